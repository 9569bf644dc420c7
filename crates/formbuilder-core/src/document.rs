//! Capability interfaces for the external document
//!
//! The engine never touches a concrete file format. A backend (see the
//! `shared-pdf` crate) implements `FormDocument` over its own object model.

use crate::error::DocumentError;
use crate::field::{FieldOption, FieldType};
use crate::units::{NativeRect, PageBox};
use serde::{Deserialize, Serialize};

/// Field kinds as the document's form layer knows them.
///
/// Wider than `FieldType`: list boxes and push buttons can exist in a
/// source document even though the builder never creates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeFieldKind {
    Text,
    Multiline,
    Checkbox,
    Radio,
    ComboBox,
    ListBox,
    Signature,
    PushButton,
}

impl NativeFieldKind {
    /// Builder type used when seeding the registry; `None` means not editable here
    pub fn builder_type(&self) -> Option<FieldType> {
        match self {
            NativeFieldKind::Text => Some(FieldType::Text),
            NativeFieldKind::Multiline => Some(FieldType::Multiline),
            NativeFieldKind::Checkbox => Some(FieldType::Checkbox),
            NativeFieldKind::Radio => Some(FieldType::Radio),
            NativeFieldKind::ComboBox | NativeFieldKind::ListBox => Some(FieldType::Dropdown),
            NativeFieldKind::Signature => Some(FieldType::Signature),
            NativeFieldKind::PushButton => None,
        }
    }
}

impl From<FieldType> for NativeFieldKind {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text => NativeFieldKind::Text,
            FieldType::Multiline => NativeFieldKind::Multiline,
            FieldType::Checkbox => NativeFieldKind::Checkbox,
            FieldType::Dropdown => NativeFieldKind::ComboBox,
            FieldType::Radio => NativeFieldKind::Radio,
            FieldType::Signature => NativeFieldKind::Signature,
        }
    }
}

/// A field as enumerated from the source document (best effort)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredField {
    /// Backend identity, e.g. the widget's object reference
    pub id: String,
    pub name: String,
    pub kind: NativeFieldKind,
    /// Zero-based page index
    pub page: usize,
    pub rect: NativeRect,
    pub editable: bool,
    pub hidden: bool,
    pub value: Option<String>,
    pub default_value: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<FieldOption>>,
}

/// Everything a backend needs to materialize one field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    pub kind: NativeFieldKind,
    pub page: usize,
    pub rect: NativeRect,
    pub options: Vec<FieldOption>,
    pub required: bool,
    pub read_only: bool,
    pub hidden: bool,
    pub font_size: Option<f64>,
    pub default_value: Option<String>,
}

/// Typed value write, derived from the per-type write rules
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum WriteValue {
    Text(String),
    Checked(bool),
    Select(String),
}

/// Construct a document from raw bytes
pub trait DocumentLoader: Sized {
    fn load(bytes: &[u8]) -> Result<Self, DocumentError>;
}

/// Mutation and inspection capability over an external form document
pub trait FormDocument {
    fn page_count(&self) -> usize;

    fn page_box(&self, page: usize) -> Option<PageBox>;

    /// Enumerate existing fields; unreadable entries are skipped, not errors
    fn discover_fields(&self) -> Vec<DiscoveredField>;

    /// Bake every interactive field into static content and drop the field layer
    fn flatten_fields(&mut self) -> Result<(), DocumentError>;

    fn create_field(&mut self, spec: &FieldSpec) -> Result<(), DocumentError>;

    fn write_value(&mut self, name: &str, value: &WriteValue) -> Result<(), DocumentError>;

    fn title(&self) -> Option<String>;

    fn set_title(&mut self, title: &str) -> Result<(), DocumentError>;

    fn to_bytes(&mut self) -> Result<Vec<u8>, DocumentError>;
}
