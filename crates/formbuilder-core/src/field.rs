//! Field data model
//!
//! A `FieldRecord` is the single source of truth for a field's identity and
//! geometry during a session. Geometry is kept in edit space.

use crate::units::EditRect;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type FieldId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Multiline,
    Checkbox,
    Dropdown,
    Radio,
    Signature,
}

impl FieldType {
    pub const ALL: [FieldType; 6] = [
        FieldType::Text,
        FieldType::Multiline,
        FieldType::Checkbox,
        FieldType::Dropdown,
        FieldType::Radio,
        FieldType::Signature,
    ];

    /// Default dimensions for a freshly dropped field (width, height)
    pub fn default_dimensions(&self) -> (f64, f64) {
        match self {
            FieldType::Text => (115.0, 16.0),
            FieldType::Multiline => (115.0, 48.0),
            FieldType::Checkbox => (16.0, 16.0),
            FieldType::Dropdown => (115.0, 16.0),
            FieldType::Radio => (16.0, 16.0),
            FieldType::Signature => (150.0, 40.0),
        }
    }

    pub fn default_properties(&self) -> FieldProperties {
        match self {
            FieldType::Text | FieldType::Multiline => FieldProperties {
                font_size: Some(12.0),
                ..FieldProperties::default()
            },
            FieldType::Dropdown | FieldType::Radio => FieldProperties {
                options: vec![
                    FieldOption::same("Option 1"),
                    FieldOption::same("Option 2"),
                ],
                ..FieldProperties::default()
            },
            FieldType::Checkbox | FieldType::Signature => FieldProperties::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Multiline => "multiline",
            FieldType::Checkbox => "checkbox",
            FieldType::Dropdown => "dropdown",
            FieldType::Radio => "radio",
            FieldType::Signature => "signature",
        }
    }

    /// Whether the type is meaningless without at least one option
    pub fn needs_options(&self) -> bool {
        matches!(self, FieldType::Dropdown | FieldType::Radio)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(FieldType::Text),
            "multiline" | "textarea" => Ok(FieldType::Multiline),
            "checkbox" => Ok(FieldType::Checkbox),
            "dropdown" | "select" => Ok(FieldType::Dropdown),
            "radio" => Ok(FieldType::Radio),
            "signature" => Ok(FieldType::Signature),
            other => Err(format!("Invalid field type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldOrigin {
    /// Discovered in the source document
    Existing,
    /// Created during this session
    New,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOption {
    pub export_value: String,
    pub display_value: String,
}

impl FieldOption {
    pub fn new(export_value: impl Into<String>, display_value: impl Into<String>) -> Self {
        Self {
            export_value: export_value.into(),
            display_value: display_value.into(),
        }
    }

    /// Option whose export and display values are identical
    pub fn same(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            export_value: value.clone(),
            display_value: value,
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        self.export_value == value || self.display_value == value
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldProperties {
    pub placeholder: Option<String>,
    pub default_value: Option<String>,
    pub required: bool,
    pub font_size: Option<f64>,
    pub text_color: Option<String>,
    pub background_color: Option<String>,
    pub border_color: Option<String>,
    pub options: Vec<FieldOption>,
    /// Participants permitted to edit this field in edit mode, in order
    pub assignees: Vec<String>,
    pub read_only: bool,
    pub hidden: bool,
}

impl FieldProperties {
    /// Deep-merge a patch: only keys present in the patch are replaced
    pub fn merge(&mut self, patch: PropertiesPatch) {
        if let Some(placeholder) = patch.placeholder {
            self.placeholder = placeholder;
        }
        if let Some(default_value) = patch.default_value {
            self.default_value = default_value;
        }
        if let Some(required) = patch.required {
            self.required = required;
        }
        if let Some(font_size) = patch.font_size {
            self.font_size = font_size;
        }
        if let Some(text_color) = patch.text_color {
            self.text_color = text_color;
        }
        if let Some(background_color) = patch.background_color {
            self.background_color = background_color;
        }
        if let Some(border_color) = patch.border_color {
            self.border_color = border_color;
        }
        if let Some(options) = patch.options {
            self.options = options;
        }
        if let Some(assignees) = patch.assignees {
            self.assignees = dedup_ordered(assignees);
        }
        if let Some(read_only) = patch.read_only {
            self.read_only = read_only;
        }
        if let Some(hidden) = patch.hidden {
            self.hidden = hidden;
        }
    }
}

/// Partial update of `FieldProperties`.
///
/// Outer `None` means "leave untouched"; for optional properties the inner
/// `Option` allows clearing (`Some(None)`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertiesPatch {
    #[serde(with = "double_option")]
    pub placeholder: Option<Option<String>>,
    #[serde(with = "double_option")]
    pub default_value: Option<Option<String>>,
    pub required: Option<bool>,
    #[serde(with = "double_option")]
    pub font_size: Option<Option<f64>>,
    #[serde(with = "double_option")]
    pub text_color: Option<Option<String>>,
    #[serde(with = "double_option")]
    pub background_color: Option<Option<String>>,
    #[serde(with = "double_option")]
    pub border_color: Option<Option<String>>,
    pub options: Option<Vec<FieldOption>>,
    pub assignees: Option<Vec<String>>,
    pub read_only: Option<bool>,
    pub hidden: Option<bool>,
}

/// Partial update of a `FieldRecord`. Type and origin are immutable and absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldPatch {
    pub name: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub page: Option<usize>,
    pub properties: Option<PropertiesPatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub page: usize,
    pub origin: FieldOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<String>,
    #[serde(default)]
    pub properties: FieldProperties,
}

impl FieldRecord {
    pub fn rect(&self) -> EditRect {
        EditRect::new(self.x, self.y, self.width, self.height)
    }
}

/// Remove repeated entries, keeping first occurrence order
pub(crate) fn dedup_ordered(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Serde helper distinguishing a missing key from an explicit `null`
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
