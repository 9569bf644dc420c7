//! In-memory `FormDocument` for unit tests

use crate::document::{
    DiscoveredField, DocumentLoader, FieldSpec, FormDocument, NativeFieldKind, WriteValue,
};
use crate::error::DocumentError;
use crate::field::FieldOption;
use crate::units::{NativeRect, PageBox};
use crate::values::{OFF_VALUE, ON_VALUE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryField {
    pub name: String,
    pub kind: NativeFieldKind,
    pub page: usize,
    pub rect: NativeRect,
    pub options: Vec<FieldOption>,
    pub value: Option<String>,
    pub default_value: Option<String>,
    pub read_only: bool,
    pub hidden: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryDocument {
    pub pages: Vec<PageBox>,
    pub fields: Vec<MemoryField>,
    pub title: Option<String>,
    #[serde(skip)]
    pub flattened: Vec<String>,
    #[serde(skip)]
    pub writes: Vec<String>,
    #[serde(skip)]
    pub fail_create: BTreeSet<String>,
}

impl MemoryDocument {
    pub fn with_pages(count: usize) -> Self {
        Self {
            pages: vec![PageBox::letter(); count],
            ..Self::default()
        }
    }

    pub fn add_existing(&mut self, name: &str, kind: NativeFieldKind, page: usize) {
        let options = match kind {
            NativeFieldKind::ComboBox | NativeFieldKind::ListBox | NativeFieldKind::Radio => {
                vec![FieldOption::same("A"), FieldOption::same("B")]
            }
            _ => Vec::new(),
        };
        self.fields.push(MemoryField {
            name: name.to_string(),
            kind,
            page,
            rect: NativeRect::new(100.0, 700.0, 300.0, 720.0),
            options,
            value: None,
            default_value: None,
            read_only: false,
            hidden: false,
        });
    }

    pub fn field(&self, name: &str) -> Option<&MemoryField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl DocumentLoader for MemoryDocument {
    fn load(bytes: &[u8]) -> Result<Self, DocumentError> {
        serde_json::from_slice(bytes).map_err(|e| DocumentError::Load(e.to_string()))
    }
}

impl FormDocument for MemoryDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_box(&self, page: usize) -> Option<PageBox> {
        self.pages.get(page).copied()
    }

    fn discover_fields(&self) -> Vec<DiscoveredField> {
        self.fields
            .iter()
            .enumerate()
            .map(|(i, f)| DiscoveredField {
                id: format!("mem-{}", i),
                name: f.name.clone(),
                kind: f.kind,
                page: f.page,
                rect: f.rect,
                editable: !f.read_only,
                hidden: f.hidden,
                value: f.value.clone(),
                default_value: f.default_value.clone(),
                options: (!f.options.is_empty()).then(|| f.options.clone()),
            })
            .collect()
    }

    fn flatten_fields(&mut self) -> Result<(), DocumentError> {
        self.flattened
            .extend(self.fields.drain(..).map(|f| f.name));
        Ok(())
    }

    fn create_field(&mut self, spec: &FieldSpec) -> Result<(), DocumentError> {
        if self.fail_create.contains(&spec.name) {
            return Err(DocumentError::UnsupportedField {
                field: spec.name.clone(),
                reason: "rejected by test document".to_string(),
            });
        }
        if spec.page >= self.pages.len() {
            return Err(DocumentError::PageNotFound(spec.page));
        }
        self.fields.push(MemoryField {
            name: spec.name.clone(),
            kind: spec.kind,
            page: spec.page,
            rect: spec.rect,
            options: spec.options.clone(),
            value: None,
            default_value: spec.default_value.clone(),
            read_only: spec.read_only,
            hidden: spec.hidden,
        });
        Ok(())
    }

    fn write_value(&mut self, name: &str, value: &WriteValue) -> Result<(), DocumentError> {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| DocumentError::FieldNotFound(name.to_string()))?;
        field.value = Some(match value {
            WriteValue::Text(text) => text.clone(),
            WriteValue::Checked(true) => ON_VALUE.to_string(),
            WriteValue::Checked(false) => OFF_VALUE.to_string(),
            WriteValue::Select(choice) => field
                .options
                .iter()
                .find(|o| o.matches(choice))
                .map(|o| o.export_value.clone())
                .ok_or_else(|| DocumentError::OptionNotFound {
                    field: name.to_string(),
                    value: choice.clone(),
                })?,
        });
        self.writes.push(name.to_string());
        Ok(())
    }

    fn title(&self) -> Option<String> {
        self.title.clone()
    }

    fn set_title(&mut self, title: &str) -> Result<(), DocumentError> {
        self.title = Some(title.to_string());
        Ok(())
    }

    fn to_bytes(&mut self) -> Result<Vec<u8>, DocumentError> {
        serde_json::to_vec(self).map_err(|e| DocumentError::Serialize(e.to_string()))
    }
}
