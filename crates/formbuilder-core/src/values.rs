//! Live field values keyed by field name

use crate::document::{DiscoveredField, NativeFieldKind, WriteValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value stored for an unset checkbox or radio group
pub const OFF_VALUE: &str = "Off";
pub const ON_VALUE: &str = "On";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues(BTreeMap<String, String>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from discovered fields: current value, falling back to the default value
    pub fn from_discovered(fields: &[DiscoveredField]) -> Self {
        let mut values = Self::new();
        for field in fields {
            if let Some(value) = field.value.clone().or_else(|| field.default_value.clone()) {
                values.0.entry(field.name.clone()).or_insert(value);
            }
        }
        values
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    /// Move a value to a new key; an existing value under `to` is kept
    pub fn rename(&mut self, from: &str, to: &str) {
        if from == to {
            return;
        }
        if let Some(value) = self.0.remove(from) {
            self.0.entry(to.to_string()).or_insert(value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A value counts as filled in when it is non-blank and not the "off" sentinel
pub fn is_completed_value(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case(OFF_VALUE)
}

/// Per-type write rule. `None` means the kind is read but not written.
pub fn write_rule(kind: NativeFieldKind, value: &str) -> Option<WriteValue> {
    match kind {
        NativeFieldKind::Text | NativeFieldKind::Multiline => {
            Some(WriteValue::Text(value.to_string()))
        }
        // Any on-state name ("On", "Yes", "Agree", ...) means checked
        NativeFieldKind::Checkbox => Some(WriteValue::Checked(is_completed_value(value))),
        NativeFieldKind::ComboBox => Some(WriteValue::Select(value.to_string())),
        NativeFieldKind::Radio
        | NativeFieldKind::ListBox
        | NativeFieldKind::Signature
        | NativeFieldKind::PushButton => None,
    }
}
