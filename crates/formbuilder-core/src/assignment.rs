//! Assignment resolver
//!
//! Decides, per field and active participant, whether the field is editable,
//! read-only or hidden, and aggregates completion progress.

use crate::field::{dedup_ordered, FieldRecord};
use crate::values::{is_completed_value, FieldValues};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// What happens to a field assigned to someone other than the active participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnassignedPolicy {
    /// Excluded from interaction and from progress
    Hidden,
    /// Visible but disabled
    #[default]
    Readonly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionState {
    Editable,
    ReadOnly,
    Hidden,
}

impl InteractionState {
    pub fn is_interactable(&self) -> bool {
        matches!(self, InteractionState::Editable)
    }
}

/// Field name to ordered, duplicate-free participant list
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct AssignmentMap(BTreeMap<String, Vec<String>>);

impl AssignmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten the live per-field assignees. Unassigned fields get no entry.
    pub fn from_fields(fields: &[FieldRecord]) -> Self {
        let mut map = Self::new();
        for field in fields {
            if !field.properties.assignees.is_empty() {
                map.insert(field.name.clone(), field.properties.assignees.clone());
            }
        }
        map
    }

    pub fn insert(&mut self, name: impl Into<String>, participants: Vec<String>) {
        self.0.insert(name.into(), dedup_ordered(participants));
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.0.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_assigned_to(&self, name: &str, participant: &str) -> bool {
        self.get(name)
            .map(|p| p.iter().any(|id| id == participant))
            .unwrap_or(false)
    }
}

impl From<BTreeMap<String, Vec<String>>> for AssignmentMap {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        let mut out = Self::new();
        for (name, participants) in map {
            out.insert(name, participants);
        }
        out
    }
}

// Decoded maps go through `insert` so participant lists stay duplicate-free
impl<'de> Deserialize<'de> for AssignmentMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::<String, Vec<String>>::deserialize(deserializer).map(Self::from)
    }
}

/// Effective interaction state of the field called `name`
pub fn effective_state(
    name: &str,
    active: Option<&str>,
    map: &AssignmentMap,
    policy: UnassignedPolicy,
) -> InteractionState {
    let Some(participant) = active else {
        return InteractionState::Editable;
    };
    let Some(assignees) = map.get(name) else {
        return InteractionState::Editable;
    };
    if assignees.iter().any(|id| id == participant) {
        return InteractionState::Editable;
    }
    match policy {
        UnassignedPolicy::Hidden => InteractionState::Hidden,
        UnassignedPolicy::Readonly => InteractionState::ReadOnly,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub assigned: usize,
    pub completed: usize,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.completed >= self.assigned
    }
}

/// Completion progress for the active participant.
///
/// With no map (or an empty one) every field counts as assigned; otherwise
/// only fields whose entry names the participant do.
pub fn progress<'a, I>(
    active: Option<&str>,
    map: Option<&AssignmentMap>,
    field_names: I,
    values: &FieldValues,
) -> Progress
where
    I: IntoIterator<Item = &'a str>,
{
    let map = map.filter(|m| !m.is_empty());
    let mut result = Progress::default();
    for name in field_names {
        let assigned = match (map, active) {
            (Some(map), Some(participant)) => map.is_assigned_to(name, participant),
            _ => true,
        };
        if !assigned {
            continue;
        }
        result.assigned += 1;
        if values.get(name).map(is_completed_value).unwrap_or(false) {
            result.completed += 1;
        }
    }
    result
}
