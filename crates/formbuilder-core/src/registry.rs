//! Field registry: owns the ordered field collection and the selection
//!
//! All mutations come from continuous interactive input, so unknown ids and
//! out-of-range geometry are clamped or ignored rather than reported.

use crate::config::MIN_FIELD_SIZE;
use crate::document::DiscoveredField;
use crate::field::{FieldId, FieldOrigin, FieldPatch, FieldProperties, FieldRecord, FieldType};
use crate::gesture::GeometrySource;
use crate::units::{import_rect, EditRect, PageBox};
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct FieldRegistry {
    fields: Vec<FieldRecord>,
    selected: Option<FieldId>,
    page_count: usize,
    min_size: f64,
}

impl FieldRegistry {
    pub fn new(page_count: usize) -> Self {
        Self::with_min_size(page_count, MIN_FIELD_SIZE)
    }

    pub fn with_min_size(page_count: usize, min_size: f64) -> Self {
        Self {
            fields: Vec::new(),
            selected: None,
            page_count: page_count.max(1),
            min_size,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn min_size(&self) -> f64 {
        self.min_size
    }

    /// Create a field with type defaults, select it and return its id
    pub fn add(&mut self, field_type: FieldType, x: f64, y: f64, page: usize) -> FieldId {
        let (width, height) = field_type.default_dimensions();
        let record = FieldRecord {
            id: Uuid::new_v4().to_string(),
            field_type,
            name: self.next_default_name(field_type),
            x: x.max(0.0),
            y: y.max(0.0),
            width,
            height,
            page: self.clamp_page(page),
            origin: FieldOrigin::New,
            original_id: None,
            properties: field_type.default_properties(),
        };
        let id = record.id.clone();
        debug!(field = %record.name, page = record.page, "added field");
        self.fields.push(record);
        self.selected = Some(id.clone());
        id
    }

    /// Move a field; coordinates are clamped to the page's positive quadrant
    pub fn move_field(&mut self, id: &str, x: f64, y: f64) -> bool {
        match self.get_mut(id) {
            Some(field) => {
                field.x = x.max(0.0);
                field.y = y.max(0.0);
                true
            }
            None => false,
        }
    }

    /// Resize a field; both extents are clamped to the minimum size
    pub fn resize_field(&mut self, id: &str, width: f64, height: f64) -> bool {
        let min = self.min_size;
        match self.get_mut(id) {
            Some(field) => {
                field.width = width.max(min);
                field.height = height.max(min);
                true
            }
            None => false,
        }
    }

    /// Apply a corner-handle resize, which repositions as well as resizes.
    ///
    /// An extent the handle left untouched is kept as is, so a default-sized
    /// text field (16 high) keeps its height on a purely horizontal resize.
    pub fn apply_rect(&mut self, id: &str, rect: EditRect) -> bool {
        let min = self.min_size;
        match self.get_mut(id) {
            Some(field) => {
                field.x = rect.x.max(0.0);
                field.y = rect.y.max(0.0);
                if rect.width != field.width {
                    field.width = rect.width.max(min);
                }
                if rect.height != field.height {
                    field.height = rect.height.max(min);
                }
                true
            }
            None => false,
        }
    }

    /// Shallow-merge top-level attributes, deep-merge properties
    pub fn update(&mut self, id: &str, patch: FieldPatch) -> bool {
        let min = self.min_size;
        let page_count = self.page_count;
        let Some(field) = self.get_mut(id) else {
            return false;
        };
        if let Some(name) = patch.name {
            field.name = name;
        }
        if let Some(x) = patch.x {
            field.x = x.max(0.0);
        }
        if let Some(y) = patch.y {
            field.y = y.max(0.0);
        }
        if let Some(width) = patch.width {
            field.width = width.max(min);
        }
        if let Some(height) = patch.height {
            field.height = height.max(min);
        }
        if let Some(page) = patch.page {
            if page < page_count {
                field.page = page;
            }
        }
        if let Some(properties) = patch.properties {
            field.properties.merge(properties);
        }
        true
    }

    /// Remove a field, clearing the selection if it pointed at it
    pub fn delete(&mut self, id: &str) -> Option<FieldRecord> {
        let index = self.fields.iter().position(|f| f.id == id)?;
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        Some(self.fields.remove(index))
    }

    /// One-shot import of pre-existing document fields.
    ///
    /// Does nothing when the registry already holds a record, so repeated
    /// calls (e.g. on re-render) never clobber edits. Returns the number seeded.
    pub fn seed_from_existing<F>(&mut self, discovered: &[DiscoveredField], page_box: F) -> usize
    where
        F: Fn(usize) -> Option<PageBox>,
    {
        if !self.fields.is_empty() {
            debug!("registry already populated, skipping seed");
            return 0;
        }

        for field in discovered {
            let Some(field_type) = field.kind.builder_type() else {
                debug!(field = %field.name, "skipping unsupported field kind");
                continue;
            };
            if field.page >= self.page_count {
                debug!(field = %field.name, page = field.page, "skipping field on missing page");
                continue;
            }

            let page = page_box(field.page).unwrap_or_else(PageBox::letter);
            let rect = import_rect(field.rect, &page);
            let name = if field.name.is_empty() {
                self.next_default_name(field_type)
            } else {
                field.name.clone()
            };

            self.fields.push(FieldRecord {
                id: Uuid::new_v4().to_string(),
                field_type,
                name,
                x: rect.x.max(0.0),
                y: rect.y.max(0.0),
                width: rect.width,
                height: rect.height,
                page: field.page,
                origin: FieldOrigin::Existing,
                original_id: Some(field.id.clone()),
                properties: FieldProperties {
                    default_value: field.default_value.clone(),
                    options: field.options.clone().unwrap_or_default(),
                    read_only: !field.editable,
                    hidden: field.hidden,
                    ..field_type.default_properties()
                },
            });
        }

        info!(count = self.fields.len(), "seeded registry from document");
        self.fields.len()
    }

    /// Select a field; unknown ids leave the selection unchanged
    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_some() {
            self.selected = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_field(&self) -> Option<&FieldRecord> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn get(&self, id: &str) -> Option<&FieldRecord> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut FieldRecord> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&FieldRecord> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> &[FieldRecord] {
        &self.fields
    }

    pub fn fields_by_page(&self, page: usize) -> Vec<&FieldRecord> {
        self.fields.iter().filter(|f| f.page == page).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names shared by more than one field, sorted
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for field in &self.fields {
            *counts.entry(field.name.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Topmost field whose rect contains an edit-space point on `page`
    pub fn hit_test(&self, page: usize, x: f64, y: f64) -> Option<&FieldRecord> {
        let point = crate::units::Point::new(x, y);
        self.fields
            .iter()
            .rev()
            .find(|f| f.page == page && f.rect().contains(point))
    }

    fn next_default_name(&self, field_type: FieldType) -> String {
        let mut n = 1;
        loop {
            let candidate = format!("{}_{}", field_type.as_str(), n);
            if self.find_by_name(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    fn clamp_page(&self, page: usize) -> usize {
        page.min(self.page_count - 1)
    }
}

impl GeometrySource for FieldRegistry {
    fn rect_of(&self, id: &str) -> Option<EditRect> {
        self.get(id).map(FieldRecord::rect)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// No sequence of resizes can push a field under the floor
        #[test]
        fn resize_floor_holds(sizes in prop::collection::vec((-100.0f64..400.0, -100.0f64..400.0), 1..30)) {
            let mut registry = FieldRegistry::new(1);
            let id = registry.add(FieldType::Text, 10.0, 10.0, 0);
            for (w, h) in sizes {
                registry.resize_field(&id, w, h);
                let field = registry.get(&id).unwrap();
                prop_assert!(field.width >= MIN_FIELD_SIZE);
                prop_assert!(field.height >= MIN_FIELD_SIZE);
            }
        }

        /// Moves never produce negative coordinates
        #[test]
        fn move_never_negative(x in -500.0f64..500.0, y in -500.0f64..500.0) {
            let mut registry = FieldRegistry::new(1);
            let id = registry.add(FieldType::Checkbox, 0.0, 0.0, 0);
            registry.move_field(&id, x, y);
            let field = registry.get(&id).unwrap();
            prop_assert!(field.x >= 0.0 && field.y >= 0.0);
        }
    }
}
