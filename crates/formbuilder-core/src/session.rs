//! Host-facing form builder session
//!
//! Owns the document, the registry, live values, zoom, gestures and render
//! scheduling. All mutation happens synchronously inside host calls; the
//! host learns about changes by draining `SessionEvent`s.

use crate::assignment::{self, AssignmentMap, InteractionState, Progress};
use crate::config::BuilderConfig;
use crate::document::{DiscoveredField, DocumentLoader, FormDocument};
use crate::error::{FormError, RenderError};
use crate::export::{self, SaveOutcome};
use crate::field::{FieldId, FieldPatch, FieldRecord, FieldType};
use crate::gesture::{self, ArrowKey, GestureClassifier, GestureKind, Intent, Nudge, PointerEvent, ZoomDirection};
use crate::metadata;
use crate::registry::FieldRegistry;
use crate::render::{RenderConfig, RenderOutcome, RenderScheduler, RenderTicket};
use crate::units::{rect_to_viewport, to_edit_space, EditRect, Point, ZoomLadder};
use crate::values::FieldValues;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Authoring: fields can be created, moved and resized
    Build,
    /// Filling in: values change, geometry does not
    Edit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    SelectionChanged { selected: Option<FieldId> },
    FieldsChanged { count: usize },
    #[serde(rename_all = "camelCase")]
    SaveCompleted { structural: bool, warnings: usize },
}

pub struct FormSession<D: FormDocument> {
    config: BuilderConfig,
    document: D,
    discovered: Vec<DiscoveredField>,
    registry: FieldRegistry,
    /// Whether build mode was ever entered; from then on the registry is
    /// the source of truth for assignments
    seeded: bool,
    values: FieldValues,
    stored_assignments: Option<AssignmentMap>,
    caller_assignments: Option<AssignmentMap>,
    active_participant: Option<String>,
    mode: Mode,
    zoom: ZoomLadder,
    gestures: GestureClassifier,
    renders: RenderScheduler,
    events: Vec<SessionEvent>,
    exporting: bool,
}

impl<D: FormDocument + DocumentLoader> FormSession<D> {
    /// Parse `bytes` into a document and open a session on it
    pub fn load(
        bytes: &[u8],
        config: BuilderConfig,
        render: RenderConfig,
    ) -> Result<Self, FormError> {
        let document = D::load(bytes)?;
        Self::from_document(document, config, render)
    }
}

impl<D: FormDocument> FormSession<D> {
    pub fn from_document(
        document: D,
        config: BuilderConfig,
        render: RenderConfig,
    ) -> Result<Self, FormError> {
        config.validate()?;

        let discovered = document.discover_fields();
        let values = FieldValues::from_discovered(&discovered);
        let stored_assignments = document.title().as_deref().and_then(metadata::decode);
        let registry = FieldRegistry::with_min_size(document.page_count(), config.min_field_size);

        info!(
            pages = document.page_count(),
            fields = discovered.len(),
            tagged = stored_assignments.is_some(),
            "document loaded"
        );

        Ok(Self {
            zoom: ZoomLadder::new(config.zoom_levels.clone(), config.default_zoom),
            gestures: GestureClassifier::new(&config),
            renders: RenderScheduler::new(render),
            config,
            document,
            discovered,
            registry,
            seeded: false,
            values,
            stored_assignments,
            caller_assignments: None,
            active_participant: None,
            mode: Mode::Edit,
            events: Vec::new(),
            exporting: false,
        })
    }

    // Accessors

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn fields(&self) -> &[FieldRecord] {
        self.registry.fields()
    }

    pub fn field(&self, id: &str) -> Option<&FieldRecord> {
        self.registry.get(id)
    }

    pub fn fields_on_page(&self, page: usize) -> Vec<&FieldRecord> {
        self.registry.fields_by_page(page)
    }

    pub fn selected(&self) -> Option<&FieldRecord> {
        self.registry.selected_field()
    }

    pub fn discovered_fields(&self) -> &[DiscoveredField] {
        &self.discovered
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // Modes

    /// Switch to build mode, seeding the registry from the document once
    pub fn enter_build_mode(&mut self) {
        self.cancel_gestures();
        self.mode = Mode::Build;
        if self.seeded {
            return;
        }

        let inherited = self.stored_assignments.clone().or_else(|| self.caller_assignments.clone());
        let document = &self.document;
        let count = self
            .registry
            .seed_from_existing(&self.discovered, |page| document.page_box(page));
        self.seeded = true;

        if let Some(map) = inherited {
            let ids: Vec<FieldId> = self.registry.fields().iter().map(|f| f.id.clone()).collect();
            for id in ids {
                if let Some(field) = self.registry.get_mut(&id) {
                    if let Some(assignees) = map.get(&field.name) {
                        field.properties.assignees = assignees.to_vec();
                    }
                }
            }
        }

        debug!(count, "entered build mode");
        self.fields_changed();
    }

    pub fn enter_edit_mode(&mut self) {
        self.cancel_gestures();
        self.mode = Mode::Edit;
    }

    // Registry operations

    pub fn add_field(
        &mut self,
        field_type: FieldType,
        x: f64,
        y: f64,
        page: usize,
    ) -> Result<FieldId, FormError> {
        self.require_build()?;
        let before = self.selection();
        let id = self.registry.add(field_type, x, y, page);
        self.fields_changed();
        self.selection_changed(before);
        Ok(id)
    }

    /// Drop a field at a viewport position (pixels at the current zoom)
    pub fn add_field_at_viewport(
        &mut self,
        field_type: FieldType,
        position: Point,
        page: usize,
    ) -> Result<FieldId, FormError> {
        let point = self.viewport_to_edit(position);
        self.add_field(field_type, point.x, point.y, page)
    }

    pub fn move_field(&mut self, id: &str, x: f64, y: f64) -> bool {
        let changed = self.mode == Mode::Build && self.registry.move_field(id, x, y);
        if changed {
            self.fields_changed();
        }
        changed
    }

    pub fn resize_field(&mut self, id: &str, width: f64, height: f64) -> bool {
        let changed = self.mode == Mode::Build && self.registry.resize_field(id, width, height);
        if changed {
            self.fields_changed();
        }
        changed
    }

    /// Patch a field. A rename carries the field's value to the new name.
    pub fn update_field(&mut self, id: &str, patch: FieldPatch) -> bool {
        if self.mode != Mode::Build {
            return false;
        }
        let Some(old_name) = self.registry.get(id).map(|f| f.name.clone()) else {
            return false;
        };
        self.registry.update(id, patch);

        let new_name = self
            .registry
            .get(id)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| old_name.clone());
        if new_name != old_name {
            if self.registry.find_by_name(&old_name).is_some() {
                // Another field still uses the old name; share rather than move
                if self.values.get(&new_name).is_none() {
                    if let Some(value) = self.values.get(&old_name).map(str::to_string) {
                        self.values.set(new_name, value);
                    }
                }
            } else {
                self.values.rename(&old_name, &new_name);
            }
        }
        self.fields_changed();
        true
    }

    pub fn delete_field(&mut self, id: &str) -> bool {
        if self.mode != Mode::Build {
            return false;
        }
        let before = self.selection();
        let Some(removed) = self.registry.delete(id) else {
            return false;
        };
        if self.registry.find_by_name(&removed.name).is_none() {
            self.values.remove(&removed.name);
        }
        self.fields_changed();
        self.selection_changed(before);
        true
    }

    pub fn select_field(&mut self, id: &str) -> bool {
        let before = self.selection();
        let found = self.registry.select(id);
        self.selection_changed(before);
        found
    }

    pub fn clear_selection(&mut self) {
        let before = self.selection();
        self.registry.clear_selection();
        self.selection_changed(before);
    }

    // Input

    /// Feed a pointer event and apply the resulting intents.
    ///
    /// In edit mode only zoom intents take effect. Returns the intents the
    /// classifier produced.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Vec<Intent> {
        let scale = self.zoom.scale();
        let intents = self.gestures.handle(event, &self.registry, scale);
        self.apply_intents(&intents);
        intents
    }

    /// Advance gesture timers (long press)
    pub fn tick(&mut self, now_ms: u64) -> Vec<Intent> {
        let intents = self.gestures.tick(now_ms);
        self.apply_intents(&intents);
        intents
    }

    /// Synthetic end for every gesture in flight
    pub fn cancel_gestures(&mut self) -> Vec<Intent> {
        let intents = self.gestures.cancel_all();
        self.apply_intents(&intents);
        intents
    }

    pub fn gestures_listening(&self) -> bool {
        self.gestures.listening()
    }

    /// Arrow-key nudge of the selected field. `Some` means the key was
    /// consumed and the host must prevent its default action.
    pub fn handle_key(&mut self, key: &str, large: bool) -> Option<Nudge> {
        if self.mode != Mode::Build {
            return None;
        }
        let arrow = ArrowKey::from_key(key)?;
        let field = self.registry.selected_field()?;
        let step = gesture::nudge(arrow, large, &self.config);
        let (id, x, y) = (field.id.clone(), field.x + step.dx, field.y + step.dy);
        self.move_field(&id, x, y);
        Some(step)
    }

    fn apply_intents(&mut self, intents: &[Intent]) {
        for intent in intents {
            match intent {
                Intent::Zoom(ZoomDirection::In) => {
                    self.zoom.zoom_in();
                }
                Intent::Zoom(ZoomDirection::Out) => {
                    self.zoom.zoom_out();
                }
                _ if self.mode != Mode::Build => {}
                Intent::Select(id) | Intent::LongPressSelect(id) | Intent::DoubleTapSelect(id) => {
                    self.select_field(id);
                }
                Intent::ClearSelection => self.clear_selection(),
                Intent::Move { id, x, y } => {
                    self.registry.move_field(id, *x, *y);
                }
                Intent::Resize { id, rect } => {
                    self.registry.apply_rect(id, *rect);
                }
                Intent::GestureEnded(GestureKind::Drag | GestureKind::Resize) => {
                    self.fields_changed();
                }
                Intent::GestureEnded(_) => {}
            }
        }
    }

    // Zoom and placement

    pub fn scale(&self) -> f64 {
        self.zoom.scale()
    }

    pub fn zoom_levels(&self) -> &[f64] {
        self.zoom.levels()
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom.zoom_out()
    }

    pub fn viewport_to_edit(&self, position: Point) -> Point {
        to_edit_space(position, self.zoom.scale())
    }

    /// Topmost field under a viewport position on `page`
    pub fn field_at(&self, page: usize, position: Point) -> Option<&FieldRecord> {
        let point = self.viewport_to_edit(position);
        self.registry.hit_test(page, point.x, point.y)
    }

    /// Where to draw a field at the current zoom
    pub fn field_viewport_rect(&self, id: &str) -> Option<EditRect> {
        self.registry
            .get(id)
            .map(|f| rect_to_viewport(f.rect(), self.zoom.scale()))
    }

    // Rendering

    pub fn worker_src(&self) -> String {
        self.renders.worker_src()
    }

    /// Ticket for rendering `page` at the current zoom
    pub fn request_render(&mut self, page: usize) -> RenderTicket {
        let scale = self.zoom.scale();
        self.renders.request(page, scale)
    }

    pub fn complete_render(
        &mut self,
        ticket_id: u64,
        result: Result<(), String>,
    ) -> Result<RenderOutcome, RenderError> {
        self.renders.complete(ticket_id, result)
    }

    /// Cancel every outstanding render, e.g. before the document is replaced
    pub fn cancel_renders(&mut self) {
        self.renders.cancel_all();
    }

    // Values and assignments

    /// Snapshot of current values
    pub fn values(&self) -> FieldValues {
        self.values.clone()
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name)
    }

    /// Write a value on behalf of the active participant. Hidden and
    /// read-only fields refuse the write.
    pub fn set_value(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        let name = name.into();
        let state = self.effective_state(&name);
        if !state.is_interactable() {
            debug!(field = %name, ?state, "value write refused");
            return Err(FormError::FieldNotEditable { name, state });
        }
        self.values.set(name, value);
        Ok(())
    }

    pub fn set_active_participant(&mut self, participant: Option<String>) {
        self.active_participant = participant;
    }

    pub fn active_participant(&self) -> Option<&str> {
        self.active_participant.as_deref()
    }

    /// Caller-supplied map, used only when the title carries none
    pub fn set_caller_assignments(&mut self, map: Option<AssignmentMap>) {
        self.caller_assignments = map;
    }

    /// Assignment map in force. Once build mode has been entered the
    /// registry is authoritative; before that the title map wins over the
    /// caller's.
    pub fn assignment_map(&self) -> Option<AssignmentMap> {
        if self.seeded {
            return Some(AssignmentMap::from_fields(self.registry.fields()));
        }
        self.stored_assignments
            .clone()
            .or_else(|| self.caller_assignments.clone())
    }

    pub fn stored_assignments(&self) -> Option<&AssignmentMap> {
        self.stored_assignments.as_ref()
    }

    pub fn effective_state(&self, name: &str) -> InteractionState {
        let map = self.assignment_map().unwrap_or_default();
        assignment::effective_state(
            name,
            self.active_participant.as_deref(),
            &map,
            self.config.unassigned_policy,
        )
    }

    /// Effective state of every field known to the session
    pub fn field_states(&self) -> BTreeMap<String, InteractionState> {
        self.field_names()
            .into_iter()
            .map(|name| {
                let state = self.effective_state(&name);
                (name, state)
            })
            .collect()
    }

    pub fn progress(&self) -> Progress {
        let names = self.field_names();
        let map = self.assignment_map();
        assignment::progress(
            self.active_participant.as_deref(),
            map.as_ref(),
            names.iter().map(String::as_str),
            &self.values,
        )
    }

    fn field_names(&self) -> Vec<String> {
        let names: BTreeSet<String> = if self.seeded {
            self.registry.fields().iter().map(|f| f.name.clone()).collect()
        } else {
            self.discovered.iter().map(|f| f.name.clone()).collect()
        };
        names.into_iter().collect()
    }

    // Saving

    /// Save the document: structural in build mode, incremental otherwise.
    ///
    /// The export guard is held for the duration of the call. It only
    /// becomes observable to hosts that wrap the save asynchronously and
    /// check `is_exporting` before starting another one.
    pub fn save(&mut self) -> Result<SaveOutcome, FormError> {
        if self.exporting {
            return Err(FormError::ExportInProgress);
        }
        self.exporting = true;
        let result = match self.mode {
            Mode::Build => self.structural_save(),
            Mode::Edit => export::incremental_save(&mut self.document, &self.values),
        };
        self.exporting = false;

        let outcome = result?;
        self.events.push(SessionEvent::SaveCompleted {
            structural: outcome.fields.is_some(),
            warnings: outcome.report.warnings.len(),
        });
        Ok(outcome)
    }

    fn structural_save(&mut self) -> Result<SaveOutcome, FormError> {
        self.require_build()?;
        let outcome = export::structural_save(
            &mut self.document,
            self.registry.fields(),
            &self.values,
        )?;

        // Adopt names made unique during export
        let mut renamed = false;
        for exported in outcome.fields.iter().flatten() {
            if let Some(field) = self.registry.get_mut(&exported.id) {
                if field.name != exported.name {
                    if let Some(value) = self.values.get(&field.name).map(str::to_string) {
                        self.values.set(exported.name.clone(), value);
                    }
                    field.name = exported.name.clone();
                    renamed = true;
                }
            }
        }
        if renamed {
            self.fields_changed();
        }

        self.discovered = self.document.discover_fields();
        self.stored_assignments = outcome.assignments.clone();
        Ok(outcome)
    }

    // Helpers

    fn require_build(&self) -> Result<(), FormError> {
        if self.mode == Mode::Build {
            Ok(())
        } else {
            Err(FormError::NotInBuildMode)
        }
    }

    fn selection(&self) -> Option<FieldId> {
        self.registry.selected().map(str::to_string)
    }

    fn selection_changed(&mut self, before: Option<FieldId>) {
        let after = self.selection();
        if after != before {
            self.events.push(SessionEvent::SelectionChanged { selected: after });
        }
    }

    fn fields_changed(&mut self) {
        self.events.push(SessionEvent::FieldsChanged {
            count: self.registry.len(),
        });
    }

    #[cfg(test)]
    pub(crate) fn set_exporting(&mut self, exporting: bool) {
        self.exporting = exporting;
    }
}
