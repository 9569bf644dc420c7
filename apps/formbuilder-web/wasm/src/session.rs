//! Stateful form-builder session
//!
//! Holds the loaded document, field registry and gesture state in Rust.
//! Every JS-facing method has an `_internal` counterpart that is testable
//! without `JsValue`.

use formbuilder_core::gesture::{Intent, PointerEvent, SwipeDismiss, SwipeOutcome};
use formbuilder_core::{
    AssignmentMap, BuilderConfig, FieldPatch, FieldType, FormError, FormSession, Mode, Point,
    RenderConfig, RenderOutcome, SaveOutcome,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_pdf::PdfDocument;
use wasm_bindgen::prelude::*;

type Session = FormSession<PdfDocument>;

fn not_ready() -> String {
    FormError::NotReady("no document loaded".to_string()).to_string()
}

/// Summary returned after loading a document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub page_count: usize,
    pub field_count: usize,
    pub has_stored_assignments: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TicketInfo {
    id: u64,
    page: usize,
    scale: f64,
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    // Plain objects rather than JS Maps for map-shaped data
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid argument: {}", e)))
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Form-builder session exposed to JavaScript
#[wasm_bindgen]
pub struct FormBuilderSession {
    config: BuilderConfig,
    render: RenderConfig,
    session: Option<Session>,
    swipe: SwipeDismiss,
    last_save: Option<SaveOutcome>,
}

impl FormBuilderSession {
    /// Build from an optional (partial) JSON config and worker override
    pub fn with_config(config_json: Option<&str>, worker_src: Option<String>) -> Result<Self, String> {
        let config = match config_json.map(str::trim).filter(|s| !s.is_empty()) {
            Some(json) => BuilderConfig::from_json(json).map_err(|e| e.to_string())?,
            None => BuilderConfig::default(),
        };
        let render = RenderConfig {
            worker_src,
            ..RenderConfig::default()
        };
        Ok(Self {
            swipe: SwipeDismiss::from_config(&config),
            config,
            render,
            session: None,
            last_save: None,
        })
    }

    fn session(&self) -> Result<&Session, String> {
        self.session.as_ref().ok_or_else(not_ready)
    }

    fn session_mut(&mut self) -> Result<&mut Session, String> {
        self.session.as_mut().ok_or_else(not_ready)
    }

    /// Replace the current document (testable without JsValue)
    pub fn load_document_internal(&mut self, bytes: &[u8]) -> Result<DocumentInfo, String> {
        let session = Session::load(bytes, self.config.clone(), self.render.clone())
            .map_err(|e| e.to_string())?;
        let info = DocumentInfo {
            page_count: session.page_count(),
            field_count: session.discovered_fields().len(),
            has_stored_assignments: session.stored_assignments().is_some(),
        };
        if let Some(previous) = self.session.as_mut() {
            previous.cancel_renders();
        }
        self.session = Some(session);
        self.last_save = None;
        self.swipe.cancel();
        Ok(info)
    }

    pub fn add_field_internal(
        &mut self,
        field_type: &str,
        x: f64,
        y: f64,
        page: usize,
    ) -> Result<String, String> {
        let field_type: FieldType = field_type.parse()?;
        self.session_mut()?
            .add_field(field_type, x, y, page)
            .map_err(|e| e.to_string())
    }

    pub fn update_field_internal(&mut self, id: &str, patch: FieldPatch) -> Result<bool, String> {
        Ok(self.session_mut()?.update_field(id, patch))
    }

    pub fn handle_pointer_internal(&mut self, event: &PointerEvent) -> Result<Vec<Intent>, String> {
        Ok(self.session_mut()?.handle_pointer(event))
    }

    /// Write a value as the active participant; refused for hidden and read-only fields
    pub fn set_value_internal(&mut self, name: &str, value: &str) -> Result<(), String> {
        self.session_mut()?
            .set_value(name, value)
            .map_err(|e| e.to_string())
    }

    pub fn set_assignments_internal(&mut self, map: Option<AssignmentMap>) -> Result<(), String> {
        self.session_mut()?.set_caller_assignments(map);
        Ok(())
    }

    /// Save and keep the outcome for `lastSaveSummary`
    pub fn save_internal(&mut self) -> Result<Vec<u8>, String> {
        let mut outcome = self.session_mut()?.save().map_err(|e| match e {
            FormError::ExportInProgress => "An export is already in progress".to_string(),
            other => other.to_string(),
        })?;
        let bytes = std::mem::take(&mut outcome.bytes);
        self.last_save = Some(outcome);
        Ok(bytes)
    }
}

#[wasm_bindgen]
impl FormBuilderSession {
    /// Create a session. `config_json` may be partial; missing keys take defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>, worker_src: Option<String>) -> Result<FormBuilderSession, JsValue> {
        Self::with_config(config_json.as_deref(), worker_src).map_err(js_err)
    }

    /// Load a PDF; returns `{ pageCount, fieldCount, hasStoredAssignments }`
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, bytes: &[u8]) -> Result<JsValue, JsValue> {
        let info = self.load_document_internal(bytes).map_err(js_err)?;
        to_js(&info)
    }

    #[wasm_bindgen(js_name = hasDocument)]
    pub fn has_document(&self) -> bool {
        self.session.is_some()
    }

    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> u32 {
        self.session
            .as_ref()
            .map(|s| s.page_count() as u32)
            .unwrap_or(0)
    }

    /// Page size in document units, zero-based page index
    #[wasm_bindgen(js_name = pageBox)]
    pub fn page_box(&self, page: usize) -> Result<JsValue, JsValue> {
        let session = self.session().map_err(js_err)?;
        let page_box = formbuilder_core::FormDocument::page_box(session.document(), page)
            .ok_or_else(|| JsValue::from_str(&format!("Page {} not found", page)))?;
        to_js(&page_box)
    }

    /// "build" or "edit"
    #[wasm_bindgen]
    pub fn mode(&self) -> String {
        match self.session.as_ref().map(|s| s.mode()) {
            Some(Mode::Build) => "build".to_string(),
            _ => "edit".to_string(),
        }
    }

    #[wasm_bindgen(js_name = enterBuildMode)]
    pub fn enter_build_mode(&mut self) -> Result<(), JsValue> {
        self.session_mut().map_err(js_err)?.enter_build_mode();
        Ok(())
    }

    #[wasm_bindgen(js_name = enterEditMode)]
    pub fn enter_edit_mode(&mut self) -> Result<(), JsValue> {
        self.session_mut().map_err(js_err)?.enter_edit_mode();
        Ok(())
    }

    // Fields

    /// Drop a field at edit-space coordinates; returns its id
    #[wasm_bindgen(js_name = addField)]
    pub fn add_field(&mut self, field_type: &str, x: f64, y: f64, page: usize) -> Result<String, JsValue> {
        self.add_field_internal(field_type, x, y, page).map_err(js_err)
    }

    /// Drop a field at viewport pixels (divided by the current zoom)
    #[wasm_bindgen(js_name = addFieldAtViewport)]
    pub fn add_field_at_viewport(
        &mut self,
        field_type: &str,
        x: f64,
        y: f64,
        page: usize,
    ) -> Result<String, JsValue> {
        let field_type: FieldType = field_type.parse().map_err(js_err)?;
        self.session_mut()
            .map_err(js_err)?
            .add_field_at_viewport(field_type, Point::new(x, y), page)
            .map_err(js_err)
    }

    #[wasm_bindgen(js_name = moveField)]
    pub fn move_field(&mut self, id: &str, x: f64, y: f64) -> bool {
        self.session
            .as_mut()
            .map(|s| s.move_field(id, x, y))
            .unwrap_or(false)
    }

    #[wasm_bindgen(js_name = resizeField)]
    pub fn resize_field(&mut self, id: &str, width: f64, height: f64) -> bool {
        self.session
            .as_mut()
            .map(|s| s.resize_field(id, width, height))
            .unwrap_or(false)
    }

    /// Apply a partial update, e.g. `{ name: "rent", properties: { assignees: ["1"] } }`
    #[wasm_bindgen(js_name = updateField)]
    pub fn update_field(&mut self, id: &str, patch: JsValue) -> Result<bool, JsValue> {
        let patch: FieldPatch = from_js(patch)?;
        self.update_field_internal(id, patch).map_err(js_err)
    }

    #[wasm_bindgen(js_name = deleteField)]
    pub fn delete_field(&mut self, id: &str) -> bool {
        self.session
            .as_mut()
            .map(|s| s.delete_field(id))
            .unwrap_or(false)
    }

    #[wasm_bindgen(js_name = selectField)]
    pub fn select_field(&mut self, id: &str) -> bool {
        self.session
            .as_mut()
            .map(|s| s.select_field(id))
            .unwrap_or(false)
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.clear_selection();
        }
    }

    #[wasm_bindgen(js_name = selectedId)]
    pub fn selected_id(&self) -> Option<String> {
        self.session
            .as_ref()
            .and_then(|s| s.selected())
            .map(|f| f.id.clone())
    }

    #[wasm_bindgen]
    pub fn fields(&self) -> Result<JsValue, JsValue> {
        let session = self.session().map_err(js_err)?;
        to_js(session.fields())
    }

    #[wasm_bindgen(js_name = fieldsOnPage)]
    pub fn fields_on_page(&self, page: usize) -> Result<JsValue, JsValue> {
        let session = self.session().map_err(js_err)?;
        to_js(&session.fields_on_page(page))
    }

    /// Fields as found in the source document
    #[wasm_bindgen(js_name = discoveredFields)]
    pub fn discovered_fields(&self) -> Result<JsValue, JsValue> {
        let session = self.session().map_err(js_err)?;
        to_js(session.discovered_fields())
    }

    /// Id of the topmost field under a viewport position, if any
    #[wasm_bindgen(js_name = fieldAt)]
    pub fn field_at(&self, x: f64, y: f64, page: usize) -> Option<String> {
        self.session
            .as_ref()
            .and_then(|s| s.field_at(page, Point::new(x, y)))
            .map(|f| f.id.clone())
    }

    /// Rect of a field in viewport pixels at the current zoom
    #[wasm_bindgen(js_name = fieldViewportRect)]
    pub fn field_viewport_rect(&self, id: &str) -> Result<JsValue, JsValue> {
        let session = self.session().map_err(js_err)?;
        to_js(&session.field_viewport_rect(id))
    }

    // Input

    /// Classify one pointer event; returns the intents it produced
    #[wasm_bindgen(js_name = handlePointer)]
    pub fn handle_pointer(&mut self, event: JsValue) -> Result<JsValue, JsValue> {
        let event: PointerEvent = from_js(event)?;
        let intents = self.handle_pointer_internal(&event).map_err(js_err)?;
        to_js(&intents)
    }

    /// Advance timers (long press); call from requestAnimationFrame or a timer
    #[wasm_bindgen]
    pub fn tick(&mut self, now_ms: f64) -> Result<JsValue, JsValue> {
        let now = now_ms.max(0.0) as u64;
        let intents = self.session_mut().map_err(js_err)?.tick(now);
        to_js(&intents)
    }

    #[wasm_bindgen(js_name = cancelGestures)]
    pub fn cancel_gestures(&mut self) -> Result<JsValue, JsValue> {
        let intents = self.session_mut().map_err(js_err)?.cancel_gestures();
        to_js(&intents)
    }

    /// Whether document-level move/up listeners should stay attached
    #[wasm_bindgen(js_name = gesturesListening)]
    pub fn gestures_listening(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.gestures_listening())
            .unwrap_or(false)
    }

    /// Arrow-key nudge of the selection. Returns `null` when the key is not handled;
    /// otherwise `{ dx, dy, preventDefault }`.
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&mut self, key: &str, large: bool) -> Result<JsValue, JsValue> {
        let nudge = self.session_mut().map_err(js_err)?.handle_key(key, large);
        to_js(&nudge)
    }

    // Swipe-to-dismiss for the properties sheet

    #[wasm_bindgen(js_name = swipeStart)]
    pub fn swipe_start(&mut self, y: f64, time_ms: f64) {
        self.swipe.start(y, time_ms.max(0.0) as u64);
    }

    /// Downward offset to apply to the sheet
    #[wasm_bindgen(js_name = swipeUpdate)]
    pub fn swipe_update(&mut self, y: f64, time_ms: f64) -> f64 {
        self.swipe.update(y, time_ms.max(0.0) as u64)
    }

    /// "dismiss" or "snapBack"
    #[wasm_bindgen(js_name = swipeEnd)]
    pub fn swipe_end(&mut self, y: f64, time_ms: f64) -> String {
        match self.swipe.end(y, time_ms.max(0.0) as u64) {
            SwipeOutcome::Dismiss => "dismiss".to_string(),
            SwipeOutcome::SnapBack => "snapBack".to_string(),
        }
    }

    #[wasm_bindgen(js_name = swipeCancel)]
    pub fn swipe_cancel(&mut self) {
        self.swipe.cancel();
    }

    // Zoom and rendering

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) -> bool {
        self.session.as_mut().map(|s| s.zoom_in()).unwrap_or(false)
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) -> bool {
        self.session.as_mut().map(|s| s.zoom_out()).unwrap_or(false)
    }

    #[wasm_bindgen]
    pub fn scale(&self) -> f64 {
        self.session
            .as_ref()
            .map(|s| s.scale())
            .unwrap_or(self.config.default_zoom)
    }

    #[wasm_bindgen(js_name = zoomLevels)]
    pub fn zoom_levels(&self) -> Vec<f64> {
        self.config.zoom_levels.clone()
    }

    #[wasm_bindgen(js_name = workerSrc)]
    pub fn worker_src(&self) -> String {
        self.render.resolved_worker_src()
    }

    /// Ticket `{ id, page, scale }` for rendering a page; supersedes older ones for that page
    #[wasm_bindgen(js_name = requestRender)]
    pub fn request_render(&mut self, page: usize) -> Result<JsValue, JsValue> {
        let ticket = self.session_mut().map_err(js_err)?.request_render(page);
        to_js(&TicketInfo {
            id: ticket.id,
            page: ticket.page,
            scale: ticket.scale,
        })
    }

    /// Report a finished render; resolves to "rendered" or "cancelled"
    #[wasm_bindgen(js_name = completeRender)]
    pub fn complete_render(&mut self, ticket_id: f64, error: Option<String>) -> Result<String, JsValue> {
        let result = match error {
            Some(message) => Err(message),
            None => Ok(()),
        };
        let outcome = self
            .session_mut()
            .map_err(js_err)?
            .complete_render(ticket_id.max(0.0) as u64, result)
            .map_err(js_err)?;
        Ok(match outcome {
            RenderOutcome::Rendered => "rendered".to_string(),
            RenderOutcome::Cancelled => "cancelled".to_string(),
        })
    }

    // Values and assignments

    #[wasm_bindgen(js_name = setValue)]
    pub fn set_value(&mut self, name: &str, value: &str) -> Result<(), JsValue> {
        self.set_value_internal(name, value).map_err(js_err)
    }

    #[wasm_bindgen(js_name = getValue)]
    pub fn get_value(&self, name: &str) -> Option<String> {
        self.session
            .as_ref()
            .and_then(|s| s.value(name))
            .map(str::to_string)
    }

    #[wasm_bindgen]
    pub fn values(&self) -> Result<JsValue, JsValue> {
        let session = self.session().map_err(js_err)?;
        to_js(&session.values())
    }

    #[wasm_bindgen(js_name = setActiveParticipant)]
    pub fn set_active_participant(&mut self, participant: Option<String>) -> Result<(), JsValue> {
        self.session_mut()
            .map_err(js_err)?
            .set_active_participant(participant);
        Ok(())
    }

    /// Caller-supplied `{ fieldName: [participantId, ...] }`, or null to clear
    #[wasm_bindgen(js_name = setAssignments)]
    pub fn set_assignments(&mut self, map: JsValue) -> Result<(), JsValue> {
        let map: Option<AssignmentMap> = if map.is_null() || map.is_undefined() {
            None
        } else {
            Some(from_js(map)?)
        };
        self.set_assignments_internal(map).map_err(js_err)
    }

    #[wasm_bindgen(js_name = assignmentMap)]
    pub fn assignment_map(&self) -> Result<JsValue, JsValue> {
        let session = self.session().map_err(js_err)?;
        to_js(&session.assignment_map())
    }

    /// `{ fieldName: "editable" | "readonly" | "hidden" }`
    #[wasm_bindgen(js_name = fieldStates)]
    pub fn field_states(&self) -> Result<JsValue, JsValue> {
        let session = self.session().map_err(js_err)?;
        to_js(&session.field_states())
    }

    /// `{ assigned, completed }` for the active participant
    #[wasm_bindgen]
    pub fn progress(&self) -> Result<JsValue, JsValue> {
        let session = self.session().map_err(js_err)?;
        to_js(&session.progress())
    }

    // Saving

    /// Save: structural in build mode, incremental otherwise. Returns PDF bytes.
    #[wasm_bindgen]
    pub fn save(&mut self) -> Result<Vec<u8>, JsValue> {
        self.save_internal().map_err(js_err)
    }

    #[wasm_bindgen(js_name = isExporting)]
    pub fn is_exporting(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.is_exporting())
            .unwrap_or(false)
    }

    /// `{ fields, assignments, report }` of the last save, or null
    #[wasm_bindgen(js_name = lastSaveSummary)]
    pub fn last_save_summary(&self) -> Result<JsValue, JsValue> {
        to_js(&self.last_save)
    }

    /// Pending session events since the last call
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> Result<JsValue, JsValue> {
        let events = self.session_mut().map_err(js_err)?.drain_events();
        to_js(&events)
    }
}
