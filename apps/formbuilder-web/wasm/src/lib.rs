//! WASM bindings for the visual form builder
//!
//! All editing state lives in Rust inside `FormBuilderSession`; JavaScript
//! forwards pointer and keyboard events, renders pages and field overlays,
//! and handles file I/O.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { FormBuilderSession } from './pkg/formbuilder_wasm.js';
//!
//! await init();
//!
//! const session = new FormBuilderSession('{"unassignedPolicy":"hidden"}', null);
//! const info = session.loadDocument(bytes);
//! pdfjsLib.GlobalWorkerOptions.workerSrc = session.workerSrc();
//!
//! session.enterBuildMode();
//! const id = session.addField("text", 50, 50, 0);
//! const intents = session.handlePointer({ contact: 1, kind: "mouse", phase: "down",
//!     position: { x: 60, y: 55 }, timeMs: performance.now(), target: { kind: "field", id } });
//! const pdf = session.save();
//! ```

pub mod session;

use wasm_bindgen::prelude::*;

pub use session::FormBuilderSession;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"Form builder WASM initialized".into());
}

/// Get the library version
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Worker URL used when the host configures none
#[wasm_bindgen(js_name = defaultWorkerSrc)]
pub fn default_worker_src() -> String {
    formbuilder_core::RenderConfig::default().resolved_worker_src()
}
