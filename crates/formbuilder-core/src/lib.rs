//! Field geometry and persistence engine for visual form building
//!
//! Keeps one field model consistent across three coordinate spaces
//! (document-native, edit, viewport), classifies pointer and touch input into
//! editing intents, and persists fields plus per-field assignments back into
//! the document through the [`document::FormDocument`] capability.
//!
//! ```text
//! pointer input -> gesture -> registry -> (host re-render via units)
//! save -> export reads registry + assignments -> document -> bytes
//! ```

pub mod assignment;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod field;
pub mod gesture;
pub mod metadata;
pub mod registry;
pub mod render;
pub mod session;
pub mod units;
pub mod values;

#[cfg(test)]
pub(crate) mod testing;

pub use assignment::{AssignmentMap, InteractionState, Progress, UnassignedPolicy};
pub use config::BuilderConfig;
pub use document::{DiscoveredField, DocumentLoader, FieldSpec, FormDocument, NativeFieldKind, WriteValue};
pub use error::{DocumentError, FormError, RenderError};
pub use export::{ExportReport, ExportWarning, SaveOutcome};
pub use field::{FieldId, FieldOption, FieldPatch, FieldProperties, FieldRecord, FieldType, PropertiesPatch};
pub use registry::FieldRegistry;
pub use render::{RenderConfig, RenderOutcome, RenderTicket};
pub use session::{FormSession, Mode, SessionEvent};
pub use units::{EditRect, NativeRect, PageBox, Point};
pub use values::FieldValues;
