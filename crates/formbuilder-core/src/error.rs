use crate::assignment::InteractionState;
use thiserror::Error;

/// Failures reported by an external document capability.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("Failed to load document: {0}")]
    Load(String),

    #[error("Page {0} not found")]
    PageNotFound(usize),

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Option {value:?} not offered by field {field}")]
    OptionNotFound { field: String, value: String },

    #[error("Unsupported field shape for {field}: {reason}")]
    UnsupportedField { field: String, reason: String },

    #[error("Document object model error: {0}")]
    ObjectModel(String),

    #[error("Failed to serialize document: {0}")]
    Serialize(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Document is not ready: {0}")]
    NotReady(String),

    #[error("Structural save is only available in build mode")]
    NotInBuildMode,

    #[error("An export is already in progress")]
    ExportInProgress,

    #[error("Field {name} is {state:?} for the active participant")]
    FieldNotEditable {
        name: String,
        state: InteractionState,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Render of page {page} failed: {message}")]
    Failed { page: usize, message: String },

    #[error("Unknown render ticket {0}")]
    UnknownTicket(u64),
}
