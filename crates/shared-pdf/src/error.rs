use formbuilder_core::DocumentError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("PDF parse error: {0}")]
    Parse(String),

    #[error("Page {0} not found")]
    PageNotFound(usize),

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Option {value:?} not offered by field {field}")]
    OptionNotFound { field: String, value: String },

    #[error("Cannot write {field}: {reason}")]
    Unsupported { field: String, reason: String },

    #[error("Malformed PDF structure: {0}")]
    Malformed(String),

    #[error("Failed to save PDF: {0}")]
    Save(String),

    #[error(transparent)]
    Lopdf(#[from] lopdf::Error),
}

impl From<PdfError> for DocumentError {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::Parse(msg) => DocumentError::Load(msg),
            PdfError::PageNotFound(page) => DocumentError::PageNotFound(page),
            PdfError::FieldNotFound(name) => DocumentError::FieldNotFound(name),
            PdfError::OptionNotFound { field, value } => {
                DocumentError::OptionNotFound { field, value }
            }
            PdfError::Unsupported { field, reason } => {
                DocumentError::UnsupportedField { field, reason }
            }
            PdfError::Save(msg) => DocumentError::Serialize(msg),
            other @ (PdfError::Malformed(_) | PdfError::Lopdf(_)) => {
                DocumentError::ObjectModel(other.to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PdfError>;
