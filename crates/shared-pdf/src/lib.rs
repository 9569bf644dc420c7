//! lopdf backend for the form builder engine
//!
//! Implements `formbuilder_core::FormDocument` over a parsed PDF: AcroForm
//! field discovery, field creation, value writes, flattening and the
//! document-info title used to carry assignments.

pub mod acroform;
pub mod appearance;
pub mod error;
pub mod flatten;
pub mod info;
pub mod parser;
pub mod text;

mod backend;

pub use error::PdfError;
pub use parser::PdfDocument;
