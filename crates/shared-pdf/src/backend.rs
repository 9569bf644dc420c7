//! `FormDocument` capability over a lopdf document

use crate::parser::PdfDocument;
use formbuilder_core::{
    DiscoveredField, DocumentError, DocumentLoader, FieldSpec, FormDocument, PageBox, WriteValue,
};
use tracing::warn;

impl DocumentLoader for PdfDocument {
    fn load(bytes: &[u8]) -> Result<Self, DocumentError> {
        Ok(PdfDocument::from_bytes(bytes)?)
    }
}

impl FormDocument for PdfDocument {
    fn page_count(&self) -> usize {
        PdfDocument::page_count(self)
    }

    fn page_box(&self, page: usize) -> Option<PageBox> {
        match PdfDocument::page_box(self, page) {
            Ok(page_box) => Some(page_box),
            Err(e) => {
                warn!(page, error = %e, "unreadable page box");
                None
            }
        }
    }

    fn discover_fields(&self) -> Vec<DiscoveredField> {
        self.discover()
    }

    fn flatten_fields(&mut self) -> Result<(), DocumentError> {
        self.flatten()?;
        Ok(())
    }

    fn create_field(&mut self, spec: &FieldSpec) -> Result<(), DocumentError> {
        Ok(PdfDocument::create_field(self, spec)?)
    }

    fn write_value(&mut self, name: &str, value: &WriteValue) -> Result<(), DocumentError> {
        Ok(PdfDocument::write_value(self, name, value)?)
    }

    fn title(&self) -> Option<String> {
        PdfDocument::title(self)
    }

    fn set_title(&mut self, title: &str) -> Result<(), DocumentError> {
        Ok(PdfDocument::set_title(self, title)?)
    }

    fn to_bytes(&mut self) -> Result<Vec<u8>, DocumentError> {
        Ok(self.save_to_bytes()?)
    }
}
