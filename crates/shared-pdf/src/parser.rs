//! PDF loading and page geometry using lopdf

use crate::error::{PdfError, Result};
use formbuilder_core::{NativeRect, PageBox};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;

/// Page tree inheritance is never deeper than this in real files
const MAX_PARENT_DEPTH: usize = 32;

/// Wrapper around lopdf::Document with the lookups the form layer needs
pub struct PdfDocument {
    pub(crate) doc: Document,
}

impl PdfDocument {
    /// Load a PDF from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))?;
        Ok(Self { doc })
    }

    pub fn from_document(doc: Document) -> Self {
        Self { doc }
    }

    pub fn inner(&self) -> &Document {
        &self.doc
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Page object for a zero-based page index
    pub fn page_id(&self, page: usize) -> Option<ObjectId> {
        let number = u32::try_from(page).ok()?.checked_add(1)?;
        self.doc.get_pages().get(&number).copied()
    }

    /// Zero-based page index per page object
    pub(crate) fn page_indices(&self) -> BTreeMap<ObjectId, usize> {
        self.doc
            .get_pages()
            .into_iter()
            .map(|(number, id)| (id, number as usize - 1))
            .collect()
    }

    /// MediaBox of a page, inherited through the page tree, US Letter if absent
    pub fn page_box(&self, page: usize) -> Result<PageBox> {
        let page_id = self.page_id(page).ok_or(PdfError::PageNotFound(page))?;
        let rect = match self.inherited(page_id, b"MediaBox")? {
            Some(obj) => self.parse_rect(obj)?,
            None => return Ok(PageBox::letter()),
        };
        Ok(PageBox {
            x: rect.llx,
            y: rect.lly,
            width: rect.width(),
            height: rect.height(),
        })
    }

    /// Look up `key` on a page or the nearest ancestor carrying it
    pub(crate) fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<&Object>> {
        let mut current = self.doc.get_dictionary(page_id)?;
        for _ in 0..MAX_PARENT_DEPTH {
            if let Ok(value) = current.get(key) {
                return Ok(Some(value));
            }
            match current.get(b"Parent").and_then(Object::as_reference) {
                Ok(parent_id) => current = self.doc.get_dictionary(parent_id)?,
                Err(_) => return Ok(None),
            }
        }
        Ok(None)
    }

    /// Follow a reference, if `obj` is one
    pub(crate) fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object> {
        match obj {
            Object::Reference(id) => Ok(self.doc.get_object(*id)?),
            other => Ok(other),
        }
    }

    pub(crate) fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Result<&'a Dictionary> {
        self.resolve(obj)?
            .as_dict()
            .map_err(|_| PdfError::Malformed("expected a dictionary".to_string()))
    }

    pub(crate) fn resolve_array<'a>(&'a self, obj: &'a Object) -> Result<&'a Vec<Object>> {
        self.resolve(obj)?
            .as_array()
            .map_err(|_| PdfError::Malformed("expected an array".to_string()))
    }

    /// Parse a PDF rectangle array, normalizing corner order
    pub(crate) fn parse_rect(&self, obj: &Object) -> Result<NativeRect> {
        let arr = self.resolve_array(obj)?;
        if arr.len() != 4 {
            return Err(PdfError::Malformed(format!(
                "rectangle has {} elements, expected 4",
                arr.len()
            )));
        }
        let mut values = [0.0f64; 4];
        for (slot, obj) in values.iter_mut().zip(arr) {
            *slot = self.extract_number(obj)?;
        }
        Ok(NativeRect::new(values[0], values[1], values[2], values[3]).normalized())
    }

    pub(crate) fn extract_number(&self, obj: &Object) -> Result<f64> {
        match self.resolve(obj)? {
            Object::Integer(i) => Ok(*i as f64),
            Object::Real(r) => Ok(*r as f64),
            _ => Err(PdfError::Malformed("expected a number".to_string())),
        }
    }

    pub(crate) fn integer(&self, dict: &Dictionary, key: &[u8]) -> Option<i64> {
        let obj = dict.get(key).ok()?;
        match self.resolve(obj).ok()? {
            Object::Integer(i) => Some(*i),
            Object::Real(r) => Some(*r as i64),
            _ => None,
        }
    }

    /// Serialize the document
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| PdfError::Save(e.to_string()))?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;
    use pretty_assertions::assert_eq;

    fn two_page_doc() -> PdfDocument {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let first = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        let second = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), Object::Real(842.0)],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![first.into(), second.into()],
                "Count" => 2,
                "MediaBox" => vec![0.into(), 0.into(), 300.into(), 400.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        PdfDocument::from_document(doc)
    }

    #[test]
    fn test_page_count_and_ids() {
        let pdf = two_page_doc();
        assert_eq!(pdf.page_count(), 2);
        assert!(pdf.page_id(0).is_some());
        assert!(pdf.page_id(1).is_some());
        assert!(pdf.page_id(2).is_none());
    }

    #[test]
    fn test_media_box_inherited_from_parent() {
        let pdf = two_page_doc();
        assert_eq!(pdf.page_box(0).unwrap(), PageBox::new(300.0, 400.0));
        assert_eq!(pdf.page_box(1).unwrap(), PageBox::new(595.0, 842.0));
    }

    #[test]
    fn test_missing_page() {
        let pdf = two_page_doc();
        assert!(matches!(pdf.page_box(5), Err(PdfError::PageNotFound(5))));
    }

    #[test]
    fn test_parse_rect_normalizes() {
        let pdf = two_page_doc();
        let rect = pdf
            .parse_rect(&Object::Array(vec![
                300.into(),
                Object::Real(720.0),
                100.into(),
                700.into(),
            ]))
            .unwrap();
        assert_eq!(rect, NativeRect::new(100.0, 700.0, 300.0, 720.0));
    }

    #[test]
    fn test_load_rejects_garbage() {
        assert!(matches!(
            PdfDocument::from_bytes(b"not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }
}
