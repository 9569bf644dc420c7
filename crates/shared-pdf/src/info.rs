//! Document information dictionary (`/Info` in the trailer)

use crate::error::Result;
use crate::parser::PdfDocument;
use crate::text::{encode_text, object_text};
use lopdf::{Dictionary, Object, ObjectId};

impl PdfDocument {
    fn info(&self) -> Option<&Dictionary> {
        let info = self.doc.trailer.get(b"Info").ok()?;
        self.resolve_dict(info).ok()
    }

    pub fn title(&self) -> Option<String> {
        let title = self.info()?.get(b"Title").ok()?;
        object_text(self.resolve(title).ok()?)
    }

    /// Get or create `/Info` as an indirect dictionary
    fn ensure_info(&mut self) -> Result<ObjectId> {
        match self.doc.trailer.get(b"Info").ok().cloned() {
            Some(Object::Reference(id)) if self.doc.get_dictionary(id).is_ok() => Ok(id),
            Some(Object::Dictionary(dict)) => {
                let id = self.doc.add_object(Object::Dictionary(dict));
                self.doc.trailer.set("Info", Object::Reference(id));
                Ok(id)
            }
            _ => {
                let id = self.doc.add_object(Object::Dictionary(Dictionary::new()));
                self.doc.trailer.set("Info", Object::Reference(id));
                Ok(id)
            }
        }
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        let info_id = self.ensure_info()?;
        self.dict_mut(info_id)?.set("Title", encode_text(title));
        Ok(())
    }
}
