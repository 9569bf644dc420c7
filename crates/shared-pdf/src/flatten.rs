//! Flattening: draw each widget's normal appearance into its page's content
//! and drop the interactive layer

use crate::error::{PdfError, Result};
use crate::parser::PdfDocument;
use crate::acroform::ANNOT_HIDDEN;
use formbuilder_core::NativeRect;
use lopdf::{Dictionary, Object, ObjectId, Stream};
use tracing::{debug, info};

/// A widget appearance placed on a page
struct Placement {
    stream_id: ObjectId,
    rect: NativeRect,
    bbox: NativeRect,
}

impl Placement {
    /// `cm` operands mapping the appearance BBox onto the widget rect
    fn matrix(&self) -> [f64; 6] {
        let sx = if self.bbox.width() > 0.0 {
            self.rect.width() / self.bbox.width()
        } else {
            1.0
        };
        let sy = if self.bbox.height() > 0.0 {
            self.rect.height() / self.bbox.height()
        } else {
            1.0
        };
        [
            sx,
            0.0,
            0.0,
            sy,
            self.rect.llx - self.bbox.llx * sx,
            self.rect.lly - self.bbox.lly * sy,
        ]
    }
}

fn is_widget(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Widget")
}

impl PdfDocument {
    /// Stream of the widget's normal appearance for its current state
    fn normal_appearance(&self, widget: &Dictionary) -> Option<ObjectId> {
        let ap = self.resolve_dict(widget.get(b"AP").ok()?).ok()?;
        let normal = ap.get(b"N").ok()?;
        let normal_id = normal.as_reference().ok()?;
        match self.doc.get_object(normal_id).ok()? {
            Object::Stream(_) => Some(normal_id),
            Object::Dictionary(states) => {
                let state = match widget.get(b"AS") {
                    Ok(Object::Name(state)) => state.clone(),
                    _ => return None,
                };
                states.get(&state).ok()?.as_reference().ok()
            }
            _ => None,
        }
    }

    fn stream_bbox(&self, stream_id: ObjectId) -> Option<NativeRect> {
        let stream = self.doc.get_object(stream_id).ok()?.as_stream().ok()?;
        self.parse_rect(stream.dict.get(b"BBox").ok()?).ok()
    }

    /// Make sure a page owns a mutable resources dictionary and register an XObject in it
    fn register_xobject(&mut self, page_id: ObjectId, name: &str, stream_id: ObjectId) -> Result<()> {
        let own = match self.doc.get_dictionary(page_id)?.get(b"Resources") {
            Ok(Object::Reference(id)) => Some(Some(*id)),
            Ok(Object::Dictionary(_)) => Some(None),
            _ => None,
        };
        let resources_id = match own {
            Some(resources_id) => resources_id,
            None => {
                // Inherited resources are copied down so the page can extend them
                let base = match self.inherited(page_id, b"Resources")? {
                    Some(obj) => self.resolve_dict(obj)?.clone(),
                    None => Dictionary::new(),
                };
                self.dict_mut(page_id)?
                    .set("Resources", Object::Dictionary(base));
                None
            }
        };

        let xobjects_id = {
            let resources = match resources_id {
                Some(id) => self.doc.get_dictionary(id)?,
                None => self.resolve_dict(self.doc.get_dictionary(page_id)?.get(b"Resources")?)?,
            };
            match resources.get(b"XObject") {
                Ok(Object::Reference(id)) => Some(*id),
                _ => None,
            }
        };
        if let Some(xobjects_id) = xobjects_id {
            self.dict_mut(xobjects_id)?
                .set(name, Object::Reference(stream_id));
            return Ok(());
        }

        let resources = match resources_id {
            Some(id) => self.dict_mut(id)?,
            None => match self.dict_mut(page_id)?.get_mut(b"Resources") {
                Ok(Object::Dictionary(resources)) => resources,
                _ => return Err(PdfError::Malformed("page resources are not a dictionary".into())),
            },
        };
        if let Ok(Object::Dictionary(xobjects)) = resources.get_mut(b"XObject") {
            xobjects.set(name, Object::Reference(stream_id));
            return Ok(());
        }
        let mut xobjects = Dictionary::new();
        xobjects.set(name, Object::Reference(stream_id));
        resources.set("XObject", Object::Dictionary(xobjects));
        Ok(())
    }

    /// Append drawing operators after the existing content, isolating its graphics state
    fn append_page_content(&mut self, page_id: ObjectId, content: String) -> Result<()> {
        let open_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let body = format!("Q\n{}", content);
        let body_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), body.into_bytes()));

        let mut items = vec![Object::Reference(open_id)];
        match self.doc.get_dictionary(page_id)?.get(b"Contents") {
            Ok(Object::Reference(id)) => match self.doc.get_object(*id)? {
                Object::Array(existing) => items.extend(existing.iter().cloned()),
                _ => items.push(Object::Reference(*id)),
            },
            Ok(Object::Array(existing)) => items.extend(existing.iter().cloned()),
            _ => {}
        }
        items.push(Object::Reference(body_id));
        self.dict_mut(page_id)?
            .set("Contents", Object::Array(items));
        Ok(())
    }

    fn flatten_page(&mut self, page_id: ObjectId) -> Result<usize> {
        let annots: Vec<Object> = match self.doc.get_dictionary(page_id)?.get(b"Annots") {
            Ok(annots) => self.resolve_array(annots)?.clone(),
            Err(_) => return Ok(0),
        };

        let mut kept = Vec::with_capacity(annots.len());
        let mut placements = Vec::new();
        let mut removed = 0;
        for annot in &annots {
            let Ok(dict) = self.resolve_dict(annot) else {
                kept.push(annot.clone());
                continue;
            };
            if !is_widget(dict) {
                kept.push(annot.clone());
                continue;
            }
            removed += 1;
            if self.integer(dict, b"F").unwrap_or(0) & ANNOT_HIDDEN != 0 {
                continue;
            }
            let placement = (|| {
                let rect = self.parse_rect(dict.get(b"Rect").ok()?).ok()?;
                let stream_id = self.normal_appearance(dict)?;
                let bbox = self.stream_bbox(stream_id)?;
                Some(Placement {
                    stream_id,
                    rect,
                    bbox,
                })
            })();
            match placement {
                Some(p) => placements.push(p),
                None => debug!(page = ?page_id, "widget has no drawable appearance"),
            }
        }
        if removed == 0 {
            return Ok(0);
        }

        if kept.is_empty() {
            self.dict_mut(page_id)?.remove(b"Annots");
        } else {
            self.dict_mut(page_id)?.set("Annots", Object::Array(kept));
        }

        if !placements.is_empty() {
            let mut content = String::new();
            for placement in &placements {
                let name = format!("FlatW{}_{}", placement.stream_id.0, placement.stream_id.1);
                if let Ok(Object::Stream(stream)) = self.doc.get_object_mut(placement.stream_id) {
                    stream.dict.set("Type", Object::Name(b"XObject".to_vec()));
                    stream.dict.set("Subtype", Object::Name(b"Form".to_vec()));
                }
                self.register_xobject(page_id, &name, placement.stream_id)?;
                let [a, b, c, d, e, f] = placement.matrix();
                content.push_str(&format!(
                    "q {} {} {} {} {} {} cm /{} Do Q\n",
                    a, b, c, d, e, f, name
                ));
            }
            self.append_page_content(page_id, content)?;
        }
        Ok(removed)
    }

    /// Bake all widgets into page content and empty the AcroForm.
    /// Returns the number of widgets removed.
    pub fn flatten(&mut self) -> Result<usize> {
        let pages: Vec<ObjectId> = self.doc.get_pages().into_values().collect();
        let mut removed = 0;
        for page_id in pages {
            removed += self.flatten_page(page_id)?;
        }
        if self.acroform().is_some() {
            let acroform_id = self.ensure_acroform()?;
            let acroform = self.dict_mut(acroform_id)?;
            acroform.set("Fields", Object::Array(vec![]));
            acroform.remove(b"NeedAppearances");
        }
        info!(widgets = removed, "flattened form fields");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_matrix_maps_bbox_onto_rect() {
        let placement = Placement {
            stream_id: (1, 0),
            rect: NativeRect::new(100.0, 700.0, 300.0, 720.0),
            bbox: NativeRect::new(0.0, 0.0, 100.0, 20.0),
        };
        assert_eq!(placement.matrix(), [2.0, 0.0, 0.0, 1.0, 100.0, 700.0]);
    }

    #[test]
    fn test_degenerate_bbox_keeps_unit_scale() {
        let placement = Placement {
            stream_id: (1, 0),
            rect: NativeRect::new(10.0, 10.0, 20.0, 20.0),
            bbox: NativeRect::new(5.0, 5.0, 5.0, 5.0),
        };
        assert_eq!(placement.matrix(), [1.0, 0.0, 0.0, 1.0, 5.0, 5.0]);
    }
}
