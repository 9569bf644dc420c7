//! In-memory PDF fixtures built with lopdf

#![allow(dead_code)]

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

pub const LETTER: (i64, i64) = (612, 792);

fn rect(llx: i64, lly: i64, urx: i64, ury: i64) -> Object {
    Object::Array(vec![llx.into(), lly.into(), urx.into(), ury.into()])
}

fn text(s: &str) -> Object {
    Object::String(s.as_bytes().to_vec(), StringFormat::Literal)
}

fn name(s: &str) -> Object {
    Object::Name(s.as_bytes().to_vec())
}

/// Document skeleton: catalog, page tree and `count` letter pages
pub struct Builder {
    pub doc: Document,
    pub pages: Vec<ObjectId>,
    fields: Vec<Object>,
    annots: Vec<Vec<Object>>,
}

impl Builder {
    pub fn new(count: usize) -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let mut pages = Vec::new();
        for i in 0..count {
            let content = doc.add_object(Stream::new(
                Dictionary::new(),
                format!("BT /F1 12 Tf 72 720 Td (Page {}) Tj ET", i + 1).into_bytes(),
            ));
            let page = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content,
            });
            pages.push(page);
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => pages.iter().map(|p| Object::Reference(*p)).collect::<Vec<_>>(),
                "Count" => count as i64,
                "MediaBox" => rect(0, 0, LETTER.0, LETTER.1),
                "Resources" => dictionary! {
                    "Font" => dictionary! {
                        "F1" => dictionary! {
                            "Type" => "Font",
                            "Subtype" => "Type1",
                            "BaseFont" => "Helvetica",
                        },
                    },
                },
            }),
        );
        Self {
            doc,
            annots: vec![Vec::new(); count],
            pages,
            fields: Vec::new(),
        }
    }

    fn appearance(&mut self, w: i64, h: i64, ops: &str) -> ObjectId {
        self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => rect(0, 0, w, h),
            },
            ops.as_bytes().to_vec(),
        ))
    }

    fn widget(&self, page: usize, r: Object, with_page_ref: bool) -> Dictionary {
        let mut widget = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "Rect" => r,
            "F" => 4,
        };
        if with_page_ref {
            widget.set("P", self.pages[page]);
        }
        widget
    }

    fn attach(&mut self, page: usize, widget_id: ObjectId) {
        self.annots[page].push(Object::Reference(widget_id));
    }

    /// Merged text field/widget
    pub fn text_field(&mut self, field: &str, page: usize, r: [i64; 4], value: Option<&str>) -> ObjectId {
        let mut dict = self.widget(page, rect(r[0], r[1], r[2], r[3]), true);
        dict.set("FT", name("Tx"));
        dict.set("T", text(field));
        dict.set("DA", text("/Helv 10 Tf 0 g"));
        if let Some(value) = value {
            dict.set("V", text(value));
        }
        let id = self.doc.add_object(dict);
        self.fields.push(Object::Reference(id));
        self.attach(page, id);
        id
    }

    pub fn checkbox(&mut self, field: &str, page: usize, r: [i64; 4], checked: bool) -> ObjectId {
        self.checkbox_with_state(field, page, r, "Yes", checked)
    }

    /// Checkbox whose on-state is named `on_state` instead of `Yes`
    pub fn checkbox_with_state(
        &mut self,
        field: &str,
        page: usize,
        r: [i64; 4],
        on_state: &str,
        checked: bool,
    ) -> ObjectId {
        let on = self.appearance(r[2] - r[0], r[3] - r[1], "0 g 2 2 12 12 re f");
        let off = self.appearance(r[2] - r[0], r[3] - r[1], "0 G 0.5 0.5 15 15 re S");
        let state = if checked { on_state } else { "Off" };
        let mut dict = self.widget(page, rect(r[0], r[1], r[2], r[3]), true);
        dict.set("FT", name("Btn"));
        dict.set("T", text(field));
        dict.set("V", name(state));
        dict.set("AS", name(state));
        dict.set(
            "AP",
            dictionary! { "N" => dictionary! { on_state => on, "Off" => off } },
        );
        let id = self.doc.add_object(dict);
        self.fields.push(Object::Reference(id));
        self.attach(page, id);
        id
    }

    pub fn combo(&mut self, field: &str, page: usize, r: [i64; 4], value: Option<&str>) -> ObjectId {
        let mut dict = self.widget(page, rect(r[0], r[1], r[2], r[3]), true);
        dict.set("FT", name("Ch"));
        dict.set("Ff", 1 << 17);
        dict.set("T", text(field));
        dict.set("DA", text("/Helv 0 Tf 0 g"));
        dict.set(
            "Opt",
            Object::Array(vec![
                Object::Array(vec![text("CA"), text("California")]),
                text("NY"),
            ]),
        );
        if let Some(value) = value {
            dict.set("V", text(value));
        }
        let id = self.doc.add_object(dict);
        self.fields.push(Object::Reference(id));
        self.attach(page, id);
        id
    }

    /// Radio group with one widget per state, laid out left to right
    pub fn radio(&mut self, field: &str, page: usize, states: &[&str], origin: (i64, i64)) -> ObjectId {
        let parent_id = self.doc.new_object_id();
        let mut kids = Vec::new();
        for (i, state) in states.iter().enumerate() {
            let llx = origin.0 + 20 * i as i64;
            let on = self.appearance(14, 14, "0 g 4 4 6 6 re f");
            let off = self.appearance(14, 14, "0 G 0.5 0.5 13 13 re S");
            let mut widget = self.widget(page, rect(llx, origin.1, llx + 14, origin.1 + 14), true);
            widget.set("Parent", parent_id);
            widget.set("AS", name("Off"));
            let mut normal = Dictionary::new();
            normal.set(state.as_bytes().to_vec(), on);
            normal.set("Off", off);
            widget.set("AP", dictionary! { "N" => normal });
            let widget_id = self.doc.add_object(widget);
            self.attach(page, widget_id);
            kids.push(Object::Reference(widget_id));
        }
        self.doc.objects.insert(
            parent_id,
            Object::Dictionary(dictionary! {
                "FT" => "Btn",
                "Ff" => (1 << 15) | (1 << 14),
                "T" => text(field),
                "V" => name("Off"),
                "Kids" => kids,
            }),
        );
        self.fields.push(Object::Reference(parent_id));
        parent_id
    }

    pub fn push_button(&mut self, field: &str, page: usize, r: [i64; 4]) -> ObjectId {
        let mut dict = self.widget(page, rect(r[0], r[1], r[2], r[3]), true);
        dict.set("FT", name("Btn"));
        dict.set("Ff", 1 << 16);
        dict.set("T", text(field));
        let id = self.doc.add_object(dict);
        self.fields.push(Object::Reference(id));
        self.attach(page, id);
        id
    }

    /// `parent.child` text field whose widget carries no `/P`
    pub fn nested_text(&mut self, parent: &str, child: &str, page: usize, r: [i64; 4]) -> ObjectId {
        let parent_id = self.doc.new_object_id();
        let mut widget = self.widget(page, rect(r[0], r[1], r[2], r[3]), false);
        widget.set("T", text(child));
        widget.set("Parent", parent_id);
        let child_id = self.doc.add_object(widget);
        self.attach(page, child_id);
        self.doc.objects.insert(
            parent_id,
            Object::Dictionary(dictionary! {
                "FT" => "Tx",
                "T" => text(parent),
                "Kids" => vec![Object::Reference(child_id)],
            }),
        );
        self.fields.push(Object::Reference(parent_id));
        child_id
    }

    /// Read-only text field hidden from view
    pub fn hidden_readonly(&mut self, field: &str, page: usize, r: [i64; 4]) -> ObjectId {
        let id = self.text_field(field, page, r, None);
        if let Ok(Object::Dictionary(dict)) = self.doc.get_object_mut(id) {
            dict.set("F", 4 | 2);
            dict.set("Ff", 1);
        }
        id
    }

    pub fn title(&mut self, title: &str) {
        let info = self.doc.add_object(dictionary! { "Title" => text(title) });
        self.doc.trailer.set("Info", info);
    }

    pub fn finish(mut self) -> Vec<u8> {
        for (page_id, annots) in self.pages.iter().zip(std::mem::take(&mut self.annots)) {
            if annots.is_empty() {
                continue;
            }
            if let Ok(Object::Dictionary(page)) = self.doc.get_object_mut(*page_id) {
                page.set("Annots", annots);
            }
        }
        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_root(),
        };
        if !self.fields.is_empty() {
            catalog.set(
                "AcroForm",
                dictionary! {
                    "Fields" => std::mem::take(&mut self.fields),
                    "DA" => text("/Helv 0 Tf 0 g"),
                },
            );
        }
        let catalog_id = self.doc.add_object(catalog);
        self.doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes).expect("fixture saves");
        bytes
    }

    fn pages_root(&self) -> ObjectId {
        match self.doc.get_object(self.pages[0]) {
            Ok(Object::Dictionary(page)) => page
                .get(b"Parent")
                .and_then(Object::as_reference)
                .expect("page has a parent"),
            _ => panic!("first page missing"),
        }
    }
}

pub fn blank_pdf(pages: usize) -> Vec<u8> {
    Builder::new(pages).finish()
}

/// Two-page lease with one field of every kind the reader understands
pub fn lease_pdf() -> Vec<u8> {
    let mut b = Builder::new(2);
    b.text_field("tenant", 0, [100, 700, 300, 720], Some("Jane Doe"));
    b.text_field("rent", 0, [100, 650, 200, 670], None);
    b.checkbox("agree", 1, [50, 100, 66, 116], true);
    b.combo("state", 0, [100, 600, 215, 616], Some("CA"));
    b.radio("pay", 0, &["Card", "Cash"], (100, 550));
    b.push_button("submit", 1, [400, 50, 480, 70]);
    b.nested_text("owner", "name", 0, [300, 500, 450, 516]);
    b.hidden_readonly("notes", 1, [50, 300, 400, 400]);
    b.finish()
}

/// Rent and consent fields, with the rent field assigned to participant 1
pub fn consent_pdf() -> Vec<u8> {
    let mut b = Builder::new(1);
    b.text_field("rent", 0, [100, 650, 200, 670], Some("1200"));
    b.checkbox_with_state("consent", 0, [50, 100, 66, 116], "Agree", true);
    b.title(r#"formbuilder-assignments:v1:{"rent":["1"]}"#);
    b.finish()
}
