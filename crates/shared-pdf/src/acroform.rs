//! AcroForm field tree: discovery, creation and value writes

use crate::appearance::{self, FONT_RESOURCE};
use crate::error::{PdfError, Result};
use crate::parser::PdfDocument;
use crate::text::{encode_text, object_text};
use formbuilder_core::units::round_coord;
use formbuilder_core::{
    DiscoveredField, FieldOption, FieldSpec, NativeFieldKind, NativeRect, WriteValue,
};
use lopdf::{Dictionary, Object, ObjectId, StringFormat};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

// Field flags (/Ff)
pub const FF_READ_ONLY: i64 = 1;
pub const FF_REQUIRED: i64 = 1 << 1;
pub const FF_MULTILINE: i64 = 1 << 12;
pub const FF_NO_TOGGLE_TO_OFF: i64 = 1 << 14;
pub const FF_RADIO: i64 = 1 << 15;
pub const FF_PUSHBUTTON: i64 = 1 << 16;
pub const FF_COMBO: i64 = 1 << 17;
pub const FF_EDIT: i64 = 1 << 18;

// Annotation flags (/F)
pub const ANNOT_HIDDEN: i64 = 1 << 1;
pub const ANNOT_PRINT: i64 = 1 << 2;

pub const OFF_STATE: &str = "Off";
const DEFAULT_ON_STATE: &str = "Yes";

/// Field trees nest a handful of levels at most
const MAX_FIELD_DEPTH: usize = 16;

/// A terminal field with its inheritable attributes resolved
#[derive(Debug, Clone)]
pub(crate) struct FieldNode {
    pub id: ObjectId,
    pub name: String,
    pub field_type: Option<Vec<u8>>,
    pub flags: i64,
    pub value: Option<Object>,
    pub default_value: Option<Object>,
    pub options: Option<Object>,
    pub appearance: Option<String>,
    pub widgets: Vec<ObjectId>,
}

impl FieldNode {
    pub fn kind(&self) -> Option<NativeFieldKind> {
        let flags = self.flags;
        match self.field_type.as_deref()? {
            b"Tx" if flags & FF_MULTILINE != 0 => Some(NativeFieldKind::Multiline),
            b"Tx" => Some(NativeFieldKind::Text),
            b"Btn" if flags & FF_PUSHBUTTON != 0 => Some(NativeFieldKind::PushButton),
            b"Btn" if flags & FF_RADIO != 0 => Some(NativeFieldKind::Radio),
            b"Btn" => Some(NativeFieldKind::Checkbox),
            b"Ch" if flags & FF_COMBO != 0 => Some(NativeFieldKind::ComboBox),
            b"Ch" => Some(NativeFieldKind::ListBox),
            b"Sig" => Some(NativeFieldKind::Signature),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Inherited {
    field_type: Option<Vec<u8>>,
    flags: Option<i64>,
    value: Option<Object>,
    default_value: Option<Object>,
    options: Option<Object>,
    appearance: Option<String>,
}

/// Font size from a default appearance string such as `/Helv 9 Tf 0 g`
pub fn da_font_size(da: &str) -> Option<f64> {
    let tokens: Vec<&str> = da.split_whitespace().collect();
    let tf = tokens.iter().position(|t| *t == "Tf")?;
    let size: f64 = tokens.get(tf.checked_sub(1)?)?.parse().ok()?;
    (size > 0.0).then_some(size)
}

fn reference_label(id: ObjectId) -> String {
    format!("{} {} R", id.0, id.1)
}

fn rect_object(rect: &NativeRect) -> Object {
    Object::Array(vec![
        Object::Real(rect.llx as f32),
        Object::Real(rect.lly as f32),
        Object::Real(rect.urx as f32),
        Object::Real(rect.ury as f32),
    ])
}

fn union(a: NativeRect, b: NativeRect) -> NativeRect {
    NativeRect::new(
        a.llx.min(b.llx),
        a.lly.min(b.lly),
        a.urx.max(b.urx),
        a.ury.max(b.ury),
    )
}

impl PdfDocument {
    pub(crate) fn dict_mut(&mut self, id: ObjectId) -> Result<&mut Dictionary> {
        self.doc
            .get_object_mut(id)?
            .as_dict_mut()
            .map_err(|_| PdfError::Malformed(format!("object {} is not a dictionary", reference_label(id))))
    }

    pub(crate) fn acroform(&self) -> Option<&Dictionary> {
        let catalog = self.doc.catalog().ok()?;
        let acroform = catalog.get(b"AcroForm").ok()?;
        self.resolve_dict(acroform).ok()
    }

    /// Top-level field references from `/AcroForm /Fields`
    fn root_fields(&self) -> Vec<ObjectId> {
        self.acroform()
            .and_then(|form| form.get(b"Fields").ok())
            .and_then(|fields| self.resolve_array(fields).ok())
            .map(|fields| fields.iter().filter_map(|f| f.as_reference().ok()).collect())
            .unwrap_or_default()
    }

    /// Walk the field tree and collect terminal fields with full names
    pub(crate) fn field_nodes(&self) -> Vec<FieldNode> {
        let mut out = Vec::new();
        let mut visited = BTreeSet::new();
        let root = Inherited {
            appearance: self
                .acroform()
                .and_then(|form| form.get(b"DA").ok())
                .and_then(object_text),
            ..Inherited::default()
        };
        for id in self.root_fields() {
            self.walk(id, &root, None, 0, &mut visited, &mut out);
        }
        out
    }

    fn walk(
        &self,
        id: ObjectId,
        parent: &Inherited,
        prefix: Option<&str>,
        depth: usize,
        visited: &mut BTreeSet<ObjectId>,
        out: &mut Vec<FieldNode>,
    ) {
        if depth > MAX_FIELD_DEPTH || !visited.insert(id) {
            return;
        }
        let Ok(dict) = self.doc.get_dictionary(id) else {
            debug!(field = %reference_label(id), "field entry is not a dictionary");
            return;
        };

        let partial = dict.get(b"T").ok().and_then(object_text);
        let name = match (prefix, partial) {
            (Some(p), Some(t)) => format!("{}.{}", p, t),
            (None, Some(t)) => t,
            (Some(p), None) => p.to_string(),
            (None, None) => String::new(),
        };

        let inherited = Inherited {
            field_type: match dict.get(b"FT") {
                Ok(Object::Name(ft)) => Some(ft.clone()),
                _ => parent.field_type.clone(),
            },
            flags: self.integer(dict, b"Ff").or(parent.flags),
            value: dict.get(b"V").ok().cloned().or_else(|| parent.value.clone()),
            default_value: dict
                .get(b"DV")
                .ok()
                .cloned()
                .or_else(|| parent.default_value.clone()),
            options: dict
                .get(b"Opt")
                .ok()
                .cloned()
                .or_else(|| parent.options.clone()),
            appearance: dict
                .get(b"DA")
                .ok()
                .and_then(object_text)
                .or_else(|| parent.appearance.clone()),
        };

        let kids: Vec<ObjectId> = dict
            .get(b"Kids")
            .ok()
            .and_then(|kids| self.resolve_array(kids).ok())
            .map(|kids| kids.iter().filter_map(|k| k.as_reference().ok()).collect())
            .unwrap_or_default();
        let (children, widgets): (Vec<ObjectId>, Vec<ObjectId>) = kids.into_iter().partition(|kid| {
            self.doc
                .get_dictionary(*kid)
                .map(|d| d.has(b"T"))
                .unwrap_or(false)
        });

        if !children.is_empty() {
            for child in children {
                self.walk(child, &inherited, Some(name.as_str()), depth + 1, visited, out);
            }
            return;
        }
        if name.is_empty() {
            return;
        }

        out.push(FieldNode {
            id,
            name,
            field_type: inherited.field_type,
            flags: inherited.flags.unwrap_or(0),
            value: inherited.value,
            default_value: inherited.default_value,
            options: inherited.options,
            appearance: inherited.appearance,
            widgets: if widgets.is_empty() { vec![id] } else { widgets },
        });
    }

    /// Page index per annotation, from each page's `/Annots`
    pub(crate) fn annotation_pages(&self, pages: &BTreeMap<ObjectId, usize>) -> BTreeMap<ObjectId, usize> {
        let mut map = BTreeMap::new();
        for (page_id, index) in pages {
            let annots = self
                .doc
                .get_dictionary(*page_id)
                .ok()
                .and_then(|page| page.get(b"Annots").ok())
                .and_then(|annots| self.resolve_array(annots).ok());
            for annot in annots.into_iter().flatten() {
                if let Ok(id) = annot.as_reference() {
                    map.insert(id, *index);
                }
            }
        }
        map
    }

    /// Page, rect and hidden flag of a field's widgets on its first page
    fn placement(
        &self,
        node: &FieldNode,
        pages: &BTreeMap<ObjectId, usize>,
        annot_pages: &BTreeMap<ObjectId, usize>,
    ) -> Option<(usize, NativeRect, bool)> {
        let mut found: Option<(usize, NativeRect, bool)> = None;
        for widget_id in &node.widgets {
            let Ok(widget) = self.doc.get_dictionary(*widget_id) else {
                continue;
            };
            let Some(rect) = widget.get(b"Rect").ok().and_then(|r| self.parse_rect(r).ok()) else {
                continue;
            };
            let page = widget
                .get(b"P")
                .ok()
                .and_then(|p| p.as_reference().ok())
                .and_then(|p| pages.get(&p).copied())
                .or_else(|| annot_pages.get(widget_id).copied());
            let Some(page) = page else {
                continue;
            };
            let hidden = self.integer(widget, b"F").unwrap_or(0) & ANNOT_HIDDEN != 0;
            found = match found {
                None => Some((page, rect, hidden)),
                Some((first, acc, h)) if first == page => Some((first, union(acc, rect), h)),
                other => other,
            };
        }
        found.map(|(page, r, hidden)| {
            let rect = NativeRect::new(
                round_coord(r.llx),
                round_coord(r.lly),
                round_coord(r.urx),
                round_coord(r.ury),
            );
            (page, rect, hidden)
        })
    }

    fn parse_options(&self, obj: &Object) -> Vec<FieldOption> {
        let Ok(items) = self.resolve_array(obj) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| match self.resolve(item).ok()? {
                Object::Array(pair) if pair.len() >= 2 => {
                    let export = object_text(self.resolve(&pair[0]).ok()?)?;
                    let display = object_text(self.resolve(&pair[1]).ok()?)?;
                    Some(FieldOption::new(export, display))
                }
                other => object_text(other).map(FieldOption::same),
            })
            .collect()
    }

    /// Normal-appearance state names of a widget, `Off` excluded
    fn on_states(&self, widget_id: ObjectId) -> Vec<String> {
        let states = self
            .doc
            .get_dictionary(widget_id)
            .ok()
            .and_then(|w| w.get(b"AP").ok())
            .and_then(|ap| self.resolve_dict(ap).ok())
            .and_then(|ap| ap.get(b"N").ok())
            .and_then(|n| self.resolve_dict(n).ok());
        states
            .map(|n| {
                n.iter()
                    .map(|(key, _)| String::from_utf8_lossy(key).into_owned())
                    .filter(|key| key != OFF_STATE)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn value_text(&self, obj: &Object) -> Option<String> {
        match self.resolve(obj).ok()? {
            Object::Array(items) => items
                .first()
                .and_then(|item| self.resolve(item).ok())
                .and_then(object_text),
            other => object_text(other),
        }
    }

    /// Enumerate fields. Entries that cannot be read or placed are skipped.
    pub fn discover(&self) -> Vec<DiscoveredField> {
        let pages = self.page_indices();
        let annot_pages = self.annotation_pages(&pages);
        self.field_nodes()
            .into_iter()
            .filter_map(|node| {
                let Some(kind) = node.kind() else {
                    debug!(field = %node.name, "skipping field of unknown type");
                    return None;
                };
                let Some((page, rect, hidden)) = self.placement(&node, &pages, &annot_pages) else {
                    debug!(field = %node.name, "skipping field without a placed widget");
                    return None;
                };
                let mut options = node
                    .options
                    .as_ref()
                    .map(|o| self.parse_options(o))
                    .unwrap_or_default();
                if options.is_empty() && kind == NativeFieldKind::Radio {
                    options = node
                        .widgets
                        .iter()
                        .flat_map(|w| self.on_states(*w))
                        .map(FieldOption::same)
                        .collect();
                }
                Some(DiscoveredField {
                    id: reference_label(node.id),
                    name: node.name.clone(),
                    kind,
                    page,
                    rect,
                    editable: node.flags & FF_READ_ONLY == 0,
                    hidden,
                    value: node.value.as_ref().and_then(|v| self.value_text(v)),
                    default_value: node.default_value.as_ref().and_then(|v| self.value_text(v)),
                    options: (!options.is_empty()).then_some(options),
                })
            })
            .collect()
    }

    /// Get or create the AcroForm as an indirect object with fonts for `/DA`
    pub(crate) fn ensure_acroform(&mut self) -> Result<ObjectId> {
        let existing = self.doc.catalog()?.get(b"AcroForm").ok().cloned();
        let acroform_id = match existing {
            Some(Object::Reference(id)) => id,
            Some(Object::Dictionary(dict)) => {
                let id = self.doc.add_object(Object::Dictionary(dict));
                self.doc.catalog_mut()?.set("AcroForm", Object::Reference(id));
                id
            }
            _ => {
                let mut acroform = Dictionary::new();
                acroform.set("Fields", Object::Array(vec![]));
                let id = self.doc.add_object(Object::Dictionary(acroform));
                self.doc.catalog_mut()?.set("AcroForm", Object::Reference(id));
                id
            }
        };

        let acroform = self.dict_mut(acroform_id)?;
        if !acroform.has(b"Fields") {
            acroform.set("Fields", Object::Array(vec![]));
        }
        if !acroform.has(b"DA") {
            acroform.set(
                "DA",
                Object::String(
                    appearance::default_appearance(None).into_bytes(),
                    StringFormat::Literal,
                ),
            );
        }
        if !acroform.has(b"DR") {
            let mut fonts = Dictionary::new();
            fonts.set(FONT_RESOURCE, Object::Dictionary(appearance::helvetica()));
            let mut resources = Dictionary::new();
            resources.set("Font", Object::Dictionary(fonts));
            acroform.set("DR", Object::Dictionary(resources));
        } else if let Ok(Object::Dictionary(resources)) = acroform.get_mut(b"DR") {
            if let Ok(Object::Dictionary(fonts)) = resources.get_mut(b"Font") {
                if !fonts.has(FONT_RESOURCE.as_bytes()) {
                    fonts.set(FONT_RESOURCE, Object::Dictionary(appearance::helvetica()));
                }
            }
        }
        Ok(acroform_id)
    }

    /// Append a reference to an array entry that may be inline or indirect
    pub(crate) fn push_reference(&mut self, holder: ObjectId, key: &[u8], item: ObjectId) -> Result<()> {
        let current = self.doc.get_dictionary(holder)?.get(key).ok().cloned();
        match current {
            Some(Object::Reference(array_id)) => match self.doc.get_object_mut(array_id)? {
                Object::Array(items) => items.push(Object::Reference(item)),
                _ => {
                    return Err(PdfError::Malformed(format!(
                        "/{} is not an array",
                        String::from_utf8_lossy(key)
                    )))
                }
            },
            Some(Object::Array(mut items)) => {
                items.push(Object::Reference(item));
                self.dict_mut(holder)?.set(key.to_vec(), Object::Array(items));
            }
            _ => {
                self.dict_mut(holder)?
                    .set(key.to_vec(), Object::Array(vec![Object::Reference(item)]));
            }
        }
        Ok(())
    }

    fn widget_base(&self, page_id: ObjectId, rect: &NativeRect, hidden: bool) -> Dictionary {
        let mut widget = Dictionary::new();
        widget.set("Type", Object::Name(b"Annot".to_vec()));
        widget.set("Subtype", Object::Name(b"Widget".to_vec()));
        widget.set("Rect", rect_object(rect));
        widget.set("P", Object::Reference(page_id));
        let flags = if hidden { ANNOT_PRINT | ANNOT_HIDDEN } else { ANNOT_PRINT };
        widget.set("F", Object::Integer(flags));
        widget
    }

    fn state_appearance(&mut self, on_state: &str, on: lopdf::Stream, off: lopdf::Stream) -> Dictionary {
        let on_id = self.doc.add_object(on);
        let off_id = self.doc.add_object(off);
        let mut normal = Dictionary::new();
        normal.set(on_state.as_bytes().to_vec(), Object::Reference(on_id));
        normal.set(OFF_STATE, Object::Reference(off_id));
        let mut ap = Dictionary::new();
        ap.set("N", Object::Dictionary(normal));
        ap
    }

    /// Materialize one field: field dictionary, widget(s), AcroForm and page links
    pub fn create_field(&mut self, spec: &FieldSpec) -> Result<()> {
        let page_id = self
            .page_id(spec.page)
            .ok_or(PdfError::PageNotFound(spec.page))?;
        let acroform_id = self.ensure_acroform()?;

        let rect = spec.rect.normalized();
        let (width, height) = (rect.width(), rect.height());
        let mut flags = 0;
        if spec.read_only {
            flags |= FF_READ_ONLY;
        }
        if spec.required {
            flags |= FF_REQUIRED;
        }

        if spec.kind == NativeFieldKind::Radio {
            return self.create_radio_group(spec, page_id, acroform_id, flags | FF_RADIO | FF_NO_TOGGLE_TO_OFF);
        }

        let mut field = self.widget_base(page_id, &rect, spec.hidden);
        field.set("T", encode_text(&spec.name));

        match spec.kind {
            NativeFieldKind::Text | NativeFieldKind::Multiline => {
                field.set("FT", Object::Name(b"Tx".to_vec()));
                if spec.kind == NativeFieldKind::Multiline {
                    flags |= FF_MULTILINE;
                }
                field.set(
                    "DA",
                    Object::String(
                        appearance::default_appearance(spec.font_size).into_bytes(),
                        StringFormat::Literal,
                    ),
                );
                if let Some(default) = &spec.default_value {
                    field.set("DV", encode_text(default));
                }
            }
            NativeFieldKind::Checkbox => {
                field.set("FT", Object::Name(b"Btn".to_vec()));
                let ap = self.state_appearance(
                    DEFAULT_ON_STATE,
                    appearance::checkbox_on(width, height),
                    appearance::checkbox_off(width, height),
                );
                field.set("AP", Object::Dictionary(ap));
                field.set("AS", Object::Name(OFF_STATE.as_bytes().to_vec()));
                field.set("V", Object::Name(OFF_STATE.as_bytes().to_vec()));
            }
            NativeFieldKind::ComboBox | NativeFieldKind::ListBox => {
                field.set("FT", Object::Name(b"Ch".to_vec()));
                if spec.kind == NativeFieldKind::ComboBox {
                    flags |= FF_COMBO;
                }
                let options = spec
                    .options
                    .iter()
                    .map(|o| {
                        if o.export_value == o.display_value {
                            encode_text(&o.export_value)
                        } else {
                            Object::Array(vec![
                                encode_text(&o.export_value),
                                encode_text(&o.display_value),
                            ])
                        }
                    })
                    .collect();
                field.set("Opt", Object::Array(options));
                field.set(
                    "DA",
                    Object::String(
                        appearance::default_appearance(spec.font_size).into_bytes(),
                        StringFormat::Literal,
                    ),
                );
                if let Some(default) = &spec.default_value {
                    field.set("DV", encode_text(default));
                }
            }
            NativeFieldKind::Signature => {
                field.set("FT", Object::Name(b"Sig".to_vec()));
                let placeholder = self
                    .doc
                    .add_object(appearance::signature_placeholder(width, height));
                let mut ap = Dictionary::new();
                ap.set("N", Object::Reference(placeholder));
                field.set("AP", Object::Dictionary(ap));
            }
            NativeFieldKind::PushButton | NativeFieldKind::Radio => {
                return Err(PdfError::Unsupported {
                    field: spec.name.clone(),
                    reason: format!("cannot create {:?} fields", spec.kind),
                });
            }
        }
        field.set("Ff", Object::Integer(flags));

        let field_id = self.doc.add_object(Object::Dictionary(field));
        self.push_reference(acroform_id, b"Fields", field_id)?;
        self.push_reference(page_id, b"Annots", field_id)?;
        debug!(field = %spec.name, kind = ?spec.kind, page = spec.page, "created field");
        Ok(())
    }

    /// Radio group: one parent field, one widget per option side by side
    fn create_radio_group(
        &mut self,
        spec: &FieldSpec,
        page_id: ObjectId,
        acroform_id: ObjectId,
        flags: i64,
    ) -> Result<()> {
        if spec.options.is_empty() {
            return Err(PdfError::Unsupported {
                field: spec.name.clone(),
                reason: "radio group has no options".to_string(),
            });
        }
        let rect = spec.rect.normalized();
        let count = spec.options.len();
        let cell = rect.width() / count as f64;

        let parent_id = self.doc.new_object_id();
        let mut kids = Vec::with_capacity(count);
        for (i, option) in spec.options.iter().enumerate() {
            let llx = rect.llx + cell * i as f64;
            let urx = if i + 1 == count { rect.urx } else { llx + cell };
            let cell_rect = NativeRect::new(llx, rect.lly, urx, rect.ury);
            let (w, h) = (cell_rect.width(), cell_rect.height());

            let mut widget = self.widget_base(page_id, &cell_rect, spec.hidden);
            let ap = self.state_appearance(
                &option.export_value,
                appearance::radio(w, h, true),
                appearance::radio(w, h, false),
            );
            widget.set("AP", Object::Dictionary(ap));
            widget.set("AS", Object::Name(OFF_STATE.as_bytes().to_vec()));
            widget.set("Parent", Object::Reference(parent_id));
            let widget_id = self.doc.add_object(Object::Dictionary(widget));
            self.push_reference(page_id, b"Annots", widget_id)?;
            kids.push(Object::Reference(widget_id));
        }

        let mut parent = Dictionary::new();
        parent.set("FT", Object::Name(b"Btn".to_vec()));
        parent.set("T", encode_text(&spec.name));
        parent.set("Ff", Object::Integer(flags));
        parent.set("V", Object::Name(OFF_STATE.as_bytes().to_vec()));
        parent.set("Kids", Object::Array(kids));
        self.doc
            .objects
            .insert(parent_id, Object::Dictionary(parent));
        self.push_reference(acroform_id, b"Fields", parent_id)?;
        debug!(field = %spec.name, options = count, "created radio group");
        Ok(())
    }

    /// Write a typed value into an existing field and refresh its appearance
    pub fn write_value(&mut self, name: &str, value: &WriteValue) -> Result<()> {
        let node = self
            .field_nodes()
            .into_iter()
            .find(|n| n.name == name)
            .ok_or_else(|| PdfError::FieldNotFound(name.to_string()))?;
        let kind = node.kind().ok_or_else(|| PdfError::Unsupported {
            field: name.to_string(),
            reason: "unknown field type".to_string(),
        })?;

        match (kind, value) {
            (NativeFieldKind::Text | NativeFieldKind::Multiline, WriteValue::Text(text)) => {
                self.dict_mut(node.id)?.set("V", encode_text(text));
                let font_size = node.appearance.as_deref().and_then(da_font_size);
                self.refresh_text_appearance(&node, text, font_size, kind == NativeFieldKind::Multiline)?;
            }
            (NativeFieldKind::Checkbox, WriteValue::Checked(checked)) => {
                let on_state = node
                    .widgets
                    .first()
                    .and_then(|w| self.on_states(*w).into_iter().next())
                    .unwrap_or_else(|| DEFAULT_ON_STATE.to_string());
                let state = if *checked { on_state.as_str() } else { OFF_STATE };
                let state = Object::Name(state.as_bytes().to_vec());
                self.dict_mut(node.id)?.set("V", state.clone());
                for widget in &node.widgets {
                    self.dict_mut(*widget)?.set("AS", state.clone());
                }
            }
            (NativeFieldKind::ComboBox | NativeFieldKind::ListBox, WriteValue::Select(choice)) => {
                let options = node
                    .options
                    .as_ref()
                    .map(|o| self.parse_options(o))
                    .unwrap_or_default();
                let selected = match options.iter().find(|o| o.matches(choice)) {
                    Some(option) => option.clone(),
                    None if node.flags & FF_EDIT != 0 => FieldOption::same(choice.clone()),
                    None => {
                        return Err(PdfError::OptionNotFound {
                            field: name.to_string(),
                            value: choice.clone(),
                        })
                    }
                };
                self.dict_mut(node.id)?
                    .set("V", encode_text(&selected.export_value));
                if kind == NativeFieldKind::ComboBox {
                    let font_size = node.appearance.as_deref().and_then(da_font_size);
                    self.refresh_text_appearance(&node, &selected.display_value, font_size, false)?;
                }
            }
            (kind, value) => {
                warn!(field = name, ?kind, ?value, "value does not fit field type");
                return Err(PdfError::Unsupported {
                    field: name.to_string(),
                    reason: format!("{:?} field cannot take {:?}", kind, value),
                });
            }
        }

        let acroform_id = self.ensure_acroform()?;
        self.dict_mut(acroform_id)?
            .set("NeedAppearances", Object::Boolean(true));
        Ok(())
    }

    fn refresh_text_appearance(
        &mut self,
        node: &FieldNode,
        text: &str,
        font_size: Option<f64>,
        multiline: bool,
    ) -> Result<()> {
        for widget_id in &node.widgets {
            let rect = {
                let widget = self.doc.get_dictionary(*widget_id)?;
                match widget.get(b"Rect") {
                    Ok(r) => self.parse_rect(r)?,
                    Err(_) => continue,
                }
            };
            let stream = appearance::text_appearance(
                rect.width(),
                rect.height(),
                text,
                font_size,
                multiline,
            );
            let stream_id = self.doc.add_object(stream);
            let mut ap = Dictionary::new();
            ap.set("N", Object::Reference(stream_id));
            self.dict_mut(*widget_id)?.set("AP", Object::Dictionary(ap));
        }
        Ok(())
    }
}
