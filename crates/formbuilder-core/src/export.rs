//! Export pipeline
//!
//! Two save paths. Incremental save writes current values into the fields
//! the document already has. Structural save (build mode only) flattens the
//! whole field layer and recreates every field from the registry, because
//! the document's form layer cannot move or resize a field in place.

use crate::assignment::AssignmentMap;
use crate::document::{FieldSpec, FormDocument, NativeFieldKind};
use crate::error::FormError;
use crate::field::FieldRecord;
use crate::metadata;
use crate::units::{export_rect, PageBox};
use crate::values::{is_completed_value, write_rule, FieldValues};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// A locally recovered export problem. The save still completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExportWarning {
    /// The field could not be created and is missing from the output
    #[serde(rename_all = "camelCase")]
    FieldSkipped { field: String, reason: String },
    /// The field kind has no write rule, so its value was left as is
    #[serde(rename_all = "camelCase")]
    ValueNotWritten { field: String, field_kind: NativeFieldKind },
    #[serde(rename_all = "camelCase")]
    ValueFailed { field: String, reason: String },
    #[serde(rename_all = "camelCase")]
    DuplicateNameRenamed { from: String, to: String },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    pub warnings: Vec<ExportWarning>,
}

impl ExportReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn push(&mut self, warning: ExportWarning) {
        warn!(?warning, "export warning");
        self.warnings.push(warning);
    }
}

/// Result of a save. `fields` and `assignments` are only present for
/// structural saves.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub fields: Option<Vec<FieldRecord>>,
    pub assignments: Option<AssignmentMap>,
    pub report: ExportReport,
}

/// Write current values back into the document's existing fields
pub fn incremental_save<D>(doc: &mut D, values: &FieldValues) -> Result<SaveOutcome, FormError>
where
    D: FormDocument + ?Sized,
{
    let mut report = ExportReport::default();
    let mut seen = BTreeSet::new();
    let targets: Vec<(String, NativeFieldKind)> = doc
        .discover_fields()
        .into_iter()
        .filter(|f| seen.insert(f.name.clone()))
        .map(|f| (f.name, f.kind))
        .collect();

    apply_values(doc, &targets, values, &mut report);

    let bytes = doc.to_bytes()?;
    info!(
        fields = targets.len(),
        warnings = report.warnings.len(),
        "incremental save complete"
    );
    Ok(SaveOutcome {
        bytes,
        fields: None,
        assignments: None,
        report,
    })
}

/// Flatten the field layer, rebuild it from `fields`, then apply values once.
///
/// Colliding names are made unique first. The flattened assignment map is
/// written into the title side-channel.
pub fn structural_save<D>(
    doc: &mut D,
    fields: &[FieldRecord],
    values: &FieldValues,
) -> Result<SaveOutcome, FormError>
where
    D: FormDocument + ?Sized,
{
    let mut report = ExportReport::default();
    let (fields, values) = dedupe_names(fields, values, &mut report);

    doc.flatten_fields()?;

    let mut created: Vec<(String, NativeFieldKind)> = Vec::with_capacity(fields.len());
    for field in &fields {
        let spec = field_spec(field, doc.page_box(field.page));
        match doc.create_field(&spec) {
            Ok(()) => created.push((spec.name, spec.kind)),
            Err(e) => report.push(ExportWarning::FieldSkipped {
                field: field.name.clone(),
                reason: e.to_string(),
            }),
        }
    }

    apply_values(doc, &created, &values, &mut report);

    let assignments = AssignmentMap::from_fields(&fields);
    doc.set_title(&metadata::encode(&assignments)?)?;

    let bytes = doc.to_bytes()?;
    info!(
        created = created.len(),
        total = fields.len(),
        warnings = report.warnings.len(),
        "structural save complete"
    );
    Ok(SaveOutcome {
        bytes,
        fields: Some(fields),
        assignments: Some(assignments),
        report,
    })
}

/// Native placement for a record on its page
pub fn field_spec(field: &FieldRecord, page: Option<PageBox>) -> FieldSpec {
    let page = page.unwrap_or_else(PageBox::letter);
    FieldSpec {
        name: field.name.clone(),
        kind: field.field_type.into(),
        page: field.page,
        rect: export_rect(&field.rect(), &page),
        options: field.properties.options.clone(),
        required: field.properties.required,
        read_only: field.properties.read_only,
        hidden: field.properties.hidden,
        font_size: field.properties.font_size,
        default_value: field.properties.default_value.clone(),
    }
}

fn apply_values<D>(
    doc: &mut D,
    targets: &[(String, NativeFieldKind)],
    values: &FieldValues,
    report: &mut ExportReport,
) where
    D: FormDocument + ?Sized,
{
    for (name, kind) in targets {
        let Some(value) = values.get(name) else {
            continue;
        };
        match write_rule(*kind, value) {
            Some(write) => {
                if let Err(e) = doc.write_value(name, &write) {
                    report.push(ExportWarning::ValueFailed {
                        field: name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
            // Unfilled values of unwritable kinds are nothing to report
            None if !is_completed_value(value) => {}
            None => report.push(ExportWarning::ValueNotWritten {
                field: name.clone(),
                field_kind: *kind,
            }),
        }
    }
}

/// Make names unique by suffixing `_2`, `_3`, ... on later occurrences.
/// The renamed field keeps the value it shared under the old name.
fn dedupe_names(
    fields: &[FieldRecord],
    values: &FieldValues,
    report: &mut ExportReport,
) -> (Vec<FieldRecord>, FieldValues) {
    let mut taken: BTreeSet<String> = fields.iter().map(|f| f.name.clone()).collect();
    let mut kept: BTreeSet<String> = BTreeSet::new();
    let mut values = values.clone();
    let mut out = Vec::with_capacity(fields.len());

    for field in fields {
        let mut field = field.clone();
        if !kept.insert(field.name.clone()) {
            let mut n = 2;
            let renamed = loop {
                let candidate = format!("{}_{}", field.name, n);
                if !taken.contains(&candidate) {
                    break candidate;
                }
                n += 1;
            };
            debug!(from = %field.name, to = %renamed, "renaming duplicate field");
            if let Some(value) = values.get(&field.name).map(str::to_string) {
                values.set(renamed.clone(), value);
            }
            report.push(ExportWarning::DuplicateNameRenamed {
                from: field.name.clone(),
                to: renamed.clone(),
            });
            taken.insert(renamed.clone());
            kept.insert(renamed.clone());
            field.name = renamed;
        }
        out.push(field);
    }
    (out, values)
}
