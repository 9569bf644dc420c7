//! Assignment side-channel carried in the document title
//!
//! The document format has no slot for per-field metadata, so the flattened
//! assignment map is stored in the title behind a versioned prefix. The
//! human-readable title is lost whenever a structural save writes it.

use crate::assignment::AssignmentMap;
use crate::error::DocumentError;
use tracing::warn;

pub const TITLE_PREFIX: &str = "formbuilder-assignments:v1:";

/// Encode a map as `TITLE_PREFIX` followed by compact JSON with sorted keys
pub fn encode(map: &AssignmentMap) -> Result<String, DocumentError> {
    let json = serde_json::to_string(map)
        .map_err(|e| DocumentError::Serialize(format!("assignment metadata: {}", e)))?;
    Ok(format!("{}{}", TITLE_PREFIX, json))
}

/// Decode a title. Untagged or malformed titles mean "no metadata".
pub fn decode(title: &str) -> Option<AssignmentMap> {
    let payload = title.strip_prefix(TITLE_PREFIX)?;
    match serde_json::from_str::<AssignmentMap>(payload) {
        Ok(map) => Some(map),
        Err(e) => {
            warn!(error = %e, "ignoring malformed assignment metadata in title");
            None
        }
    }
}
