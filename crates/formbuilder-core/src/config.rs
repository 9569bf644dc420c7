//! Tunables for the form builder
//!
//! Every threshold the gesture classifier, registry and resolver rely on
//! lives here so hosts can pass a single JSON blob at construction time.

use crate::assignment::UnassignedPolicy;
use crate::error::FormError;
use serde::{Deserialize, Serialize};

/// Floor for interactive resizes, in edit-space units.
pub const MIN_FIELD_SIZE: f64 = 20.0;

/// Discrete zoom factors, ascending.
pub const DEFAULT_ZOOM_LEVELS: [f64; 8] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0, 2.5, 3.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuilderConfig {
    pub min_field_size: f64,
    /// Pointer travel (viewport px) before a press becomes a drag
    pub drag_threshold_px: f64,
    pub long_press_ms: u64,
    pub double_tap_ms: u64,
    /// Cumulative inter-contact distance change before one zoom step
    pub pinch_threshold_px: f64,
    pub swipe_distance_px: f64,
    /// Flick speed (px per ms) that dismisses regardless of distance
    pub swipe_velocity: f64,
    pub nudge_step: f64,
    pub nudge_step_large: f64,
    pub zoom_levels: Vec<f64>,
    pub default_zoom: f64,
    pub unassigned_policy: UnassignedPolicy,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            min_field_size: MIN_FIELD_SIZE,
            drag_threshold_px: 4.0,
            long_press_ms: 500,
            double_tap_ms: 300,
            pinch_threshold_px: 30.0,
            swipe_distance_px: 100.0,
            swipe_velocity: 0.5,
            nudge_step: 1.0,
            nudge_step_large: 10.0,
            zoom_levels: DEFAULT_ZOOM_LEVELS.to_vec(),
            default_zoom: 1.0,
            unassigned_policy: UnassignedPolicy::default(),
        }
    }
}

impl BuilderConfig {
    /// Parse a (possibly partial) JSON config; missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self, FormError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| FormError::InvalidConfig(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if !(self.min_field_size > 0.0) {
            return Err(FormError::InvalidConfig(
                "minFieldSize must be positive".to_string(),
            ));
        }
        if self.zoom_levels.is_empty() {
            return Err(FormError::InvalidConfig(
                "zoomLevels must not be empty".to_string(),
            ));
        }
        if self.zoom_levels.iter().any(|z| !(*z > 0.0)) {
            return Err(FormError::InvalidConfig(
                "zoomLevels must be positive".to_string(),
            ));
        }
        if self.zoom_levels.windows(2).any(|w| w[0] >= w[1]) {
            return Err(FormError::InvalidConfig(
                "zoomLevels must be strictly ascending".to_string(),
            ));
        }
        if !self.zoom_levels.contains(&self.default_zoom) {
            return Err(FormError::InvalidConfig(format!(
                "defaultZoom {} is not one of zoomLevels",
                self.default_zoom
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BuilderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = BuilderConfig::from_json(r#"{"longPressMs": 650}"#).unwrap();
        assert_eq!(config.long_press_ms, 650);
        assert_eq!(config.min_field_size, MIN_FIELD_SIZE);
        assert_eq!(config.unassigned_policy, UnassignedPolicy::Readonly);
    }

    #[test]
    fn test_policy_parses_lowercase() {
        let config = BuilderConfig::from_json(r#"{"unassignedPolicy": "hidden"}"#).unwrap();
        assert_eq!(config.unassigned_policy, UnassignedPolicy::Hidden);
    }

    #[test]
    fn test_rejects_unsorted_zoom_levels() {
        let result = BuilderConfig::from_json(r#"{"zoomLevels": [1.0, 0.5]}"#);
        assert!(matches!(result, Err(FormError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_default_zoom_outside_ladder() {
        let result = BuilderConfig::from_json(r#"{"defaultZoom": 1.1}"#);
        assert!(matches!(result, Err(FormError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(BuilderConfig::from_json("not json").is_err());
    }
}
