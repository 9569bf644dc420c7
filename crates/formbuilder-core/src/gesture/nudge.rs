//! Arrow-key nudging of the selected field

use crate::config::BuilderConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrowKey {
    Up,
    Down,
    Left,
    Right,
}

impl ArrowKey {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(ArrowKey::Up),
            "ArrowDown" => Some(ArrowKey::Down),
            "ArrowLeft" => Some(ArrowKey::Left),
            "ArrowRight" => Some(ArrowKey::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Nudge {
    pub dx: f64,
    pub dy: f64,
    /// The host must suppress the default action so the page does not scroll
    pub prevent_default: bool,
}

/// Edit-space offset for one arrow press; `large` is the modifier (shift)
pub fn nudge(key: ArrowKey, large: bool, config: &BuilderConfig) -> Nudge {
    let step = if large {
        config.nudge_step_large
    } else {
        config.nudge_step
    };
    let (dx, dy) = match key {
        ArrowKey::Up => (0.0, -step),
        ArrowKey::Down => (0.0, step),
        ArrowKey::Left => (-step, 0.0),
        ArrowKey::Right => (step, 0.0),
    };
    Nudge {
        dx,
        dy,
        prevent_default: true,
    }
}
