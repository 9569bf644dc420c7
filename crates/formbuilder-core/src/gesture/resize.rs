//! Corner-handle resize rules

use crate::units::EditRect;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Handle {
    pub const ALL: [Handle; 4] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomLeft,
        Handle::BottomRight,
    ];

    /// Whether dragging this handle moves the left edge (and so `x`)
    pub fn moves_left_edge(&self) -> bool {
        matches!(self, Handle::TopLeft | Handle::BottomLeft)
    }

    /// Whether dragging this handle moves the top edge (and so `y`)
    pub fn moves_top_edge(&self) -> bool {
        matches!(self, Handle::TopLeft | Handle::TopRight)
    }
}

/// Rect produced by dragging `handle` by (dx, dy) edit units from `origin`.
///
/// Returns `None` when an extent the drag changed would fall under `min`.
/// Extents the drag leaves untouched are not checked, so a 16-high text
/// field can still be widened.
pub fn apply_handle(handle: Handle, origin: EditRect, dx: f64, dy: f64, min: f64) -> Option<EditRect> {
    let mut rect = origin;

    if handle.moves_left_edge() {
        rect.x += dx;
        rect.width -= dx;
    } else {
        rect.width += dx;
    }

    if handle.moves_top_edge() {
        rect.y += dy;
        rect.height -= dy;
    } else {
        rect.height += dy;
    }

    let width_ok = rect.width >= min || rect.width == origin.width;
    let height_ok = rect.height >= min || rect.height == origin.height;
    (width_ok && height_ok).then_some(rect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_FIELD_SIZE;
    use pretty_assertions::assert_eq;

    fn text_field() -> EditRect {
        EditRect::new(50.0, 50.0, 115.0, 16.0)
    }

    #[test]
    fn test_bottom_right_changes_size_only() {
        let rect = apply_handle(Handle::BottomRight, text_field(), 10.0, 20.0, MIN_FIELD_SIZE);
        assert_eq!(rect, Some(EditRect::new(50.0, 50.0, 125.0, 36.0)));
    }

    #[test]
    fn test_bottom_left_drag_left_widens_and_moves() {
        let rect = apply_handle(Handle::BottomLeft, text_field(), -30.0, 0.0, MIN_FIELD_SIZE);
        assert_eq!(rect, Some(EditRect::new(20.0, 50.0, 145.0, 16.0)));
    }

    #[test]
    fn test_top_right_moves_top_edge() {
        let origin = EditRect::new(0.0, 100.0, 100.0, 50.0);
        let rect = apply_handle(Handle::TopRight, origin, 5.0, -10.0, MIN_FIELD_SIZE);
        assert_eq!(rect, Some(EditRect::new(0.0, 90.0, 105.0, 60.0)));
    }

    #[test]
    fn test_top_left_moves_both_edges() {
        let origin = EditRect::new(100.0, 100.0, 100.0, 50.0);
        let rect = apply_handle(Handle::TopLeft, origin, 10.0, 10.0, MIN_FIELD_SIZE);
        assert_eq!(rect, Some(EditRect::new(110.0, 110.0, 90.0, 40.0)));
    }

    #[test]
    fn test_rejects_below_floor() {
        let origin = EditRect::new(0.0, 0.0, 40.0, 40.0);
        assert_eq!(
            apply_handle(Handle::BottomRight, origin, -25.0, 0.0, MIN_FIELD_SIZE),
            None
        );
        assert_eq!(
            apply_handle(Handle::TopLeft, origin, 0.0, 30.0, MIN_FIELD_SIZE),
            None
        );
    }

    #[test]
    fn test_growing_sub_floor_extent_waits_for_floor() {
        let checkbox = EditRect::new(0.0, 0.0, 16.0, 16.0);
        assert_eq!(
            apply_handle(Handle::BottomRight, checkbox, 2.0, 0.0, MIN_FIELD_SIZE),
            None
        );
        assert_eq!(
            apply_handle(Handle::BottomRight, checkbox, 4.0, 0.0, MIN_FIELD_SIZE),
            Some(EditRect::new(0.0, 0.0, 20.0, 16.0))
        );
    }
}
