//! Coordinate transformation between edit, viewport and document-native space
//!
//! Edit space is the field-storage system: top-left origin, document units,
//! unscaled. Viewport space is edit space multiplied by the zoom factor.
//! Document-native space is the PDF convention: bottom-left origin, y up.

use serde::{Deserialize, Serialize};

/// Precision that native coordinates are rounded to on export
pub const COORD_PRECISION: f64 = 0.01;
const COORD_SCALE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Rectangle with a top-left origin (edit or viewport space)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EditRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl EditRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// PDF rectangle as stored in a `/Rect` array: lower-left and upper-right corners
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NativeRect {
    pub llx: f64,
    pub lly: f64,
    pub urx: f64,
    pub ury: f64,
}

impl NativeRect {
    pub fn new(llx: f64, lly: f64, urx: f64, ury: f64) -> Self {
        Self { llx, lly, urx, ury }
    }

    /// Corners may be given in any order in a PDF; normalize so ll < ur.
    pub fn normalized(self) -> Self {
        Self {
            llx: self.llx.min(self.urx),
            lly: self.lly.min(self.ury),
            urx: self.llx.max(self.urx),
            ury: self.lly.max(self.ury),
        }
    }

    pub fn width(&self) -> f64 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f64 {
        self.ury - self.lly
    }
}

/// Page media box: origin plus extents, in document units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PageBox {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    /// US Letter, used when a page carries no usable MediaBox
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }
}

pub fn to_viewport(point: Point, scale: f64) -> Point {
    Point::new(point.x * scale, point.y * scale)
}

pub fn to_edit_space(point: Point, scale: f64) -> Point {
    Point::new(point.x / scale, point.y / scale)
}

pub fn rect_to_viewport(rect: EditRect, scale: f64) -> EditRect {
    EditRect::new(
        rect.x * scale,
        rect.y * scale,
        rect.width * scale,
        rect.height * scale,
    )
}

pub fn round_coord(value: f64) -> f64 {
    (value * COORD_SCALE).round() / COORD_SCALE
}

/// Import an existing field's native rect into edit space
pub fn import_rect(native: NativeRect, page: &PageBox) -> EditRect {
    let native = native.normalized();
    EditRect {
        x: native.llx - page.x,
        y: page.y + page.height - native.ury,
        width: native.width(),
        height: native.height(),
    }
}

/// Export an edit-space rect to native coordinates, rounded to document precision
pub fn export_rect(rect: &EditRect, page: &PageBox) -> NativeRect {
    let width = round_coord(rect.width);
    let height = round_coord(rect.height);
    let llx = round_coord(rect.x + page.x);
    let lly = round_coord(page.y + page.height - rect.y - rect.height);
    NativeRect {
        llx,
        lly,
        urx: llx + width,
        ury: lly + height,
    }
}

/// Ordered list of discrete zoom factors with a cursor.
///
/// Stepping past either end is a no-op.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomLadder {
    levels: Vec<f64>,
    index: usize,
}

impl ZoomLadder {
    /// `levels` must be non-empty and ascending (see `BuilderConfig::validate`).
    pub fn new(levels: Vec<f64>, initial: f64) -> Self {
        let mut ladder = Self { levels, index: 0 };
        ladder.snap_to(initial);
        ladder
    }

    pub fn scale(&self) -> f64 {
        self.levels.get(self.index).copied().unwrap_or(1.0)
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Returns true if the scale changed
    pub fn zoom_in(&mut self) -> bool {
        if self.index + 1 < self.levels.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn zoom_out(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Move the cursor to the level closest to `scale`
    pub fn snap_to(&mut self, scale: f64) {
        self.index = self
            .levels
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (**a - scale)
                    .abs()
                    .partial_cmp(&(**b - scale).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn page_height() -> impl Strategy<Value = f64> {
        100.0f64..2000.0
    }

    proptest! {
        /// Exporting then re-importing reproduces the edit rect within one rounding unit
        #[test]
        fn export_import_round_trip(
            height in page_height(),
            x in 0.0f64..1000.0,
            y_frac in 0.0f64..0.9,
            w in 20.0f64..400.0,
            h in 20.0f64..80.0,
        ) {
            let page = PageBox::new(1000.0, height);
            let y = y_frac * height;
            let rect = EditRect::new(x, y, w, h);
            let back = import_rect(export_rect(&rect, &page), &page);
            let tol = COORD_PRECISION + 1e-6;
            prop_assert!((back.x - rect.x).abs() <= tol, "x: {} vs {}", back.x, rect.x);
            prop_assert!((back.y - rect.y).abs() <= tol, "y: {} vs {}", back.y, rect.y);
            prop_assert!((back.width - rect.width).abs() <= tol);
            prop_assert!((back.height - rect.height).abs() <= tol);
        }

        /// Scaling is linear and uniform
        #[test]
        fn viewport_scaling_is_linear(
            x in -500.0f64..500.0,
            y in -500.0f64..500.0,
            scale in 0.25f64..4.0,
        ) {
            let v = to_viewport(Point::new(x, y), scale);
            prop_assert!((v.x - x * scale).abs() < 1e-9);
            prop_assert!((v.y - y * scale).abs() < 1e-9);
            let back = to_edit_space(v, scale);
            prop_assert!((back.x - x).abs() < 1e-9);
            prop_assert!((back.y - y).abs() < 1e-9);
        }
    }
}
