//! Two-contact pinch tracking

use super::ContactId;
use crate::units::Point;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomDirection {
    In,
    Out,
}

/// Tracks exactly two contacts. Distance changes accumulate until they
/// exceed the noise threshold, then yield one discrete zoom step.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PinchTracker {
    touch_a: (ContactId, Point),
    touch_b: (ContactId, Point),
    last_distance: f64,
    accumulated: f64,
}

impl PinchTracker {
    pub fn new(a: (ContactId, Point), b: (ContactId, Point)) -> Self {
        Self {
            touch_a: a,
            touch_b: b,
            last_distance: a.1.distance(b.1),
            accumulated: 0.0,
        }
    }

    pub fn contains(&self, contact: ContactId) -> bool {
        self.touch_a.0 == contact || self.touch_b.0 == contact
    }

    pub fn contacts(&self) -> [ContactId; 2] {
        [self.touch_a.0, self.touch_b.0]
    }

    /// The contact that is not `contact`
    pub fn other(&self, contact: ContactId) -> ContactId {
        if self.touch_a.0 == contact {
            self.touch_b.0
        } else {
            self.touch_a.0
        }
    }

    /// Feed a new position for one contact
    pub fn update(&mut self, contact: ContactId, position: Point, threshold: f64) -> Option<ZoomDirection> {
        if self.touch_a.0 == contact {
            self.touch_a.1 = position;
        } else if self.touch_b.0 == contact {
            self.touch_b.1 = position;
        } else {
            return None;
        }

        let distance = self.touch_a.1.distance(self.touch_b.1);
        let delta = distance - self.last_distance;
        self.last_distance = distance;

        // A direction reversal restarts accumulation
        if delta * self.accumulated < 0.0 {
            self.accumulated = delta;
        } else {
            self.accumulated += delta;
        }

        if self.accumulated.abs() > threshold {
            let direction = if self.accumulated > 0.0 {
                ZoomDirection::In
            } else {
                ZoomDirection::Out
            };
            self.accumulated = 0.0;
            Some(direction)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> PinchTracker {
        PinchTracker::new((1, Point::new(100.0, 100.0)), (2, Point::new(200.0, 100.0)))
    }

    #[test]
    fn test_small_changes_are_noise() {
        let mut pinch = tracker();
        assert_eq!(pinch.update(2, Point::new(210.0, 100.0), 30.0), None);
        assert_eq!(pinch.update(2, Point::new(225.0, 100.0), 30.0), None);
    }

    #[test]
    fn test_spread_zooms_in_once() {
        let mut pinch = tracker();
        pinch.update(2, Point::new(220.0, 100.0), 30.0);
        assert_eq!(
            pinch.update(2, Point::new(240.0, 100.0), 30.0),
            Some(ZoomDirection::In)
        );
        assert_eq!(pinch.update(2, Point::new(245.0, 100.0), 30.0), None);
    }

    #[test]
    fn test_squeeze_zooms_out() {
        let mut pinch = tracker();
        assert_eq!(
            pinch.update(1, Point::new(140.0, 100.0), 30.0),
            Some(ZoomDirection::Out)
        );
    }

    #[test]
    fn test_reversal_resets_accumulator() {
        let mut pinch = tracker();
        pinch.update(2, Point::new(225.0, 100.0), 30.0);
        // Back in by 10, then out again by 25: neither leg exceeds 30
        assert_eq!(pinch.update(2, Point::new(215.0, 100.0), 30.0), None);
        assert_eq!(pinch.update(2, Point::new(240.0, 100.0), 30.0), None);
    }

    #[test]
    fn test_other_contact() {
        let pinch = tracker();
        assert_eq!(pinch.other(1), 2);
        assert_eq!(pinch.other(2), 1);
        assert!(!pinch.contains(3));
    }
}
