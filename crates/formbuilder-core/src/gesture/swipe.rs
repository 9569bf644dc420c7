//! Swipe-to-dismiss for drawer and sheet panels

use crate::config::BuilderConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SwipeOutcome {
    Dismiss,
    SnapBack,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    y: f64,
    time_ms: u64,
}

/// Vertical drag tracker for one panel.
///
/// A downward drag past the distance threshold, or a downward flick faster
/// than the velocity threshold, dismisses. Anything else snaps back.
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeDismiss {
    distance_threshold: f64,
    velocity_threshold: f64,
    start: Option<Sample>,
    previous: Option<Sample>,
    last: Option<Sample>,
}

impl SwipeDismiss {
    pub fn new(distance_threshold: f64, velocity_threshold: f64) -> Self {
        Self {
            distance_threshold,
            velocity_threshold,
            start: None,
            previous: None,
            last: None,
        }
    }

    pub fn from_config(config: &BuilderConfig) -> Self {
        Self::new(config.swipe_distance_px, config.swipe_velocity)
    }

    pub fn is_tracking(&self) -> bool {
        self.start.is_some()
    }

    pub fn start(&mut self, y: f64, time_ms: u64) {
        let sample = Sample { y, time_ms };
        self.start = Some(sample);
        self.previous = None;
        self.last = Some(sample);
    }

    /// Record a move and return the panel offset to display (never upward)
    pub fn update(&mut self, y: f64, time_ms: u64) -> f64 {
        let Some(start) = self.start else {
            return 0.0;
        };
        self.previous = self.last;
        self.last = Some(Sample { y, time_ms });
        (y - start.y).max(0.0)
    }

    /// Finish the drag. Without a matching `start` the panel stays put.
    pub fn end(&mut self, y: f64, time_ms: u64) -> SwipeOutcome {
        let Some(start) = self.start.take() else {
            return SwipeOutcome::SnapBack;
        };
        let end = Sample { y, time_ms };
        let reference = match self.last {
            Some(last) if last.time_ms < time_ms => last,
            _ => self.previous.unwrap_or(start),
        };
        self.previous = None;
        self.last = None;

        let distance = end.y - start.y;
        let velocity = velocity(reference, end);

        if distance > self.distance_threshold || velocity > self.velocity_threshold {
            SwipeOutcome::Dismiss
        } else {
            SwipeOutcome::SnapBack
        }
    }

    pub fn cancel(&mut self) {
        self.start = None;
        self.previous = None;
        self.last = None;
    }
}

/// Downward speed in px/ms between two samples; zero when no time elapsed
fn velocity(from: Sample, to: Sample) -> f64 {
    let elapsed = to.time_ms.saturating_sub(from.time_ms);
    if elapsed == 0 {
        0.0
    } else {
        (to.y - from.y) / elapsed as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tracker() -> SwipeDismiss {
        SwipeDismiss::from_config(&BuilderConfig::default())
    }

    #[test]
    fn test_long_slow_drag_dismisses() {
        let mut swipe = tracker();
        swipe.start(0.0, 0);
        swipe.update(80.0, 800);
        swipe.update(150.0, 1600);
        assert_eq!(swipe.end(150.0, 2400), SwipeOutcome::Dismiss);
    }

    #[test]
    fn test_short_slow_drag_snaps_back() {
        let mut swipe = tracker();
        swipe.start(0.0, 0);
        swipe.update(20.0, 200);
        swipe.update(40.0, 400);
        assert_eq!(swipe.end(40.0, 600), SwipeOutcome::SnapBack);
    }

    #[test]
    fn test_fast_flick_dismisses() {
        let mut swipe = tracker();
        swipe.start(0.0, 0);
        swipe.update(10.0, 100);
        assert_eq!(swipe.end(60.0, 150), SwipeOutcome::Dismiss);
    }

    #[test]
    fn test_upward_flick_snaps_back() {
        let mut swipe = tracker();
        swipe.start(200.0, 0);
        swipe.update(150.0, 20);
        assert_eq!(swipe.end(100.0, 40), SwipeOutcome::SnapBack);
    }

    #[test]
    fn test_offset_never_negative() {
        let mut swipe = tracker();
        swipe.start(100.0, 0);
        assert_eq!(swipe.update(60.0, 10), 0.0);
        assert_eq!(swipe.update(130.0, 20), 30.0);
    }

    #[test]
    fn test_end_without_start() {
        let mut swipe = tracker();
        assert!(!swipe.is_tracking());
        assert_eq!(swipe.end(500.0, 10), SwipeOutcome::SnapBack);
    }

    #[test]
    fn test_cancel_resets() {
        let mut swipe = tracker();
        swipe.start(0.0, 0);
        swipe.cancel();
        assert!(!swipe.is_tracking());
        assert_eq!(swipe.update(300.0, 10), 0.0);
    }
}
