//! Gesture classifier
//!
//! Turns an abstract pointer/touch event feed into intents. The host
//! forwards raw events (viewport pixels, a contact id, a phase and a
//! timestamp) plus what was under the pointer; all state lives here so the
//! same logic runs without a UI host.
//!
//! At most one gesture is active at a time: either a single tracked contact
//! or a two-contact pinch. Starting anything new first ends what was active.

mod contact;
pub mod nudge;
mod pinch;
pub mod resize;
pub mod swipe;

pub use contact::ContactState;
pub use nudge::{nudge, ArrowKey, Nudge};
pub use pinch::ZoomDirection;
pub use resize::{apply_handle, Handle};
pub use swipe::{SwipeDismiss, SwipeOutcome};

use crate::config::BuilderConfig;
use crate::field::FieldId;
use crate::units::{EditRect, Point};
use contact::Contact;
use pinch::PinchTracker;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

pub type ContactId = u32;

/// Read access to field geometry, needed to anchor drags and resizes
pub trait GeometrySource {
    fn rect_of(&self, id: &str) -> Option<EditRect>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Down,
    Move,
    Up,
    /// Window-level cancellation (pointercancel, blur, lost capture)
    Cancel,
}

/// What the pointer was over when the contact went down
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Target {
    Background,
    Field { id: FieldId },
    Handle { field: FieldId, handle: Handle },
}

impl Target {
    pub fn field(id: impl Into<FieldId>) -> Self {
        Target::Field { id: id.into() }
    }

    pub fn field_id(&self) -> Option<&str> {
        match self {
            Target::Background => None,
            Target::Field { id } => Some(id),
            Target::Handle { field, .. } => Some(field),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    pub contact: ContactId,
    pub kind: PointerKind,
    pub phase: Phase,
    /// Viewport pixels
    pub position: Point,
    pub time_ms: u64,
    #[serde(default = "background")]
    pub target: Target,
}

fn background() -> Target {
    Target::Background
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GestureKind {
    Drag,
    Resize,
    LongPress,
    Pinch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "intent", content = "data", rename_all = "camelCase")]
pub enum Intent {
    Select(FieldId),
    ClearSelection,
    LongPressSelect(FieldId),
    DoubleTapSelect(FieldId),
    /// Absolute edit-space position for the field's top-left corner
    Move { id: FieldId, x: f64, y: f64 },
    Resize { id: FieldId, rect: EditRect },
    Zoom(ZoomDirection),
    GestureEnded(GestureKind),
}

#[derive(Debug, Clone, PartialEq)]
struct TapRecord {
    field: FieldId,
    time_ms: u64,
}

#[derive(Debug, Clone)]
pub struct GestureClassifier {
    drag_threshold: f64,
    long_press_ms: u64,
    double_tap_ms: u64,
    pinch_threshold: f64,
    min_size: f64,
    active: Option<Contact>,
    pinch: Option<PinchTracker>,
    /// Contacts left over from an aborted pinch, ignored until lifted
    suppressed: BTreeSet<ContactId>,
    last_tap: Option<TapRecord>,
}

impl GestureClassifier {
    pub fn new(config: &BuilderConfig) -> Self {
        Self {
            drag_threshold: config.drag_threshold_px,
            long_press_ms: config.long_press_ms,
            double_tap_ms: config.double_tap_ms,
            pinch_threshold: config.pinch_threshold_px,
            min_size: config.min_field_size,
            active: None,
            pinch: None,
            suppressed: BTreeSet::new(),
            last_tap: None,
        }
    }

    /// Feed one event. `scale` is the current zoom factor.
    pub fn handle<G>(&mut self, event: &PointerEvent, geometry: &G, scale: f64) -> Vec<Intent>
    where
        G: GeometrySource + ?Sized,
    {
        let mut out = Vec::new();
        match event.phase {
            Phase::Down => self.on_down(event, geometry, &mut out),
            Phase::Move => self.on_move(event, geometry, scale, &mut out),
            Phase::Up => self.on_up(event, &mut out),
            Phase::Cancel => self.on_cancel(event.contact, &mut out),
        }
        out
    }

    /// Advance timers; call periodically while `listening()`
    pub fn tick(&mut self, now_ms: u64) -> Vec<Intent> {
        let mut out = Vec::new();
        if let Some(contact) = self.active.as_mut() {
            contact.on_tick(now_ms, self.long_press_ms, &mut out);
        }
        out
    }

    /// Synthetic end for everything in flight (window blur, mode switch)
    pub fn cancel_all(&mut self) -> Vec<Intent> {
        let mut out = Vec::new();
        self.end_pinch(&mut out);
        if let Some(contact) = self.active.take() {
            contact.finish(&mut out);
        }
        self.suppressed.clear();
        out
    }

    /// True while any contact is tracked and move/end events matter
    pub fn listening(&self) -> bool {
        self.active.is_some() || self.pinch.is_some() || !self.suppressed.is_empty()
    }

    /// The gesture currently in progress, if any
    pub fn active_gesture(&self) -> Option<GestureKind> {
        if self.pinch.is_some() {
            return Some(GestureKind::Pinch);
        }
        self.active.as_ref().and_then(|c| c.state.gesture_kind())
    }

    pub fn active_state(&self) -> Option<&ContactState> {
        self.active.as_ref().map(|c| &c.state)
    }

    fn on_down<G>(&mut self, event: &PointerEvent, geometry: &G, out: &mut Vec<Intent>)
    where
        G: GeometrySource + ?Sized,
    {
        self.suppressed.remove(&event.contact);

        if event.kind == PointerKind::Touch {
            if self.pinch.is_some() {
                // Third finger: abort the pinch and ignore every finger until lifted
                let contacts = self.pinch.as_ref().map(|p| p.contacts());
                self.end_pinch(out);
                if let Some(contacts) = contacts {
                    self.suppressed.extend(contacts);
                }
                self.suppressed.insert(event.contact);
                return;
            }

            let second_touch = self
                .active
                .as_ref()
                .filter(|c| c.kind == PointerKind::Touch && c.id != event.contact)
                .map(|c| (c.id, c.last));
            if let Some(first) = second_touch {
                if let Some(contact) = self.active.take() {
                    contact.finish(out);
                }
                debug!(a = first.0, b = event.contact, "pinch started");
                self.pinch = Some(PinchTracker::new(first, (event.contact, event.position)));
                return;
            }
        }

        if let Some(contacts) = self.pinch.as_ref().map(|p| p.contacts()) {
            self.end_pinch(out);
            self.suppressed.extend(contacts);
        }
        if let Some(previous) = self.active.take() {
            debug!(contact = previous.id, "ending previous gesture before new press");
            previous.finish(out);
        }
        self.active = Some(Contact::begin(
            event.contact,
            event.kind,
            event.target.clone(),
            event.position,
            event.time_ms,
            geometry,
        ));
    }

    fn on_move<G>(&mut self, event: &PointerEvent, geometry: &G, scale: f64, out: &mut Vec<Intent>)
    where
        G: GeometrySource + ?Sized,
    {
        if self.suppressed.contains(&event.contact) {
            return;
        }
        if let Some(pinch) = self.pinch.as_mut() {
            if pinch.contains(event.contact) {
                if let Some(direction) =
                    pinch.update(event.contact, event.position, self.pinch_threshold)
                {
                    out.push(Intent::Zoom(direction));
                }
                return;
            }
        }
        if let Some(contact) = self.active.as_mut().filter(|c| c.id == event.contact) {
            contact.on_move(
                event.position,
                geometry,
                scale,
                self.drag_threshold,
                self.min_size,
                out,
            );
        }
    }

    fn on_up(&mut self, event: &PointerEvent, out: &mut Vec<Intent>) {
        if self.suppressed.remove(&event.contact) {
            return;
        }
        if self.release_pinch_contact(event.contact, out) {
            return;
        }
        let Some(contact) = self.take_active(event.contact) else {
            return;
        };
        if contact.state == ContactState::Pending {
            self.tap(&contact, event.time_ms, out);
        } else {
            contact.finish(out);
        }
    }

    fn on_cancel(&mut self, contact_id: ContactId, out: &mut Vec<Intent>) {
        if self.suppressed.remove(&contact_id) {
            return;
        }
        if self.release_pinch_contact(contact_id, out) {
            return;
        }
        if let Some(contact) = self.take_active(contact_id) {
            contact.finish(out);
        }
    }

    /// A pinch finger lifted: the pinch ends and the remaining finger is
    /// ignored until it lifts too
    fn release_pinch_contact(&mut self, contact_id: ContactId, out: &mut Vec<Intent>) -> bool {
        let other = match self.pinch.as_ref() {
            Some(pinch) if pinch.contains(contact_id) => pinch.other(contact_id),
            _ => return false,
        };
        self.end_pinch(out);
        self.suppressed.insert(other);
        true
    }

    fn end_pinch(&mut self, out: &mut Vec<Intent>) {
        if self.pinch.take().is_some() {
            debug!("pinch ended");
            out.push(Intent::GestureEnded(GestureKind::Pinch));
        }
    }

    fn take_active(&mut self, contact_id: ContactId) -> Option<Contact> {
        match self.active.as_ref() {
            Some(c) if c.id == contact_id => self.active.take(),
            _ => None,
        }
    }

    fn tap(&mut self, contact: &Contact, time_ms: u64, out: &mut Vec<Intent>) {
        let Some(field) = contact.target.field_id() else {
            self.last_tap = None;
            out.push(Intent::ClearSelection);
            return;
        };

        if contact.kind != PointerKind::Touch {
            out.push(Intent::Select(field.to_string()));
            return;
        }

        let is_double = self
            .last_tap
            .as_ref()
            .map(|t| t.field == field && time_ms.saturating_sub(t.time_ms) <= self.double_tap_ms)
            .unwrap_or(false);
        if is_double {
            self.last_tap = None;
            out.push(Intent::DoubleTapSelect(field.to_string()));
        } else {
            self.last_tap = Some(TapRecord {
                field: field.to_string(),
                time_ms,
            });
            out.push(Intent::Select(field.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Rects(HashMap<String, EditRect>);

    impl GeometrySource for Rects {
        fn rect_of(&self, id: &str) -> Option<EditRect> {
            self.0.get(id).copied()
        }
    }

    fn geometry() -> Rects {
        let mut rects = Rects::default();
        rects
            .0
            .insert("f".to_string(), EditRect::new(50.0, 50.0, 115.0, 16.0));
        rects
    }

    fn classifier() -> GestureClassifier {
        GestureClassifier::new(&BuilderConfig::default())
    }

    fn ev(contact: ContactId, kind: PointerKind, phase: Phase, x: f64, y: f64, t: u64, target: Target) -> PointerEvent {
        PointerEvent {
            contact,
            kind,
            phase,
            position: Point::new(x, y),
            time_ms: t,
            target,
        }
    }

    fn mouse(phase: Phase, x: f64, y: f64, target: Target) -> PointerEvent {
        ev(1, PointerKind::Mouse, phase, x, y, 0, target)
    }

    fn touch(contact: ContactId, phase: Phase, x: f64, y: f64, t: u64, target: Target) -> PointerEvent {
        ev(contact, PointerKind::Touch, phase, x, y, t, target)
    }

    #[test]
    fn test_click_selects_and_unsubscribes() {
        let g = geometry();
        let mut c = classifier();
        assert!(c.handle(&mouse(Phase::Down, 60.0, 55.0, Target::field("f")), &g, 1.0).is_empty());
        assert!(c.listening());
        let out = c.handle(&mouse(Phase::Move, 61.0, 56.0, Target::field("f")), &g, 1.0);
        assert!(out.is_empty());
        let out = c.handle(&mouse(Phase::Up, 61.0, 56.0, Target::field("f")), &g, 1.0);
        assert_eq!(out, vec![Intent::Select("f".into())]);
        assert!(!c.listening());
    }

    #[test]
    fn test_click_background_clears_selection() {
        let g = geometry();
        let mut c = classifier();
        c.handle(&mouse(Phase::Down, 500.0, 500.0, Target::Background), &g, 1.0);
        let out = c.handle(&mouse(Phase::Up, 500.0, 500.0, Target::Background), &g, 1.0);
        assert_eq!(out, vec![Intent::ClearSelection]);
    }

    #[test]
    fn test_drag_moves_then_ends() {
        let g = geometry();
        let mut c = classifier();
        c.handle(&mouse(Phase::Down, 60.0, 55.0, Target::field("f")), &g, 1.0);
        let out = c.handle(&mouse(Phase::Move, 70.0, 75.0, Target::field("f")), &g, 1.0);
        assert_eq!(out.last(), Some(&Intent::Move { id: "f".into(), x: 60.0, y: 70.0 }));
        assert_eq!(c.active_gesture(), Some(GestureKind::Drag));
        let out = c.handle(&mouse(Phase::Up, 70.0, 75.0, Target::field("f")), &g, 1.0);
        assert_eq!(out, vec![Intent::GestureEnded(GestureKind::Drag)]);
        assert!(!c.listening());
    }

    #[test]
    fn test_bottom_left_resize_scenario() {
        let g = geometry();
        let mut c = classifier();
        let handle = Target::Handle {
            field: "f".into(),
            handle: Handle::BottomLeft,
        };
        c.handle(&mouse(Phase::Down, 50.0, 66.0, handle.clone()), &g, 1.0);
        assert_eq!(c.active_gesture(), Some(GestureKind::Resize));
        let out = c.handle(&mouse(Phase::Move, 20.0, 66.0, handle.clone()), &g, 1.0);
        assert_eq!(
            out,
            vec![Intent::Resize {
                id: "f".into(),
                rect: EditRect::new(20.0, 50.0, 145.0, 16.0)
            }]
        );
    }

    #[test]
    fn test_rejected_resize_frame_keeps_tracking() {
        let g = geometry();
        let mut c = classifier();
        let handle = Target::Handle {
            field: "f".into(),
            handle: Handle::BottomRight,
        };
        c.handle(&mouse(Phase::Down, 165.0, 66.0, handle.clone()), &g, 1.0);
        // Shrinks width to 15: rejected
        let out = c.handle(&mouse(Phase::Move, 65.0, 66.0, handle.clone()), &g, 1.0);
        assert!(out.is_empty());
        assert_eq!(c.active_gesture(), Some(GestureKind::Resize));
        let out = c.handle(&mouse(Phase::Move, 175.0, 66.0, handle), &g, 1.0);
        assert_eq!(
            out,
            vec![Intent::Resize {
                id: "f".into(),
                rect: EditRect::new(50.0, 50.0, 125.0, 16.0)
            }]
        );
    }

    #[test]
    fn test_new_press_ends_previous_gesture() {
        let g = geometry();
        let mut c = classifier();
        c.handle(&mouse(Phase::Down, 60.0, 55.0, Target::field("f")), &g, 1.0);
        c.handle(&mouse(Phase::Move, 90.0, 55.0, Target::field("f")), &g, 1.0);
        // Lost the up event; the next press must end the drag first
        let out = c.handle(&mouse(Phase::Down, 300.0, 300.0, Target::Background), &g, 1.0);
        assert_eq!(out, vec![Intent::GestureEnded(GestureKind::Drag)]);
        assert_eq!(c.active_state(), Some(&ContactState::Pending));
    }

    #[test]
    fn test_long_press_selects() {
        let g = geometry();
        let mut c = classifier();
        c.handle(&touch(1, Phase::Down, 60.0, 55.0, 1000, Target::field("f")), &g, 1.0);
        assert!(c.tick(1400).is_empty());
        assert_eq!(c.tick(1500), vec![Intent::LongPressSelect("f".into())]);
        // Fires once
        assert!(c.tick(1600).is_empty());
        let out = c.handle(&touch(1, Phase::Up, 60.0, 55.0, 1700, Target::field("f")), &g, 1.0);
        assert_eq!(out, vec![Intent::GestureEnded(GestureKind::LongPress)]);
    }

    #[test]
    fn test_movement_before_timer_cancels_long_press() {
        let g = geometry();
        let mut c = classifier();
        c.handle(&touch(1, Phase::Down, 60.0, 55.0, 0, Target::field("f")), &g, 1.0);
        let out = c.handle(&touch(1, Phase::Move, 80.0, 55.0, 200, Target::field("f")), &g, 1.0);
        assert!(matches!(out.last(), Some(Intent::Move { .. })));
        assert!(c.tick(600).is_empty());
        assert_eq!(c.active_gesture(), Some(GestureKind::Drag));
    }

    #[test]
    fn test_mouse_never_long_presses() {
        let g = geometry();
        let mut c = classifier();
        c.handle(&mouse(Phase::Down, 60.0, 55.0, Target::field("f")), &g, 1.0);
        assert!(c.tick(10_000).is_empty());
    }

    #[test]
    fn test_double_tap_selects() {
        let g = geometry();
        let mut c = classifier();
        c.handle(&touch(1, Phase::Down, 60.0, 55.0, 0, Target::field("f")), &g, 1.0);
        let first = c.handle(&touch(1, Phase::Up, 60.0, 55.0, 50, Target::field("f")), &g, 1.0);
        assert_eq!(first, vec![Intent::Select("f".into())]);
        c.handle(&touch(2, Phase::Down, 60.0, 55.0, 200, Target::field("f")), &g, 1.0);
        let second = c.handle(&touch(2, Phase::Up, 60.0, 55.0, 250, Target::field("f")), &g, 1.0);
        assert_eq!(second, vec![Intent::DoubleTapSelect("f".into())]);
    }

    #[test]
    fn test_slow_second_tap_is_single() {
        let g = geometry();
        let mut c = classifier();
        c.handle(&touch(1, Phase::Down, 60.0, 55.0, 0, Target::field("f")), &g, 1.0);
        c.handle(&touch(1, Phase::Up, 60.0, 55.0, 50, Target::field("f")), &g, 1.0);
        c.handle(&touch(2, Phase::Down, 60.0, 55.0, 300, Target::field("f")), &g, 1.0);
        let second = c.handle(&touch(2, Phase::Up, 60.0, 55.0, 400, Target::field("f")), &g, 1.0);
        assert_eq!(second, vec![Intent::Select("f".into())]);
    }

    #[test]
    fn test_pinch_spread_zooms_in() {
        let g = geometry();
        let mut c = classifier();
        c.handle(&touch(1, Phase::Down, 100.0, 100.0, 0, Target::Background), &g, 1.0);
        c.handle(&touch(2, Phase::Down, 200.0, 100.0, 10, Target::Background), &g, 1.0);
        assert_eq!(c.active_gesture(), Some(GestureKind::Pinch));
        let out = c.handle(&touch(2, Phase::Move, 220.0, 100.0, 20, Target::Background), &g, 1.0);
        assert!(out.is_empty());
        let out = c.handle(&touch(2, Phase::Move, 240.0, 100.0, 30, Target::Background), &g, 1.0);
        assert_eq!(out, vec![Intent::Zoom(ZoomDirection::In)]);
    }

    #[test]
    fn test_second_finger_ends_drag_before_pinch() {
        let g = geometry();
        let mut c = classifier();
        c.handle(&touch(1, Phase::Down, 60.0, 55.0, 0, Target::field("f")), &g, 1.0);
        c.handle(&touch(1, Phase::Move, 90.0, 55.0, 10, Target::field("f")), &g, 1.0);
        let out = c.handle(&touch(2, Phase::Down, 200.0, 55.0, 20, Target::Background), &g, 1.0);
        assert_eq!(out, vec![Intent::GestureEnded(GestureKind::Drag)]);
        assert_eq!(c.active_gesture(), Some(GestureKind::Pinch));
    }

    #[test]
    fn test_third_finger_ends_pinch() {
        let g = geometry();
        let mut c = classifier();
        c.handle(&touch(1, Phase::Down, 100.0, 100.0, 0, Target::Background), &g, 1.0);
        c.handle(&touch(2, Phase::Down, 200.0, 100.0, 0, Target::Background), &g, 1.0);
        let out = c.handle(&touch(3, Phase::Down, 300.0, 100.0, 0, Target::Background), &g, 1.0);
        assert_eq!(out, vec![Intent::GestureEnded(GestureKind::Pinch)]);
        assert_eq!(c.active_gesture(), None);
        // Leftover fingers are ignored until lifted
        let out = c.handle(&touch(1, Phase::Move, 0.0, 100.0, 0, Target::Background), &g, 1.0);
        assert!(out.is_empty());
        for id in 1..=3 {
            c.handle(&touch(id, Phase::Up, 0.0, 0.0, 0, Target::Background), &g, 1.0);
        }
        assert!(!c.listening());
    }

    #[test]
    fn test_lifting_pinch_finger_suppresses_other() {
        let g = geometry();
        let mut c = classifier();
        c.handle(&touch(1, Phase::Down, 100.0, 100.0, 0, Target::Background), &g, 1.0);
        c.handle(&touch(2, Phase::Down, 200.0, 100.0, 0, Target::Background), &g, 1.0);
        let out = c.handle(&touch(2, Phase::Up, 200.0, 100.0, 0, Target::Background), &g, 1.0);
        assert_eq!(out, vec![Intent::GestureEnded(GestureKind::Pinch)]);
        // The remaining finger does not turn into a tap
        let out = c.handle(&touch(1, Phase::Up, 100.0, 100.0, 0, Target::Background), &g, 1.0);
        assert!(out.is_empty());
        assert!(!c.listening());
    }

    #[test]
    fn test_cancel_event_ends_gesture() {
        let g = geometry();
        let mut c = classifier();
        c.handle(&mouse(Phase::Down, 60.0, 55.0, Target::field("f")), &g, 1.0);
        c.handle(&mouse(Phase::Move, 90.0, 55.0, Target::field("f")), &g, 1.0);
        let out = c.handle(&mouse(Phase::Cancel, 90.0, 55.0, Target::field("f")), &g, 1.0);
        assert_eq!(out, vec![Intent::GestureEnded(GestureKind::Drag)]);
        assert!(!c.listening());
    }

    #[test]
    fn test_cancel_all_releases_everything() {
        let g = geometry();
        let mut c = classifier();
        c.handle(&touch(1, Phase::Down, 100.0, 100.0, 0, Target::Background), &g, 1.0);
        c.handle(&touch(2, Phase::Down, 200.0, 100.0, 0, Target::Background), &g, 1.0);
        let out = c.cancel_all();
        assert_eq!(out, vec![Intent::GestureEnded(GestureKind::Pinch)]);
        assert!(!c.listening());
        assert!(c.cancel_all().is_empty());
    }

    #[test]
    fn test_handle_on_vanished_field_is_inert() {
        let g = Rects::default();
        let mut c = classifier();
        let handle = Target::Handle {
            field: "gone".into(),
            handle: Handle::TopLeft,
        };
        c.handle(&mouse(Phase::Down, 0.0, 0.0, handle.clone()), &g, 1.0);
        let out = c.handle(&mouse(Phase::Move, 50.0, 50.0, handle.clone()), &g, 1.0);
        assert!(out.is_empty());
        let out = c.handle(&mouse(Phase::Up, 50.0, 50.0, handle), &g, 1.0);
        assert!(out.is_empty());
        assert!(!c.listening());
    }

    #[test]
    fn test_event_json_shape() {
        let event: PointerEvent = serde_json::from_str(
            r#"{"contact":1,"kind":"touch","phase":"down","position":{"x":1.0,"y":2.0},"timeMs":5,
                "target":{"kind":"handle","field":"f","handle":"bottomLeft"}}"#,
        )
        .unwrap();
        assert_eq!(
            event.target,
            Target::Handle {
                field: "f".into(),
                handle: Handle::BottomLeft
            }
        );
        let bare: PointerEvent = serde_json::from_str(
            r#"{"contact":1,"kind":"mouse","phase":"up","position":{"x":0,"y":0},"timeMs":0}"#,
        )
        .unwrap();
        assert_eq!(bare.target, Target::Background);
    }
}
