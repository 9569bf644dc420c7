//! Single-contact state machine: pending press, drag, resize, long press

use super::resize::{apply_handle, Handle};
use super::{ContactId, GeometrySource, GestureKind, Intent, PointerKind, Target};
use crate::field::FieldId;
use crate::units::{EditRect, Point};

#[derive(Debug, Clone, PartialEq)]
pub enum ContactState {
    /// Down, not yet past the drag threshold
    Pending,
    Dragging {
        field: FieldId,
        origin: EditRect,
    },
    Resizing {
        field: FieldId,
        handle: Handle,
        origin: EditRect,
    },
    /// Held long enough on a field to select it
    LongPress { field: FieldId },
    /// Tracked until release but produces nothing (background pans, vanished fields)
    Passthrough,
}

impl ContactState {
    pub fn gesture_kind(&self) -> Option<GestureKind> {
        match self {
            ContactState::Dragging { .. } => Some(GestureKind::Drag),
            ContactState::Resizing { .. } => Some(GestureKind::Resize),
            ContactState::LongPress { .. } => Some(GestureKind::LongPress),
            ContactState::Pending | ContactState::Passthrough => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Contact {
    pub id: ContactId,
    pub kind: PointerKind,
    pub target: Target,
    pub start: Point,
    pub start_ms: u64,
    pub last: Point,
    pub state: ContactState,
}

impl Contact {
    pub fn begin<G>(
        id: ContactId,
        kind: PointerKind,
        target: Target,
        position: Point,
        time_ms: u64,
        geometry: &G,
    ) -> Self
    where
        G: GeometrySource + ?Sized,
    {
        let state = match &target {
            Target::Handle { field, handle } => match geometry.rect_of(field) {
                Some(origin) => ContactState::Resizing {
                    field: field.clone(),
                    handle: *handle,
                    origin,
                },
                None => ContactState::Passthrough,
            },
            Target::Field { .. } | Target::Background => ContactState::Pending,
        };
        Self {
            id,
            kind,
            target,
            start: position,
            start_ms: time_ms,
            last: position,
            state,
        }
    }

    pub fn on_move<G>(
        &mut self,
        position: Point,
        geometry: &G,
        scale: f64,
        drag_threshold: f64,
        min_size: f64,
        out: &mut Vec<Intent>,
    ) where
        G: GeometrySource + ?Sized,
    {
        self.last = position;
        let dx = (position.x - self.start.x) / scale;
        let dy = (position.y - self.start.y) / scale;

        match &self.state {
            ContactState::Pending | ContactState::LongPress { .. } => {
                if position.distance(self.start) <= drag_threshold {
                    return;
                }
                self.state = match &self.target {
                    Target::Field { id: field } => match geometry.rect_of(field) {
                        Some(origin) => {
                            out.push(Intent::Select(field.clone()));
                            out.push(Intent::Move {
                                id: field.clone(),
                                x: origin.x + dx,
                                y: origin.y + dy,
                            });
                            ContactState::Dragging {
                                field: field.clone(),
                                origin,
                            }
                        }
                        None => ContactState::Passthrough,
                    },
                    _ => ContactState::Passthrough,
                };
            }
            ContactState::Dragging { field, origin } => {
                out.push(Intent::Move {
                    id: field.clone(),
                    x: origin.x + dx,
                    y: origin.y + dy,
                });
            }
            ContactState::Resizing {
                field,
                handle,
                origin,
            } => {
                // Rejected frames are dropped; tracking continues from the same origin
                if let Some(rect) = apply_handle(*handle, *origin, dx, dy, min_size) {
                    out.push(Intent::Resize {
                        id: field.clone(),
                        rect,
                    });
                }
            }
            ContactState::Passthrough => {}
        }
    }

    /// Long-press timer check; only touch presses on a field qualify
    pub fn on_tick(&mut self, now_ms: u64, long_press_ms: u64, out: &mut Vec<Intent>) {
        if self.kind != PointerKind::Touch || self.state != ContactState::Pending {
            return;
        }
        let Target::Field { id: field } = &self.target else {
            return;
        };
        if now_ms.saturating_sub(self.start_ms) >= long_press_ms {
            out.push(Intent::LongPressSelect(field.clone()));
            self.state = ContactState::LongPress {
                field: field.clone(),
            };
        }
    }

    /// Intents for a gesture that ends without a tap (release after a
    /// committed gesture, cancel, or a synthetic end)
    pub fn finish(&self, out: &mut Vec<Intent>) {
        if let Some(kind) = self.state.gesture_kind() {
            out.push(Intent::GestureEnded(kind));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Rects(HashMap<String, EditRect>);

    impl GeometrySource for Rects {
        fn rect_of(&self, id: &str) -> Option<EditRect> {
            self.0.get(id).copied()
        }
    }

    fn rects() -> Rects {
        let mut map = HashMap::new();
        map.insert("f".to_string(), EditRect::new(50.0, 50.0, 115.0, 16.0));
        Rects(map)
    }

    #[test]
    fn test_move_within_threshold_stays_pending() {
        let geometry = rects();
        let mut contact = Contact::begin(
            1,
            PointerKind::Mouse,
            Target::field("f"),
            Point::new(60.0, 60.0),
            0,
            &geometry,
        );
        let mut out = Vec::new();
        contact.on_move(Point::new(62.0, 61.0), &geometry, 1.0, 4.0, 20.0, &mut out);
        assert!(out.is_empty());
        assert_eq!(contact.state, ContactState::Pending);
    }

    #[test]
    fn test_drag_commits_past_threshold_and_scales() {
        let geometry = rects();
        let mut contact = Contact::begin(
            1,
            PointerKind::Mouse,
            Target::field("f"),
            Point::new(60.0, 60.0),
            0,
            &geometry,
        );
        let mut out = Vec::new();
        contact.on_move(Point::new(80.0, 60.0), &geometry, 2.0, 4.0, 20.0, &mut out);
        assert_eq!(
            out,
            vec![
                Intent::Select("f".into()),
                Intent::Move {
                    id: "f".into(),
                    x: 60.0,
                    y: 50.0
                }
            ]
        );
    }

    #[test]
    fn test_handle_press_resizes_immediately() {
        let geometry = rects();
        let mut contact = Contact::begin(
            1,
            PointerKind::Mouse,
            Target::Handle {
                field: "f".into(),
                handle: Handle::BottomLeft,
            },
            Point::new(50.0, 66.0),
            0,
            &geometry,
        );
        let mut out = Vec::new();
        contact.on_move(Point::new(20.0, 66.0), &geometry, 1.0, 4.0, 20.0, &mut out);
        assert_eq!(
            out,
            vec![Intent::Resize {
                id: "f".into(),
                rect: EditRect::new(20.0, 50.0, 145.0, 16.0)
            }]
        );
    }

    #[test]
    fn test_background_drag_is_passthrough() {
        let geometry = rects();
        let mut contact = Contact::begin(
            1,
            PointerKind::Touch,
            Target::Background,
            Point::new(0.0, 0.0),
            0,
            &geometry,
        );
        let mut out = Vec::new();
        contact.on_move(Point::new(0.0, 50.0), &geometry, 1.0, 4.0, 20.0, &mut out);
        assert!(out.is_empty());
        assert_eq!(contact.state, ContactState::Passthrough);
    }
}
