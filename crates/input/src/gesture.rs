use crate::action::Action;
use glam::Vec2;
use std::collections::HashMap;

/// Identifies a pointer: the mouse, or one finger of a touch screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Started,
    Moved,
    Ended,
    Cancelled,
}

/// A pointer event in window pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub id: PointerId,
    pub phase: PointerPhase,
    pub position: Vec2,
}

impl PointerEvent {
    pub fn new(id: PointerId, phase: PointerPhase, position: Vec2) -> Self {
        Self {
            id,
            phase,
            position,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Contact {
    start: Vec2,
    last: Vec2,
    dragging: bool,
}

/// Pixels of pinch spread that count as one wheel line.
const PINCH_PIXELS_PER_LINE: f32 = 40.0;

/// Two contacts being pinched and their separation at the last event.
#[derive(Debug, Clone, Copy)]
struct Pinch {
    a: PointerId,
    b: PointerId,
    distance: f32,
}

impl Pinch {
    fn involves(&self, id: PointerId) -> bool {
        self.a == id || self.b == id
    }
}

/// Turns pointer streams into taps, drags and pinches.
///
/// A contact that is released before travelling `tap_slop` pixels is a tap
/// and produces [`Action::CycleCamera`]. Once past the slop it becomes a drag
/// and produces [`Action::Orbit`] deltas, but only for the primary (first)
/// contact. A second contact turns the gesture into a pinch: the change in
/// separation of the two produces [`Action::Zoom`] and orbiting stops until
/// one of them lifts. Taps are ignored while another contact is still down.
#[derive(Debug, Clone)]
pub struct GestureMapper {
    tap_slop: f32,
    contacts: HashMap<PointerId, Contact>,
    primary: Option<PointerId>,
    pinch: Option<Pinch>,
}

impl Default for GestureMapper {
    fn default() -> Self {
        Self::new(6.0)
    }
}

impl GestureMapper {
    pub fn new(tap_slop: f32) -> Self {
        Self {
            tap_slop,
            contacts: HashMap::new(),
            primary: None,
            pinch: None,
        }
    }

    /// Number of pointers currently pressed.
    pub fn active_contacts(&self) -> usize {
        self.contacts.len()
    }

    /// Whether two contacts are currently pinching.
    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    pub fn handle(&mut self, event: PointerEvent) -> Option<Action> {
        match event.phase {
            PointerPhase::Started => {
                self.contacts.insert(
                    event.id,
                    Contact {
                        start: event.position,
                        last: event.position,
                        dragging: false,
                    },
                );
                match self.primary {
                    None => self.primary = Some(event.id),
                    Some(primary) if self.pinch.is_none() => {
                        if let Some(first) = self.contacts.get(&primary) {
                            self.pinch = Some(Pinch {
                                a: primary,
                                b: event.id,
                                distance: first.last.distance(event.position),
                            });
                        }
                    }
                    Some(_) => {}
                }
                None
            }
            PointerPhase::Moved => {
                if let Some(pinch) = self.pinch {
                    if !pinch.involves(event.id) {
                        return None;
                    }
                    return self.pinch_moved(pinch, event);
                }

                let is_primary = self.primary == Some(event.id);
                let slop = self.tap_slop;
                let contact = self.contacts.get_mut(&event.id)?;
                let delta = if contact.dragging {
                    event.position - contact.last
                } else if event.position.distance(contact.start) > slop {
                    contact.dragging = true;
                    event.position - contact.start
                } else {
                    Vec2::ZERO
                };
                contact.last = event.position;

                (is_primary && delta != Vec2::ZERO).then_some(Action::Orbit(delta))
            }
            PointerPhase::Ended => {
                let contact = self.contacts.remove(&event.id)?;
                self.release(event.id);
                let travelled = event.position.distance(contact.start);
                if contact.dragging || travelled > self.tap_slop || !self.contacts.is_empty() {
                    return None;
                }
                tracing::debug!(pointer = ?event.id, "tap");
                Some(Action::CycleCamera)
            }
            PointerPhase::Cancelled => {
                self.contacts.remove(&event.id);
                self.release(event.id);
                None
            }
        }
    }

    /// Wheel scroll in lines; positive scrolls away from the user (zoom in).
    pub fn wheel(&self, lines: f32) -> Action {
        if lines == 0.0 || !lines.is_finite() {
            Action::Noop
        } else {
            Action::Zoom(lines)
        }
    }

    fn pinch_moved(&mut self, pinch: Pinch, event: PointerEvent) -> Option<Action> {
        let contact = self.contacts.get_mut(&event.id)?;
        contact.last = event.position;
        let (a, b) = (self.contacts.get(&pinch.a)?, self.contacts.get(&pinch.b)?);
        let distance = a.last.distance(b.last);

        // a pinch is never a tap
        for id in [pinch.a, pinch.b] {
            if let Some(c) = self.contacts.get_mut(&id) {
                c.dragging = true;
            }
        }
        self.pinch = Some(Pinch { distance, ..pinch });

        let lines = (distance - pinch.distance) / PINCH_PIXELS_PER_LINE;
        (lines != 0.0).then_some(Action::Zoom(lines))
    }

    fn release(&mut self, id: PointerId) {
        if self.primary == Some(id) {
            self.primary = None;
        }
        if self.pinch.is_some_and(|p| p.involves(id)) {
            self.pinch = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(id: PointerId, phase: PointerPhase, x: f32, y: f32) -> PointerEvent {
        PointerEvent::new(id, phase, Vec2::new(x, y))
    }

    #[test]
    fn click_is_a_tap() {
        let mut g = GestureMapper::default();
        assert_eq!(g.handle(ev(PointerId::Mouse, PointerPhase::Started, 10.0, 10.0)), None);
        assert_eq!(
            g.handle(ev(PointerId::Mouse, PointerPhase::Ended, 11.0, 10.0)),
            Some(Action::CycleCamera)
        );
        assert_eq!(g.active_contacts(), 0);
    }

    #[test]
    fn small_jitter_stays_a_tap() {
        let mut g = GestureMapper::new(6.0);
        let t = PointerId::Touch(1);
        g.handle(ev(t, PointerPhase::Started, 0.0, 0.0));
        assert_eq!(g.handle(ev(t, PointerPhase::Moved, 2.0, 2.0)), None);
        assert_eq!(
            g.handle(ev(t, PointerPhase::Ended, 2.0, 2.0)),
            Some(Action::CycleCamera)
        );
    }

    #[test]
    fn drag_orbits_and_does_not_tap() {
        let mut g = GestureMapper::new(6.0);
        let m = PointerId::Mouse;
        g.handle(ev(m, PointerPhase::Started, 0.0, 0.0));
        assert_eq!(
            g.handle(ev(m, PointerPhase::Moved, 10.0, 0.0)),
            Some(Action::Orbit(Vec2::new(10.0, 0.0)))
        );
        assert_eq!(
            g.handle(ev(m, PointerPhase::Moved, 12.0, 3.0)),
            Some(Action::Orbit(Vec2::new(2.0, 3.0)))
        );
        assert_eq!(g.handle(ev(m, PointerPhase::Ended, 0.0, 0.0)), None);
    }

    #[test]
    fn cancelled_touch_produces_nothing() {
        let mut g = GestureMapper::default();
        let t = PointerId::Touch(7);
        g.handle(ev(t, PointerPhase::Started, 5.0, 5.0));
        assert_eq!(g.handle(ev(t, PointerPhase::Cancelled, 5.0, 5.0)), None);
        assert_eq!(g.handle(ev(t, PointerPhase::Ended, 5.0, 5.0)), None);
    }

    #[test]
    fn second_touch_pinches_instead_of_orbiting() {
        let mut g = GestureMapper::default();
        let a = PointerId::Touch(1);
        let b = PointerId::Touch(2);
        g.handle(ev(a, PointerPhase::Started, 0.0, 0.0));
        g.handle(ev(b, PointerPhase::Started, 100.0, 0.0));
        assert!(g.is_pinching());
        assert_eq!(
            g.handle(ev(b, PointerPhase::Moved, 180.0, 0.0)),
            Some(Action::Zoom(2.0))
        );
        assert_eq!(
            g.handle(ev(a, PointerPhase::Moved, 40.0, 0.0)),
            Some(Action::Zoom(-1.0))
        );
    }

    #[test]
    fn pinch_end_returns_to_orbit_without_tapping() {
        let mut g = GestureMapper::default();
        let a = PointerId::Touch(1);
        let b = PointerId::Touch(2);
        g.handle(ev(a, PointerPhase::Started, 0.0, 0.0));
        g.handle(ev(b, PointerPhase::Started, 100.0, 0.0));
        g.handle(ev(b, PointerPhase::Moved, 60.0, 0.0));
        assert_eq!(g.handle(ev(b, PointerPhase::Ended, 60.0, 0.0)), None);
        assert!(!g.is_pinching());
        assert_eq!(
            g.handle(ev(a, PointerPhase::Moved, 10.0, 0.0)),
            Some(Action::Orbit(Vec2::new(10.0, 0.0)))
        );
        assert_eq!(g.handle(ev(a, PointerPhase::Ended, 10.0, 0.0)), None);
    }

    #[test]
    fn third_contact_does_not_join_the_pinch() {
        let mut g = GestureMapper::default();
        g.handle(ev(PointerId::Touch(1), PointerPhase::Started, 0.0, 0.0));
        g.handle(ev(PointerId::Touch(2), PointerPhase::Started, 100.0, 0.0));
        g.handle(ev(PointerId::Touch(3), PointerPhase::Started, 50.0, 50.0));
        assert_eq!(
            g.handle(ev(PointerId::Touch(3), PointerPhase::Moved, 90.0, 90.0)),
            None
        );
    }

    #[test]
    fn tap_ignored_while_other_contact_down() {
        let mut g = GestureMapper::default();
        let a = PointerId::Touch(1);
        let b = PointerId::Touch(2);
        g.handle(ev(a, PointerPhase::Started, 0.0, 0.0));
        g.handle(ev(b, PointerPhase::Started, 100.0, 0.0));
        assert_eq!(g.handle(ev(b, PointerPhase::Ended, 100.0, 0.0)), None);
        assert_eq!(
            g.handle(ev(a, PointerPhase::Ended, 0.0, 0.0)),
            Some(Action::CycleCamera)
        );
    }

    #[test]
    fn move_without_press_is_ignored() {
        let mut g = GestureMapper::default();
        assert_eq!(g.handle(ev(PointerId::Mouse, PointerPhase::Moved, 40.0, 40.0)), None);
    }

    #[test]
    fn wheel_maps_to_zoom() {
        let g = GestureMapper::default();
        assert_eq!(g.wheel(1.5), Action::Zoom(1.5));
        assert_eq!(g.wheel(0.0), Action::Noop);
    }
}
