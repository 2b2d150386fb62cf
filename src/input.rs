//! Pointer and wheel handling for one gallery.
//!
//! Events are delivered by the host for the window that owns the gallery only, and a drag
//! captures the pointer that started it. Two galleries never see each other's input.

use std::time::{Duration, Instant};

use crate::scroll::ScrollState;

/// Identifies the pointer an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

/// Input delivered to a gallery. Coordinates are physical pixels relative to the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { pointer: PointerId, x: f32, y: f32 },
    PointerMove { pointer: PointerId, x: f32, y: f32 },
    PointerUp { pointer: PointerId },
    PointerCancel { pointer: PointerId },
    /// Positive values scroll the gallery forward.
    Wheel { delta_y: f32 },
}

/// What the tracker did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// The event belonged to a pointer we are not tracking.
    Ignored,
    /// Scroll state may have changed; any pending snap is void.
    Handled,
    /// The gesture ended; a snap should be scheduled.
    Settled,
}

/// Tunables copied from the gallery configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSettings {
    pub wheel_step: f32,
    pub drag_sensitivity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging {
        pointer: PointerId,
        start_x: f32,
        origin: f32,
    },
}

/// Two-state machine turning drags and wheel notches into scroll targets.
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    state: DragState,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// The pointer currently captured by a drag, if any.
    pub fn captured_pointer(&self) -> Option<PointerId> {
        match self.state {
            DragState::Dragging { pointer, .. } => Some(pointer),
            DragState::Idle => None,
        }
    }

    pub fn apply(
        &mut self,
        event: &InputEvent,
        scroll: &mut ScrollState,
        settings: InputSettings,
    ) -> InputOutcome {
        match (*event, self.state) {
            (InputEvent::PointerDown { pointer, x, .. }, DragState::Idle) => {
                self.state = DragState::Dragging {
                    pointer,
                    start_x: x,
                    origin: scroll.current,
                };
                InputOutcome::Handled
            }
            (
                InputEvent::PointerMove { pointer, x, .. },
                DragState::Dragging {
                    pointer: captured,
                    start_x,
                    origin,
                },
            ) if pointer == captured => {
                scroll.target = origin + (start_x - x) * settings.drag_sensitivity;
                InputOutcome::Handled
            }
            (
                InputEvent::PointerUp { pointer } | InputEvent::PointerCancel { pointer },
                DragState::Dragging {
                    pointer: captured, ..
                },
            ) if pointer == captured => {
                self.state = DragState::Idle;
                InputOutcome::Settled
            }
            (InputEvent::Wheel { delta_y }, _) => {
                let sign = if delta_y > 0.0 { 1.0 } else { -1.0 };
                scroll.target += settings.wheel_step * sign;
                InputOutcome::Settled
            }
            _ => InputOutcome::Ignored,
        }
    }

    /// Drops any drag in progress.
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }
}

/// Debounce timer for snapping the scroll target to a tile boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl SnapTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Replaces any pending deadline with `now + delay`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` exactly once when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTINGS: InputSettings = InputSettings {
        wheel_step: 2.0,
        drag_sensitivity: 0.05,
    };

    #[test]
    fn drag_moves_target_relative_to_origin() {
        let mut tracker = InputTracker::new();
        let mut scroll = ScrollState::new(0.05);
        scroll.current = 3.0;

        let down = InputEvent::PointerDown {
            pointer: PointerId::Mouse,
            x: 500.0,
            y: 10.0,
        };
        assert_eq!(
            tracker.apply(&down, &mut scroll, SETTINGS),
            InputOutcome::Handled
        );

        let drag = InputEvent::PointerMove {
            pointer: PointerId::Mouse,
            x: 300.0,
            y: 10.0,
        };
        tracker.apply(&drag, &mut scroll, SETTINGS);
        assert!((scroll.target - 13.0).abs() < 1e-5);

        let up = InputEvent::PointerUp {
            pointer: PointerId::Mouse,
        };
        assert_eq!(
            tracker.apply(&up, &mut scroll, SETTINGS),
            InputOutcome::Settled
        );
        assert!(!tracker.is_dragging());
    }

    #[test]
    fn other_pointers_are_ignored_while_dragging() {
        let mut tracker = InputTracker::new();
        let mut scroll = ScrollState::new(0.05);
        tracker.apply(
            &InputEvent::PointerDown {
                pointer: PointerId::Touch(1),
                x: 0.0,
                y: 0.0,
            },
            &mut scroll,
            SETTINGS,
        );

        let foreign = InputEvent::PointerMove {
            pointer: PointerId::Touch(2),
            x: -400.0,
            y: 0.0,
        };
        assert_eq!(
            tracker.apply(&foreign, &mut scroll, SETTINGS),
            InputOutcome::Ignored
        );
        assert_eq!(scroll.target, 0.0);
        assert_eq!(tracker.captured_pointer(), Some(PointerId::Touch(1)));

        let foreign_down = InputEvent::PointerDown {
            pointer: PointerId::Mouse,
            x: 0.0,
            y: 0.0,
        };
        assert_eq!(
            tracker.apply(&foreign_down, &mut scroll, SETTINGS),
            InputOutcome::Ignored
        );
    }

    #[test]
    fn wheel_steps_by_sign_of_delta() {
        let mut tracker = InputTracker::new();
        let mut scroll = ScrollState::new(0.05);
        tracker.apply(&InputEvent::Wheel { delta_y: 120.0 }, &mut scroll, SETTINGS);
        tracker.apply(&InputEvent::Wheel { delta_y: 0.3 }, &mut scroll, SETTINGS);
        tracker.apply(&InputEvent::Wheel { delta_y: -5.0 }, &mut scroll, SETTINGS);
        assert_eq!(scroll.target, 2.0);
    }

    #[test]
    fn zero_wheel_delta_steps_backward() {
        let mut tracker = InputTracker::new();
        let mut scroll = ScrollState::new(0.05);
        let outcome = tracker.apply(&InputEvent::Wheel { delta_y: 0.0 }, &mut scroll, SETTINGS);
        assert_eq!(outcome, InputOutcome::Settled);
        assert_eq!(scroll.target, -2.0);

        tracker.apply(&InputEvent::Wheel { delta_y: -0.0 }, &mut scroll, SETTINGS);
        assert_eq!(scroll.target, -4.0);
    }

    #[test]
    fn snap_timer_fires_once_after_deadline() {
        let start = Instant::now();
        let mut timer = SnapTimer::new(Duration::from_millis(200));
        timer.arm(start);
        assert!(!timer.poll(start + Duration::from_millis(199)));
        timer.arm(start + Duration::from_millis(150));
        assert!(!timer.poll(start + Duration::from_millis(300)));
        assert!(timer.poll(start + Duration::from_millis(350)));
        assert!(!timer.poll(start + Duration::from_millis(400)));
    }
}
