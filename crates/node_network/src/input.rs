//! Pointer input tracking
//!
//! Raw pointer events arrive far more often than frames. The tracker keeps
//! the latest accepted position, drops updates that are too frequent or too
//! small to matter, and treats a pointer that has not moved for a while as
//! absent.

use crate::foundation::math::Vec2;

/// Minimum seconds between accepted pointer updates
pub const POINTER_THROTTLE_SECS: f32 = 0.016;

/// Movements shorter than this many pixels are ignored
pub const POINTER_MIN_DELTA_PX: f32 = 2.0;

/// A pointer unmoved for this long stops repelling nodes
pub const POINTER_IDLE_TIMEOUT_SECS: f32 = 5.0;

/// Throttled pointer state in container-relative pixels
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    position: Option<Vec2>,
    last_accepted_at: Option<f32>,
    idle_deadline: Option<f32>,
}

impl PointerTracker {
    /// Create a tracker with no pointer
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer move at `(x, y)` pixels, observed at `now` seconds.
    ///
    /// Returns `true` when the update was accepted.
    pub fn pointer_moved(&mut self, x: f32, y: f32, now: f32) -> bool {
        let candidate = Vec2::new(x, y);
        if !(x.is_finite() && y.is_finite()) {
            return false;
        }

        if let (Some(previous), Some(accepted_at)) = (self.position, self.last_accepted_at) {
            let idle = self.is_idle(now);
            if !idle && now - accepted_at < POINTER_THROTTLE_SECS {
                return false;
            }
            if !idle && (candidate - previous).norm() < POINTER_MIN_DELTA_PX {
                return false;
            }
        }

        self.position = Some(candidate);
        self.last_accepted_at = Some(now);
        self.idle_deadline = Some(now + POINTER_IDLE_TIMEOUT_SECS);
        true
    }

    /// The pointer left the container
    pub fn pointer_left(&mut self) {
        self.clear();
    }

    /// Whether the inactivity timeout has elapsed at `now`
    pub fn is_idle(&self, now: f32) -> bool {
        self.idle_deadline.map_or(true, |deadline| now >= deadline)
    }

    /// Pointer position if present and recently moved
    pub fn active_position(&self, now: f32) -> Option<Vec2> {
        if self.is_idle(now) {
            None
        } else {
            self.position
        }
    }

    /// Forget the pointer and cancel its inactivity timeout
    pub fn clear(&mut self) {
        self.position = None;
        self.last_accepted_at = None;
        self.idle_deadline = None;
    }

    /// Whether an inactivity timeout is armed
    pub fn has_pending_timeout(&self) -> bool {
        self.idle_deadline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_move_is_accepted() {
        let mut tracker = PointerTracker::new();
        assert!(tracker.pointer_moved(10.0, 20.0, 0.0));
        assert_eq!(tracker.active_position(0.0), Some(Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn test_updates_are_throttled() {
        let mut tracker = PointerTracker::new();
        tracker.pointer_moved(0.0, 0.0, 1.0);
        assert!(!tracker.pointer_moved(50.0, 50.0, 1.005));
        assert!(tracker.pointer_moved(50.0, 50.0, 1.02));
        assert_eq!(tracker.active_position(1.02), Some(Vec2::new(50.0, 50.0)));
    }

    #[test]
    fn test_small_movements_ignored() {
        let mut tracker = PointerTracker::new();
        tracker.pointer_moved(100.0, 100.0, 0.0);
        assert!(!tracker.pointer_moved(101.0, 100.5, 0.5));
        assert_eq!(tracker.active_position(0.5), Some(Vec2::new(100.0, 100.0)));
    }

    #[test]
    fn test_idle_pointer_becomes_inactive() {
        let mut tracker = PointerTracker::new();
        tracker.pointer_moved(5.0, 5.0, 2.0);
        assert!(tracker.active_position(6.9).is_some());
        assert!(tracker.active_position(7.0).is_none());
    }

    #[test]
    fn test_small_move_after_idle_reactivates() {
        let mut tracker = PointerTracker::new();
        tracker.pointer_moved(5.0, 5.0, 0.0);
        assert!(tracker.pointer_moved(5.5, 5.0, 6.0));
        assert!(tracker.active_position(6.0).is_some());
    }

    #[test]
    fn test_leave_clears_timeout() {
        let mut tracker = PointerTracker::new();
        tracker.pointer_moved(5.0, 5.0, 0.0);
        assert!(tracker.has_pending_timeout());
        tracker.pointer_left();
        assert!(!tracker.has_pending_timeout());
        assert!(tracker.active_position(0.1).is_none());
    }
}
