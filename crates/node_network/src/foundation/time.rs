//! Time management utilities
//!
//! All timers are driven by the host's elapsed time (seconds since the
//! visualization started) rather than a wall clock, so they freeze together
//! with the simulation while the engine is suspended.

/// Trailing-edge debounce holding the most recent value
///
/// Each `schedule` call replaces the pending value and pushes the deadline
/// out; `take_due` yields the value once the deadline has passed.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    delay: f32,
    pending: Option<(f32, T)>,
}

impl<T> Debounce<T> {
    /// Create a debounce with the given delay in seconds
    pub fn new(delay: f32) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Schedule `value`, restarting the delay from `now`
    pub fn schedule(&mut self, value: T, now: f32) {
        self.pending = Some((now + self.delay, value));
    }

    /// Take the pending value if its deadline has passed
    pub fn take_due(&mut self, now: f32) -> Option<T> {
        match self.pending {
            Some((deadline, _)) if now >= deadline => self.pending.take().map(|(_, value)| value),
            _ => None,
        }
    }

    /// Check whether a value is waiting
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any pending value without firing it
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Fixed-period interval that reports when it is due
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period: f32,
    next_due: Option<f32>,
}

impl IntervalTimer {
    /// Create an interval with the given period in seconds
    pub fn new(period: f32) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// Returns `true` at most once per period.
    ///
    /// The first poll arms the timer and fires immediately.
    pub fn poll(&mut self, now: f32) -> bool {
        match self.next_due {
            Some(due) if now < due => false,
            _ => {
                self.next_due = Some(now + self.period);
                true
            }
        }
    }

    /// Re-arm so the next poll fires immediately
    pub fn reset(&mut self) {
        self.next_due = None;
    }
}
