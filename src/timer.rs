//! Repeating timers polled from the event loop.

use std::time::{Duration, Instant};

/// A periodic deadline. The owner polls it with the current time; once due it
/// re-arms itself one interval later until cancelled.
#[derive(Debug, Clone)]
pub struct RepeatingTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl RepeatingTimer {
    /// Arm a timer whose first firing is one interval after `now`.
    /// An interval too large to represent leaves the timer disarmed.
    pub fn start(interval: Duration, now: Instant) -> Self {
        RepeatingTimer {
            interval,
            next_due: now.checked_add(interval),
        }
    }

    #[cfg(test)]
    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns true if the timer was due at `now`, and re-arms it for
    /// `now + interval`. Missed periods collapse into a single firing.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = now.checked_add(self.interval);
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }
}
