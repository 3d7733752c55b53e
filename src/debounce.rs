//! Debouncing of high-frequency input
//!
//! `Debouncer` holds at most one pending value and one deadline. Every push
//! replaces the pending value and restarts the window, so only the latest
//! value survives a burst, and it is released once the input has been quiet
//! for the whole window.
//!
//! The debouncer owns no timer task. Callers pass the current instant in and
//! ask for the deadline, which keeps it deterministic under test and lets an
//! async caller sleep until `deadline()`.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

/// Classic trailing-edge debounce (not throttle)
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given quiet window
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Quiet window
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Submit a value, superseding any pending one and restarting the window
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some(Pending {
            value,
            deadline: now + self.delay,
        });
    }

    /// Instant at which the pending value becomes due
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Whether a value is waiting for its window to elapse
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Release the pending value if its window has elapsed at `now`
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.deadline().is_some_and(|deadline| deadline <= now) {
            self.pending.take().map(|p| p.value)
        } else {
            None
        }
    }

    /// Drop the pending value without emitting it
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }
}
