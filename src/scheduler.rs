//! Debounce scheduler for remote persistence.
//!
//! DESIGN
//! ======
//! The board container owns one `PersistScheduler`. Every local mutation
//! re-arms it, pushing the deadline to `now + delay`; a burst of mutations
//! therefore collapses into a single write once the board has been quiet
//! for `delay`. The scheduler never sleeps or spawns anything itself: the
//! persistence task (or a test) asks `take_due(now)` and performs the write.
//! Time is always passed in, which keeps tests deterministic.

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct PersistScheduler {
    delay: Duration,
    deadline: Option<Instant>,
    /// Mutations coalesced into the pending write.
    coalesced: u64,
}

impl PersistScheduler {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None, coalesced: 0 }
    }

    /// (Re)arm the timer; any pending deadline is replaced.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
        self.coalesced += 1;
    }

    /// Drop the pending write without performing it.
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.coalesced = 0;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Number of arms folded into the pending write.
    #[must_use]
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }

    /// Disarm and return `true` if the deadline has passed at `now`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.cancel();
                true
            }
            _ => false,
        }
    }

    /// Disarm and return `true` if anything was pending, regardless of the deadline.
    pub fn flush(&mut self) -> bool {
        let pending = self.is_armed();
        self.cancel();
        pending
    }
}
