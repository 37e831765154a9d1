//! Single-slot debounce timer
//!
//! The timer never sleeps on its own. Callers hand it `Instant`s when a value
//! changes and when the event loop ticks, which keeps every emission on the
//! event loop's thread and lets tests drive time explicitly.

use std::time::{Duration, Instant};

use tracing::trace;

/// Default quiet period used by the inputs in this crate
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

/// Collapses bursts of values into one delayed emission.
///
/// At most one value is pending at any time. Scheduling again before the
/// deadline replaces both the value and the deadline. A zero delay hands the
/// value straight back from [`Debouncer::schedule`].
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
    disposed: bool,
}

impl<T> Debouncer<T> {
    /// Creates a debouncer with the given quiet period
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            disposed: false,
        }
    }

    /// Returns the configured quiet period
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Changes the quiet period used by the next [`schedule`](Self::schedule) call.
    /// A value that is already pending keeps its deadline.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Arms the timer with `value`, cancelling whatever was pending.
    ///
    /// Returns `Some(value)` when the delay is zero: the caller must emit it
    /// right away. After [`dispose`](Self::dispose) the value is dropped.
    pub fn schedule(&mut self, value: T, now: Instant) -> Option<T> {
        if self.disposed {
            trace!("debouncer disposed, dropping scheduled value");
            return None;
        }

        if self.delay.is_zero() {
            self.pending = None;
            return Some(value);
        }

        self.pending = Some(Pending {
            value,
            deadline: now + self.delay,
        });
        None
    }

    /// Takes the pending value if its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(pending) if now >= pending.deadline => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// Drops the pending value without emitting it, returning it to the caller
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    /// Cancels the pending value and refuses every later schedule
    pub fn dispose(&mut self) {
        self.pending = None;
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// The value currently waiting for its deadline
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|p| &p.value)
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
