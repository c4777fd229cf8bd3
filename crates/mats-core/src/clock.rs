//! Clock sources.
//!
//! The timer and the log both read time through [`Clock`] so tests can drive
//! them with a [`ManualClock`] instead of sleeping.

use chrono::{DateTime, Local, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Instant;

/// A source of wall-clock time in milliseconds since the Unix epoch.
///
/// Implementations must not go backwards for the lifetime of a session; the
/// timer engine tolerates it but does not consume time across a regression.
pub trait Clock {
    fn now_millis(&self) -> i64;

    /// Current instant as a UTC timestamp.
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_millis()).unwrap_or_default()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

/// Production clock: wall time at construction plus monotonic elapsed time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    base_millis: i64,
    started: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_millis: Utc::now().timestamp_millis(),
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        let elapsed = i64::try_from(self.started.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.base_millis.saturating_add(elapsed)
    }
}

/// Hand-driven clock for tests and simulations.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// advance it while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    #[must_use]
    pub fn at_millis(millis: i64) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(millis)),
        }
    }

    /// Move time forward (or backward, for negative values).
    pub fn advance_millis(&self, delta: i64) {
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }

    pub fn set_millis(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Short local wall time for log lines, e.g. `3:07pm`.
#[must_use]
pub fn display_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%-I:%M%P").to_string()
}
