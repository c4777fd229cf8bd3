//! Countdown timer engine.
//!
//! The engine is a two-state machine (stopped / running) whose running state
//! owns a [`RepeatingTask`]: a cancellable poll schedule. A front end calls
//! [`TimerEngine::poll`] whenever [`TimerEngine::next_delay`] says the task is
//! due. Each poll reads the injected [`Clock`], converts the time since the
//! last applied tick into whole seconds and consumes exactly that many.
//!
//! # Drift correction
//!
//! The "last applied" reference only moves forward by the whole seconds that
//! were consumed, never to `now`. A poll that lands 1.7 s after the last tick
//! consumes one second and carries 0.7 s into the next poll, so late or
//! jittery polls neither lose nor double-count time.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, info};

use crate::clock::Clock;
use crate::model::ScoreboardState;

/// Default poll cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

const MILLIS_PER_SECOND: i64 = 1_000;

/// Poll intervals are clamped into this range so a tick is always finer
/// than one timer second.
const MIN_POLL_MILLIS: i64 = 1;
const MAX_POLL_MILLIS: i64 = 999;

// ---------------------------------------------------------------------------
// Time input
// ---------------------------------------------------------------------------

/// Reason a requested countdown value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeInputError {
    #[error("minutes must be a whole number, got '{0}'")]
    InvalidMinutes(String),
    #[error("seconds must be a whole number, got '{0}'")]
    InvalidSeconds(String),
    #[error("minutes cannot be negative (got {0})")]
    NegativeMinutes(i64),
    #[error("seconds must be between 0 and 59 (got {0})")]
    SecondsOutOfRange(i64),
    #[error("minutes value {0} is too large")]
    MinutesOutOfRange(i64),
}

/// A validated countdown value: minutes ≥ 0 and seconds in `0..=59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerSetting {
    minutes: u32,
    seconds: u32,
}

impl TimerSetting {
    /// Validate a minutes/seconds pair.
    ///
    /// # Errors
    ///
    /// Returns [`TimeInputError`] when seconds exceed 59 or the total does
    /// not fit the timer.
    pub fn new(minutes: u32, seconds: u32) -> Result<Self, TimeInputError> {
        if seconds > 59 {
            return Err(TimeInputError::SecondsOutOfRange(i64::from(seconds)));
        }
        if minutes.checked_mul(60).and_then(|m| m.checked_add(seconds)).is_none() {
            return Err(TimeInputError::MinutesOutOfRange(i64::from(minutes)));
        }
        Ok(Self { minutes, seconds })
    }

    /// Parse the two free-form inputs a user typed for minutes and seconds.
    ///
    /// # Errors
    ///
    /// Returns [`TimeInputError`] for non-numeric, negative or out-of-range
    /// input. Nothing is mutated on error.
    pub fn parse(minutes: &str, seconds: &str) -> Result<Self, TimeInputError> {
        let mins: i64 = minutes
            .trim()
            .parse()
            .map_err(|_| TimeInputError::InvalidMinutes(minutes.to_string()))?;
        let secs: i64 = seconds
            .trim()
            .parse()
            .map_err(|_| TimeInputError::InvalidSeconds(seconds.to_string()))?;

        if mins < 0 {
            return Err(TimeInputError::NegativeMinutes(mins));
        }
        if !(0..=59).contains(&secs) {
            return Err(TimeInputError::SecondsOutOfRange(secs));
        }
        let mins = u32::try_from(mins).map_err(|_| TimeInputError::MinutesOutOfRange(mins))?;
        let secs = u32::try_from(secs).map_err(|_| TimeInputError::SecondsOutOfRange(secs))?;
        Self::new(mins, secs)
    }

    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.minutes
    }

    #[must_use]
    pub const fn seconds(self) -> u32 {
        self.seconds
    }

    #[must_use]
    pub const fn total_seconds(self) -> u32 {
        self.minutes * 60 + self.seconds
    }
}

impl fmt::Display for TimerSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.minutes, self.seconds)
    }
}

/// Accepts `M:SS` or a bare minutes value (`2` means `2:00`).
impl FromStr for TimerSetting {
    type Err = TimeInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((minutes, seconds)) => Self::parse(minutes, seconds),
            None => Self::parse(s, "0"),
        }
    }
}

// ---------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------

/// A cancellable, fixed-interval poll schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatingTask {
    interval_millis: i64,
    next_due_millis: i64,
}

impl RepeatingTask {
    const fn starting_at(now_millis: i64, interval_millis: i64) -> Self {
        Self {
            interval_millis,
            next_due_millis: now_millis + interval_millis,
        }
    }

    const fn is_due(&self, now_millis: i64) -> bool {
        now_millis >= self.next_due_millis
    }

    const fn reschedule(&mut self, now_millis: i64) {
        self.next_due_millis = now_millis + self.interval_millis;
    }

    fn delay(&self, now_millis: i64) -> Duration {
        let remaining = (self.next_due_millis - now_millis).max(0);
        Duration::from_millis(u64::try_from(remaining).unwrap_or(0))
    }
}

/// Result of one [`TimerEngine::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No task is scheduled.
    Idle,
    /// The task exists but its next poll is not due yet.
    NotDue,
    /// Polled, but less than one whole second has accumulated.
    Pending,
    /// Whole seconds were consumed and time remains.
    Ticked { consumed: u32, remaining: u32 },
    /// The countdown reached zero; the timer stopped and polling was cancelled.
    Expired { consumed: u32 },
}

impl TickOutcome {
    /// Whether the board changed and needs saving and re-rendering.
    #[must_use]
    pub const fn changed(self) -> bool {
        matches!(self, Self::Ticked { .. } | Self::Expired { .. })
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Drives `timer_seconds` / `timer_running` on a [`ScoreboardState`].
#[derive(Debug)]
pub struct TimerEngine<C> {
    clock: C,
    interval_millis: i64,
    task: Option<RepeatingTask>,
    last_applied_millis: i64,
}

impl<C: Clock> TimerEngine<C> {
    #[must_use]
    pub fn new(clock: C, poll_interval: Duration) -> Self {
        let interval_millis = i64::try_from(poll_interval.as_millis())
            .unwrap_or(MAX_POLL_MILLIS)
            .clamp(MIN_POLL_MILLIS, MAX_POLL_MILLIS);
        Self {
            clock,
            interval_millis,
            task: None,
            last_applied_millis: 0,
        }
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(u64::try_from(self.interval_millis).unwrap_or(0))
    }

    /// Whether a poll task is currently scheduled.
    #[must_use]
    pub const fn is_scheduled(&self) -> bool {
        self.task.is_some()
    }

    /// A start is only meaningful from the stopped state with time left.
    #[must_use]
    pub const fn can_start(state: &ScoreboardState) -> bool {
        !state.timer_running && state.timer_seconds > 0
    }

    /// Transition to running. Returns `false` (and changes nothing) when the
    /// timer is already running or has no time left.
    pub fn start(&mut self, state: &mut ScoreboardState) -> bool {
        if !Self::can_start(state) {
            return false;
        }
        state.timer_running = true;
        self.schedule();
        info!(remaining = state.timer_seconds, "timer started");
        true
    }

    /// Transition to stopped. Returns `false` when it was not running.
    pub fn stop(&mut self, state: &mut ScoreboardState) -> bool {
        if !state.timer_running {
            return false;
        }
        state.timer_running = false;
        self.cancel();
        info!(remaining = state.timer_seconds, "timer stopped");
        true
    }

    /// Set the remaining time, forcing the stopped state.
    pub fn set(&mut self, state: &mut ScoreboardState, seconds: u32) {
        state.set_timer(seconds);
        self.cancel();
        debug!(seconds, "timer set");
    }

    /// Align the schedule with `state.timer_running` after the board was
    /// replaced (load or undo). A running board with no time left is stopped.
    pub fn sync(&mut self, state: &mut ScoreboardState) {
        if state.timer_running && state.timer_seconds == 0 {
            state.timer_running = false;
        }
        if state.timer_running {
            self.schedule();
        } else {
            self.cancel();
        }
    }

    /// Cancel future polls without touching the board.
    pub const fn cancel(&mut self) {
        self.task = None;
    }

    /// Time until the next poll is due, or `None` when idle.
    #[must_use]
    pub fn next_delay(&self) -> Option<Duration> {
        self.task
            .as_ref()
            .map(|task| task.delay(self.clock.now_millis()))
    }

    /// Run one poll against `state`.
    pub fn poll(&mut self, state: &mut ScoreboardState) -> TickOutcome {
        let Some(task) = self.task.as_mut() else {
            return TickOutcome::Idle;
        };
        if !state.timer_running {
            self.task = None;
            return TickOutcome::Idle;
        }

        let now = self.clock.now_millis();
        if now < self.last_applied_millis {
            // Clock moved backwards: re-anchor without consuming time.
            self.last_applied_millis = now;
            task.reschedule(now);
            return TickOutcome::Pending;
        }
        if !task.is_due(now) {
            return TickOutcome::NotDue;
        }
        task.reschedule(now);

        let whole_seconds = (now - self.last_applied_millis) / MILLIS_PER_SECOND;
        if whole_seconds == 0 {
            return TickOutcome::Pending;
        }
        self.last_applied_millis += whole_seconds * MILLIS_PER_SECOND;

        let consumed = u32::try_from(whole_seconds)
            .unwrap_or(u32::MAX)
            .min(state.timer_seconds);
        state.timer_seconds -= consumed;

        if state.timer_seconds == 0 {
            state.timer_running = false;
            self.task = None;
            info!("timer expired");
            TickOutcome::Expired { consumed }
        } else {
            TickOutcome::Ticked {
                consumed,
                remaining: state.timer_seconds,
            }
        }
    }

    fn schedule(&mut self) {
        if self.task.is_some() {
            return;
        }
        let now = self.clock.now_millis();
        self.last_applied_millis = now;
        self.task = Some(RepeatingTask::starting_at(now, self.interval_millis));
    }
}
