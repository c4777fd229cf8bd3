//! Action vocabulary and dispatch.
//!
//! Every user input (CLI token, key press, button) becomes an [`Action`].
//! [`Dispatcher::dispatch`] runs one action to completion against the board:
//!
//! 1. scoring actions pass through the [`Debouncer`] first;
//! 2. no-op actions (start a running timer, undo with empty history) return
//!    [`Outcome::Ignored`] without touching history;
//! 3. otherwise the board is snapshotted into [`UndoHistory`], mutated, and
//!    scoring/outcome events append a log entry.
//!
//! Persisting and re-rendering is left to the caller, keyed off
//! [`Outcome::changed`].

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::clock::Clock;
use crate::error::ErrorCode;
use crate::model::{EntryEvent, ParseEnumError, ScoreboardState, Side};
use crate::presets::PresetTable;
use crate::timer::{TimeInputError, TimerEngine, TimerSetting};
use crate::undo::UndoHistory;

/// Default window in which a repeated scoring input is dropped.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(150);

/// Allowed bout step sizes.
const BOUT_STEPS: [i32; 3] = [1, 10, 100];

/// A single state-changing input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ChangeMat(i32),
    ChangeBout(i32),
    CyclePeriod(i32),
    /// Manual point adjustment, logged as `Manual +1` / `Manual -1`.
    ManualScore { side: Side, delta: i32 },
    /// Quick-score preset applied to the active side.
    QuickScore { label: String, points: i32 },
    /// Bout-ending outcome logged on the active side with no points.
    RecordOutcome { label: String, title: String },
    StartTimer,
    StopTimer,
    ToggleTimer,
    /// Zero the clock and stop it.
    ResetTimer,
    SetTimer(TimerSetting),
    ResetScores,
    ClearLog,
    ToggleActiveSide,
    SetActiveSide(Side),
    Rename { side: Side, name: String },
    Undo,
}

/// Reason an action token could not be turned into an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionParseError {
    #[error("unknown action '{0}'")]
    Unknown(String),
    #[error("no quick-score preset labelled '{0}'")]
    UnknownPreset(String),
    #[error("no outcome labelled '{0}'")]
    UnknownOutcome(String),
    #[error("invalid points '{0}'")]
    InvalidPoints(String),
    #[error(transparent)]
    InvalidSide(#[from] ParseEnumError),
    #[error(transparent)]
    InvalidTime(#[from] TimeInputError),
}

impl ActionParseError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Unknown(_) | Self::InvalidPoints(_) | Self::InvalidSide(_) => {
                ErrorCode::UnknownAction
            }
            Self::UnknownPreset(_) | Self::UnknownOutcome(_) => ErrorCode::UnknownPreset,
            Self::InvalidTime(_) => ErrorCode::InvalidTimeInput,
        }
    }
}

impl Action {
    /// Parse a CLI token such as `mat-inc`, `bout-dec-10`, `quick=T3`,
    /// `quick=T2:2`, `outcome=F`, `timer-set=2:00` or `name-left=Cael`.
    /// Preset labels resolve through `presets`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionParseError`] for unknown tokens, unknown preset labels
    /// and invalid values.
    pub fn parse(token: &str, presets: &PresetTable) -> Result<Self, ActionParseError> {
        let token = token.trim();
        if let Some((key, value)) = token.split_once('=') {
            return Self::parse_valued(key, value, presets);
        }

        let action = match token {
            "mat-inc" => Self::ChangeMat(1),
            "mat-dec" => Self::ChangeMat(-1),
            "period-next" => Self::CyclePeriod(1),
            "period-prev" => Self::CyclePeriod(-1),
            "left-inc" => Self::ManualScore { side: Side::Left, delta: 1 },
            "left-dec" => Self::ManualScore { side: Side::Left, delta: -1 },
            "right-inc" => Self::ManualScore { side: Side::Right, delta: 1 },
            "right-dec" => Self::ManualScore { side: Side::Right, delta: -1 },
            "timer-start" => Self::StartTimer,
            "timer-stop" => Self::StopTimer,
            "timer-toggle" => Self::ToggleTimer,
            "timer-reset" => Self::ResetTimer,
            "reset-scores" => Self::ResetScores,
            "clear-log" => Self::ClearLog,
            "toggle-side" => Self::ToggleActiveSide,
            "undo" => Self::Undo,
            other => return parse_bout(other).ok_or_else(|| ActionParseError::Unknown(other.into())),
        };
        Ok(action)
    }

    fn parse_valued(key: &str, value: &str, presets: &PresetTable) -> Result<Self, ActionParseError> {
        match key {
            "quick" => {
                if let Some((label, points)) = value.split_once(':') {
                    let points = points
                        .trim()
                        .parse()
                        .map_err(|_| ActionParseError::InvalidPoints(points.to_string()))?;
                    return Ok(Self::QuickScore {
                        label: label.trim().to_string(),
                        points,
                    });
                }
                let preset = presets
                    .preset(value.trim())
                    .ok_or_else(|| ActionParseError::UnknownPreset(value.to_string()))?;
                Ok(Self::QuickScore {
                    label: preset.label.clone(),
                    points: preset.points,
                })
            }
            "outcome" => {
                let outcome = presets
                    .outcome(value.trim())
                    .ok_or_else(|| ActionParseError::UnknownOutcome(value.to_string()))?;
                Ok(Self::RecordOutcome {
                    label: outcome.label.clone(),
                    title: outcome.title.clone(),
                })
            }
            "timer-set" => Ok(Self::SetTimer(value.trim().parse()?)),
            "active" => Ok(Self::SetActiveSide(value.trim().parse()?)),
            "name-left" => Ok(Self::Rename {
                side: Side::Left,
                name: value.to_string(),
            }),
            "name-right" => Ok(Self::Rename {
                side: Side::Right,
                name: value.to_string(),
            }),
            _ => Err(ActionParseError::Unknown(format!("{key}={value}"))),
        }
    }

    /// Debounce key for scoring inputs; other actions are never debounced.
    #[must_use]
    pub fn debounce_key(&self) -> Option<DebounceKey> {
        match self {
            Self::ManualScore { side, delta } => Some(DebounceKey::Manual {
                side: *side,
                increment: *delta >= 0,
            }),
            Self::QuickScore { label, .. } => Some(DebounceKey::Quick(label.clone())),
            Self::RecordOutcome { label, .. } => Some(DebounceKey::Outcome(label.clone())),
            _ => None,
        }
    }

    /// Short, stable name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ChangeMat(_) => "change_mat",
            Self::ChangeBout(_) => "change_bout",
            Self::CyclePeriod(_) => "cycle_period",
            Self::ManualScore { .. } => "manual_score",
            Self::QuickScore { .. } => "quick_score",
            Self::RecordOutcome { .. } => "outcome",
            Self::StartTimer => "timer_start",
            Self::StopTimer => "timer_stop",
            Self::ToggleTimer => "timer_toggle",
            Self::ResetTimer => "timer_reset",
            Self::SetTimer(_) => "timer_set",
            Self::ResetScores => "reset_scores",
            Self::ClearLog => "clear_log",
            Self::ToggleActiveSide => "toggle_side",
            Self::SetActiveSide(_) => "set_side",
            Self::Rename { .. } => "rename",
            Self::Undo => "undo",
        }
    }
}

fn parse_bout(token: &str) -> Option<Action> {
    let rest = token.strip_prefix("bout-")?;
    let (direction, step) = match rest.split_once('-') {
        Some((direction, step)) => (direction, step.parse::<i32>().ok()?),
        None => (rest, 1),
    };
    if !BOUT_STEPS.contains(&step) {
        return None;
    }
    match direction {
        "inc" => Some(Action::ChangeBout(step)),
        "dec" => Some(Action::ChangeBout(-step)),
        _ => None,
    }
}

fn step_token(f: &mut fmt::Formatter<'_>, prefix: &str, delta: i32, suffix_steps: bool) -> fmt::Result {
    let direction = if delta < 0 { "dec" } else { "inc" };
    let step = delta.unsigned_abs();
    if suffix_steps && step != 1 {
        write!(f, "{prefix}-{direction}-{step}")
    } else {
        write!(f, "{prefix}-{direction}")
    }
}

/// Renders the CLI token that parses back into this action.
impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChangeMat(delta) => step_token(f, "mat", *delta, false),
            Self::ChangeBout(delta) => step_token(f, "bout", *delta, true),
            Self::CyclePeriod(direction) if *direction < 0 => f.write_str("period-prev"),
            Self::CyclePeriod(_) => f.write_str("period-next"),
            Self::ManualScore { side, delta } => step_token(f, side.as_str(), *delta, false),
            Self::QuickScore { label, points } => write!(f, "quick={label}:{points}"),
            Self::RecordOutcome { label, .. } => write!(f, "outcome={label}"),
            Self::StartTimer => f.write_str("timer-start"),
            Self::StopTimer => f.write_str("timer-stop"),
            Self::ToggleTimer => f.write_str("timer-toggle"),
            Self::ResetTimer => f.write_str("timer-reset"),
            Self::SetTimer(setting) => write!(f, "timer-set={setting}"),
            Self::ResetScores => f.write_str("reset-scores"),
            Self::ClearLog => f.write_str("clear-log"),
            Self::ToggleActiveSide => f.write_str("toggle-side"),
            Self::SetActiveSide(side) => write!(f, "active={side}"),
            Self::Rename { side, name } => write!(f, "name-{side}={name}"),
            Self::Undo => f.write_str("undo"),
        }
    }
}

// ---------------------------------------------------------------------------
// Debounce
// ---------------------------------------------------------------------------

/// Identity of a debounced input. Distinct keys never block each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DebounceKey {
    Manual { side: Side, increment: bool },
    Quick(String),
    Outcome(String),
}

/// Remembers when each key last went through.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window_millis: i64,
    last_accepted: HashMap<DebounceKey, i64>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}

impl Debouncer {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window_millis: i64::try_from(window.as_millis()).unwrap_or(i64::MAX),
            last_accepted: HashMap::new(),
        }
    }

    /// Accept `key` at `now_millis` unless it was accepted within the window.
    /// Accepting records the time; a dropped input does not extend the window.
    pub fn accept(&mut self, key: DebounceKey, now_millis: i64) -> bool {
        if let Some(last) = self.last_accepted.get(&key)
            && now_millis.saturating_sub(*last) < self.window_millis
        {
            return false;
        }
        self.last_accepted.insert(key, now_millis);
        true
    }

    pub fn clear(&mut self) {
        self.last_accepted.clear();
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// What happened to a dispatched action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The board changed; save and re-render.
    Applied,
    /// Dropped as a repeat within the debounce window.
    Debounced,
    /// Nothing to do (e.g. starting a running timer).
    Ignored,
}

impl Outcome {
    #[must_use]
    pub const fn changed(self) -> bool {
        matches!(self, Self::Applied)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Debounced => "debounced",
            Self::Ignored => "ignored",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps actions onto board mutations.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    debouncer: Debouncer,
}

impl Dispatcher {
    #[must_use]
    pub const fn new(debouncer: Debouncer) -> Self {
        Self { debouncer }
    }

    /// Run `action` against the board. Time (for debouncing and log stamps)
    /// comes from the timer's clock.
    pub fn dispatch<C: Clock>(
        &mut self,
        action: &Action,
        state: &mut ScoreboardState,
        history: &mut UndoHistory,
        timer: &mut TimerEngine<C>,
    ) -> Outcome {
        let now_millis = timer.clock().now_millis();

        if let Some(key) = action.debounce_key()
            && !self.debouncer.accept(key, now_millis)
        {
            debug!(action = action.kind(), "debounced");
            return Outcome::Debounced;
        }

        let outcome = match action {
            Action::Undo => {
                if history.undo(state) {
                    timer.sync(state);
                    Outcome::Applied
                } else {
                    Outcome::Ignored
                }
            }
            Action::StartTimer => {
                if TimerEngine::<C>::can_start(state) {
                    history.snapshot(state);
                    timer.start(state);
                    Outcome::Applied
                } else {
                    Outcome::Ignored
                }
            }
            Action::StopTimer => {
                if state.timer_running {
                    history.snapshot(state);
                    timer.stop(state);
                    Outcome::Applied
                } else {
                    Outcome::Ignored
                }
            }
            Action::ToggleTimer => {
                let next = if state.timer_running {
                    Action::StopTimer
                } else {
                    Action::StartTimer
                };
                return self.dispatch(&next, state, history, timer);
            }
            _ => {
                history.snapshot(state);
                mutate(action, state, timer);
                Outcome::Applied
            }
        };

        debug!(
            action = action.kind(),
            outcome = outcome.as_str(),
            history = history.len(),
            "dispatched"
        );
        outcome
    }

    #[must_use]
    pub const fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }
}

/// Mutations that always apply once snapshotted.
fn mutate<C: Clock>(action: &Action, state: &mut ScoreboardState, timer: &mut TimerEngine<C>) {
    let at = timer.clock().now();
    match action {
        Action::ChangeMat(delta) => state.change_mat(*delta),
        Action::ChangeBout(delta) => state.change_bout(*delta),
        Action::CyclePeriod(direction) => state.cycle_period(*direction),
        Action::ManualScore { side, delta } => {
            state.adjust_score(*side, *delta);
            let label = format!("Manual {delta:+}");
            state.record(EntryEvent::score(*side, &label, *delta), at);
        }
        Action::QuickScore { label, points } => {
            let side = state.active_side;
            state.adjust_score(side, *points);
            state.record(EntryEvent::score(side, label, *points), at);
        }
        Action::RecordOutcome { label, title } => {
            let side = state.active_side;
            state.record(EntryEvent::outcome(side, label, title), at);
        }
        Action::ResetTimer => timer.set(state, 0),
        Action::SetTimer(setting) => timer.set(state, setting.total_seconds()),
        Action::ResetScores => state.reset_scores(),
        Action::ClearLog => state.clear_log(),
        Action::ToggleActiveSide => state.toggle_active_side(),
        Action::SetActiveSide(side) => state.set_active_side(*side),
        Action::Rename { side, name } => state.set_name(*side, name),
        Action::Undo | Action::StartTimer | Action::StopTimer | Action::ToggleTimer => {}
    }
}
