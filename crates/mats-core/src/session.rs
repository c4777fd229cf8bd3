//! One open scoreboard.
//!
//! A [`Session`] owns the board together with everything that acts on it:
//! undo history, timer engine, dispatcher and the store it persists to.
//! Front ends feed it actions and timer polls and re-render when the result
//! says the board changed.

use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::config::MatsConfig;
use crate::dispatch::{Action, Debouncer, Dispatcher};
use crate::error::ErrorCode;
use crate::keymap::{KeyPress, action_for_key};
use crate::model::ScoreboardState;
use crate::normalize::{NormalizeReport, normalize_state};
use crate::presets::PresetTable;
use crate::store::{StateStore, StoreError, save_state};
use crate::timer::{TickOutcome, TimerEngine};
use crate::undo::UndoHistory;

pub use crate::dispatch::Outcome;

/// Failure surfaced by a session operation.
///
/// Mutations are never rolled back on a failed save; the next successful
/// save writes the full board again.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Store(err) => err.code(),
        }
    }
}

#[derive(Debug)]
pub struct Session<S, C> {
    state: ScoreboardState,
    history: UndoHistory,
    timer: TimerEngine<C>,
    dispatcher: Dispatcher,
    presets: PresetTable,
    store: S,
    report: NormalizeReport,
}

impl<S: StateStore, C: Clock> Session<S, C> {
    /// Load the board from `store`, repair it and resume a running timer.
    ///
    /// A missing or unparsable blob yields the fresh board from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] when the store cannot be read.
    pub fn open(store: S, clock: C, config: &MatsConfig) -> Result<Self, SessionError> {
        let base = config.fresh_board();
        let blob = store.load()?;

        let (mut state, report) = match blob.as_deref().map(serde_json::from_str::<Value>) {
            None => (base, NormalizeReport::default()),
            Some(Err(err)) => {
                warn!(key = store.key(), error = %err, "stored board is not valid JSON; starting fresh");
                (base, NormalizeReport::default())
            }
            Some(Ok(raw)) => normalize_state(&raw, &base, clock.now()),
        };

        if !report.is_clean() {
            warn!(
                repaired = report.repaired_fields(),
                dropped_entries = report.dropped_entries,
                replaced_root = report.replaced_root,
                fields = ?report.repairs,
                "repaired stored board"
            );
        }

        let mut timer = TimerEngine::new(clock, config.poll_interval());
        timer.sync(&mut state);

        info!(
            key = store.key(),
            mat = state.mat,
            bout = state.bout,
            entries = state.log.len(),
            timer_running = state.timer_running,
            "session opened"
        );

        Ok(Self {
            state,
            history: UndoHistory::new(config.undo_capacity()),
            timer,
            dispatcher: Dispatcher::new(Debouncer::new(config.debounce_window())),
            presets: config.preset_table(),
            store,
            report,
        })
    }

    /// Dispatch one action and save if it changed the board.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] when the save fails. The board keeps
    /// the mutation.
    pub fn apply(&mut self, action: &Action) -> Result<Outcome, SessionError> {
        let outcome = self.dispatcher.dispatch(
            action,
            &mut self.state,
            &mut self.history,
            &mut self.timer,
        );
        if outcome.changed() {
            self.save()?;
        }
        Ok(outcome)
    }

    /// Resolve a shortcut key and apply it. `None` when the key is unbound.
    ///
    /// # Errors
    ///
    /// See [`Session::apply`].
    pub fn apply_key(&mut self, key: KeyPress) -> Result<Option<Outcome>, SessionError> {
        match action_for_key(key, &self.state, &self.presets) {
            Some(action) => self.apply(&action).map(Some),
            None => Ok(None),
        }
    }

    /// Run one timer poll and save if time was consumed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] when the save fails.
    pub fn tick(&mut self) -> Result<TickOutcome, SessionError> {
        let outcome = self.timer.poll(&mut self.state);
        if outcome.changed() {
            self.save()?;
        }
        Ok(outcome)
    }

    /// Write the current board to the store.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] when the save fails.
    pub fn save(&mut self) -> Result<(), SessionError> {
        save_state(&mut self.store, &self.state)?;
        Ok(())
    }

    /// How long a front end should wait before calling [`Session::tick`].
    #[must_use]
    pub fn next_delay(&self) -> Option<Duration> {
        self.timer.next_delay()
    }

    #[must_use]
    pub const fn state(&self) -> &ScoreboardState {
        &self.state
    }

    #[must_use]
    pub const fn history(&self) -> &UndoHistory {
        &self.history
    }

    #[must_use]
    pub const fn timer(&self) -> &TimerEngine<C> {
        &self.timer
    }

    #[must_use]
    pub const fn presets(&self) -> &PresetTable {
        &self.presets
    }

    /// Repairs made while loading the stored board.
    #[must_use]
    pub const fn load_report(&self) -> &NormalizeReport {
        &self.report
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::model::Side;
    use crate::store::MemoryStore;

    fn open(store: MemoryStore, clock: &ManualClock) -> Session<MemoryStore, ManualClock> {
        Session::open(store, clock.clone(), &MatsConfig::default()).expect("open")
    }

    #[test]
    fn empty_store_opens_fresh_board() {
        let clock = ManualClock::at_millis(1_700_000_000_000);
        let session = open(MemoryStore::default(), &clock);
        assert_eq!(session.state(), &ScoreboardState::default());
        assert!(session.load_report().is_clean());
        assert!(session.next_delay().is_none());
    }

    #[test]
    fn unparsable_blob_falls_back_to_defaults() {
        let clock = ManualClock::default();
        let session = open(MemoryStore::with_blob("{not json"), &clock);
        assert_eq!(session.state(), &ScoreboardState::default());
    }

    #[test]
    fn applied_actions_are_saved_and_ignored_ones_are_not() -> Result<(), SessionError> {
        let clock = ManualClock::at_millis(1_700_000_000_000);
        let store = MemoryStore::default();
        let mut session = open(store.clone(), &clock);

        assert_eq!(session.apply(&Action::StartTimer)?, Outcome::Ignored);
        assert!(store.blob().is_none());

        assert_eq!(session.apply(&Action::ChangeMat(2))?, Outcome::Applied);
        let saved: ScoreboardState =
            serde_json::from_str(&store.blob().expect("saved")).expect("valid blob");
        assert_eq!(saved.mat, 3);
        Ok(())
    }

    #[test]
    fn ticks_save_only_when_time_changes() -> Result<(), SessionError> {
        let clock = ManualClock::at_millis(1_700_000_000_000);
        let store = MemoryStore::default();
        let mut session = open(store.clone(), &clock);
        session.apply(&Action::SetTimer("0:03".parse().expect("valid")))?;
        session.apply(&Action::StartTimer)?;
        let after_start = store.blob();

        clock.advance_millis(250);
        assert_eq!(session.tick()?, TickOutcome::Pending);
        assert_eq!(store.blob(), after_start);

        clock.advance_millis(800);
        assert!(matches!(session.tick()?, TickOutcome::Ticked { remaining: 2, .. }));
        assert_ne!(store.blob(), after_start);
        Ok(())
    }

    #[test]
    fn reopen_resumes_running_timer_from_now() -> Result<(), SessionError> {
        let clock = ManualClock::at_millis(1_700_000_000_000);
        let store = MemoryStore::default();
        {
            let mut session = open(store.clone(), &clock);
            session.apply(&Action::SetTimer("1:00".parse().expect("valid")))?;
            session.apply(&Action::StartTimer)?;
        }

        // Time while closed is not consumed.
        clock.advance_millis(30_000);
        let mut session = open(store, &clock);
        assert!(session.state().timer_running);
        assert!(session.timer().is_scheduled());

        clock.advance_millis(1_000);
        assert!(matches!(session.tick()?, TickOutcome::Ticked { remaining: 59, .. }));
        Ok(())
    }

    #[test]
    fn history_is_not_persisted() -> Result<(), SessionError> {
        let clock = ManualClock::default();
        let store = MemoryStore::default();
        {
            let mut session = open(store.clone(), &clock);
            session.apply(&Action::ToggleActiveSide)?;
            assert_eq!(session.history().len(), 1);
        }
        let mut session = open(store, &clock);
        assert_eq!(session.state().active_side, Side::Right);
        assert!(session.history().is_empty());
        assert_eq!(session.apply(&Action::Undo)?, Outcome::Ignored);
        Ok(())
    }

    #[test]
    fn shortcut_keys_resolve_through_presets() -> Result<(), SessionError> {
        let clock = ManualClock::default();
        let mut session = open(MemoryStore::default(), &clock);
        assert_eq!(session.apply_key(KeyPress::plain('t'))?, Some(Outcome::Applied));
        assert_eq!(session.apply_key(KeyPress::plain('z'))?, None);
        assert_eq!(session.state().left_score, 3);
        Ok(())
    }
}
