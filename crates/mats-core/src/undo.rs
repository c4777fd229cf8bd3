//! Snapshot-based undo for the scoreboard.
//!
//! Every mutating action pushes a full copy of the board *before* it changes
//! anything. Undo pops the latest copy and swaps it in wholesale, so no
//! action needs its own inverse:
//!
//! | Action | What undo restores |
//! |---|---|
//! | score / quick score | score **and** the appended log entry |
//! | outcome | the log without the outcome entry |
//! | rename, side toggle | the previous name / active side |
//! | timer start/stop/set/reset | remaining time and run state |
//! | clear log | the whole log |
//!
//! Timer ticks are never snapshotted; undoing a start restores the time as
//! it was when the timer was started.
//!
//! History is bounded. When it grows past its capacity the oldest snapshot
//! is dropped. History lives only as long as the process; it is not saved.

use std::collections::VecDeque;

use crate::model::ScoreboardState;

/// Default number of undo steps kept.
pub const DEFAULT_MAX_UNDO_STEPS: usize = 50;

/// Bounded LIFO stack of full board snapshots.
#[derive(Debug, Clone)]
pub struct UndoHistory {
    snapshots: VecDeque<ScoreboardState>,
    capacity: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO_STEPS)
    }
}

impl UndoHistory {
    /// Create a history holding at most `capacity` snapshots (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a copy of `state`, evicting the oldest snapshot when full.
    pub fn snapshot(&mut self, state: &ScoreboardState) {
        self.snapshots.push_back(state.clone());
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
    }

    /// Replace `state` with the most recent snapshot.
    ///
    /// Returns `false` (leaving `state` untouched) when there is nothing to
    /// undo. Callers must re-sync the timer engine with the restored
    /// `timer_running` flag.
    pub fn undo(&mut self, state: &mut ScoreboardState) -> bool {
        match self.snapshots.pop_back() {
            Some(previous) => {
                *state = previous;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// The snapshot that the next [`UndoHistory::undo`] would restore.
    #[must_use]
    pub fn peek(&self) -> Option<&ScoreboardState> {
        self.snapshots.back()
    }
}
