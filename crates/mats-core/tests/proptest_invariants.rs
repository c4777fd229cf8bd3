use mats_core::ScoreboardState;
use mats_core::clock::ManualClock;
use mats_core::dispatch::{Action, Dispatcher, Outcome};
use mats_core::model::{Period, state::MIN_MAT};
use mats_core::timer::{DEFAULT_POLL_INTERVAL, TimerEngine};
use mats_core::undo::{DEFAULT_MAX_UNDO_STEPS, UndoHistory};
use proptest::prelude::*;

use generators::*;

struct Board {
    clock: ManualClock,
    state: ScoreboardState,
    history: UndoHistory,
    timer: TimerEngine<ManualClock>,
    dispatcher: Dispatcher,
}

impl Board {
    fn new() -> Self {
        let clock = ManualClock::at_millis(1_700_000_000_000);
        Self {
            timer: TimerEngine::new(clock.clone(), DEFAULT_POLL_INTERVAL),
            clock,
            state: ScoreboardState::default(),
            history: UndoHistory::default(),
            dispatcher: Dispatcher::default(),
        }
    }

    fn apply(&mut self, action: &Action) -> Outcome {
        self.dispatcher
            .dispatch(action, &mut self.state, &mut self.history, &mut self.timer)
    }

    /// Advance past the debounce window and run any due poll.
    fn settle(&mut self, millis: i64) {
        self.clock.advance_millis(millis);
        self.timer.poll(&mut self.state);
    }
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn board_invariants_hold_after_every_action(
        steps in prop::collection::vec((arb_action(), 0i64..2_000), 1..80)
    ) {
        let mut board = Board::new();
        for (action, gap) in steps {
            board.apply(&action);
            board.settle(gap);

            prop_assert!(board.state.mat >= MIN_MAT);
            prop_assert!(board.state.period.index() < Period::ALL.len());
            prop_assert!(!board.state.left_name.trim().is_empty());
            prop_assert!(!board.state.right_name.trim().is_empty());
            prop_assert!(!(board.state.timer_running && board.state.timer_seconds == 0));
            prop_assert_eq!(board.state.timer_running, board.timer.is_scheduled());
        }
    }

    #[test]
    fn undo_inverts_every_applied_mutation(
        prefix in prop::collection::vec(arb_action(), 0..30),
        action in arb_mutation(),
    ) {
        let mut board = Board::new();
        for step in &prefix {
            board.apply(step);
            board.clock.advance_millis(200);
        }

        let before = board.state.clone();
        if board.apply(&action) == Outcome::Applied {
            prop_assert_eq!(board.apply(&Action::Undo), Outcome::Applied);
            prop_assert_eq!(&board.state, &before);
            prop_assert_eq!(board.state.timer_running, board.timer.is_scheduled());
        } else {
            prop_assert_eq!(&board.state, &before);
        }
    }

    #[test]
    fn history_never_exceeds_capacity(
        steps in prop::collection::vec(arb_mutation(), 0..200)
    ) {
        let mut board = Board::new();
        for action in &steps {
            board.apply(action);
            board.clock.advance_millis(200);
            prop_assert!(board.history.len() <= DEFAULT_MAX_UNDO_STEPS);
        }
    }
}

#[test]
fn fifty_first_snapshot_evicts_oldest() {
    let mut board = Board::new();
    for _ in 0..51 {
        board.apply(&Action::ChangeBout(1));
    }
    assert_eq!(board.history.len(), DEFAULT_MAX_UNDO_STEPS);

    while board.apply(&Action::Undo) == Outcome::Applied {}
    // The snapshot of bout 101 was evicted; the oldest surviving one is 102.
    assert_eq!(board.state.bout, 102);
}
