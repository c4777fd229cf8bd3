use mats_core::clock::ManualClock;
use mats_core::config::MatsConfig;
use mats_core::dispatch::{Action, Outcome};
use mats_core::presets::PresetTable;
use mats_core::store::MemoryStore;
use mats_core::{EntryType, Period, ScoreboardState, Session, Side};

fn session(clock: &ManualClock) -> Session<MemoryStore, ManualClock> {
    Session::open(MemoryStore::default(), clock.clone(), &MatsConfig::default())
        .expect("memory store opens")
}

#[test]
fn two_point_quick_score_then_undo() -> anyhow::Result<()> {
    let clock = ManualClock::at_millis(1_700_000_000_000);
    let mut session = session(&clock);
    assert_eq!(session.state().active_side, Side::Left);

    session.apply(&Action::QuickScore {
        label: "T2".into(),
        points: 2,
    })?;
    assert_eq!(session.state().left_score, 2);
    let entry = session.state().log.last().expect("logged");
    assert_eq!(entry.side, Side::Left);
    assert_eq!(entry.delta, 2);
    assert_eq!(entry.label, "T2");
    assert_eq!(entry.entry_type, EntryType::Score);

    assert_eq!(session.apply(&Action::Undo)?, Outcome::Applied);
    assert_eq!(session.state().left_score, 0);
    assert!(session.state().log.is_empty());
    Ok(())
}

#[test]
fn period_forward_from_second_overtime_wraps_to_first() -> anyhow::Result<()> {
    let clock = ManualClock::default();
    let mut session = session(&clock);
    for _ in 0..4 {
        session.apply(&Action::CyclePeriod(1))?;
    }
    assert_eq!(session.state().period, Period::Overtime2);
    assert_eq!(session.state().period.index(), 4);

    session.apply(&Action::CyclePeriod(1))?;
    assert_eq!(session.state().period.index(), 0);
    Ok(())
}

#[test]
fn repeated_button_within_window_counts_once() -> anyhow::Result<()> {
    let clock = ManualClock::at_millis(1_700_000_000_000);
    let mut session = session(&clock);
    let takedown = Action::parse("quick=T3", &PresetTable::default())?;

    assert_eq!(session.apply(&takedown)?, Outcome::Applied);
    clock.advance_millis(149);
    assert_eq!(session.apply(&takedown)?, Outcome::Debounced);
    assert_eq!(session.state().left_score, 3);
    assert_eq!(session.state().log.len(), 1);

    // A different key in the same window is not blocked.
    assert_eq!(
        session.apply(&Action::ManualScore {
            side: Side::Right,
            delta: 1
        })?,
        Outcome::Applied
    );
    assert_eq!(session.state().right_score, 1);
    Ok(())
}

#[test]
fn entries_capture_context_at_time_of_event() -> anyhow::Result<()> {
    let clock = ManualClock::at_millis(1_700_000_000_000);
    let mut session = session(&clock);
    let presets = PresetTable::default();

    for token in ["bout-inc-100", "period-next", "name-right=Dake", "active=right", "quick=E1"] {
        session.apply(&Action::parse(token, &presets)?)?;
    }
    for token in ["name-right=", "period-next", "bout-dec"] {
        session.apply(&Action::parse(token, &presets)?)?;
    }

    let state: &ScoreboardState = session.state();
    assert_eq!(state.right_name, "Green");
    let entry = &state.log[0];
    assert_eq!(entry.bout, 201);
    assert_eq!(entry.period, Period::Second);
    assert_eq!(entry.side_name, "Dake");
    assert_eq!(entry.summary(), format!("201 Period 2 Dake: E1 (+1) {}", entry.display_time));
    Ok(())
}
