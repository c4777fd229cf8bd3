use mats_core::clock::ManualClock;
use mats_core::config::MatsConfig;
use mats_core::dispatch::Action;
use mats_core::normalize::normalize_state;
use mats_core::store::{FileStore, StateStore, DEFAULT_STATE_KEY};
use mats_core::{EntryType, Period, ScoreboardState, Session, Side};

type FileSession = Session<FileStore, ManualClock>;

fn open(dir: &std::path::Path, clock: &ManualClock) -> anyhow::Result<FileSession> {
    let store = FileStore::new(dir, DEFAULT_STATE_KEY);
    Ok(Session::open(store, clock.clone(), &MatsConfig::default())?)
}

#[test]
fn saved_board_reloads_equal() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let clock = ManualClock::at_millis(1_706_983_445_123);

    let saved = {
        let mut session = open(dir.path(), &clock)?;
        for action in [
            Action::ChangeMat(2),
            Action::ChangeBout(10),
            Action::CyclePeriod(1),
            Action::Rename {
                side: Side::Left,
                name: "Lee, Spencer".into(),
            },
            Action::QuickScore {
                label: "T3".into(),
                points: 3,
            },
            Action::ToggleActiveSide,
            Action::RecordOutcome {
                label: "DEC".into(),
                title: "Decision".into(),
            },
        ] {
            session.apply(&action)?;
            clock.advance_millis(400);
        }
        session.state().clone()
    };

    let reopened = open(dir.path(), &clock)?;
    assert_eq!(reopened.state(), &saved);
    assert!(reopened.load_report().is_clean());
    assert_eq!(reopened.state().log.len(), 2);
    assert_eq!(reopened.state().log[1].entry_type, EntryType::Outcome);
    Ok(())
}

#[test]
fn normalizing_a_saved_blob_is_idempotent() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let clock = ManualClock::at_millis(1_706_983_445_123);
    let mut session = open(dir.path(), &clock)?;
    session.apply(&Action::ManualScore {
        side: Side::Right,
        delta: 1,
    })?;

    let blob = session.store().load()?.expect("saved");
    let raw: serde_json::Value = serde_json::from_str(&blob)?;
    let base = ScoreboardState::default();
    let (once, report) = normalize_state(&raw, &base, clock_now(&clock));
    assert!(report.is_clean());

    let (twice, _) = normalize_state(&serde_json::to_value(&once)?, &base, clock_now(&clock));
    assert_eq!(once, twice);
    assert_eq!(&once, session.state());
    Ok(())
}

#[test]
fn legacy_blob_is_repaired_on_open() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join("scoreboardState.json"),
        r#"{
            "mat": "2",
            "bout": 305,
            "periodIndex": "3",
            "leftName": "",
            "rightName": "Dake",
            "leftScore": -1,
            "rightScore": "4",
            "activeSide": "right",
            "timerSeconds": 45,
            "timerRunning": false,
            "log": [
                {"label": "T3", "delta": 3, "side": "right", "period": "2"},
                {"label": "F", "type": "outcome", "fullTitle": "Fall"}
            ]
        }"#,
    )?;

    let clock = ManualClock::at_millis(1_706_983_445_123);
    let session = open(dir.path(), &clock)?;
    let state = session.state();
    assert_eq!(state.mat, 2);
    assert_eq!(state.period, Period::Overtime1);
    assert_eq!(state.left_name, "Red");
    assert_eq!(state.left_score, 0);
    assert_eq!(state.right_score, 4);
    assert_eq!(state.timer_seconds, 45);

    let takedown = &state.log[0];
    assert_eq!(takedown.side_name, "Dake");
    assert_eq!(takedown.period, Period::Second);
    assert_eq!(takedown.mat, 2);
    assert_eq!(takedown.bout, 305);

    let fall = &state.log[1];
    assert_eq!(fall.side, Side::Left);
    assert_eq!(fall.side_name, "Red");
    assert_eq!(fall.period, Period::Overtime1);
    assert_eq!(fall.entry_type, EntryType::Outcome);

    assert!(!session.load_report().is_clean());
    Ok(())
}

#[test]
fn corrupt_blob_opens_fresh_board() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("scoreboardState.json"), "{\"mat\": 3,")?;
    let clock = ManualClock::default();
    let session = open(dir.path(), &clock)?;
    assert_eq!(session.state(), &ScoreboardState::default());
    Ok(())
}

fn clock_now(clock: &ManualClock) -> chrono::DateTime<chrono::Utc> {
    use mats_core::clock::Clock;
    clock.now()
}
