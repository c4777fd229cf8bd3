use chrono::DateTime;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use mats_core::clock::ManualClock;
use mats_core::dispatch::{Action, Debouncer, Dispatcher};
use mats_core::model::EntryEvent;
use mats_core::normalize::normalize_state;
use mats_core::timer::{DEFAULT_POLL_INTERVAL, TimerEngine};
use mats_core::undo::UndoHistory;
use mats_core::{ScoreboardState, Side};
use std::time::Duration;

const LOG_SIZES: [usize; 3] = [10, 200, 2_000];

fn board_with_log(entries: usize) -> ScoreboardState {
    let mut state = ScoreboardState::default();
    let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default();
    for i in 0..entries {
        let side = if i % 2 == 0 { Side::Left } else { Side::Right };
        state.record(EntryEvent::score(side, "T3", 3), at);
    }
    state
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize.load");
    let base = ScoreboardState::default();
    let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default();

    for size in LOG_SIZES {
        let raw = serde_json::to_value(board_with_log(size)).unwrap_or_default();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &raw, |b, raw| {
            b.iter(|| {
                let (state, report) = normalize_state(raw, &base, now);
                black_box((state.log.len(), report.is_clean()))
            });
        });
    }

    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch.snapshot");

    // Every action snapshots the whole board, so cost grows with the log.
    for size in LOG_SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let clock = ManualClock::at_millis(1_700_000_000_000);
            let mut state = board_with_log(size);
            let mut history = UndoHistory::default();
            let mut timer = TimerEngine::new(clock.clone(), DEFAULT_POLL_INTERVAL);
            let mut dispatcher = Dispatcher::new(Debouncer::new(Duration::ZERO));
            b.iter(|| {
                clock.advance_millis(1);
                black_box(dispatcher.dispatch(
                    &Action::ToggleActiveSide,
                    &mut state,
                    &mut history,
                    &mut timer,
                ))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_dispatch);
criterion_main!(benches);
