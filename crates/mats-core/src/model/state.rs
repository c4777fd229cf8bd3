use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entry::LogEntry;
use super::kinds::{EntryType, Period, Side};
use crate::clock::display_time;

pub const DEFAULT_MAT: u32 = 1;
pub const DEFAULT_BOUT: u32 = 101;
pub const MIN_MAT: u32 = 1;
pub const MIN_BOUT: u32 = 0;

/// The whole scoreboard: bout context, both competitors, timer and log.
///
/// Every mutator clamps instead of failing. Scores never go below zero, the
/// mat number never below one, and the period is an enum so it cannot leave
/// its range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreboardState {
    pub mat: u32,
    pub bout: u32,
    #[serde(rename = "periodIndex", with = "period_index")]
    pub period: Period,
    pub left_name: String,
    pub right_name: String,
    pub left_score: u32,
    pub right_score: u32,
    pub active_side: Side,
    pub timer_seconds: u32,
    pub timer_running: bool,
    pub log: Vec<LogEntry>,
}

impl Default for ScoreboardState {
    fn default() -> Self {
        Self {
            mat: DEFAULT_MAT,
            bout: DEFAULT_BOUT,
            period: Period::First,
            left_name: Side::Left.default_name().to_string(),
            right_name: Side::Right.default_name().to_string(),
            left_score: 0,
            right_score: 0,
            active_side: Side::Left,
            timer_seconds: 0,
            timer_running: false,
            log: Vec::new(),
        }
    }
}

impl ScoreboardState {
    #[must_use]
    pub fn name(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.left_name,
            Side::Right => &self.right_name,
        }
    }

    #[must_use]
    pub const fn score(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left_score,
            Side::Right => self.right_score,
        }
    }

    const fn score_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Left => &mut self.left_score,
            Side::Right => &mut self.right_score,
        }
    }

    /// Remaining time as `MM:SS`.
    #[must_use]
    pub fn formatted_clock(&self) -> String {
        format_clock(self.timer_seconds)
    }

    pub fn change_mat(&mut self, delta: i32) {
        self.mat = offset_clamped(self.mat, delta, MIN_MAT);
    }

    pub fn change_bout(&mut self, delta: i32) {
        self.bout = offset_clamped(self.bout, delta, MIN_BOUT);
    }

    pub fn cycle_period(&mut self, direction: i32) {
        self.period = self.period.cycled(direction);
    }

    /// Add `delta` points to `side`, flooring the score at zero.
    pub fn adjust_score(&mut self, side: Side, delta: i32) {
        let score = self.score_mut(side);
        *score = offset_clamped(*score, delta, 0);
    }

    pub const fn reset_scores(&mut self) {
        self.left_score = 0;
        self.right_score = 0;
    }

    /// Rename a competitor. Blank input restores the side's default name.
    pub fn set_name(&mut self, side: Side, raw: &str) {
        let trimmed = raw.trim();
        let name = if trimmed.is_empty() {
            side.default_name().to_string()
        } else {
            trimmed.to_string()
        };
        match side {
            Side::Left => self.left_name = name,
            Side::Right => self.right_name = name,
        }
    }

    pub const fn set_active_side(&mut self, side: Side) {
        self.active_side = side;
    }

    pub const fn toggle_active_side(&mut self) {
        self.active_side = self.active_side.opposite();
    }

    /// Set the countdown and force the timer into the stopped state.
    pub const fn set_timer(&mut self, seconds: u32) {
        self.timer_seconds = seconds;
        self.timer_running = false;
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Build a log entry stamped with the current board context.
    #[must_use]
    pub fn entry(&self, event: EntryEvent<'_>, at: DateTime<Utc>) -> LogEntry {
        LogEntry {
            at,
            display_time: display_time(at),
            mat: self.mat,
            bout: self.bout,
            period: self.period,
            side: event.side,
            side_name: self.name(event.side).to_string(),
            label: event.label.to_string(),
            delta: event.delta,
            entry_type: event.entry_type,
            full_title: event.full_title.to_string(),
        }
    }

    /// Append an entry stamped with the current board context.
    pub fn record(&mut self, event: EntryEvent<'_>, at: DateTime<Utc>) {
        let entry = self.entry(event, at);
        self.log.push(entry);
    }
}

/// The caller-supplied half of a log entry; the board supplies the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryEvent<'a> {
    pub side: Side,
    pub label: &'a str,
    pub delta: i32,
    pub entry_type: EntryType,
    pub full_title: &'a str,
}

impl<'a> EntryEvent<'a> {
    #[must_use]
    pub const fn score(side: Side, label: &'a str, delta: i32) -> Self {
        Self {
            side,
            label,
            delta,
            entry_type: EntryType::Score,
            full_title: "",
        }
    }

    #[must_use]
    pub const fn outcome(side: Side, label: &'a str, full_title: &'a str) -> Self {
        Self {
            side,
            label,
            delta: 0,
            entry_type: EntryType::Outcome,
            full_title,
        }
    }
}

/// Format seconds as zero-padded `MM:SS`. Minutes are not capped at 99.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn offset_clamped(value: u32, delta: i32, floor: u32) -> u32 {
    let next = i64::from(value) + i64::from(delta);
    let clamped = next.clamp(i64::from(floor), i64::from(u32::MAX));
    u32::try_from(clamped).unwrap_or(floor)
}

mod period_index {
    use super::Period;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(period: &Period, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(period.index() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Period, D::Error> {
        let index = u64::deserialize(deserializer)?;
        Ok(Period::from_index_clamped(
            usize::try_from(index).unwrap_or(usize::MAX),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
    }

    #[test]
    fn defaults_match_fresh_board() {
        let state = ScoreboardState::default();
        assert_eq!(state.mat, 1);
        assert_eq!(state.bout, 101);
        assert_eq!(state.period, Period::First);
        assert_eq!(state.left_name, "Red");
        assert_eq!(state.right_name, "Green");
        assert_eq!(state.active_side, Side::Left);
        assert!(!state.timer_running);
        assert!(state.log.is_empty());
    }

    #[test]
    fn scores_floor_at_zero() {
        let mut state = ScoreboardState::default();
        state.adjust_score(Side::Left, -1);
        assert_eq!(state.left_score, 0);
        state.adjust_score(Side::Right, 3);
        state.adjust_score(Side::Right, -5);
        assert_eq!(state.right_score, 0);
    }

    #[test]
    fn mat_floors_at_one_and_bout_at_zero() {
        let mut state = ScoreboardState::default();
        state.change_mat(-10);
        assert_eq!(state.mat, 1);
        state.change_bout(-1000);
        assert_eq!(state.bout, 0);
        state.change_bout(100);
        assert_eq!(state.bout, 100);
    }

    #[test]
    fn blank_name_restores_default() {
        let mut state = ScoreboardState::default();
        state.set_name(Side::Left, "  Cael  ");
        assert_eq!(state.left_name, "Cael");
        state.set_name(Side::Left, "   ");
        assert_eq!(state.left_name, "Red");
        state.set_name(Side::Right, "");
        assert_eq!(state.right_name, "Green");
    }

    #[test]
    fn set_timer_forces_stopped() {
        let mut state = ScoreboardState {
            timer_running: true,
            ..ScoreboardState::default()
        };
        state.set_timer(120);
        assert_eq!(state.timer_seconds, 120);
        assert!(!state.timer_running);
        assert_eq!(state.formatted_clock(), "02:00");
    }

    #[test]
    fn recorded_entry_captures_board_context() {
        let mut state = ScoreboardState::default();
        state.set_name(Side::Right, "Spencer");
        state.cycle_period(2);
        state.record(EntryEvent::score(Side::Right, "R2", 2), at());

        state.set_name(Side::Right, "Renamed");
        state.cycle_period(1);

        let entry = &state.log[0];
        assert_eq!(entry.side_name, "Spencer");
        assert_eq!(entry.period, Period::Third);
        assert_eq!(entry.bout, 101);
        assert_eq!(entry.entry_type, EntryType::Score);
        assert!(entry.full_title.is_empty());
    }

    #[test]
    fn serializes_period_as_index() {
        let mut state = ScoreboardState::default();
        state.cycle_period(3);
        let value = serde_json::to_value(&state).expect("serialize");
        assert_eq!(value["periodIndex"], 3);
        assert_eq!(value["leftName"], "Red");
        let back: ScoreboardState = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, state);
    }

    #[test]
    fn clock_format_pads_minutes_and_seconds() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(6000), "100:00");
    }
}
