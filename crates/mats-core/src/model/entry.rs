use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kinds::{EntryType, Period, Side};

/// One line of the bout event log.
///
/// Entries capture the board context (mat, bout, period, competitor name) at
/// the moment they were recorded, so later renames or period changes do not
/// rewrite history. Entries are never edited after they are appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub display_time: String,
    pub mat: u32,
    pub bout: u32,
    pub period: Period,
    pub side: Side,
    pub side_name: String,
    pub label: String,
    pub delta: i32,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Long-form description; empty for score entries.
    pub full_title: String,
}

impl LogEntry {
    #[must_use]
    pub const fn is_outcome(&self) -> bool {
        matches!(self.entry_type, EntryType::Outcome)
    }

    /// One-line summary used by the log views, e.g. `101 Period 2 Red: T3 (+3) 3:07pm`.
    #[must_use]
    pub fn summary(&self) -> String {
        let delta = if self.is_outcome() {
            String::new()
        } else if self.delta >= 0 {
            format!(" (+{})", self.delta)
        } else {
            format!(" ({})", self.delta)
        };
        format!(
            "{} Period {} {}: {}{} {}",
            self.bout, self.period, self.side_name, self.label, delta, self.display_time
        )
    }
}
