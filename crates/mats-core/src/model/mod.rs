//! Scoreboard data model: the board record, its log entries and the small
//! enums they are built from.

pub mod entry;
pub mod kinds;
pub mod state;

pub use entry::LogEntry;
pub use kinds::{EntryType, ParseEnumError, Period, Side};
pub use state::{EntryEvent, ScoreboardState, format_clock};
