//! Load-time repair of persisted boards.
//!
//! Blobs written by older versions (or edited by hand) may miss fields, carry
//! numbers as strings, or hold values outside the board's invariants. The
//! normalizer walks the raw JSON and produces a valid [`ScoreboardState`] no
//! matter what it is given:
//!
//! | Field | Repair |
//! |---|---|
//! | numeric board fields | lenient parse (`12`, `"12"`, `12.7`), clamp to floor/ceiling, else default |
//! | names | non-blank string, else the default name |
//! | entry `mat` / `bout` | lenient parse and clamp, else the board's current value |
//! | entry `period` | label or numeric index, else the board's current period |
//! | entry `sideName` | present, else the *current* name for that side |
//! | entry `type` | `outcome` only when explicit, else `score` |
//! | entry `at` / `displayTime` | regenerated from the clock when missing |
//!
//! Normalizing an already well-formed blob returns it unchanged and reports
//! no repairs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::clock::display_time;
use crate::model::state::{MIN_BOUT, MIN_MAT};
use crate::model::{EntryType, LogEntry, Period, ScoreboardState, Side};

/// What the normalizer had to change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Repair count per field name (`"mat"`, `"log.sideName"`, ...).
    pub repairs: BTreeMap<&'static str, usize>,
    /// Log entries that were not JSON objects and were discarded.
    pub dropped_entries: usize,
    /// The blob root was not a JSON object; defaults were used wholesale.
    pub replaced_root: bool,
}

impl NormalizeReport {
    /// True when the input was already well-formed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.repairs.is_empty() && self.dropped_entries == 0 && !self.replaced_root
    }

    /// Total number of repaired fields.
    #[must_use]
    pub fn repaired_fields(&self) -> usize {
        self.repairs.values().sum()
    }

    fn note(&mut self, field: &'static str) {
        *self.repairs.entry(field).or_insert(0) += 1;
    }
}

/// Build a valid board from a raw persisted value.
///
/// `base` supplies defaults for missing board fields (normally a fresh board
/// built from config); `now` stamps entries that lost their timestamp.
#[must_use]
pub fn normalize_state(
    raw: &Value,
    base: &ScoreboardState,
    now: DateTime<Utc>,
) -> (ScoreboardState, NormalizeReport) {
    let mut report = NormalizeReport::default();
    let Some(obj) = raw.as_object() else {
        report.replaced_root = true;
        return (base.clone(), report);
    };

    let mut state = ScoreboardState {
        mat: u32_field(obj.get("mat"), MIN_MAT, base.mat, "mat", &mut report),
        bout: u32_field(obj.get("bout"), MIN_BOUT, base.bout, "bout", &mut report),
        period: match lenient_int(obj.get("periodIndex")) {
            None => {
                report.note("periodIndex");
                base.period
            }
            Some(index) => {
                let period = period_at(index);
                let stored = i64::try_from(period.index()).unwrap_or(i64::MAX);
                if !is_plain_int(obj.get("periodIndex"), stored) {
                    report.note("periodIndex");
                }
                period
            }
        },
        left_name: name_or(obj.get("leftName"), &base.left_name, "leftName", &mut report),
        right_name: name_or(obj.get("rightName"), &base.right_name, "rightName", &mut report),
        left_score: u32_field(obj.get("leftScore"), 0, 0, "leftScore", &mut report),
        right_score: u32_field(obj.get("rightScore"), 0, 0, "rightScore", &mut report),
        active_side: side_field(obj.get("activeSide"), "activeSide", &mut report),
        timer_seconds: u32_field(obj.get("timerSeconds"), 0, 0, "timerSeconds", &mut report),
        timer_running: obj
            .get("timerRunning")
            .and_then(Value::as_bool)
            .unwrap_or_else(|| {
                report.note("timerRunning");
                false
            }),
        log: Vec::new(),
    };

    if state.timer_running && state.timer_seconds == 0 {
        report.note("timerRunning");
        state.timer_running = false;
    }

    match obj.get("log") {
        Some(Value::Array(entries)) => {
            let mut log = Vec::with_capacity(entries.len());
            for entry in entries {
                match entry.as_object() {
                    Some(fields) => log.push(normalize_entry(fields, &state, now, &mut report)),
                    None => report.dropped_entries += 1,
                }
            }
            state.log = log;
        }
        _ => report.note("log"),
    }

    (state, report)
}

fn normalize_entry(
    fields: &Map<String, Value>,
    state: &ScoreboardState,
    now: DateTime<Utc>,
    report: &mut NormalizeReport,
) -> LogEntry {
    let at = fields
        .get("at")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map_or_else(
            || {
                report.note("log.at");
                now
            },
            |parsed| parsed.with_timezone(&Utc),
        );

    let display_time = non_blank(fields.get("displayTime")).unwrap_or_else(|| {
        report.note("log.displayTime");
        display_time(at)
    });

    let side = side_field(fields.get("side"), "log.side", report);

    let entry_type = match fields.get("type").and_then(Value::as_str) {
        Some("outcome") => EntryType::Outcome,
        Some("score") => EntryType::Score,
        _ => {
            report.note("log.type");
            EntryType::Score
        }
    };

    LogEntry {
        at,
        display_time,
        mat: u32_field(fields.get("mat"), MIN_MAT, state.mat, "log.mat", report),
        bout: u32_field(fields.get("bout"), MIN_BOUT, state.bout, "log.bout", report),
        period: match entry_period(fields.get("period")) {
            Some((period, canonical)) => {
                if !canonical {
                    report.note("log.period");
                }
                period
            }
            None => {
                report.note("log.period");
                state.period
            }
        },
        side,
        side_name: non_blank(fields.get("sideName")).unwrap_or_else(|| {
            report.note("log.sideName");
            state.name(side).to_string()
        }),
        label: string_or_empty(fields.get("label"), "log.label", report),
        delta: lenient_int(fields.get("delta")).map_or_else(
            || {
                report.note("log.delta");
                0
            },
            |delta| {
                i32::try_from(delta).unwrap_or(if delta < 0 { i32::MIN } else { i32::MAX })
            },
        ),
        entry_type,
        full_title: string_or_empty(fields.get("fullTitle"), "log.fullTitle", report),
    }
}

/// Parse an integer the way a forgiving form field would: JSON integers,
/// finite floats (truncated) and strings that start with an integer.
#[allow(clippy::cast_possible_truncation)]
fn lenient_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < 9.0e18)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => leading_int(s),
        _ => None,
    }
}

fn leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['-', '+']));
    let digits = trimmed[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    trimmed[..sign_len + digits].parse().ok()
}

/// True when `value` is already the JSON integer `expected`.
fn is_plain_int(value: Option<&Value>, expected: i64) -> bool {
    value.and_then(Value::as_i64) == Some(expected)
}

/// Lenient parse clamped to `[floor, u32::MAX]`; `fallback` when unparsable.
/// Anything other than an in-range JSON integer counts as a repair.
fn u32_field(
    value: Option<&Value>,
    floor: u32,
    fallback: u32,
    field: &'static str,
    report: &mut NormalizeReport,
) -> u32 {
    let Some(n) = lenient_int(value) else {
        report.note(field);
        return fallback;
    };
    let clamped = n.clamp(i64::from(floor), i64::from(u32::MAX));
    if !is_plain_int(value, clamped) {
        report.note(field);
    }
    u32::try_from(clamped).unwrap_or(floor)
}

/// Side by name or alias (`"L"`, `"right"`); aliases are rewritten.
fn side_field(value: Option<&Value>, field: &'static str, report: &mut NormalizeReport) -> Side {
    let raw = value.and_then(Value::as_str);
    match raw.and_then(|s| s.parse::<Side>().ok()) {
        Some(side) => {
            if raw != Some(side.as_str()) {
                report.note(field);
            }
            side
        }
        None => {
            report.note(field);
            Side::Left
        }
    }
}

fn period_at(index: i64) -> Period {
    Period::from_index_clamped(usize::try_from(index.max(0)).unwrap_or(usize::MAX))
}

/// Entry period from its label or a numeric index into [`Period::ALL`].
/// The flag is false when the stored form is not the canonical label.
fn entry_period(value: Option<&Value>) -> Option<(Period, bool)> {
    match value? {
        Value::String(s) => s
            .parse::<Period>()
            .ok()
            .map(|period| (period, s == period.as_str())),
        Value::Number(n) => {
            let index = n.as_i64()?;
            Some((period_at(index), false))
        }
        _ => None,
    }
}

fn non_blank(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn name_or(
    value: Option<&Value>,
    fallback: &str,
    field: &'static str,
    report: &mut NormalizeReport,
) -> String {
    non_blank(value).unwrap_or_else(|| {
        report.note(field);
        fallback.to_string()
    })
}

fn string_or_empty(
    value: Option<&Value>,
    field: &'static str,
    report: &mut NormalizeReport,
) -> String {
    if let Some(s) = value.and_then(Value::as_str) {
        s.to_string()
    } else {
        report.note(field);
        String::new()
    }
}
