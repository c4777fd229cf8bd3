use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Which competitor an action or log entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Default for Side {
    fn default() -> Self {
        Self::Left
    }
}

impl Side {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// The other competitor.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Name used when a competitor's name is cleared.
    #[must_use]
    pub const fn default_name(self) -> &'static str {
        match self {
            Self::Left => "Red",
            Self::Right => "Green",
        }
    }
}

/// Bout period, in display order.
///
/// Serialized as its display label (`"1"`, `"OT1"`, ...) inside log entries
/// and as a zero-based index (`periodIndex`) on the board itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1")]
    First,
    #[serde(rename = "2")]
    Second,
    #[serde(rename = "3")]
    Third,
    #[serde(rename = "OT1")]
    Overtime1,
    #[serde(rename = "OT2")]
    Overtime2,
}

impl Default for Period {
    fn default() -> Self {
        Self::First
    }
}

impl Period {
    /// All periods in cycling order.
    pub const ALL: [Self; 5] = [
        Self::First,
        Self::Second,
        Self::Third,
        Self::Overtime1,
        Self::Overtime2,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::First => "1",
            Self::Second => "2",
            Self::Third => "3",
            Self::Overtime1 => "OT1",
            Self::Overtime2 => "OT2",
        }
    }

    /// Zero-based position in [`Period::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
            Self::Third => 2,
            Self::Overtime1 => 3,
            Self::Overtime2 => 4,
        }
    }

    /// Period at `index`, clamped into range.
    #[must_use]
    pub const fn from_index_clamped(index: usize) -> Self {
        if index >= Self::ALL.len() {
            Self::ALL[Self::ALL.len() - 1]
        } else {
            Self::ALL[index]
        }
    }

    /// Step forward (`steps > 0`) or backward through the periods, wrapping
    /// at both ends.
    #[must_use]
    pub fn cycled(self, steps: i32) -> Self {
        let len = i64::try_from(Self::ALL.len()).unwrap_or(i64::MAX);
        let current = i64::try_from(self.index()).unwrap_or(0);
        let next = (current + i64::from(steps)).rem_euclid(len);
        Self::from_index_clamped(usize::try_from(next).unwrap_or(0))
    }
}

/// Kind of log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// A point change on one side.
    Score,
    /// A zero-delta bout result marker (fall, forfeit, ...).
    Outcome,
}

impl Default for EntryType {
    fn default() -> Self {
        Self::Score
    }
}

impl EntryType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Score => "score",
            Self::Outcome => "outcome",
        }
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Self::Left),
            "right" | "r" => Ok(Self::Right),
            _ => Err(ParseEnumError {
                expected: "side",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Period {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1" => Ok(Self::First),
            "2" => Ok(Self::Second),
            "3" => Ok(Self::Third),
            "OT1" => Ok(Self::Overtime1),
            "OT2" => Ok(Self::Overtime2),
            _ => Err(ParseEnumError {
                expected: "period",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for EntryType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "score" => Ok(Self::Score),
            "outcome" => Ok(Self::Outcome),
            _ => Err(ParseEnumError {
                expected: "entry type",
                got: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_cycles_forward_with_wraparound() {
        assert_eq!(Period::Overtime2.cycled(1), Period::First);
        assert_eq!(Period::First.cycled(1), Period::Second);
    }

    #[test]
    fn period_cycles_backward_with_wraparound() {
        assert_eq!(Period::First.cycled(-1), Period::Overtime2);
        assert_eq!(Period::Third.cycled(-1), Period::Second);
    }

    #[test]
    fn period_index_round_trips() {
        for (i, period) in Period::ALL.iter().enumerate() {
            assert_eq!(period.index(), i);
            assert_eq!(Period::from_index_clamped(i), *period);
        }
        assert_eq!(Period::from_index_clamped(99), Period::Overtime2);
    }

    #[test]
    fn period_serializes_as_label() {
        let json = serde_json::to_string(&Period::Overtime1).expect("serialize");
        assert_eq!(json, "\"OT1\"");
        let back: Period = serde_json::from_str("\"3\"").expect("deserialize");
        assert_eq!(back, Period::Third);
    }

    #[test]
    fn side_parse_accepts_short_forms() {
        assert_eq!("L".parse::<Side>(), Ok(Side::Left));
        assert_eq!(" right ".parse::<Side>(), Ok(Side::Right));
        let err = "middle".parse::<Side>().expect_err("must fail");
        assert_eq!(err.to_string(), "invalid side: 'middle'");
    }

    #[test]
    fn default_names_match_singlet_colors() {
        assert_eq!(Side::Left.default_name(), "Red");
        assert_eq!(Side::Right.default_name(), "Green");
        assert_eq!(Side::Left.opposite(), Side::Right);
    }
}
