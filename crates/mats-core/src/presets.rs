//! Quick-score and outcome button tables.

use serde::{Deserialize, Serialize};

/// A quick-score button: fixed points applied to the active side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub label: String,
    pub points: i32,
    #[serde(default)]
    pub title: String,
}

/// A bout-ending outcome: logged with its long title and no points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomePreset {
    pub label: String,
    #[serde(default)]
    pub title: String,
}

impl Preset {
    #[must_use]
    pub fn new(label: &str, points: i32, title: &str) -> Self {
        Self {
            label: label.to_string(),
            points,
            title: title.to_string(),
        }
    }
}

impl OutcomePreset {
    #[must_use]
    pub fn new(label: &str, title: &str) -> Self {
        Self {
            label: label.to_string(),
            title: title.to_string(),
        }
    }
}

/// Folkstyle scoring buttons.
#[must_use]
pub fn default_presets() -> Vec<Preset> {
    vec![
        Preset::new("T3", 3, "Takedown"),
        Preset::new("E1", 1, "Escape"),
        Preset::new("R2", 2, "Reversal"),
        Preset::new("NF2", 2, "Near fall"),
        Preset::new("NF3", 3, "Near fall"),
        Preset::new("NF4", 4, "Near fall"),
        Preset::new("P1", 1, "Penalty"),
        Preset::new("P2", 2, "Penalty"),
    ]
}

#[must_use]
pub fn default_outcomes() -> Vec<OutcomePreset> {
    vec![
        OutcomePreset::new("F", "Fall"),
        OutcomePreset::new("TF", "Technical Fall"),
        OutcomePreset::new("MD", "Major Decision"),
        OutcomePreset::new("DEC", "Decision"),
        OutcomePreset::new("FF", "Forfeit"),
        OutcomePreset::new("DQ", "Disqualification"),
        OutcomePreset::new("INJ", "Injury Default"),
    ]
}

/// The configured button tables, looked up by label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetTable {
    presets: Vec<Preset>,
    outcomes: Vec<OutcomePreset>,
}

impl Default for PresetTable {
    fn default() -> Self {
        Self::new(default_presets(), default_outcomes())
    }
}

impl PresetTable {
    #[must_use]
    pub const fn new(presets: Vec<Preset>, outcomes: Vec<OutcomePreset>) -> Self {
        Self { presets, outcomes }
    }

    /// Quick-score preset by label. Labels compare case-insensitively.
    #[must_use]
    pub fn preset(&self, label: &str) -> Option<&Preset> {
        self.presets
            .iter()
            .find(|p| p.label.eq_ignore_ascii_case(label))
    }

    #[must_use]
    pub fn outcome(&self, label: &str) -> Option<&OutcomePreset> {
        self.outcomes
            .iter()
            .find(|o| o.label.eq_ignore_ascii_case(label))
    }

    #[must_use]
    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    #[must_use]
    pub fn outcomes(&self) -> &[OutcomePreset] {
        &self.outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_cover_folkstyle_buttons() {
        let table = PresetTable::default();
        assert_eq!(table.presets().len(), 8);
        assert_eq!(table.outcomes().len(), 7);
        assert_eq!(table.preset("T3").map(|p| p.points), Some(3));
        assert_eq!(table.preset("nf4").map(|p| p.points), Some(4));
        assert_eq!(
            table.outcome("tf").map(|o| o.title.as_str()),
            Some("Technical Fall")
        );
    }

    #[test]
    fn unknown_labels_are_absent() {
        let table = PresetTable::new(vec![Preset::new("T2", 2, "Takedown")], Vec::new());
        assert!(table.preset("T3").is_none());
        assert!(table.outcome("F").is_none());
        assert!(table.preset("t2").is_some());
    }
}
