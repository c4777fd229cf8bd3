//! Keyboard shortcuts for the live board.
//!
//! | Key | Action |
//! |---|---|
//! | space | start/stop timer |
//! | `u` | undo |
//! | `a` | switch active side |
//! | `t` `r` | T3, R2 |
//! | `1` `2` `3` `4` | E1, NF2, NF3, NF4 |
//! | `p` / shift-`p` | P1 / P2 |
//! | `+` `=` / `-` | manual +1 / -1 on the active side |

use crate::dispatch::Action;
use crate::model::ScoreboardState;
use crate::presets::PresetTable;

/// A key press reduced to what the shortcut layer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub ch: char,
    pub shift: bool,
}

impl KeyPress {
    #[must_use]
    pub const fn plain(ch: char) -> Self {
        Self { ch, shift: false }
    }

    #[must_use]
    pub const fn shifted(ch: char) -> Self {
        Self { ch, shift: true }
    }
}

/// Resolve a key press to an action. Preset shortcuts go through `presets`
/// and yield nothing when the label is not configured.
#[must_use]
pub fn action_for_key(
    key: KeyPress,
    state: &ScoreboardState,
    presets: &PresetTable,
) -> Option<Action> {
    let quick = |label: &str| {
        presets.preset(label).map(|preset| Action::QuickScore {
            label: preset.label.clone(),
            points: preset.points,
        })
    };
    let manual = |delta| {
        Some(Action::ManualScore {
            side: state.active_side,
            delta,
        })
    };

    match key.ch.to_ascii_lowercase() {
        ' ' => Some(Action::ToggleTimer),
        'u' => Some(Action::Undo),
        'a' => Some(Action::ToggleActiveSide),
        't' => quick("T3"),
        'r' => quick("R2"),
        '1' => quick("E1"),
        '2' => quick("NF2"),
        '3' => quick("NF3"),
        '4' => quick("NF4"),
        'p' if key.shift => quick("P2"),
        'p' => quick("P1"),
        '+' | '=' => manual(1),
        '-' => manual(-1),
        _ => None,
    }
}
