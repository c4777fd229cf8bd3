use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::ScoreboardState;
use crate::model::state::{DEFAULT_BOUT, DEFAULT_MAT, MIN_MAT};
use crate::presets::{OutcomePreset, Preset, PresetTable, default_outcomes, default_presets};
use crate::timer::DEFAULT_POLL_INTERVAL;
use crate::undo::DEFAULT_MAX_UNDO_STEPS;

/// File name of the config inside the state directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Directory name used under the working directory and the data dir.
pub const STATE_DIR_NAME: &str = "mats";

/// No `--state-dir`, `MATS_HOME`, `./.mats` or platform data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no state directory: pass --state-dir or set MATS_HOME")]
pub struct StateDirUnavailable;

impl StateDirUnavailable {
    #[must_use]
    pub const fn code(self) -> crate::error::ErrorCode {
        crate::error::ErrorCode::StateDirUnavailable
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatsConfig {
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default = "default_presets")]
    pub presets: Vec<Preset>,
    #[serde(default = "default_outcomes")]
    pub outcomes: Vec<OutcomePreset>,
}

impl Default for MatsConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            timer: TimerConfig::default(),
            history: HistoryConfig::default(),
            input: InputConfig::default(),
            presets: default_presets(),
            outcomes: default_outcomes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_left_name")]
    pub left_name: String,
    #[serde(default = "default_right_name")]
    pub right_name: String,
    #[serde(default = "default_mat")]
    pub mat: u32,
    #[serde(default = "default_bout")]
    pub bout: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            left_name: default_left_name(),
            right_name: default_right_name(),
            mat: default_mat(),
            bout: default_bout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Minutes pre-filled when setting the clock from the live board.
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            default_minutes: default_minutes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_max_undo_steps")]
    pub max_undo_steps: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_undo_steps: default_max_undo_steps(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl MatsConfig {
    /// A fresh board seeded from `[board]`. Invalid values are clamped the
    /// same way the board's own mutators clamp.
    #[must_use]
    pub fn fresh_board(&self) -> ScoreboardState {
        let mut state = ScoreboardState {
            mat: self.board.mat.max(MIN_MAT),
            bout: self.board.bout,
            ..ScoreboardState::default()
        };
        state.set_name(crate::model::Side::Left, &self.board.left_name);
        state.set_name(crate::model::Side::Right, &self.board.right_name);
        state
    }

    #[must_use]
    pub fn preset_table(&self) -> PresetTable {
        PresetTable::new(self.presets.clone(), self.outcomes.clone())
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.timer.poll_interval_ms)
    }

    #[must_use]
    pub const fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.input.debounce_ms)
    }

    #[must_use]
    pub const fn undo_capacity(&self) -> usize {
        self.history.max_undo_steps
    }
}

/// Load `config.toml` from the state directory, or defaults when absent.
///
/// # Errors
///
/// Returns an error when the file exists but cannot be read or parsed.
pub fn load_config(state_dir: &Path) -> Result<MatsConfig> {
    let path = state_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(MatsConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<MatsConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write the default config to the state directory.
///
/// # Errors
///
/// Returns an error when the directory or file cannot be written.
pub fn write_default_config(state_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(state_dir)
        .with_context(|| format!("Failed to create {}", state_dir.display()))?;
    let path = state_dir.join(CONFIG_FILE);
    let content =
        toml::to_string_pretty(&MatsConfig::default()).context("Failed to render default config")?;
    std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Resolve the state directory: `--state-dir`, then `MATS_HOME`, then
/// `./.mats` if it exists, then the platform data directory.
///
/// # Errors
///
/// Returns an error when no candidate is available.
pub fn resolve_state_dir(cli_dir: Option<&Path>) -> Result<PathBuf> {
    let env_home = std::env::var_os("MATS_HOME").map(PathBuf::from);
    let cwd = std::env::current_dir().ok();
    resolve_state_dir_inner(cli_dir, env_home, cwd.as_deref(), dirs::data_dir())
}

fn resolve_state_dir_inner(
    cli_dir: Option<&Path>,
    env_home: Option<PathBuf>,
    cwd: Option<&Path>,
    data_dir: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(dir) = cli_dir {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env_home.filter(|d| !d.as_os_str().is_empty()) {
        return Ok(dir);
    }
    if let Some(local) = cwd.map(|c| c.join(format!(".{STATE_DIR_NAME}")))
        && local.is_dir()
    {
        return Ok(local);
    }
    data_dir
        .map(|d| d.join(STATE_DIR_NAME))
        .ok_or_else(|| StateDirUnavailable.into())
}

fn default_left_name() -> String {
    crate::model::Side::Left.default_name().to_string()
}

fn default_right_name() -> String {
    crate::model::Side::Right.default_name().to_string()
}

const fn default_mat() -> u32 {
    DEFAULT_MAT
}

const fn default_bout() -> u32 {
    DEFAULT_BOUT
}

#[allow(clippy::cast_possible_truncation)]
const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

const fn default_minutes() -> u32 {
    2
}

const fn default_max_undo_steps() -> usize {
    DEFAULT_MAX_UNDO_STEPS
}

const fn default_debounce_ms() -> u64 {
    150
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let cfg = load_config(dir.path())?;
        assert_eq!(cfg.timer.poll_interval_ms, 250);
        assert_eq!(cfg.history.max_undo_steps, 50);
        assert_eq!(cfg.input.debounce_ms, 150);
        assert_eq!(cfg.presets.len(), 8);
        assert_eq!(cfg.outcomes.len(), 7);
        assert_eq!(cfg.fresh_board(), ScoreboardState::default());
        Ok(())
    }

    #[test]
    fn partial_config_keeps_other_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
[board]
left_name = "Blue"
mat = 0

[input]
debounce_ms = 300

[[presets]]
label = "T2"
points = 2
title = "Takedown"
"#,
        )?;

        let cfg = load_config(dir.path())?;
        let board = cfg.fresh_board();
        assert_eq!(board.left_name, "Blue");
        assert_eq!(board.right_name, "Green");
        assert_eq!(board.mat, 1);
        assert_eq!(cfg.debounce_window(), Duration::from_millis(300));
        assert_eq!(cfg.poll_interval(), Duration::from_millis(250));
        assert!(cfg.preset_table().preset("T2").is_some());
        assert!(cfg.preset_table().preset("T3").is_none());
        assert_eq!(cfg.outcomes.len(), 7);
        Ok(())
    }

    #[test]
    fn malformed_config_reports_path() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join(CONFIG_FILE), "[board\nmat = ")?;
        let err = load_config(dir.path()).expect_err("parse must fail");
        assert!(format!("{err:#}").contains(CONFIG_FILE));
        Ok(())
    }

    #[test]
    fn default_config_round_trips() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_default_config(dir.path())?;
        assert!(path.exists());
        assert_eq!(load_config(dir.path())?, MatsConfig::default());
        Ok(())
    }

    #[test]
    fn state_dir_precedence() -> Result<()> {
        let cwd = tempfile::tempdir()?;
        let cli = PathBuf::from("/tmp/cli");
        let env = PathBuf::from("/tmp/env");
        let data = PathBuf::from("/tmp/data");

        let resolved = resolve_state_dir_inner(
            Some(&cli),
            Some(env.clone()),
            Some(cwd.path()),
            Some(data.clone()),
        )?;
        assert_eq!(resolved, cli);

        let resolved =
            resolve_state_dir_inner(None, Some(env.clone()), Some(cwd.path()), Some(data.clone()))?;
        assert_eq!(resolved, env);

        let resolved =
            resolve_state_dir_inner(None, None, Some(cwd.path()), Some(data.clone()))?;
        assert_eq!(resolved, data.join("mats"));

        std::fs::create_dir(cwd.path().join(".mats"))?;
        let resolved = resolve_state_dir_inner(None, None, Some(cwd.path()), Some(data))?;
        assert_eq!(resolved, cwd.path().join(".mats"));

        let err = resolve_state_dir_inner(None, None, None, None).expect_err("no candidates");
        assert!(err.downcast_ref::<StateDirUnavailable>().is_some());
        Ok(())
    }
}
