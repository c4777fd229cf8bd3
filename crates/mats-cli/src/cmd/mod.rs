//! Subcommand handlers for `mats`.

pub mod apply;
pub mod completions;
pub mod export;
pub mod init;
pub mod log;
pub mod show;
pub mod timer;

use crate::output::OutputMode;
use anyhow::{Context as _, Result};
use mats_core::clock::SystemClock;
use mats_core::config::{MatsConfig, load_config};
use mats_core::store::{DEFAULT_STATE_KEY, FileStore};
use mats_core::Session;
use std::path::PathBuf;

/// A board session backed by the state directory.
pub type BoardSession = Session<FileStore, SystemClock>;

/// Everything a command needs: where the board lives, its config, and how
/// to print.
#[derive(Debug)]
pub struct Context {
    pub state_dir: PathBuf,
    pub config: MatsConfig,
    pub output: OutputMode,
}

impl Context {
    /// Load `config.toml` from `state_dir` (defaults when absent).
    ///
    /// # Errors
    ///
    /// Returns an error when the config exists but cannot be parsed.
    pub fn load(state_dir: PathBuf, output: OutputMode) -> Result<Self> {
        let config = load_config(&state_dir)?;
        tracing::debug!(state_dir = %state_dir.display(), "loaded config");
        Ok(Self {
            state_dir,
            config,
            output,
        })
    }

    pub fn store(&self) -> FileStore {
        FileStore::new(&self.state_dir, DEFAULT_STATE_KEY)
    }

    /// Open the saved board, repairing it as needed.
    ///
    /// # Errors
    ///
    /// Returns an error when the saved board cannot be read.
    pub fn open_session(&self) -> Result<BoardSession> {
        Session::open(self.store(), SystemClock::new(), &self.config)
            .with_context(|| format!("Failed to open board in {}", self.state_dir.display()))
    }
}
