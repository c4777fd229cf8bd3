use crate::output::{OutputMode, pretty_kv, render};
use anyhow::{Context as _, Result};
use clap::Args;
use mats_core::config::{CONFIG_FILE, load_config, write_default_config};
use mats_core::store::{DEFAULT_STATE_KEY, FileStore, save_state};
use serde::Serialize;
use std::path::Path;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config and board with defaults.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct InitReport {
    state_dir: String,
    config: String,
    board: String,
}

/// Execute `mats init`. Creates the state directory:
///
/// ```text
/// <state-dir>/
///   config.toml            (every setting at its default)
///   scoreboardState.json   (fresh board)
/// ```
///
/// # Errors
///
/// Returns an error if `config.toml` already exists and `--force` is not
/// set, or if any filesystem operation fails.
pub fn run_init(args: &InitArgs, state_dir: &Path, output: OutputMode) -> Result<()> {
    if state_dir.join(CONFIG_FILE).exists() && !args.force {
        anyhow::bail!(
            "{} is already initialized. Use `mats init --force` to reset it.",
            state_dir.display()
        );
    }

    let config_path = write_default_config(state_dir)?;
    let config = load_config(state_dir)?;

    let mut store = FileStore::new(state_dir, DEFAULT_STATE_KEY);
    save_state(&mut store, &config.fresh_board())
        .with_context(|| format!("Failed to write fresh board to {}", store.path().display()))?;

    tracing::info!(state_dir = %state_dir.display(), force = args.force, "initialized state directory");

    let report = InitReport {
        state_dir: state_dir.display().to_string(),
        config: config_path.display().to_string(),
        board: store.path().display().to_string(),
    };
    render(output, &report, |r, w| {
        if output.is_pretty() {
            writeln!(w, "✓ Initialized {}", r.state_dir)?;
            pretty_kv(w, "config", &r.config)?;
            pretty_kv(w, "board", &r.board)
        } else {
            writeln!(w, "initialized {}", r.state_dir)
        }
    })
}
