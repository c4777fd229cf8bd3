//! mats-core library.
//!
//! State model, undo history, timer engine, log normalizer and action
//! dispatcher for a mat-side wrestling scoreboard.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums at module seams, `anyhow::Result` for config loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod export;
pub mod keymap;
pub mod lock;
pub mod model;
pub mod normalize;
pub mod presets;
pub mod session;
pub mod store;
pub mod timer;
pub mod undo;

pub use model::{EntryType, LogEntry, Period, ScoreboardState, Side};
pub use session::{Outcome, Session, SessionError};
