//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for a person at the scorer's table, compact
//! text for scripts, or stable JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / hidden `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use clap::ValueEnum;
use mats_core::config::StateDirUnavailable;
use mats_core::dispatch::ActionParseError;
use mats_core::error::ErrorCode;
use mats_core::export::ExportError;
use mats_core::store::StoreError;
use mats_core::timer::TimeInputError;
use mats_core::SessionError;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 48;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<10} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, visual framing).
    Pretty,
    /// Token-efficient plain text for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Returns `true` if pretty output was requested.
    pub const fn is_pretty(self) -> bool {
        matches!(self, Self::Pretty)
    }
}

/// Core resolution logic, separated from I/O for testability.
fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }

    if json_flag {
        return OutputMode::Json;
    }

    if let Some(val) = format_env {
        match val.to_lowercase().as_str() {
            "json" => return OutputMode::Json,
            "text" => return OutputMode::Text,
            "pretty" => return OutputMode::Pretty,
            _ => {} // unknown value: fall through to TTY detection
        }
    }

    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Resolve the output mode from CLI flags, environment, and TTY defaults.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, json_flag: bool) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(format_flag, json_flag, env_val.as_deref(), is_tty)
}

/// Trait implemented by any CLI result type that can be rendered in all modes.
///
/// `render_table` is the text-mode row; [`table_headers`] names its columns.
///
/// [`table_headers`]: Renderable::table_headers
pub trait Renderable {
    /// Render for human consumption.
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Render as a self-contained JSON value.
    fn render_json(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Render as a single text row (no header; see [`table_headers`]).
    ///
    /// [`table_headers`]: Renderable::table_headers
    fn render_table(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Column headers for text mode. Default: none.
    fn table_headers() -> &'static [&'static str]
    where
        Self: Sized,
    {
        &[]
    }
}

/// Render a single [`Renderable`] item to stdout using the given output mode.
pub fn render_item<R: Renderable>(item: &R, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_item(&mut out, item, mode)
}

fn write_item<R: Renderable>(out: &mut dyn Write, item: &R, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Pretty => item.render_human(out),
        OutputMode::Text => item.render_table(out),
        OutputMode::Json => {
            item.render_json(out)?;
            writeln!(out)
        }
    }
}

/// Render a list of [`Renderable`] items to stdout.
///
/// - In JSON mode, wraps items in a JSON array.
/// - In pretty/text mode, renders items sequentially.
pub fn render_list<R: Renderable>(items: &[R], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_list(&mut out, items, mode)
}

fn write_list<R: Renderable>(out: &mut dyn Write, items: &[R], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Pretty => {
            for item in items {
                item.render_human(out)?;
            }
        }
        OutputMode::Text => {
            let headers = if items.is_empty() {
                &[] as &[&str]
            } else {
                R::table_headers()
            };
            if !headers.is_empty() {
                writeln!(out, "{}", headers.join("  "))?;
            }
            for item in items {
                item.render_table(out)?;
            }
        }
        OutputMode::Json => {
            write!(out, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(out, ",")?;
                }
                writeln!(out)?;
                let mut buf = Vec::new();
                item.render_json(&mut buf)?;
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                }
                out.write_all(&buf)?;
            }
            if items.is_empty() {
                writeln!(out, "]")?;
            } else {
                writeln!(out, "\n]")?;
            }
        }
    }
    Ok(())
}

/// Render a serializable value to stdout in the requested format.
///
/// In JSON mode, the value is serialized with `serde_json`. In pretty/text mode,
/// the provided `human_fn` closure is called to produce text output.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            human_fn(value, &mut out)?;
        }
    }
    Ok(())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "E2002").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Create a simple error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    fn with_code(message: String, code: ErrorCode) -> Self {
        Self {
            message,
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

/// Find the most specific [`ErrorCode`] in an error chain.
fn error_code_of(err: &anyhow::Error) -> Option<ErrorCode> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<SessionError>() {
            Some(e.code())
        } else if let Some(e) = cause.downcast_ref::<StoreError>() {
            Some(e.code())
        } else if let Some(e) = cause.downcast_ref::<ActionParseError>() {
            Some(e.code())
        } else if let Some(e) = cause.downcast_ref::<ExportError>() {
            Some(e.code())
        } else if cause.downcast_ref::<TimeInputError>().is_some() {
            Some(ErrorCode::InvalidTimeInput)
        } else if let Some(e) = cause.downcast_ref::<StateDirUnavailable>() {
            Some(e.code())
        } else if cause.downcast_ref::<toml::de::Error>().is_some() {
            Some(ErrorCode::ConfigParseError)
        } else {
            None
        }
    })
}

/// Convert a command failure into a [`CliError`], keeping its context chain.
impl From<&anyhow::Error> for CliError {
    fn from(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");
        match error_code_of(err) {
            Some(code) => Self::with_code(message, code),
            None => Self::new(message),
        }
    }
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            match error.error_code {
                Some(ref code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn resolve_format_flag_wins_over_json_and_env() {
        let mode = resolve_output_mode_inner(Some(OutputMode::Text), true, Some("pretty"), true);
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn resolve_json_flag_wins_over_env() {
        let mode = resolve_output_mode_inner(None, true, Some("pretty"), true);
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn resolve_format_env_case_insensitive() {
        let mode = resolve_output_mode_inner(None, false, Some("TEXT"), true);
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn resolve_format_env_unknown_falls_through_to_tty() {
        let mode_tty = resolve_output_mode_inner(None, false, Some("fancy"), true);
        assert_eq!(mode_tty, OutputMode::Pretty);
        let mode_pipe = resolve_output_mode_inner(None, false, Some("fancy"), false);
        assert_eq!(mode_pipe, OutputMode::Text);
    }

    struct Row {
        label: &'static str,
        delta: i32,
    }

    impl Renderable for Row {
        fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
            writeln!(w, "{} ({:+})", self.label, self.delta)
        }

        fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
            write!(w, "{{\"label\":\"{}\",\"delta\":{}}}", self.label, self.delta)
        }

        fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
            writeln!(w, "{}  {}", self.label, self.delta)
        }

        fn table_headers() -> &'static [&'static str] {
            &["LABEL", "DELTA"]
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                label: "T3",
                delta: 3,
            },
            Row {
                label: "E1",
                delta: 1,
            },
        ]
    }

    fn list_to_string(items: &[Row], mode: OutputMode) -> String {
        let mut buf = Vec::new();
        write_list(&mut buf, items, mode).expect("write to vec");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn text_list_has_header_row() {
        let text = list_to_string(&rows(), OutputMode::Text);
        assert_eq!(text, "LABEL  DELTA\nT3  3\nE1  1\n");
    }

    #[test]
    fn json_list_is_valid_array() {
        let json = list_to_string(&rows(), OutputMode::Json);
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(value.as_array().map(Vec::len), Some(2));
        assert_eq!(value[0]["label"], "T3");

        let empty = list_to_string(&[], OutputMode::Json);
        let value: serde_json::Value = serde_json::from_str(&empty).expect("valid JSON");
        assert_eq!(value, serde_json::json!([]));
    }

    #[test]
    fn json_item_ends_with_newline() {
        let mut buf = Vec::new();
        write_item(&mut buf, &rows()[0], OutputMode::Json).expect("write");
        assert!(buf.ends_with(b"}\n"));
        assert!(!buf.ends_with(b"\n\n"));
    }

    #[test]
    fn cli_error_picks_up_code_through_context() {
        let err = anyhow::Error::from(ActionParseError::Unknown("fly".into()))
            .context("while parsing actions");
        let cli = CliError::from(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E2002"));
        assert!(cli.message.contains("unknown action 'fly'"));
        assert!(cli.suggestion.is_some());
    }

    #[test]
    fn missing_state_dir_maps_to_e1002() {
        let err = anyhow::Error::from(StateDirUnavailable);
        let cli = CliError::from(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E1002"));
        assert!(cli.message.contains("MATS_HOME"));
    }

    #[test]
    fn cli_error_without_code_is_plain() {
        let err: anyhow::Result<()> = Err(anyhow::anyhow!("boom")).context("outer");
        let cli = CliError::from(&err.expect_err("error"));
        assert!(cli.error_code.is_none());
        assert_eq!(cli.message, "outer: boom");
    }

    #[test]
    fn render_error_modes_do_not_fail() {
        let err = CliError::new("bad input");
        assert!(render_error(OutputMode::Json, &err).is_ok());
        assert!(render_error(OutputMode::Text, &err).is_ok());
    }
}
