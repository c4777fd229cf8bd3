//! `mats log`: list bout log entries, newest first.

use crate::cmd::Context;
use crate::output::{Renderable, render_list};
use clap::Args;
use mats_core::LogEntry;
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct LogArgs {
    /// Show at most this many entries.
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

/// One log entry as listed by `mats log`.
#[derive(Debug)]
pub struct LogRow<'a>(pub &'a LogEntry);

impl Renderable for LogRow<'_> {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{}", self.0.summary())?;
        if !self.0.full_title.is_empty() {
            writeln!(w, "    {}", self.0.full_title)?;
        }
        Ok(())
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, self.0).map_err(io::Error::other)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        let e = self.0;
        writeln!(
            w,
            "{}  {}  {}  {}  {}  {}  {:+}  {}",
            e.display_time, e.mat, e.bout, e.period.as_str(), e.side, e.label, e.delta, e.entry_type
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["TIME", "MAT", "BOUT", "PERIOD", "SIDE", "LABEL", "DELTA", "TYPE"]
    }
}

/// Newest-first view of `log`, truncated to `limit`.
pub fn newest_first(log: &[LogEntry], limit: Option<usize>) -> Vec<LogRow<'_>> {
    log.iter()
        .rev()
        .take(limit.unwrap_or(usize::MAX))
        .map(LogRow)
        .collect()
}

/// Execute `mats log`.
///
/// # Errors
///
/// Returns an error if the board cannot be read or output fails.
pub fn run_log(args: &LogArgs, ctx: &Context) -> anyhow::Result<()> {
    let session = ctx.open_session()?;
    let rows = newest_first(&session.state().log, args.limit);
    if rows.is_empty() && ctx.output.is_pretty() {
        println!("No log entries yet.");
        return Ok(());
    }
    render_list(&rows, ctx.output)?;
    Ok(())
}
