//! `mats export`: write the log as CSV or JSON.

use crate::cmd::Context;
use crate::output::render;
use anyhow::Result;
use clap::Args;
use mats_core::export::{self, ExportFormat};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export format: csv or json.
    #[arg(default_value_t = ExportFormat::Csv, value_name = "FORMAT")]
    pub log_format: ExportFormat,

    /// Destination file, or `-` for stdout. Defaults to
    /// `wrestling-log.csv` / `wrestling-log.json` in the working directory.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ExportReport {
    path: String,
    format: &'static str,
    entries: usize,
}

impl ExportArgs {
    fn destination(&self) -> Option<PathBuf> {
        match &self.output {
            Some(path) if path.as_os_str() == "-" => None,
            Some(path) => Some(path.clone()),
            None => Some(PathBuf::from(self.log_format.default_file_name())),
        }
    }
}

/// Execute `mats export`.
///
/// # Errors
///
/// Returns an error if the board cannot be read or the export cannot be
/// written.
pub fn run_export(args: &ExportArgs, ctx: &Context) -> Result<()> {
    let session = ctx.open_session()?;
    let log = &session.state().log;

    let Some(path) = args.destination() else {
        let content = export::render(log, args.log_format)?;
        let mut out = std::io::stdout().lock();
        out.write_all(content.as_bytes())?;
        if !content.ends_with('\n') {
            writeln!(out)?;
        }
        return Ok(());
    };

    export::export_to_path(log, args.log_format, &path)?;
    let report = ExportReport {
        path: path.display().to_string(),
        format: args.log_format.as_str(),
        entries: log.len(),
    };
    render(ctx.output, &report, |r, w| {
        writeln!(w, "✓ Exported {} entries to {}", r.entries, r.path)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(format: ExportFormat, output: Option<&str>) -> ExportArgs {
        ExportArgs {
            log_format: format,
            output: output.map(PathBuf::from),
        }
    }

    #[test]
    fn default_destination_follows_format() {
        assert_eq!(
            args(ExportFormat::Json, None).destination(),
            Some(PathBuf::from("wrestling-log.json"))
        );
        assert_eq!(
            args(ExportFormat::Csv, Some("out/log.csv")).destination(),
            Some(PathBuf::from("out/log.csv"))
        );
    }

    #[test]
    fn dash_means_stdout() {
        assert_eq!(args(ExportFormat::Csv, Some("-")).destination(), None);
    }
}
