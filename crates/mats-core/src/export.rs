//! Log export as CSV or pretty-printed JSON.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::SecondsFormat;

use crate::error::ErrorCode;
use crate::model::{LogEntry, ParseEnumError};

/// Column order of the CSV export.
pub const CSV_HEADER: [&str; 10] = [
    "at", "mat", "bout", "period", "side", "sideName", "label", "delta", "type", "fullTitle",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// File name used when no output path is given.
    #[must_use]
    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::Csv => "wrestling-log.csv",
            Self::Json => "wrestling-log.json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(ParseEnumError {
                expected: "export format",
                got: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::ExportFailed
    }
}

/// Write the log as CSV. Fields containing commas, quotes or newlines are
/// quoted with embedded quotes doubled.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] when the writer fails.
pub fn write_csv<W: Write>(log: &[LogEntry], writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for entry in log {
        wtr.write_record([
            entry.at.to_rfc3339_opts(SecondsFormat::Millis, true),
            entry.mat.to_string(),
            entry.bout.to_string(),
            entry.period.to_string(),
            entry.side.to_string(),
            entry.side_name.clone(),
            entry.label.clone(),
            entry.delta.to_string(),
            entry.entry_type.to_string(),
            entry.full_title.clone(),
        ])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write the log as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns [`ExportError::Json`] when serialization or the writer fails.
pub fn write_json<W: Write>(log: &[LogEntry], writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, log)?;
    Ok(())
}

/// Render the log into a string in `format`.
///
/// # Errors
///
/// See [`write_csv`] and [`write_json`].
pub fn render(log: &[LogEntry], format: ExportFormat) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    match format {
        ExportFormat::Csv => write_csv(log, &mut buf)?,
        ExportFormat::Json => write_json(log, &mut buf)?,
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write the rendered log to `path`.
///
/// # Errors
///
/// Returns [`ExportError::Io`] when the file cannot be written.
pub fn export_to_path(log: &[LogEntry], format: ExportFormat, path: &Path) -> Result<(), ExportError> {
    let content = render(log, format)?;
    std::fs::write(path, content).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), entries = log.len(), format = %format, "exported log");
    Ok(())
}
