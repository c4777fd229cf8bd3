use std::fmt;

/// Machine-readable error codes for scripted callers of the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    StateDirUnavailable,
    InvalidTimeInput,
    UnknownAction,
    UnknownPreset,
    StateFileWriteFailed,
    StateFileReadFailed,
    LockContention,
    ExportFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::StateDirUnavailable => "E1002",
            Self::InvalidTimeInput => "E2001",
            Self::UnknownAction => "E2002",
            Self::UnknownPreset => "E2003",
            Self::StateFileWriteFailed => "E5001",
            Self::StateFileReadFailed => "E5002",
            Self::LockContention => "E5003",
            Self::ExportFailed => "E6001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::StateDirUnavailable => "State directory unavailable",
            Self::InvalidTimeInput => "Invalid minutes/seconds",
            Self::UnknownAction => "Unknown action",
            Self::UnknownPreset => "Unknown quick-score or outcome label",
            Self::StateFileWriteFailed => "State file write failed",
            Self::StateFileReadFailed => "State file read failed",
            Self::LockContention => "Lock contention",
            Self::ExportFailed => "Log export failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in config.toml and retry."),
            Self::StateDirUnavailable => {
                Some("Pass --state-dir or set MATS_HOME to a writable directory.")
            }
            Self::InvalidTimeInput => Some("Enter valid minutes and seconds, e.g. 2:00."),
            Self::UnknownAction => Some("Run `mats apply --help` for the action vocabulary."),
            Self::UnknownPreset => Some("Check the [[presets]] and [[outcomes]] tables in config.toml."),
            Self::StateFileWriteFailed => Some("Check disk space and write permissions."),
            Self::StateFileReadFailed => Some("Check read permissions on the state directory."),
            Self::LockContention => Some("Retry after the other `mats` process finishes saving."),
            Self::ExportFailed => Some("Check that the output path is writable."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
