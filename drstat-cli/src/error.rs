//! CLI-specific error types and exit code mapping

use drstat_core::error::DrstatError;
use drstat_log_scan::LogScanError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// A scan violated the extraction contract (duplicate key write).
    #[error("scan error: {0}")]
    Scan(String),

    /// Invalid rule or profile definition.
    #[error("profile error: {0}")]
    Profile(String),

    /// An input log could not be read.
    #[error("input error: {0}")]
    Input(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from drstat-core.
    #[error("{0}")]
    Core(#[from] DrstatError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                       |
    /// |------|-------------------------------|
    /// | 0    | Success                       |
    /// | 1    | General / command / scan error |
    /// | 2    | Configuration error           |
    /// | 3    | Rule or profile error         |
    /// | 10   | IO error                      |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Profile(_) => 3,
            Self::Input(_) | Self::Io(_) => 10,
            Self::Command(_) | Self::Scan(_) | Self::JsonSerialize(_) => 1,
            Self::Core(err) => match err {
                DrstatError::Config(_) => 2,
                DrstatError::Io(_) => 10,
            },
        }
    }
}

impl From<LogScanError> for CliError {
    fn from(e: LogScanError) -> Self {
        match e {
            LogScanError::DuplicateKey { .. } => Self::Scan(e.to_string()),
            LogScanError::Read { .. } | LogScanError::Io(_) => Self::Input(e.to_string()),
            LogScanError::RuleValidation { .. }
            | LogScanError::ProfileValidation { .. }
            | LogScanError::ProfileLoad { .. } => Self::Profile(e.to_string()),
        }
    }
}
