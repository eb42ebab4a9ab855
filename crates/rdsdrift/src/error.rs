//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` kinds and `ConfigError` into user-facing errors with
//! help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use rdsdrift_config::ConfigError;
use rdsdrift_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const PERMISSION: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const DRIFT: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Sources ──────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(rdsdrift::not_found),
        help("Run: rdsdrift instances to see available instances")
    )]
    NotFound { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(rdsdrift::permission_denied),
        help(
            "The AWS identity needs rds:DescribeDBInstances and rds:DescribeDBParameters.\n\
             Check the active profile with: aws sts get-caller-identity"
        )
    )]
    PermissionDenied { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(rdsdrift::unavailable),
        help("The service or database did not respond in time; retry shortly.")
    )]
    Unavailable { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(rdsdrift::connection_failed),
        help(
            "Check the URL, network reachability and credentials.\n\
             Store a password with: rdsdrift config set-password <connection>"
        )
    )]
    ConnectionFailed { message: String },

    #[error("{message}")]
    #[diagnostic(code(rdsdrift::query_failed))]
    QueryFailed { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(rdsdrift::setup),
        help("Check the [aws] section of the config: rdsdrift config show")
    )]
    Setup { message: String },

    #[error("Internal error: {message}")]
    #[diagnostic(code(rdsdrift::internal))]
    Internal { message: String },

    // ── Drift ────────────────────────────────────────────────────────
    #[error("Drift detected in {count} setting(s)")]
    #[diagnostic(code(rdsdrift::drift))]
    DriftDetected { count: usize },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(rdsdrift::validation))]
    Validation { field: String, reason: String },

    #[error("Unknown connection '{name}'")]
    #[diagnostic(
        code(rdsdrift::unknown_connection),
        help(
            "Configured connections: {available}\n\
             Add one under [connections.{name}] in {path}, or pass a postgres:// URL."
        )
    )]
    UnknownConnection {
        name: String,
        available: String,
        path: String,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(rdsdrift::config), help("Check the config file: rdsdrift config path"))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(rdsdrift::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::Unavailable { .. } | Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::DriftDetected { .. } => exit_code::DRIFT,
            Self::Validation { .. }
            | Self::UnknownConnection { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Drift is reported through the exit status alone; the table was
    /// already printed.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::DriftDetected { .. })
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::NotFound { .. } => Self::NotFound { message },
            CoreError::PermissionDenied { .. } => Self::PermissionDenied { message },
            CoreError::Transient { .. } => Self::Unavailable { message },
            CoreError::Connection { .. } => Self::ConnectionFailed { message },
            CoreError::Query { .. } => Self::QueryFailed { message },
            CoreError::Config { .. } => Self::Setup { message },
            CoreError::Internal(_) => Self::Internal { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}
