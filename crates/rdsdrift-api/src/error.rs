use thiserror::Error;

/// AWS error codes meaning the requested instance or parameter group does not exist.
const NOT_FOUND_CODES: &[&str] = &[
    "DBInstanceNotFound",
    "DBInstanceNotFoundFault",
    "DBParameterGroupNotFound",
    "DBParameterGroupNotFoundFault",
];

/// AWS error codes meaning the caller's credentials were rejected or lack access.
const PERMISSION_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "UnauthorizedOperation",
    "UnrecognizedClientException",
    "InvalidClientTokenId",
    "ExpiredToken",
    "ExpiredTokenException",
    "SignatureDoesNotMatch",
    "AuthFailure",
];

/// AWS error codes worth retrying later (throttling, service hiccups).
const TRANSIENT_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "TooManyRequestsException",
    "ServiceUnavailable",
    "InternalFailure",
    "RequestTimeout",
];

/// Top-level error type for the `rdsdrift-api` crate.
///
/// Covers every failure mode of both backing services: the RDS metadata
/// API (reached through the `aws` command line) and the PostgreSQL
/// runtime settings view. `rdsdrift-core` classifies these into labelled
/// error kinds.
#[derive(Debug, Error)]
pub enum Error {
    // ── AWS command line ────────────────────────────────────────────
    /// The `aws` program could not be started at all.
    #[error("Failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An `aws rds` invocation did not finish in time.
    #[error("`aws rds {operation}` timed out after {timeout_secs}s")]
    Timeout {
        operation: String,
        timeout_secs: u64,
    },

    /// Structured service error, parsed from the CLI's stderr
    /// (`An error occurred (CODE) when calling the OP operation: MESSAGE`).
    #[error("AWS error {code} during {operation}: {message}")]
    Aws {
        code: String,
        operation: String,
        message: String,
    },

    /// The CLI failed without a recognizable service error
    /// (endpoint unreachable, missing credentials, bad arguments).
    #[error("`aws rds {operation}` exited with status {status}: {stderr}")]
    CommandFailed {
        operation: String,
        status: i32,
        stderr: String,
    },

    // ── PostgreSQL ──────────────────────────────────────────────────
    /// Connecting or authenticating to a live database failed.
    #[error("Cannot connect to {url}: {source}")]
    Connect {
        /// Connection URL with the password redacted.
        url: String,
        #[source]
        source: sqlx::Error,
    },

    /// The `pg_settings` query itself failed.
    #[error("Runtime settings query failed: {0}")]
    Query(#[source] sqlx::Error),

    /// Connection URL parsing error.
    #[error("Invalid connection URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Aws { code, .. } => TRANSIENT_CODES.contains(&code.as_str()),
            Self::CommandFailed { stderr, .. } => {
                stderr.contains("Could not connect to the endpoint URL")
                    || stderr.contains("Connect timeout")
                    || stderr.contains("Read timeout")
            }
            _ => false,
        }
    }

    /// Returns `true` if the requested instance or parameter group does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Aws { code, .. } if NOT_FOUND_CODES.contains(&code.as_str()))
    }

    /// Returns `true` if the credentials in use were rejected or lack access.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Aws { code, .. } => PERMISSION_CODES.contains(&code.as_str()),
            Self::CommandFailed { stderr, .. } => stderr.contains("Unable to locate credentials"),
            _ => false,
        }
    }

    /// Extract the AWS error code, if available.
    pub fn aws_error_code(&self) -> Option<&str> {
        match self {
            Self::Aws { code, .. } => Some(code),
            _ => None,
        }
    }
}
