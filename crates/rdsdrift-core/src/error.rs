// ── Core error types ──
//
// Labelled failures of the resolvers and orchestration. Consumers never
// see `aws` stderr or sqlx errors directly: the `From<rdsdrift_api::Error>`
// impl classifies transport failures into one of the kinds below, and the
// resolvers attach the Source Identity they were working on.

use strum::{Display, EnumString};
use thiserror::Error;

use crate::model::SourceIdentity;

/// The label every core error carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, serde::Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Permission,
    Transient,
    Connection,
    Query,
    Config,
    Internal,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Metadata service ─────────────────────────────────────────────
    #[error("{}not found: {message}", origin_prefix(.origin.as_ref()))]
    NotFound {
        origin: Option<SourceIdentity>,
        message: String,
    },

    #[error("{}permission denied: {message}", origin_prefix(.origin.as_ref()))]
    PermissionDenied {
        origin: Option<SourceIdentity>,
        message: String,
    },

    #[error("{}temporarily unavailable: {message}", origin_prefix(.origin.as_ref()))]
    Transient {
        origin: Option<SourceIdentity>,
        message: String,
    },

    // ── Live connections ─────────────────────────────────────────────
    #[error("{}cannot connect: {message}", origin_prefix(.origin.as_ref()))]
    Connection {
        origin: Option<SourceIdentity>,
        message: String,
    },

    #[error("{}settings query failed: {message}", origin_prefix(.origin.as_ref()))]
    Query {
        origin: Option<SourceIdentity>,
        message: String,
    },

    // ── Setup ────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

fn origin_prefix(origin: Option<&SourceIdentity>) -> String {
    origin.map_or_else(String::new, |o| format!("{o}: "))
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::PermissionDenied { .. } => ErrorKind::Permission,
            Self::Transient { .. } => ErrorKind::Transient,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Query { .. } => ErrorKind::Query,
            Self::Config { .. } => ErrorKind::Config,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The source the failure concerns, when one is known.
    pub fn origin(&self) -> Option<&SourceIdentity> {
        match self {
            Self::NotFound { origin, .. }
            | Self::PermissionDenied { origin, .. }
            | Self::Transient { origin, .. }
            | Self::Connection { origin, .. }
            | Self::Query { origin, .. } => origin.as_ref(),
            Self::Config { .. } | Self::Internal(_) => None,
        }
    }

    /// Attach the Source Identity unless one is already set.
    #[must_use]
    pub fn with_origin(mut self, identity: &SourceIdentity) -> Self {
        match &mut self {
            Self::NotFound { origin, .. }
            | Self::PermissionDenied { origin, .. }
            | Self::Transient { origin, .. }
            | Self::Connection { origin, .. }
            | Self::Query { origin, .. } => {
                if origin.is_none() {
                    *origin = Some(identity.clone());
                }
            }
            Self::Config { .. } | Self::Internal(_) => {}
        }
        self
    }

    /// `Transient` and `Connection` failures may succeed on a later run.
    /// Fleet audits skip such instances instead of aborting.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transient | ErrorKind::Connection)
    }

    pub fn not_found(identity: &SourceIdentity, message: impl Into<String>) -> Self {
        Self::NotFound {
            origin: Some(identity.clone()),
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<rdsdrift_api::Error> for CoreError {
    fn from(err: rdsdrift_api::Error) -> Self {
        use rdsdrift_api::Error as Api;

        if err.is_not_found() {
            return Self::NotFound {
                origin: None,
                message: err.to_string(),
            };
        }
        if err.is_permission_denied() {
            return Self::PermissionDenied {
                origin: None,
                message: err.to_string(),
            };
        }
        if err.is_transient() {
            return Self::Transient {
                origin: None,
                message: err.to_string(),
            };
        }

        match err {
            Api::Spawn { ref program, .. } => Self::Config {
                message: format!(
                    "{err}. Is the AWS CLI installed? Set `aws.program` if `{program}` lives elsewhere"
                ),
            },
            Api::Connect { .. } | Api::InvalidUrl(_) => Self::Connection {
                origin: None,
                message: err.to_string(),
            },
            // Service rejections with an unrecognized code, malformed
            // responses and failed SQL all mean the request itself is bad.
            Api::Query(_) | Api::Aws { .. } | Api::CommandFailed { .. } | Api::Deserialization { .. } => {
                Self::Query {
                    origin: None,
                    message: err.to_string(),
                }
            }
            Api::Timeout { .. } => Self::Transient {
                origin: None,
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aws(code: &str) -> rdsdrift_api::Error {
        rdsdrift_api::Error::Aws {
            code: code.into(),
            operation: "DescribeDBInstances".into(),
            message: "boom".into(),
        }
    }

    #[test]
    fn classifies_transport_errors() {
        assert_eq!(CoreError::from(aws("DBInstanceNotFound")).kind(), ErrorKind::NotFound);
        assert_eq!(CoreError::from(aws("AccessDenied")).kind(), ErrorKind::Permission);
        assert_eq!(CoreError::from(aws("Throttling")).kind(), ErrorKind::Transient);
        assert_eq!(CoreError::from(aws("InvalidParameterValue")).kind(), ErrorKind::Query);
        assert_eq!(
            CoreError::from(rdsdrift_api::Error::Timeout {
                operation: "describe-db-parameters".into(),
                timeout_secs: 60,
            })
            .kind(),
            ErrorKind::Transient
        );
    }

    #[test]
    fn origin_is_attached_once() {
        let first = SourceIdentity::Instance("orders-primary".into());
        let second = SourceIdentity::Template("pg15-orders".into());

        let err = CoreError::from(aws("DBParameterGroupNotFound"))
            .with_origin(&first)
            .with_origin(&second);

        assert_eq!(err.origin(), Some(&first));
        assert!(err.to_string().starts_with("instance:orders-primary: not found"));
    }

    #[test]
    fn only_transient_and_connection_are_retryable() {
        let id = SourceIdentity::Instance("a".into());
        assert!(
            CoreError::Transient {
                origin: None,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(
            CoreError::Connection {
                origin: None,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(!CoreError::not_found(&id, "gone").is_retryable());
        assert!(
            !CoreError::Query {
                origin: None,
                message: String::new()
            }
            .is_retryable()
        );
    }

    #[test]
    fn kind_labels_are_snake_case() {
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
        assert_eq!(ErrorKind::Connection.to_string(), "connection");
    }
}
