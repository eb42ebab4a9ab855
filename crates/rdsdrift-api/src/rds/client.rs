// RDS metadata client
//
// Drives `aws rds <operation> --output json` as a child process, parses
// the JSON document on stdout, and turns the CLI's stderr into structured
// errors. Endpoint modules (instances, parameters) are implemented as
// inherent methods in separate files to keep this one about process
// mechanics and pagination.

use tokio::time::timeout;
use tracing::{debug, trace};

use crate::error::Error;
use crate::rds::models::Page;
use crate::transport::AwsCliConfig;

/// Raw client for the RDS metadata API.
///
/// Each call spawns one `aws` process per page. Pagination is done with
/// `--max-items` / `--starting-token`, and results are returned fully
/// materialized.
#[derive(Debug, Clone)]
pub struct RdsClient {
    config: AwsCliConfig,
}

impl RdsClient {
    pub fn new(config: AwsCliConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AwsCliConfig {
        &self.config
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Run one `aws rds` invocation and deserialize its stdout.
    pub(crate) async fn invoke<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        args: &[String],
    ) -> Result<T, Error> {
        let mut cmd = self.config.rds_command(operation);
        cmd.args(args);
        debug!(operation, ?args, "aws rds");

        let output = timeout(self.config.timeout, cmd.output())
            .await
            .map_err(|_| Error::Timeout {
                operation: operation.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            })?
            .map_err(|source| Error::Spawn {
                program: self.config.program().to_owned(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
            return Err(parse_cli_error(
                operation,
                output.status.code().unwrap_or(-1),
                &stderr,
            ));
        }

        let body = String::from_utf8_lossy(&output.stdout);
        trace!(operation, bytes = body.len(), "aws rds response");
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone().into_owned(),
            }
        })
    }

    /// Follow `NextToken` until the result set is exhausted.
    pub(crate) async fn paginate<P: Page>(
        &self,
        operation: &str,
        args: &[String],
    ) -> Result<Vec<P::Item>, Error> {
        let mut items = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0_u32;

        loop {
            let mut page_args = args.to_vec();
            page_args.push("--max-items".into());
            page_args.push(self.config.page_size.to_string());
            if let Some(ref t) = token {
                page_args.push("--starting-token".into());
                page_args.push(t.clone());
            }

            let page: P = self.invoke(operation, &page_args).await?;
            let (mut batch, next) = page.into_parts();
            pages += 1;
            items.append(&mut batch);

            match next {
                Some(t) if !t.is_empty() => token = Some(t),
                _ => break,
            }
        }

        debug!(operation, pages, items = items.len(), "pagination complete");
        Ok(items)
    }
}

/// Turn a failed CLI run into an [`Error`].
///
/// Service errors follow a fixed shape on stderr:
/// `An error occurred (CODE) when calling the OPERATION operation: MESSAGE`.
/// Anything else is kept verbatim as `CommandFailed`.
pub(crate) fn parse_cli_error(operation: &str, status: i32, stderr: &str) -> Error {
    const MARKER: &str = "An error occurred (";

    let Some(start) = stderr.find(MARKER) else {
        return Error::CommandFailed {
            operation: operation.to_owned(),
            status,
            stderr: stderr.to_owned(),
        };
    };
    let rest = &stderr[start + MARKER.len()..];
    let Some(code_end) = rest.find(')') else {
        return Error::CommandFailed {
            operation: operation.to_owned(),
            status,
            stderr: stderr.to_owned(),
        };
    };

    let code = rest[..code_end].to_owned();
    let tail = &rest[code_end + 1..];
    let api_operation = tail
        .split_whitespace()
        .skip_while(|w| *w != "the")
        .nth(1)
        .unwrap_or(operation)
        .to_owned();
    let message = tail
        .split_once("operation")
        .map(|(_, m)| m.trim_start_matches([':', ' ']))
        .unwrap_or(tail)
        .trim()
        .to_owned();

    Error::Aws {
        code,
        operation: api_operation,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_error() {
        let err = parse_cli_error(
            "describe-db-instances",
            254,
            "\nAn error occurred (DBInstanceNotFound) when calling the DescribeDBInstances operation: DBInstance missing-db not found.",
        );
        match err {
            Error::Aws {
                code,
                operation,
                message,
            } => {
                assert_eq!(code, "DBInstanceNotFound");
                assert_eq!(operation, "DescribeDBInstances");
                assert_eq!(message, "DBInstance missing-db not found.");
            }
            other => panic!("expected Aws error, got {other:?}"),
        }
    }

    #[test]
    fn parses_throttling_with_retry_suffix() {
        let err = parse_cli_error(
            "describe-db-parameters",
            254,
            "An error occurred (Throttling) when calling the DescribeDBParameters operation (reached max retries: 2): Rate exceeded",
        );
        assert!(err.is_transient());
        assert_eq!(err.aws_error_code(), Some("Throttling"));
    }

    #[test]
    fn keeps_unstructured_stderr() {
        let err = parse_cli_error("describe-db-instances", 252, "usage: aws [options]");
        assert!(matches!(
            err,
            Error::CommandFailed { status: 252, ref stderr, .. } if stderr == "usage: aws [options]"
        ));
    }
}
