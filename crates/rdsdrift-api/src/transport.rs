// Shared configuration for invoking the AWS command line.
//
// Every RDS metadata call goes through `aws rds <operation> --output json`.
// Region, named profile, timeout and page size are applied here so the
// endpoint modules only deal with operation names and arguments.

use std::time::Duration;

use tokio::process::Command;

/// How to invoke the `aws` program for RDS metadata calls.
#[derive(Debug, Clone)]
pub struct AwsCliConfig {
    /// Program plus any leading arguments, e.g. `["aws"]` or
    /// `["aws-vault", "exec", "prod", "--", "aws"]`.
    pub command: Vec<String>,
    /// Region override (`--region`). Falls back to the CLI's own resolution.
    pub region: Option<String>,
    /// Named profile (`--profile`).
    pub profile: Option<String>,
    /// Upper bound for a single invocation (one page).
    pub timeout: Duration,
    /// Items requested per page (`--max-items`).
    pub page_size: u32,
}

impl Default for AwsCliConfig {
    fn default() -> Self {
        Self {
            command: vec!["aws".into()],
            region: None,
            profile: None,
            timeout: Duration::from_secs(60),
            page_size: 100,
        }
    }
}

impl AwsCliConfig {
    /// The program name, for diagnostics.
    pub fn program(&self) -> &str {
        self.command.first().map_or("aws", String::as_str)
    }

    /// Build a `Command` for `aws rds {operation}` with JSON output,
    /// region/profile flags and the pager disabled.
    pub(crate) fn rds_command(&self, operation: &str) -> Command {
        let mut cmd = Command::new(self.program());
        cmd.args(self.command.iter().skip(1))
            .arg("rds")
            .arg(operation)
            .args(["--output", "json"])
            .env("AWS_PAGER", "")
            .kill_on_drop(true);

        if let Some(ref region) = self.region {
            cmd.args(["--region", region]);
        }
        if let Some(ref profile) = self.profile {
            cmd.args(["--profile", profile]);
        }
        cmd
    }
}
