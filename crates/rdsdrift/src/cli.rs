//! Clap derive structures for the `rdsdrift` CLI.
//!
//! Also compiled into `build.rs` for man page generation, so this file may
//! only depend on clap and clap_complete.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// rdsdrift -- PostgreSQL parameter drift auditing for RDS fleets
#[derive(Debug, Parser)]
#[command(
    name = "rdsdrift",
    version,
    about = "Audit PostgreSQL parameter drift across an RDS fleet",
    long_about = "Compares PostgreSQL settings between RDS instances, parameter groups\n\
        and live databases, and audits chosen settings across a whole fleet.\n\n\
        Declared values come from the RDS API through the `aws` command line\n\
        and are cached on disk; live values are read from pg_settings.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "RDSDRIFT_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Bypass the on-disk settings cache
    #[arg(long, env = "RDSDRIFT_NO_CACHE", global = true)]
    pub no_cache: bool,

    /// Cache entry lifetime, e.g. 30m, 2h, 0s
    #[arg(long, value_name = "DURATION", global = true)]
    pub cache_ttl: Option<String>,

    /// AWS region (overrides config and the aws CLI default)
    #[arg(long, env = "AWS_REGION", hide_env = true, global = true)]
    pub region: Option<String>,

    /// Named AWS CLI profile
    #[arg(long, value_name = "PROFILE", global = true)]
    pub aws_profile: Option<String>,

    /// Instances resolved in parallel during an audit
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..), global = true)]
    pub concurrency: Option<u16>,
}

impl GlobalOpts {
    pub fn output(&self) -> OutputFormat {
        self.output.unwrap_or(OutputFormat::Table)
    }

    pub fn color(&self) -> ColorMode {
        self.color.unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Audit settings across every matching instance
    Audit(AuditArgs),

    /// Show the settings that differ between two sources
    #[command(alias = "diff")]
    Compare(CompareArgs),

    /// List database instances
    #[command(alias = "ls")]
    Instances(InstancesArgs),

    /// Print the resolved settings of one source
    Show(ShowArgs),

    /// Inspect or purge the on-disk settings cache
    Cache(CacheArgs),

    /// Manage configuration and connection passwords
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Audit ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Setting names to audit, e.g. max_connections work_mem
    #[arg(required = true, value_name = "SETTING")]
    pub settings: Vec<String>,

    /// Only instances whose identifier contains this substring
    #[arg(long, short = 'f', value_name = "SUBSTR")]
    pub filter: Option<String>,

    /// Exit with status 9 when any setting differs between instances
    #[arg(long)]
    pub exit_code: bool,
}

// ── Compare ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
#[command(after_help = "Sources:\n  \
    instance:<id>          declared settings of an instance (via its parameter group)\n  \
    template:<name>        declared settings of a parameter group\n  \
    live:<name-or-url>     runtime settings of a configured connection or a postgres:// URL\n  \
    <id>                   same as instance:<id>")]
pub struct CompareArgs {
    /// The source being checked
    pub target: String,

    /// The source it is checked against
    pub other: String,

    /// Restrict the comparison to these settings (repeatable)
    #[arg(long, short = 's', value_name = "NAME")]
    pub setting: Vec<String>,

    /// Rewrite values into base units (kB, ms, 1/0) before comparing
    #[arg(long, short = 'n')]
    pub normalize: bool,

    /// Exit with status 9 when differences are found
    #[arg(long)]
    pub exit_code: bool,
}

// ── Instances ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InstancesArgs {
    /// Only instances whose identifier contains this substring
    #[arg(long, short = 'f', value_name = "SUBSTR")]
    pub filter: Option<String>,
}

// ── Show ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// instance:<id>, template:<name>, live:<name-or-url>, or a bare instance id
    pub source: String,

    /// Restrict output to these settings (repeatable)
    #[arg(long, short = 's', value_name = "NAME")]
    pub setting: Vec<String>,
}

// ── Cache ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Print the cache directory
    Path,

    /// Delete every cached entry
    Clear,

    /// List cached entries with their age and freshness
    Stats,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with guided setup
    Init,

    /// Display the resolved configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// Store a connection password in the system keyring
    SetPassword {
        /// Connection name from [connections.<name>]
        connection: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
