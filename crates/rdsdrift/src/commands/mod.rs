//! Command dispatch: bridges CLI args -> auditor calls -> output formatting.

pub mod audit;
pub mod cache_cmd;
pub mod compare;
pub mod config_cmd;
pub mod instances;
pub mod show;
pub mod util;

use rdsdrift_config::Config;
use rdsdrift_core::{Auditor, AuditorConfig};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an AWS-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    cfg: &Config,
    auditor_config: &AuditorConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let auditor = Auditor::new(auditor_config);

    let result = match cmd {
        Command::Audit(args) => audit::handle(&auditor, args, global).await,
        Command::Compare(args) => compare::handle(&auditor, cfg, args, global).await,
        Command::Instances(args) => instances::handle(&auditor, args, global).await,
        Command::Show(args) => show::handle(&auditor, cfg, args, global).await,
        Command::Cache(args) => cache_cmd::handle(args, &auditor_config.cache, global),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    };

    util::finish(auditor, global);
    result
}
