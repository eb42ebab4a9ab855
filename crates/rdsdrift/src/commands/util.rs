//! Shared helpers for command handlers.

use std::io::IsTerminal;

use rdsdrift_config::{Config, ConfigError};
use rdsdrift_core::{
    Auditor, DeclaredSource, MetadataProvider, RuntimeSettingsProvider, SettingScope, SourceSpec,
};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output::{self, Tone};

const INSTANCE_PREFIX: &str = "instance:";
const TEMPLATE_PREFIX: &str = "template:";
const LIVE_PREFIX: &str = "live:";

/// Parse `instance:<id>`, `template:<name>`, `live:<name-or-url>` or a
/// bare instance id.
pub fn parse_source(raw: &str, cfg: &Config) -> Result<SourceSpec, CliError> {
    let invalid = |reason: &str| CliError::Validation {
        field: "source".into(),
        reason: format!("'{raw}': {reason}"),
    };

    if let Some(id) = raw.strip_prefix(INSTANCE_PREFIX) {
        return non_empty(id, "missing instance identifier")
            .map(|id| DeclaredSource::Instance(id.into()).into())
            .map_err(invalid);
    }
    if let Some(name) = raw.strip_prefix(TEMPLATE_PREFIX) {
        return non_empty(name, "missing parameter group name")
            .map(|name| DeclaredSource::Template(name.into()).into())
            .map_err(invalid);
    }
    if let Some(target) = raw.strip_prefix(LIVE_PREFIX) {
        let target = non_empty(target, "missing connection name or URL").map_err(invalid)?;
        return resolve_connection(cfg, target).map(SourceSpec::Live);
    }
    if raw.is_empty() {
        return Err(invalid("empty source"));
    }
    if raw.contains(':') {
        return Err(invalid("expected instance:, template: or live: prefix"));
    }
    Ok(DeclaredSource::Instance(raw.into()).into())
}

fn non_empty<'a>(value: &'a str, reason: &'static str) -> Result<&'a str, &'static str> {
    if value.trim().is_empty() { Err(reason) } else { Ok(value) }
}

fn resolve_connection(
    cfg: &Config,
    target: &str,
) -> Result<rdsdrift_core::ConnectionDescriptor, CliError> {
    cfg.resolve_connection(target).map_err(|e| match e {
        ConfigError::UnknownConnection { name } => CliError::UnknownConnection {
            name,
            available: if cfg.connections.is_empty() {
                "(none)".into()
            } else {
                cfg.connections.keys().cloned().collect::<Vec<_>>().join(", ")
            },
            path: config::config_path().display().to_string(),
        },
        other => other.into(),
    })
}

/// `--setting` values as a scope; none means every setting.
pub fn scope(names: &[String]) -> SettingScope {
    SettingScope::named(names.iter().cloned())
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Point at a live source when declared values are formulas.
pub fn formula_hint(global: &GlobalOpts, formulas: usize) {
    if formulas > 0 {
        output::status(
            global,
            Tone::Hint,
            format_args!(
                "{formulas} value(s) marked{} are formulas evaluated per instance class; \
                 compare against live:<connection> for the materialized value",
                output::FORMULA_MARK
            ),
        );
    }
}

/// Surface cache warnings and close the auditor.
pub fn finish<P: MetadataProvider, R: RuntimeSettingsProvider>(
    auditor: Auditor<P, R>,
    global: &GlobalOpts,
) {
    for warning in auditor.cache().take_warnings() {
        output::status(global, Tone::Warn, format_args!("warning: {warning}"));
    }
    let stats = auditor.close();
    tracing::debug!(
        hits = stats.hits,
        misses = stats.misses,
        writes = stats.writes,
        "run finished"
    );
}
