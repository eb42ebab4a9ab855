//! CLI-side config resolution.
//!
//! File and environment layers come from `rdsdrift-config`; the flags in
//! [`GlobalOpts`] are applied on top here.

use clap::ValueEnum;

use rdsdrift_config::Config;
use rdsdrift_core::AuditorConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use rdsdrift_config::config_path;

/// Load config and fill `--output` / `--color` from `[defaults]` when the
/// flags were not given.
pub fn load(global: &mut GlobalOpts) -> Result<Config, CliError> {
    let cfg = rdsdrift_config::load_config()?;

    if global.output.is_none() {
        global.output = Some(parse_enum::<OutputFormat>("defaults.output", &cfg.defaults.output)?);
    }
    if global.color.is_none() {
        global.color = Some(parse_enum::<ColorMode>("defaults.color", &cfg.defaults.color)?);
    }
    Ok(cfg)
}

fn parse_enum<T: ValueEnum>(field: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw, true).map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!(
            "'{raw}' is not one of: {}",
            T::value_variants()
                .iter()
                .filter_map(|v| v.to_possible_value().map(|p| p.get_name().to_owned()))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    })
}

/// Core configuration with flag overrides applied.
pub fn auditor_config(cfg: &Config, global: &GlobalOpts) -> Result<AuditorConfig, CliError> {
    let mut resolved = cfg.auditor_config()?;

    if global.no_cache {
        resolved.cache.enabled = false;
    }
    if let Some(ref ttl) = global.cache_ttl {
        resolved.cache.ttl = humantime::parse_duration(ttl).map_err(|e| CliError::Validation {
            field: "--cache-ttl".into(),
            reason: e.to_string(),
        })?;
    }
    if let Some(ref region) = global.region {
        resolved.aws.region = Some(region.clone());
    }
    if let Some(ref profile) = global.aws_profile {
        resolved.aws.profile = Some(profile.clone());
    }
    if let Some(concurrency) = global.concurrency {
        resolved.concurrency = usize::from(concurrency);
    }
    Ok(resolved)
}
