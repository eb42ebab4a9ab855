//! Cache maintenance handlers.
//!
//! These work on the cache directory even under `--no-cache`.

use chrono::Utc;
use tabled::Tabled;

use rdsdrift_core::{CacheConfig, CacheEntryInfo, SettingsCache};

use crate::cli::{CacheArgs, CacheCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Tone};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Scope")]
    scope: String,
    #[tabled(rename = "Settings")]
    settings: usize,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Fresh")]
    fresh: &'static str,
}

impl From<&CacheEntryInfo> for EntryRow {
    fn from(e: &CacheEntryInfo) -> Self {
        let age = (Utc::now() - e.fetched_at)
            .to_std()
            .map(|d| std::time::Duration::from_secs(d.as_secs()))
            .map_or_else(|_| "future".into(), |d| humantime::format_duration(d).to_string());
        Self {
            source: e.key.source.to_string(),
            scope: e.key.scope.canonical(),
            settings: e.settings,
            age,
            fresh: if e.fresh { "yes" } else { "no" },
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: CacheArgs, config: &CacheConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let maintenance = CacheConfig {
        enabled: true,
        ..config.clone()
    };

    match args.command {
        CacheCommand::Path => {
            output::print_output(&config.dir.display().to_string(), global.quiet);
            Ok(())
        }

        CacheCommand::Stats => {
            let cache = SettingsCache::open(&maintenance);
            let inventory = cache.inventory()?;
            let out = output::render_list(
                global.output(),
                &inventory.entries,
                |e| EntryRow::from(e),
                |e| e.path.display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            output::status(
                global,
                Tone::Hint,
                format_args!(
                    "{} entr{} in {} (ttl {})",
                    inventory.entries.len(),
                    if inventory.entries.len() == 1 { "y" } else { "ies" },
                    config.dir.display(),
                    humantime::format_duration(config.ttl)
                ),
            );
            if inventory.corrupt > 0 {
                output::status(
                    global,
                    Tone::Warn,
                    format_args!(
                        "{} unreadable entr{} (removed by: rdsdrift cache clear)",
                        inventory.corrupt,
                        if inventory.corrupt == 1 { "y" } else { "ies" }
                    ),
                );
            }
            Ok(())
        }

        CacheCommand::Clear => {
            if !util::confirm(
                &format!("Delete all cached settings in {}?", config.dir.display()),
                "cache clear",
                global.yes,
            )? {
                return Ok(());
            }
            let cache = SettingsCache::open(&maintenance);
            let removed = cache.clear()?;
            output::status(
                global,
                Tone::Good,
                format_args!("Removed {removed} cached entr{}", if removed == 1 { "y" } else { "ies" }),
            );
            Ok(())
        }
    }
}
