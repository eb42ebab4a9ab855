//! Single-source display handler.

use rdsdrift_config::Config;
use rdsdrift_core::{Auditor, MetadataProvider, RuntimeSettingsProvider, SettingSet};

use crate::cli::{GlobalOpts, OutputFormat, ShowArgs};
use crate::error::CliError;
use crate::output::{self, Tone};

use super::util;

fn table(set: &SettingSet) -> String {
    let rows = set.iter().map(|s| {
        [
            s.name.clone(),
            output::value_cell(Some(&s.value)),
            s.unit.clone().unwrap_or_default(),
        ]
    });
    output::render_grid(["Name", "Value", "Unit"], rows)
}

fn plain(set: &SettingSet) -> String {
    set.iter()
        .map(|s| format!("{}={}", s.name, s.value))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn handle<P, R>(
    auditor: &Auditor<P, R>,
    cfg: &Config,
    args: ShowArgs,
    global: &GlobalOpts,
) -> Result<(), CliError>
where
    P: MetadataProvider,
    R: RuntimeSettingsProvider,
{
    let source = util::parse_source(&args.source, cfg)?;
    let scope = util::scope(&args.setting);
    let set = auditor.resolve(&source, &scope).await?;

    let out = output::render_single(global.output(), &set, table, plain)?;
    output::print_output(&out, global.quiet);

    if global.output() == OutputFormat::Table {
        let missing: Vec<&str> = args
            .setting
            .iter()
            .filter(|name| set.get(name).is_none())
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            output::status(
                global,
                Tone::Hint,
                format_args!("not reported by {}: {}", set.source(), missing.join(", ")),
            );
        }
        util::formula_hint(global, set.iter().filter(|s| s.is_formula()).count());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rdsdrift_core::{Setting, SourceIdentity};

    use super::*;

    #[test]
    fn plain_lists_name_value_pairs_in_order() {
        let set = SettingSet::new(
            SourceIdentity::Template("pg15-orders".into()),
            [
                Setting::new("work_mem", "4096").with_unit("kB"),
                Setting::new("max_connections", "200"),
            ],
        );
        assert_eq!(plain(&set), "max_connections=200\nwork_mem=4096");
        assert!(table(&set).contains("kB"));
    }
}
