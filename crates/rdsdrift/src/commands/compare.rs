//! Two-source comparison handler.

use rdsdrift_config::Config;
use rdsdrift_core::{Auditor, Comparison, MetadataProvider, RuntimeSettingsProvider};

use crate::cli::{CompareArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output::{self, Tone};

use super::util;

fn table(cmp: &Comparison) -> String {
    let headers = [
        "Name".to_owned(),
        cmp.a.to_string(),
        cmp.b.to_string(),
        "Unit".to_owned(),
    ];
    let rows = cmp.drift.iter().map(|record| {
        [
            record.name.clone(),
            output::value_cell(record.a.as_deref()),
            output::value_cell(record.b.as_deref()),
            record.unit.clone().unwrap_or_default(),
        ]
    });
    output::render_grid(headers, rows)
}

fn plain(cmp: &Comparison) -> String {
    cmp.drift
        .iter()
        .map(|r| {
            format!(
                "{}\t{}\t{}",
                r.name,
                r.a.as_deref().unwrap_or("-"),
                r.b.as_deref().unwrap_or("-")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn formula_count(cmp: &Comparison) -> usize {
    cmp.drift
        .iter()
        .flat_map(|r| [r.a.as_deref(), r.b.as_deref()])
        .flatten()
        .filter(|v| rdsdrift_core::model::is_formula(v))
        .count()
}

pub async fn handle<P, R>(
    auditor: &Auditor<P, R>,
    cfg: &Config,
    args: CompareArgs,
    global: &GlobalOpts,
) -> Result<(), CliError>
where
    P: MetadataProvider,
    R: RuntimeSettingsProvider,
{
    let target = util::parse_source(&args.target, cfg)?;
    let other = util::parse_source(&args.other, cfg)?;
    let scope = util::scope(&args.setting);

    let cmp = auditor
        .compare(&target, &other, &scope, args.normalize)
        .await?;

    let format = global.output();
    if format == OutputFormat::Table && cmp.is_clean() {
        output::status(global, Tone::Good, "No differences.");
    } else {
        let out = output::render_single(format, &cmp, table, plain)?;
        output::print_output(&out, global.quiet);
        if format == OutputFormat::Table {
            util::formula_hint(global, formula_count(&cmp));
        }
    }

    if args.exit_code && !cmp.is_clean() {
        return Err(CliError::DriftDetected {
            count: cmp.drift.len(),
        });
    }
    Ok(())
}
