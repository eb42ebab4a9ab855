//! Fleet audit handler.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use rdsdrift_core::{
    AuditReport, AuditRequest, AuditRow, Auditor, FleetFilter, MetadataProvider,
    RuntimeSettingsProvider, SkippedInstance,
};

use crate::cli::{AuditArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output::{self, Tone};

use super::util;

// ── Structured view ─────────────────────────────────────────────────

#[derive(Serialize)]
struct AuditView<'a> {
    settings: &'a [String],
    divergent: Vec<&'a str>,
    rows: &'a [AuditRow],
    skipped: &'a [SkippedInstance],
}

fn table(report: &AuditReport) -> String {
    let headers = ["Instance", "Parameter Group"]
        .into_iter()
        .map(str::to_owned)
        .chain(report.settings.iter().cloned());
    let rows = report.rows.iter().map(|row| {
        [
            row.instance.clone(),
            row.parameter_group.clone().unwrap_or_else(|| "-".into()),
        ]
        .into_iter()
        .chain(
            report
                .settings
                .iter()
                .map(|name| output::value_cell(row.settings.value(name))),
        )
        .collect::<Vec<_>>()
    });
    output::render_grid(headers, rows)
}

fn plain(report: &AuditReport) -> String {
    report
        .rows
        .iter()
        .map(|row| {
            std::iter::once(row.instance.as_str())
                .chain(
                    report
                        .settings
                        .iter()
                        .map(|name| row.settings.value(name).unwrap_or("-")),
                )
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn formula_count(report: &AuditReport) -> usize {
    report
        .rows
        .iter()
        .flat_map(|row| row.settings.iter())
        .filter(|s| s.is_formula())
        .count()
}

fn progress(global: &GlobalOpts) -> ProgressBar {
    if global.quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {pos} resolved  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle<P, R>(
    auditor: &Auditor<P, R>,
    args: AuditArgs,
    global: &GlobalOpts,
) -> Result<(), CliError>
where
    P: MetadataProvider,
    R: RuntimeSettingsProvider,
{
    let request = AuditRequest::new(args.settings, FleetFilter::from(args.filter));

    let bar = progress(global);
    let result = auditor
        .audit(&request, |instance| {
            bar.inc(1);
            bar.set_message(instance.to_owned());
        })
        .await;
    bar.finish_and_clear();
    let report = result?;

    let divergent = report.divergent_settings();
    let format = global.output();
    let out = output::render_single(
        format,
        &AuditView {
            settings: &report.settings,
            divergent: divergent.clone(),
            rows: &report.rows,
            skipped: &report.skipped,
        },
        |_| table(&report),
        |_| plain(&report),
    )?;
    output::print_output(&out, global.quiet);

    for skipped in &report.skipped {
        output::status(
            global,
            Tone::Warn,
            format_args!("skipped {} ({}): {}", skipped.instance, skipped.kind, skipped.reason),
        );
    }

    if format == OutputFormat::Table {
        if report.rows.is_empty() {
            output::status(global, Tone::Hint, "No instances matched.");
        } else if divergent.is_empty() {
            output::status(
                global,
                Tone::Good,
                format_args!("All {} instance(s) agree.", report.rows.len()),
            );
        } else {
            output::status(
                global,
                Tone::Warn,
                format_args!("Divergent: {}", divergent.join(", ")),
            );
        }
        util::formula_hint(global, formula_count(&report));
    }

    if args.exit_code && !divergent.is_empty() {
        return Err(CliError::DriftDetected {
            count: divergent.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rdsdrift_core::{Setting, SettingSet, SourceIdentity};

    use super::*;

    fn report() -> AuditReport {
        let row = |id: &str, wal: &str| AuditRow {
            instance: id.into(),
            parameter_group: Some("pg15".into()),
            settings: SettingSet::new(
                SourceIdentity::Instance(id.into()),
                [
                    Setting::new("max_wal_size", wal),
                    Setting::new("shared_buffers", "{DBInstanceClassMemory/32768}"),
                ],
            ),
        };
        AuditReport {
            settings: vec!["max_wal_size".into(), "shared_buffers".into(), "work_mem".into()],
            rows: vec![row("orders-a", "2048"), row("orders-b", "4096")],
            skipped: Vec::new(),
        }
    }

    #[test]
    fn plain_is_tab_separated_with_absent_marker() {
        assert_eq!(
            plain(&report()),
            "orders-a\t2048\t{DBInstanceClassMemory/32768}\t-\n\
             orders-b\t4096\t{DBInstanceClassMemory/32768}\t-"
        );
    }

    #[test]
    fn table_has_one_column_per_setting() {
        let out = table(&report());
        for header in ["Instance", "Parameter Group", "max_wal_size", "shared_buffers", "work_mem"] {
            assert!(out.contains(header), "missing {header} in\n{out}");
        }
        assert!(out.contains(output::FORMULA_MARK));
    }

    #[test]
    fn counts_formula_values() {
        assert_eq!(formula_count(&report()), 2);
    }
}
