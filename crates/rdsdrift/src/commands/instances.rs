//! Instance listing handler.

use tabled::Tabled;

use rdsdrift_core::{Auditor, FleetFilter, InstanceSummary, MetadataProvider, RuntimeSettingsProvider};

use crate::cli::{GlobalOpts, InstancesArgs};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct InstanceRow {
    #[tabled(rename = "Identifier")]
    identifier: String,
    #[tabled(rename = "Engine")]
    engine: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Parameter Group")]
    parameter_group: String,
}

fn or_dash(value: Option<&String>) -> String {
    value.map_or_else(|| "-".into(), Clone::clone)
}

impl From<&InstanceSummary> for InstanceRow {
    fn from(i: &InstanceSummary) -> Self {
        Self {
            identifier: i.identifier.clone(),
            engine: or_dash(i.engine.as_ref()),
            version: or_dash(i.engine_version.as_ref()),
            status: or_dash(i.status.as_ref()),
            parameter_group: or_dash(i.parameter_group.as_ref()),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle<P, R>(
    auditor: &Auditor<P, R>,
    args: InstancesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError>
where
    P: MetadataProvider,
    R: RuntimeSettingsProvider,
{
    let instances = auditor.instances(&FleetFilter::from(args.filter)).await?;
    let out = output::render_list(
        global.output(),
        &instances,
        |i| InstanceRow::from(i),
        |i| i.identifier.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
