// ── API-to-domain conversions ──
//
// Bridges raw `rdsdrift_api` records into domain settings and instance
// summaries. Units are pulled from wherever each service reports them:
// the RDS parameter description prefix, or `pg_settings.unit`.

use rdsdrift_api::{DbInstance, DbParameter, PgSettingRow};

use crate::model::{InstanceSummary, Setting};

/// Extract the unit RDS puts at the start of a parameter description,
/// e.g. `"(8kB) Sets the number of ..."` gives `8kB`.
pub fn unit_from_description(description: &str) -> Option<&str> {
    let rest = description.trim_start().strip_prefix('(')?;
    let (unit, _) = rest.split_once(')')?;
    let unit = unit.trim();
    (!unit.is_empty() && !unit.contains(char::is_whitespace)).then_some(unit)
}

/// The declared value of a parameter group entry.
///
/// Entries left at the engine default carry no value and yield `None`.
pub fn declared_setting(param: &DbParameter) -> Option<Setting> {
    let value = param.value.as_ref()?;
    let mut setting = Setting::new(&param.name, value);
    setting.unit = param
        .description
        .as_deref()
        .and_then(unit_from_description)
        .map(str::to_owned);
    Some(setting)
}

/// The materialized value of a `pg_settings` row.
pub fn runtime_setting(row: &PgSettingRow) -> Option<Setting> {
    let value = row.setting.as_ref()?;
    let mut setting = Setting::new(&row.name, value);
    setting.unit = row.unit.clone().filter(|u| !u.is_empty());
    Some(setting)
}

impl From<DbInstance> for InstanceSummary {
    fn from(raw: DbInstance) -> Self {
        let endpoint = raw.endpoint.map(|e| match e.port {
            Some(port) => format!("{}:{port}", e.address),
            None => e.address,
        });
        Self {
            parameter_group: raw.parameter_groups.into_iter().next().map(|g| g.name),
            identifier: raw.identifier,
            engine: raw.engine,
            engine_version: raw.engine_version,
            status: raw.status,
            instance_class: raw.instance_class,
            endpoint,
        }
    }
}
