// ── Unit normalization ──
//
// RDS declares memory and time parameters in the parameter's native unit
// (`(8kB)`, `(MB)`, `(s)`, ...), PostgreSQL reports `pg_settings.setting`
// in `pg_settings.unit`, and humans write `1GB`. Normalization rewrites
// each value into a base unit (kB for memory, ms for time) so the textual
// diff can compare them. Formula values and values it cannot interpret
// pass through untouched.

use crate::model::setting::is_formula;
use crate::model::{Setting, SettingSet};

/// Base unit for memory values.
pub const MEMORY_BASE: &str = "kB";
/// Base unit for time values.
pub const TIME_BASE: &str = "ms";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Dimension {
    Memory,
    Time,
}

/// Ratio (numerator, denominator) that converts one `unit` into its base
/// unit, with an optional numeric multiplier prefix (`8kB`, `16MB`).
fn unit_factor(unit: &str) -> Option<(Dimension, f64, f64)> {
    let unit = unit.trim();
    let split = unit
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unit.len());
    let (count, name) = unit.split_at(split);
    let count: f64 = if count.is_empty() { 1.0 } else { count.parse().ok()? };

    let (dimension, num, den) = match name.to_ascii_lowercase().as_str() {
        "b" => (Dimension::Memory, 1.0, 1024.0),
        "kb" => (Dimension::Memory, 1.0, 1.0),
        "mb" => (Dimension::Memory, 1024.0, 1.0),
        "gb" => (Dimension::Memory, 1024.0 * 1024.0, 1.0),
        "tb" => (Dimension::Memory, 1024.0 * 1024.0 * 1024.0, 1.0),
        "us" => (Dimension::Time, 1.0, 1000.0),
        "ms" => (Dimension::Time, 1.0, 1.0),
        "s" => (Dimension::Time, 1000.0, 1.0),
        "min" => (Dimension::Time, 60_000.0, 1.0),
        "h" => (Dimension::Time, 3_600_000.0, 1.0),
        "d" => (Dimension::Time, 86_400_000.0, 1.0),
        _ => return None,
    };
    Some((dimension, count * num, den))
}

/// Split `1GB` / `300s` / `0.5` into number and unit suffix.
fn split_quantity(value: &str) -> Option<(f64, &str)> {
    let value = value.trim();
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(value.len());
    let (number, suffix) = value.split_at(split);
    let number: f64 = number.parse().ok()?;
    Some((number, suffix.trim()))
}

fn format_number(n: f64) -> String {
    // `Display` for f64 prints integral values without a fraction.
    format!("{n}")
}

/// Normalize a single value. Returns the rewritten value and its new unit,
/// or `None` when the value should be kept as is.
pub fn normalize_value(value: &str, unit: Option<&str>) -> Option<(String, Option<&'static str>)> {
    if is_formula(value) {
        return None;
    }
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => return Some(("1".into(), None)),
        "off" | "false" | "no" => return Some(("0".into(), None)),
        // -1 conventionally means "disabled", whatever the unit.
        "-1" => return Some(("-1".into(), None)),
        _ => {}
    }

    let (number, suffix) = split_quantity(value)?;
    let unit = if suffix.is_empty() { unit? } else { suffix };
    let (dimension, num, den) = unit_factor(unit)?;
    let base = match dimension {
        Dimension::Memory => MEMORY_BASE,
        Dimension::Time => TIME_BASE,
    };
    Some((format_number(number * num / den), Some(base)))
}

/// A new set with every value rewritten into base units.
pub fn normalize(set: &SettingSet) -> SettingSet {
    set.map_settings(normalize_setting)
}

fn normalize_setting(setting: &Setting) -> Setting {
    match normalize_value(&setting.value, setting.unit.as_deref()) {
        Some((value, unit)) => Setting {
            name: setting.name.clone(),
            value,
            unit: unit.map(str::to_owned),
        },
        None => setting.clone(),
    }
}
