// ── Diff engine ──
//
// Structural comparison of two resolved setting-sets. Purely textual: two
// values are equal only if their strings are. Use `units::normalize` first
// to compare values written in different units.

use std::collections::BTreeSet;

use crate::model::{DriftRecord, SettingSet};

/// Every setting on which `a` and `b` disagree, sorted by name.
///
/// A setting present on one side only is reported with the other side
/// `None`. Never fails.
pub fn diff(a: &SettingSet, b: &SettingSet) -> Vec<DriftRecord> {
    let names: BTreeSet<&str> = a.names().chain(b.names()).collect();

    names
        .into_iter()
        .filter_map(|name| {
            let left = a.get(name);
            let right = b.get(name);
            match (left, right) {
                (Some(l), Some(r)) if l.value == r.value => None,
                (None, None) => None,
                _ => Some(DriftRecord {
                    name: name.to_owned(),
                    a: left.map(|s| s.value.clone()),
                    b: right.map(|s| s.value.clone()),
                    unit: left
                        .and_then(|s| s.unit.clone())
                        .or_else(|| right.and_then(|s| s.unit.clone())),
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{Setting, SourceIdentity};

    fn set(id: &str, pairs: &[(&str, &str)]) -> SettingSet {
        SettingSet::new(
            SourceIdentity::Instance(id.into()),
            pairs.iter().map(|(n, v)| Setting::new(*n, *v)),
        )
    }

    #[test]
    fn reports_changed_value_only() {
        let a = set("a", &[("max_wal_size", "1GB"), ("shared_buffers", "4GB")]);
        let b = set("b", &[("max_wal_size", "2GB"), ("shared_buffers", "4GB")]);

        assert_eq!(
            diff(&a, &b),
            vec![DriftRecord::new("max_wal_size", Some("1GB"), Some("2GB"))]
        );
    }

    #[test]
    fn absence_is_drift() {
        let a = set("a", &[("max_wal_size", "1GB")]);
        let b = set("b", &[]);

        let drift = diff(&a, &b);

        assert_eq!(drift, vec![DriftRecord::new("max_wal_size", Some("1GB"), None)]);
        assert!(drift[0].is_absence());
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let a = set("a", &[("log_statement", "ddl")]);
        let b = set("b", &[("log_statement", "DDL")]);
        assert_eq!(diff(&a, &b).len(), 1);
    }

    #[test]
    fn unit_is_taken_from_either_side() {
        let a = SettingSet::new(SourceIdentity::Template("t".into()), [Setting::new("work_mem", "4096")]);
        let b = SettingSet::new(
            SourceIdentity::Instance("i".into()),
            [Setting::new("work_mem", "8192").with_unit("kB")],
        );
        assert_eq!(diff(&a, &b)[0].unit.as_deref(), Some("kB"));
    }
}
