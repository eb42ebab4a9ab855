// ── Settings and setting-sets ──

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::source::SourceIdentity;

/// A single named configuration value, as text exactly as reported.
///
/// `unit` is provenance only (`8kB`, `ms`, ...). Comparisons look at
/// `value` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Setting {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            unit: None,
        }
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Declared through a template expression such as
    /// `{DBInstanceClassMemory/32768}`. Only a live connection knows the
    /// materialized value.
    pub fn is_formula(&self) -> bool {
        is_formula(&self.value)
    }
}

/// `true` for template expressions such as `{DBInstanceClassMemory/32768}`.
/// A single brace of either kind is enough.
pub fn is_formula(value: &str) -> bool {
    value.contains(['{', '}'])
}

/// Which settings a resolution asks for.
///
/// Named scopes are stored sorted and deduplicated so equal requests
/// produce equal cache keys regardless of argument order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingScope {
    #[default]
    All,
    Named(BTreeSet<String>),
}

impl SettingScope {
    /// Scope for the given names; an empty list means everything.
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            Self::All
        } else {
            Self::Named(names)
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(names) => names.contains(name),
        }
    }

    /// The requested names, or `None` for the full set.
    pub fn names(&self) -> Option<Vec<String>> {
        match self {
            Self::All => None,
            Self::Named(names) => Some(names.iter().cloned().collect()),
        }
    }

    /// Canonical text form, used in cache keys.
    pub fn canonical(&self) -> String {
        match self {
            Self::All => "*".into(),
            Self::Named(names) => names.iter().map(String::as_str).collect::<Vec<_>>().join(","),
        }
    }
}

/// An immutable, name-ordered set of settings from exactly one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingSet {
    source: SourceIdentity,
    settings: BTreeMap<String, Setting>,
}

impl SettingSet {
    /// Build a set from settings. A later setting with the same name
    /// replaces an earlier one.
    pub fn new(source: SourceIdentity, settings: impl IntoIterator<Item = Setting>) -> Self {
        let settings = settings
            .into_iter()
            .map(|s| (s.name.clone(), s))
            .collect();
        Self { source, settings }
    }

    pub fn empty(source: SourceIdentity) -> Self {
        Self::new(source, [])
    }

    pub fn source(&self) -> &SourceIdentity {
        &self.source
    }

    pub fn get(&self, name: &str) -> Option<&Setting> {
        self.settings.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.settings.get(name).map(|s| s.value.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.settings.keys().map(String::as_str)
    }

    /// Settings in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Setting> {
        self.settings.values()
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// A new set holding only the settings inside `scope`.
    #[must_use]
    pub fn restrict(&self, scope: &SettingScope) -> Self {
        Self::new(
            self.source.clone(),
            self.iter().filter(|s| scope.contains(&s.name)).cloned(),
        )
    }

    /// A new set with every setting passed through `f`.
    #[must_use]
    pub fn map_settings(&self, f: impl Fn(&Setting) -> Setting) -> Self {
        Self::new(self.source.clone(), self.iter().map(f))
    }
}

impl<'a> IntoIterator for &'a SettingSet {
    type Item = &'a Setting;
    type IntoIter = std::collections::btree_map::Values<'a, String, Setting>;

    fn into_iter(self) -> Self::IntoIter {
        self.settings.values()
    }
}
