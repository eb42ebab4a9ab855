use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::model::{SettingScope, SourceIdentity};

/// Source Identity plus requested scope.
///
/// Scopes are matched exactly: an entry for `{a, b}` never serves a
/// request for `{a}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub source: SourceIdentity,
    pub scope: SettingScope,
}

impl CacheKey {
    pub fn new(source: SourceIdentity, scope: SettingScope) -> Self {
        Self { source, scope }
    }

    /// `kind \n id \n scope`, the text the file name is derived from.
    pub fn canonical(&self) -> String {
        format!(
            "{}\n{}\n{}",
            self.source.kind(),
            self.source.id(),
            self.scope.canonical()
        )
    }

    /// Hex SHA-256 of the canonical key, plus `.json`.
    pub fn file_name(&self) -> String {
        let digest = Sha256::digest(self.canonical().as_bytes());
        format!("{}.json", hex::encode(digest))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.source, self.scope.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_stable_hex_digest() {
        let key = CacheKey::new(
            SourceIdentity::Instance("orders-primary".into()),
            SettingScope::named(["work_mem", "max_wal_size"]),
        );
        let name = key.file_name();
        assert_eq!(name.len(), 64 + ".json".len());
        assert!(name.trim_end_matches(".json").chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(
            name,
            CacheKey::new(
                SourceIdentity::Instance("orders-primary".into()),
                SettingScope::named(["max_wal_size", "work_mem"]),
            )
            .file_name()
        );
    }

    #[test]
    fn kind_and_scope_separate_keys() {
        let scope = SettingScope::All;
        let instance = CacheKey::new(SourceIdentity::Instance("x".into()), scope.clone());
        let template = CacheKey::new(SourceIdentity::Template("x".into()), scope);
        let narrow = CacheKey::new(
            SourceIdentity::Instance("x".into()),
            SettingScope::named(["work_mem"]),
        );
        assert_ne!(instance.file_name(), template.file_name());
        assert_ne!(instance.file_name(), narrow.file_name());
    }
}
