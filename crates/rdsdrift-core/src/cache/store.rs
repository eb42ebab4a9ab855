// ── On-disk entry files ──
//
// One JSON document per key: `{key, fetched_at, settings}`. Writes go to
// a temporary file in the cache directory which is then renamed over the
// entry, so readers see either the old entry or the new one.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::key::CacheKey;
use crate::model::SettingSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredEntry {
    pub key: CacheKey,
    pub fetched_at: DateTime<Utc>,
    pub settings: SettingSet,
}

pub(crate) enum ReadOutcome {
    Missing,
    Found(StoredEntry),
    Corrupt(String),
}

/// Read and validate the entry at `path`.
pub(crate) fn read_entry(path: &Path, key: &CacheKey) -> ReadOutcome {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return ReadOutcome::Missing,
        Err(e) => return ReadOutcome::Corrupt(format!("unreadable: {e}")),
    };
    match serde_json::from_slice::<StoredEntry>(&bytes) {
        Ok(entry) if entry.key == *key => ReadOutcome::Found(entry),
        Ok(entry) => ReadOutcome::Corrupt(format!("entry holds a different key ({})", entry.key)),
        Err(e) => ReadOutcome::Corrupt(format!("invalid JSON: {e}")),
    }
}

/// Atomically replace the entry at `path`.
pub(crate) fn write_entry(path: &Path, entry: &StoredEntry) -> io::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "entry path has no parent"))?;
    let body = serde_json::to_vec_pretty(entry).map_err(io::Error::other)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::model::{Setting, SettingScope, SourceIdentity};

    fn entry() -> StoredEntry {
        let source = SourceIdentity::Template("pg15-orders".into());
        StoredEntry {
            key: CacheKey::new(source.clone(), SettingScope::All),
            fetched_at: Utc::now(),
            settings: SettingSet::new(source, [Setting::new("work_mem", "4096").with_unit("kB")]),
        }
    }

    #[test]
    fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let e = entry();
        let path = dir.path().join(e.key.file_name());

        write_entry(&path, &e).unwrap();

        match read_entry(&path, &e.key) {
            ReadOutcome::Found(read) => assert_eq!(read.settings, e.settings),
            _ => panic!("expected entry"),
        }
    }

    #[test]
    fn leaves_no_temporary_files() {
        let dir = TempDir::new().unwrap();
        let e = entry();
        let path = dir.path().join(e.key.file_name());

        write_entry(&path, &e).unwrap();
        write_entry(&path, &e).unwrap();

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn garbage_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let e = entry();
        let path = dir.path().join(e.key.file_name());
        fs::write(&path, b"{not json").unwrap();

        assert!(matches!(read_entry(&path, &e.key), ReadOutcome::Corrupt(_)));
    }

    #[test]
    fn foreign_key_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let e = entry();
        let path = dir.path().join(e.key.file_name());
        write_entry(&path, &e).unwrap();

        let other = CacheKey::new(SourceIdentity::Template("other".into()), SettingScope::All);
        assert!(matches!(read_entry(&path, &other), ReadOutcome::Corrupt(_)));
    }

    #[test]
    fn missing_file() {
        let dir = TempDir::new().unwrap();
        let e = entry();
        assert!(matches!(
            read_entry(&dir.path().join("nope.json"), &e.key),
            ReadOutcome::Missing
        ));
    }
}
