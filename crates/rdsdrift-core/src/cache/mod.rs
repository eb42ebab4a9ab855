// ── Settings cache ──
//
// Keyed, TTL-based store in front of the declared-settings resolver.
// Entries persist as one file per key so repeated invocations skip the
// metadata service. Nothing here is ever fatal: unreadable entries count
// as misses, an unusable directory turns the layer into a pass-through,
// and both are reported as collected warnings.

mod key;
mod store;

use std::fmt;
use std::fs;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, info, warn};

pub use key::CacheKey;
use store::{ReadOutcome, StoredEntry};

use crate::error::CoreError;
use crate::model::SettingSet;

/// Entries older than this are re-fetched unless configured otherwise.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub dir: PathBuf,
    pub ttl: Duration,
    /// `false` bypasses reads and writes entirely.
    pub enabled: bool,
}

impl CacheConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ttl: DEFAULT_TTL,
            enabled: true,
        }
    }
}

/// A non-fatal cache problem, surfaced to the caller after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CacheWarning {
    /// An entry could not be read or parsed and was treated as a miss.
    Corrupted { path: PathBuf, reason: String },
    /// The cache directory cannot be used; every lookup fetches.
    Unavailable { path: PathBuf, reason: String },
    /// A fresh value could not be persisted.
    WriteFailed { path: PathBuf, reason: String },
}

impl fmt::Display for CacheWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted { path, reason } => {
                write!(f, "ignored corrupt cache entry {}: {reason}", path.display())
            }
            Self::Unavailable { path, reason } => {
                write!(f, "cache directory {} unusable, caching disabled: {reason}", path.display())
            }
            Self::WriteFailed { path, reason } => {
                write!(f, "could not write cache entry {}: {reason}", path.display())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub corrupt: u64,
}

/// One persisted entry, as reported by [`SettingsCache::inventory`].
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryInfo {
    pub key: CacheKey,
    pub fetched_at: DateTime<Utc>,
    pub settings: usize,
    pub fresh: bool,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheInventory {
    pub entries: Vec<CacheEntryInfo>,
    pub corrupt: usize,
}

/// The per-process cache handle.
///
/// Open once, pass by reference to every lookup, and [`close`](Self::close)
/// at exit. Concurrent lookups of the same key are single-flighted: one
/// caller fetches and writes, the others wait and then read the stored
/// entry.
pub struct SettingsCache {
    dir: Option<PathBuf>,
    enabled: bool,
    ttl: Duration,
    clock: Clock,
    in_flight: DashMap<CacheKey, Gate>,
    warnings: Mutex<Vec<CacheWarning>>,
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    corrupt: AtomicU64,
}

impl SettingsCache {
    /// Open (creating if needed) the cache directory.
    ///
    /// A directory that cannot be created leaves the cache in always-fetch
    /// mode with an `Unavailable` warning.
    pub fn open(config: &CacheConfig) -> Self {
        let mut cache = Self::with_dir(None, config.enabled, config.ttl);
        if !config.enabled {
            debug!("settings cache disabled");
            return cache;
        }
        match fs::create_dir_all(&config.dir) {
            Ok(()) => {
                debug!(dir = %config.dir.display(), ttl = ?config.ttl, "settings cache opened");
                cache.dir = Some(config.dir.clone());
            }
            Err(e) => {
                warn!(dir = %config.dir.display(), error = %e, "cache directory unusable, fetching every time");
                cache.push_warning(CacheWarning::Unavailable {
                    path: config.dir.clone(),
                    reason: e.to_string(),
                });
            }
        }
        cache
    }

    /// A cache that never reads or writes.
    pub fn disabled() -> Self {
        Self::with_dir(None, false, DEFAULT_TTL)
    }

    fn with_dir(dir: Option<PathBuf>, enabled: bool, ttl: Duration) -> Self {
        Self {
            dir,
            enabled,
            ttl,
            clock: Arc::new(Utc::now),
            in_flight: DashMap::new(),
            warnings: Mutex::new(Vec::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            corrupt: AtomicU64::new(0),
        }
    }

    /// Replace the wall clock used for entry ages.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.dir.is_some()
    }

    /// Where the entry for `key` lives, if the cache is usable.
    pub fn entry_path(&self, key: &CacheKey) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(key.file_name()))
    }

    // ── Lookup ───────────────────────────────────────────────────────

    /// Return the cached set for `key` if it is younger than the TTL,
    /// otherwise call `fetch`, persist its result, and return it.
    ///
    /// Errors from `fetch` propagate unchanged and are never stored.
    pub async fn get<F, Fut>(&self, key: &CacheKey, fetch: F) -> Result<SettingSet, CoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SettingSet, CoreError>>,
    {
        let Some(path) = self.entry_path(key).filter(|_| self.enabled) else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return fetch().await;
        };

        let _flight = Flight {
            in_flight: &self.in_flight,
            key,
        };
        let gate = Arc::clone(&self.in_flight.entry(key.clone()).or_default());
        let _permit = gate.lock_owned().await;

        if let Some(set) = self.lookup(&path, key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            info!(key = %key, "cache hit");
            return Ok(set);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        info!(key = %key, "cache miss");
        let set = fetch().await?;
        self.store(&path, key, &set);
        Ok(set)
    }

    fn lookup(&self, path: &Path, key: &CacheKey) -> Option<SettingSet> {
        match store::read_entry(path, key) {
            ReadOutcome::Missing => None,
            ReadOutcome::Found(entry) if self.is_fresh(entry.fetched_at) => Some(entry.settings),
            ReadOutcome::Found(entry) => {
                debug!(key = %key, fetched_at = %entry.fetched_at, "cache entry expired");
                None
            }
            ReadOutcome::Corrupt(reason) => {
                warn!(path = %path.display(), %reason, "corrupt cache entry, refetching");
                self.corrupt.fetch_add(1, Ordering::Relaxed);
                self.push_warning(CacheWarning::Corrupted {
                    path: path.to_path_buf(),
                    reason,
                });
                None
            }
        }
    }

    fn store(&self, path: &Path, key: &CacheKey, set: &SettingSet) {
        let entry = StoredEntry {
            key: key.clone(),
            fetched_at: (self.clock)(),
            settings: set.clone(),
        };
        match store::write_entry(path, &entry) {
            Ok(()) => {
                self.writes.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, settings = set.len(), "cache entry written");
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to write cache entry");
                self.push_warning(CacheWarning::WriteFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Younger than the TTL. Timestamps from the future count as stale.
    fn is_fresh(&self, fetched_at: DateTime<Utc>) -> bool {
        ((self.clock)() - fetched_at)
            .to_std()
            .is_ok_and(|age| age < self.ttl)
    }

    // ── Warnings and statistics ──────────────────────────────────────

    fn push_warning(&self, warning: CacheWarning) {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(warning);
    }

    /// Drain the warnings collected so far.
    pub fn take_warnings(&self) -> Vec<CacheWarning> {
        std::mem::take(&mut *self.warnings.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            corrupt: self.corrupt.load(Ordering::Relaxed),
        }
    }

    /// Finish with the cache and report what it did.
    pub fn close(self) -> CacheStats {
        let stats = self.stats();
        debug!(
            hits = stats.hits,
            misses = stats.misses,
            writes = stats.writes,
            corrupt = stats.corrupt,
            "settings cache closed"
        );
        stats
    }

    // ── Maintenance ──────────────────────────────────────────────────

    /// Every entry file in the directory, with unreadable ones counted.
    pub fn inventory(&self) -> io::Result<CacheInventory> {
        let mut inventory = CacheInventory::default();
        let Some(dir) = self.dir.as_deref() else {
            return Ok(inventory);
        };
        for path in entry_files(dir)? {
            let parsed = fs::read(&path)
                .ok()
                .and_then(|bytes| serde_json::from_slice::<StoredEntry>(&bytes).ok());
            match parsed {
                Some(entry) => inventory.entries.push(CacheEntryInfo {
                    fresh: self.is_fresh(entry.fetched_at),
                    settings: entry.settings.len(),
                    fetched_at: entry.fetched_at,
                    key: entry.key,
                    path,
                }),
                None => inventory.corrupt += 1,
            }
        }
        inventory
            .entries
            .sort_by(|a, b| a.key.to_string().cmp(&b.key.to_string()));
        Ok(inventory)
    }

    /// Delete every entry file. Returns how many were removed.
    pub fn clear(&self) -> io::Result<usize> {
        let Some(dir) = self.dir.as_deref() else {
            return Ok(0);
        };
        let mut removed = 0;
        for path in entry_files(dir)? {
            fs::remove_file(&path)?;
            removed += 1;
        }
        info!(dir = %dir.display(), removed, "cache cleared");
        Ok(removed)
    }
}

impl fmt::Debug for SettingsCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsCache")
            .field("dir", &self.dir)
            .field("enabled", &self.enabled)
            .field("ttl", &self.ttl)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

type Gate = Arc<tokio::sync::Mutex<()>>;

/// Drops the single-flight gate of a key once nobody else holds it.
///
/// Declared before the permit so the permit is released first.
struct Flight<'a> {
    in_flight: &'a DashMap<CacheKey, Gate>,
    key: &'a CacheKey,
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        self.in_flight
            .remove_if(self.key, |_, gate| Arc::strong_count(gate) == 1);
    }
}

fn entry_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
