#![allow(clippy::unwrap_used)]
// SettingsCache behavior on a real temporary directory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use rdsdrift_core::{
    CacheConfig, CacheKey, CacheWarning, CoreError, ErrorKind, Setting, SettingScope, SettingSet,
    SettingsCache, SourceIdentity,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn key() -> CacheKey {
    CacheKey::new(
        SourceIdentity::Instance("orders-primary".into()),
        SettingScope::named(["max_wal_size"]),
    )
}

fn settings(value: &str) -> SettingSet {
    SettingSet::new(
        SourceIdentity::Instance("orders-primary".into()),
        [Setting::new("max_wal_size", value)],
    )
}

/// A manually advanced clock.
#[derive(Clone)]
struct TestClock(Arc<Mutex<DateTime<Utc>>>);

impl TestClock {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(Utc::now())))
    }

    fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += chrono::Duration::from_std(by).unwrap();
    }

    fn reader(&self) -> impl Fn() -> DateTime<Utc> + Send + Sync + 'static {
        let inner = Arc::clone(&self.0);
        move || *inner.lock().unwrap()
    }
}

fn open(dir: &TempDir, ttl: Duration, clock: &TestClock) -> SettingsCache {
    let config = CacheConfig {
        ttl,
        ..CacheConfig::new(dir.path().join("entries"))
    };
    SettingsCache::open(&config).with_clock(clock.reader())
}

/// Run `get` with a fetch that counts its calls and returns `value`.
async fn counted_get(cache: &SettingsCache, calls: &AtomicUsize, value: &str) -> SettingSet {
    cache
        .get(&key(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(settings(value))
        })
        .await
        .unwrap()
}

const HOUR: Duration = Duration::from_secs(3600);

// ── TTL ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_hit_within_ttl_skips_fetch() {
    let dir = TempDir::new().unwrap();
    let clock = TestClock::new();
    let cache = open(&dir, HOUR, &clock);
    let calls = AtomicUsize::new(0);

    counted_get(&cache, &calls, "1GB").await;
    clock.advance(Duration::from_secs(3599));
    let second = counted_get(&cache, &calls, "2GB").await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(second.value("max_wal_size"), Some("1GB"));
    assert_eq!(cache.stats().hits, 1);
    assert_eq!(cache.stats().misses, 1);
}

#[tokio::test]
async fn test_expired_entry_is_refetched() {
    let dir = TempDir::new().unwrap();
    let clock = TestClock::new();
    let cache = open(&dir, HOUR, &clock);
    let calls = AtomicUsize::new(0);

    counted_get(&cache, &calls, "1GB").await;
    clock.advance(HOUR);
    let second = counted_get(&cache, &calls, "2GB").await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(second.value("max_wal_size"), Some("2GB"));
}

#[tokio::test]
async fn test_zero_ttl_always_fetches() {
    let dir = TempDir::new().unwrap();
    let clock = TestClock::new();
    let cache = open(&dir, Duration::ZERO, &clock);
    let calls = AtomicUsize::new(0);

    counted_get(&cache, &calls, "1GB").await;
    counted_get(&cache, &calls, "1GB").await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_entries_survive_reopening() {
    let dir = TempDir::new().unwrap();
    let clock = TestClock::new();
    let calls = AtomicUsize::new(0);

    let first = open(&dir, HOUR, &clock);
    counted_get(&first, &calls, "1GB").await;
    first.close();

    let second = open(&dir, HOUR, &clock);
    let set = counted_get(&second, &calls, "2GB").await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(set.value("max_wal_size"), Some("1GB"));
}

#[tokio::test]
async fn test_scope_must_match_exactly() {
    let dir = TempDir::new().unwrap();
    let clock = TestClock::new();
    let cache = open(&dir, HOUR, &clock);
    let calls = AtomicUsize::new(0);
    counted_get(&cache, &calls, "1GB").await;

    let wider = CacheKey::new(
        SourceIdentity::Instance("orders-primary".into()),
        SettingScope::named(["max_wal_size", "work_mem"]),
    );
    cache
        .get(&wider, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(settings("1GB"))
        })
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// ── Failure handling ────────────────────────────────────────────────

#[tokio::test]
async fn test_corrupt_entry_degrades_to_fetch() {
    let dir = TempDir::new().unwrap();
    let clock = TestClock::new();
    let cache = open(&dir, HOUR, &clock);
    let calls = AtomicUsize::new(0);
    let path = cache.entry_path(&key()).unwrap();
    std::fs::write(&path, b"\x00\x01 definitely not json").unwrap();

    let set = counted_get(&cache, &calls, "1GB").await;

    assert_eq!(set.value("max_wal_size"), Some("1GB"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let warnings = cache.take_warnings();
    assert_eq!(warnings.len(), 1);
    assert!(matches!(&warnings[0], CacheWarning::Corrupted { path: p, .. } if *p == path));

    // The entry was rewritten and serves the next lookup.
    counted_get(&cache, &calls, "2GB").await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(cache.take_warnings().is_empty());
}

#[tokio::test]
async fn test_unusable_directory_always_fetches() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();
    let cache = SettingsCache::open(&CacheConfig::new(blocker.join("entries")));
    let calls = AtomicUsize::new(0);

    counted_get(&cache, &calls, "1GB").await;
    counted_get(&cache, &calls, "1GB").await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(!cache.is_enabled());
    assert!(matches!(
        cache.take_warnings().as_slice(),
        [CacheWarning::Unavailable { .. }]
    ));
}

#[tokio::test]
async fn test_fetch_errors_are_not_cached() {
    let dir = TempDir::new().unwrap();
    let clock = TestClock::new();
    let cache = open(&dir, HOUR, &clock);
    let calls = AtomicUsize::new(0);

    let err = cache
        .get(&key(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(CoreError::Transient {
                origin: None,
                message: "Rate exceeded".into(),
            })
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transient);

    counted_get(&cache, &calls, "1GB").await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_disabled_cache_never_touches_disk() {
    let dir = TempDir::new().unwrap();
    let config = CacheConfig {
        enabled: false,
        ..CacheConfig::new(dir.path().join("entries"))
    };
    let cache = SettingsCache::open(&config);
    let calls = AtomicUsize::new(0);

    counted_get(&cache, &calls, "1GB").await;
    counted_get(&cache, &calls, "1GB").await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(!dir.path().join("entries").exists());
}

// ── Concurrency ─────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_lookups_are_single_flighted() {
    let dir = TempDir::new().unwrap();
    let clock = TestClock::new();
    let cache = open(&dir, HOUR, &clock);
    let calls = AtomicUsize::new(0);
    let key = key();

    let lookups = (0..8).map(|_| {
        cache.get(&key, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(settings("1GB"))
        })
    });
    let results = join_all(lookups).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(results.iter().all(|r| r.as_ref().unwrap().value("max_wal_size") == Some("1GB")));
    assert_eq!(cache.stats().writes, 1);
}

// ── Maintenance ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_inventory_and_clear() {
    let dir = TempDir::new().unwrap();
    let clock = TestClock::new();
    let cache = open(&dir, HOUR, &clock);
    let calls = AtomicUsize::new(0);
    counted_get(&cache, &calls, "1GB").await;
    std::fs::write(cache.dir().unwrap().join("junk.json"), b"[]").unwrap();

    let inventory = cache.inventory().unwrap();
    assert_eq!(inventory.entries.len(), 1);
    assert_eq!(inventory.corrupt, 1);
    assert!(inventory.entries[0].fresh);
    assert_eq!(inventory.entries[0].key, key());

    assert_eq!(cache.clear().unwrap(), 2);
    assert!(cache.inventory().unwrap().entries.is_empty());
}
