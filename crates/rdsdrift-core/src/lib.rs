//! Settings resolution, caching and drift detection for RDS PostgreSQL.
//!
//! - **[`Auditor`]**: facade wiring a command (audit / compare / show) to
//!   the resolvers, the cache and the diff engine.
//!
//! - **Resolvers** ([`resolver`]): [`TemplateResolver`] reads declared
//!   values from parameter groups; [`LiveResolver`] reads materialized
//!   values from `pg_settings`. Both implement [`SettingsResolver`].
//!
//! - **[`SettingsCache`]**: TTL-based, one-file-per-key disk cache in
//!   front of the declared resolver, with single-flighted lookups.
//!
//! - **[`diff()`]**: pure, name-ordered comparison of two
//!   [`SettingSet`]s.
//!
//! - **Fleet** ([`fleet`]): enumeration and substring filtering of instances.
//!
//! The backing services are reached through [`MetadataProvider`] and
//! [`RuntimeSettingsProvider`], implemented for the `rdsdrift-api` clients.

pub mod auditor;
pub mod cache;
pub mod config;
pub mod convert;
pub mod diff;
pub mod error;
pub mod fleet;
pub mod model;
pub mod provider;
pub mod resolver;
pub mod units;

// ── Primary re-exports ──────────────────────────────────────────────
pub use auditor::{AuditReport, AuditRequest, AuditRow, Auditor, Comparison, SkippedInstance};
pub use cache::{
    CacheConfig, CacheEntryInfo, CacheInventory, CacheKey, CacheStats, CacheWarning,
    DEFAULT_TTL, SettingsCache,
};
pub use config::{AuditorConfig, DEFAULT_CONCURRENCY};
pub use diff::diff;
pub use error::{CoreError, ErrorKind};
pub use fleet::FleetFilter;
pub use provider::{MetadataProvider, PgRuntimeSettings, RuntimeSettingsProvider};
pub use resolver::{LiveResolver, SettingsResolver, TemplateResolver};

pub use model::{
    ConnectionDescriptor, DeclaredSource, DriftRecord, InstanceSummary, Setting, SettingScope,
    SettingSet, SourceIdentity, SourceKind, SourceSpec,
};
