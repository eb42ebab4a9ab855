// ── Audit and compare orchestration ──
//
// Wires a requested command to the resolvers, the cache and the diff
// engine. Declared sources (instances, parameter groups) always go through
// the cache; live connections never do.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures_util::future::try_join;
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use rdsdrift_api::RdsClient;

use crate::cache::{CacheKey, CacheStats, SettingsCache};
use crate::config::AuditorConfig;
use crate::diff::diff;
use crate::error::{CoreError, ErrorKind};
use crate::fleet::{self, FleetFilter};
use crate::model::{
    DeclaredSource, DriftRecord, InstanceSummary, SettingScope, SettingSet, SourceIdentity,
    SourceSpec,
};
use crate::provider::{MetadataProvider, PgRuntimeSettings, RuntimeSettingsProvider};
use crate::resolver::{LiveResolver, SettingsResolver, TemplateResolver};
use crate::units;

// ── Requests and reports ─────────────────────────────────────────────

/// Which settings to audit across which instances.
#[derive(Debug, Clone, Default)]
pub struct AuditRequest {
    names: Vec<String>,
    pub filter: FleetFilter,
}

impl AuditRequest {
    /// Duplicate names are dropped; first-seen order is kept for display.
    pub fn new<I, S>(names: I, filter: FleetFilter) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|n: &String| seen.insert(n.clone()))
            .collect();
        Self { names, filter }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn scope(&self) -> SettingScope {
        SettingScope::named(self.names.iter().cloned())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditRow {
    pub instance: String,
    pub parameter_group: Option<String>,
    pub settings: SettingSet,
}

/// An instance left out of an audit after a retryable failure.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedInstance {
    pub instance: String,
    pub kind: ErrorKind,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub settings: Vec<String>,
    pub rows: Vec<AuditRow>,
    pub skipped: Vec<SkippedInstance>,
}

impl AuditReport {
    /// Requested settings whose value differs between audited instances.
    /// An instance that does not declare a setting counts as a value.
    pub fn divergent_settings(&self) -> Vec<&str> {
        self.settings
            .iter()
            .filter(|name| {
                let values: BTreeSet<Option<&str>> =
                    self.rows.iter().map(|r| r.settings.value(name)).collect();
                values.len() > 1
            })
            .map(String::as_str)
            .collect()
    }
}

/// The outcome of comparing two sources.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub a: SourceIdentity,
    pub b: SourceIdentity,
    pub normalized: bool,
    pub drift: Vec<DriftRecord>,
}

impl Comparison {
    pub fn is_clean(&self) -> bool {
        self.drift.is_empty()
    }
}

// ── Auditor ──────────────────────────────────────────────────────────

/// Facade over resolvers, cache and diff engine.
///
/// Owns the process's [`SettingsCache`]; call [`close`](Self::close) when
/// done to get the cache statistics.
pub struct Auditor<P, R> {
    provider: Arc<P>,
    templates: TemplateResolver<P>,
    live: LiveResolver<R>,
    cache: SettingsCache,
    concurrency: usize,
}

impl Auditor<RdsClient, PgRuntimeSettings> {
    /// An auditor backed by the AWS command line and sqlx.
    pub fn new(config: &AuditorConfig) -> Self {
        Self::with_providers(
            RdsClient::new(config.aws.clone()),
            PgRuntimeSettings,
            SettingsCache::open(&config.cache),
            config.concurrency,
        )
    }
}

impl<P: MetadataProvider, R: RuntimeSettingsProvider> Auditor<P, R> {
    pub fn with_providers(provider: P, runtime: R, cache: SettingsCache, concurrency: usize) -> Self {
        let provider = Arc::new(provider);
        Self {
            templates: TemplateResolver::new(Arc::clone(&provider)),
            live: LiveResolver::new(Arc::new(runtime)),
            provider,
            cache,
            concurrency: concurrency.max(1),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn cache(&self) -> &SettingsCache {
        &self.cache
    }

    /// Finish the run, closing the cache.
    pub fn close(self) -> CacheStats {
        self.cache.close()
    }

    // ── Fleet ────────────────────────────────────────────────────────

    /// Instances whose identifier matches `filter`, sorted by identifier.
    pub async fn instances(&self, filter: &FleetFilter) -> Result<Vec<InstanceSummary>, CoreError> {
        let all = fleet::list_instances(self.provider.as_ref()).await?;
        Ok(fleet::filter(all, filter))
    }

    // ── Resolution ───────────────────────────────────────────────────

    /// Declared settings of an instance or parameter group, through the cache.
    pub async fn resolve_declared(
        &self,
        source: &DeclaredSource,
        scope: &SettingScope,
    ) -> Result<SettingSet, CoreError> {
        let key = CacheKey::new(source.identity(), scope.clone());
        self.cache
            .get(&key, || self.templates.resolve(source, scope))
            .await
    }

    /// Declared settings of a listed instance, through the same cache entry
    /// as `instance:<id>`. Uses the group from the listing when it has one.
    async fn resolve_listed(
        &self,
        instance: &InstanceSummary,
        scope: &SettingScope,
    ) -> Result<SettingSet, CoreError> {
        let source = DeclaredSource::Instance(instance.identifier.clone());
        let Some(group) = instance.parameter_group.as_deref() else {
            return self.resolve_declared(&source, scope).await;
        };
        let key = CacheKey::new(source.identity(), scope.clone());
        self.cache
            .get(&key, || {
                self.templates
                    .resolve_in_group(&instance.identifier, group, scope)
            })
            .await
    }

    /// Settings of any source. Live connections bypass the cache.
    pub async fn resolve(&self, source: &SourceSpec, scope: &SettingScope) -> Result<SettingSet, CoreError> {
        match source {
            SourceSpec::Declared(declared) => self.resolve_declared(declared, scope).await,
            SourceSpec::Live(conn) => self.live.resolve(conn, scope).await,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Resolve both sources concurrently and diff them.
    ///
    /// With `normalize`, values are rewritten into base units first.
    pub async fn compare(
        &self,
        a: &SourceSpec,
        b: &SourceSpec,
        scope: &SettingScope,
        normalize: bool,
    ) -> Result<Comparison, CoreError> {
        let (mut left, mut right) = try_join(self.resolve(a, scope), self.resolve(b, scope)).await?;
        if normalize {
            left = units::normalize(&left);
            right = units::normalize(&right);
        }
        let drift = diff(&left, &right);
        info!(a = %left.source(), b = %right.source(), drift = drift.len(), "comparison complete");
        Ok(Comparison {
            a: left.source().clone(),
            b: right.source().clone(),
            normalized: normalize,
            drift,
        })
    }

    /// Resolve the requested settings for every matching instance.
    ///
    /// Instances are resolved concurrently, bounded by the configured
    /// limit. A `Transient` or `Connection` failure skips the instance and
    /// is recorded in the report; any other failure aborts the run.
    /// `on_resolved` is called with each instance identifier as it
    /// finishes, successfully or not.
    pub async fn audit(
        &self,
        request: &AuditRequest,
        mut on_resolved: impl FnMut(&str),
    ) -> Result<AuditReport, CoreError> {
        let instances = self.instances(&request.filter).await?;
        let scope = request.scope();
        debug!(
            instances = instances.len(),
            concurrency = self.concurrency,
            scope = %scope.canonical(),
            "starting audit"
        );

        let scope = &scope;
        let mut pending = stream::iter(instances)
            .map(|instance| async move {
                let result = self.resolve_listed(&instance, scope).await;
                (instance, result)
            })
            .buffer_unordered(self.concurrency);

        let mut rows = Vec::new();
        let mut skipped = Vec::new();
        while let Some((instance, result)) = pending.next().await {
            on_resolved(&instance.identifier);
            match result {
                Ok(settings) => rows.push(AuditRow {
                    instance: instance.identifier,
                    parameter_group: instance.parameter_group,
                    settings,
                }),
                Err(e) if e.is_retryable() => {
                    warn!(instance = %instance.identifier, error = %e, "skipping instance");
                    skipped.push(SkippedInstance {
                        instance: instance.identifier,
                        kind: e.kind(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        rows.sort_by(|a, b| a.instance.cmp(&b.instance));
        skipped.sort_by(|a, b| a.instance.cmp(&b.instance));
        info!(resolved = rows.len(), skipped = skipped.len(), "audit complete");

        Ok(AuditReport {
            settings: request.names().to_vec(),
            rows,
            skipped,
        })
    }
}
