use std::sync::Arc;

use tracing::debug;

use crate::convert::runtime_setting;
use crate::error::CoreError;
use crate::model::{ConnectionDescriptor, SettingScope, SettingSet};
use crate::provider::RuntimeSettingsProvider;

use super::SettingsResolver;

/// Resolves materialized values from a live database's `pg_settings`.
///
/// One connection, one query, release. Nothing is cached here.
pub struct LiveResolver<R> {
    provider: Arc<R>,
}

impl<R> Clone for LiveResolver<R> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<R: RuntimeSettingsProvider> LiveResolver<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

impl<R: RuntimeSettingsProvider> SettingsResolver for LiveResolver<R> {
    type Source = ConnectionDescriptor;

    async fn resolve(
        &self,
        source: &ConnectionDescriptor,
        scope: &SettingScope,
    ) -> Result<SettingSet, CoreError> {
        let identity = source.identity();
        let names = scope.names();
        let rows = self
            .provider
            .runtime_settings(source.url(), names.as_deref())
            .await
            .map_err(|e| CoreError::from(e).with_origin(&identity))?;

        let set = SettingSet::new(
            identity,
            rows.iter()
                .filter(|r| scope.contains(&r.name))
                .filter_map(runtime_setting),
        );
        debug!(url = source.display_url(), resolved = set.len(), "runtime settings resolved");
        Ok(set)
    }
}
