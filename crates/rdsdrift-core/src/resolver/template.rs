use std::sync::Arc;

use tracing::debug;

use crate::convert::declared_setting;
use crate::error::CoreError;
use crate::model::{DeclaredSource, SettingScope, SettingSet, SourceIdentity};
use crate::provider::MetadataProvider;

use super::SettingsResolver;

/// Resolves declared values from parameter groups.
///
/// An `Instance` source is resolved through the first parameter group
/// attached to it. Values are returned as declared, so formula
/// placeholders come back verbatim, and parameters left at the engine
/// default are omitted.
pub struct TemplateResolver<P> {
    provider: Arc<P>,
}

impl<P> Clone for TemplateResolver<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: MetadataProvider> TemplateResolver<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// The parameter group that defines an instance's declared settings.
    pub async fn parameter_group_of(&self, instance: &str) -> Result<String, CoreError> {
        let identity = SourceIdentity::Instance(instance.to_owned());
        let described = self
            .provider
            .describe_instance(instance)
            .await
            .map_err(|e| CoreError::from(e).with_origin(&identity))?;
        described
            .parameter_groups
            .into_iter()
            .next()
            .map(|g| g.name)
            .ok_or_else(|| CoreError::not_found(&identity, "no parameter group attached"))
    }

    /// Declared settings of `instance` when its parameter group is already
    /// known, e.g. from the fleet listing.
    pub async fn resolve_in_group(
        &self,
        instance: &str,
        group: &str,
        scope: &SettingScope,
    ) -> Result<SettingSet, CoreError> {
        self.group_settings(group, SourceIdentity::Instance(instance.to_owned()), scope)
            .await
    }

    async fn group_settings(
        &self,
        group: &str,
        identity: SourceIdentity,
        scope: &SettingScope,
    ) -> Result<SettingSet, CoreError> {
        let params = self
            .provider
            .template_values(group)
            .await
            .map_err(|e| CoreError::from(e).with_origin(&identity))?;
        let total = params.len();
        let set = SettingSet::new(
            identity,
            params
                .iter()
                .filter(|p| scope.contains(&p.name))
                .filter_map(declared_setting),
        );
        debug!(group, total, resolved = set.len(), "parameter group resolved");
        Ok(set)
    }
}

impl<P: MetadataProvider> SettingsResolver for TemplateResolver<P> {
    type Source = DeclaredSource;

    async fn resolve(&self, source: &DeclaredSource, scope: &SettingScope) -> Result<SettingSet, CoreError> {
        match source {
            DeclaredSource::Template(name) => {
                self.group_settings(name, source.identity(), scope).await
            }
            DeclaredSource::Instance(id) => {
                let group = self.parameter_group_of(id).await?;
                debug!(instance = %id, group = %group, "instance uses parameter group");
                self.group_settings(&group, source.identity(), scope).await
            }
        }
    }
}
