// ── Fleet enumerator and filter ──

use tracing::debug;

use crate::error::CoreError;
use crate::model::InstanceSummary;
use crate::provider::MetadataProvider;

/// Case-sensitive substring predicate over instance identifiers.
///
/// The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetFilter(String);

impl FleetFilter {
    pub fn new(substring: impl Into<String>) -> Self {
        Self(substring.into())
    }

    pub fn matches(&self, name: &str) -> bool {
        name.contains(self.0.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Option<String>> for FleetFilter {
    fn from(value: Option<String>) -> Self {
        Self(value.unwrap_or_default())
    }
}

/// Keep the instances whose identifier contains the filter substring.
pub fn filter(instances: Vec<InstanceSummary>, by: &FleetFilter) -> Vec<InstanceSummary> {
    if by.is_empty() {
        return instances;
    }
    instances
        .into_iter()
        .filter(|i| by.matches(&i.identifier))
        .collect()
}

/// Every instance in scope, sorted by identifier.
pub async fn list_instances<P: MetadataProvider>(provider: &P) -> Result<Vec<InstanceSummary>, CoreError> {
    let mut instances: Vec<InstanceSummary> = provider
        .list_instances()
        .await?
        .into_iter()
        .map(InstanceSummary::from)
        .collect();
    instances.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    debug!(count = instances.len(), "fleet enumerated");
    Ok(instances)
}
