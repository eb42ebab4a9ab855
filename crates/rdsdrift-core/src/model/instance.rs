// ── Fleet instance summary ──

use serde::Serialize;

use super::source::SourceIdentity;

/// A database instance as listed by the fleet enumerator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceSummary {
    pub identifier: String,
    pub engine: Option<String>,
    pub engine_version: Option<String>,
    pub status: Option<String>,
    pub instance_class: Option<String>,
    /// The first attached parameter group; this is the one that resolves
    /// the instance's declared settings.
    pub parameter_group: Option<String>,
    /// `host:port` of the instance endpoint.
    pub endpoint: Option<String>,
}

impl InstanceSummary {
    pub fn identity(&self) -> SourceIdentity {
        SourceIdentity::Instance(self.identifier.clone())
    }
}
