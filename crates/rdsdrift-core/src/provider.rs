// ── Backing-service seams ──
//
// The resolvers talk to the metadata service and to live databases only
// through these two traits. Production code uses the `rdsdrift_api`
// clients; tests plug in in-memory fakes.

use std::future::Future;

use secrecy::SecretString;

use rdsdrift_api::{DbInstance, DbParameter, PgSettingRow, RdsClient};

/// Read access to instance and parameter-group metadata.
pub trait MetadataProvider: Send + Sync {
    /// Every instance visible to the caller, fully paginated.
    fn list_instances(&self) -> impl Future<Output = Result<Vec<DbInstance>, rdsdrift_api::Error>> + Send;

    fn describe_instance(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<DbInstance, rdsdrift_api::Error>> + Send;

    /// Every parameter of a parameter group, fully paginated.
    fn template_values(
        &self,
        group: &str,
    ) -> impl Future<Output = Result<Vec<DbParameter>, rdsdrift_api::Error>> + Send;
}

impl MetadataProvider for RdsClient {
    async fn list_instances(&self) -> Result<Vec<DbInstance>, rdsdrift_api::Error> {
        self.list_db_instances().await
    }

    async fn describe_instance(&self, id: &str) -> Result<DbInstance, rdsdrift_api::Error> {
        self.describe_db_instance(id).await
    }

    async fn template_values(&self, group: &str) -> Result<Vec<DbParameter>, rdsdrift_api::Error> {
        self.describe_db_parameters(group).await
    }
}

/// Read access to a live database's runtime settings.
pub trait RuntimeSettingsProvider: Send + Sync {
    /// Connect, read the requested rows of `pg_settings` (all when `names`
    /// is `None`), and release the connection on every path.
    fn runtime_settings(
        &self,
        url: &SecretString,
        names: Option<&[String]>,
    ) -> impl Future<Output = Result<Vec<PgSettingRow>, rdsdrift_api::Error>> + Send;
}

/// One short-lived sqlx connection per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgRuntimeSettings;

impl RuntimeSettingsProvider for PgRuntimeSettings {
    async fn runtime_settings(
        &self,
        url: &SecretString,
        names: Option<&[String]>,
    ) -> Result<Vec<PgSettingRow>, rdsdrift_api::Error> {
        rdsdrift_api::fetch_runtime_settings(url, names).await
    }
}
