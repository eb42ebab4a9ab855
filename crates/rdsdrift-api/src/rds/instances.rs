// RDS instance endpoints
//
// `describe-db-instances`, both fleet-wide (paginated) and for a single
// identifier.

use tracing::debug;

use crate::error::Error;
use crate::rds::client::RdsClient;
use crate::rds::models::{DbInstance, DescribeDbInstancesPage};

impl RdsClient {
    /// List every DB instance visible to the caller in the configured region.
    ///
    /// `aws rds describe-db-instances`, following `NextToken` to the end.
    pub async fn list_db_instances(&self) -> Result<Vec<DbInstance>, Error> {
        debug!("listing db instances");
        self.paginate::<DescribeDbInstancesPage>("describe-db-instances", &[])
            .await
    }

    /// Describe a single DB instance.
    ///
    /// `aws rds describe-db-instances --db-instance-identifier {id}`. The
    /// service reports an unknown identifier as `DBInstanceNotFound`; an
    /// empty result is mapped to the same error.
    pub async fn describe_db_instance(&self, identifier: &str) -> Result<DbInstance, Error> {
        debug!(identifier, "describing db instance");
        let args = ["--db-instance-identifier".to_owned(), identifier.to_owned()];
        let instances = self
            .paginate::<DescribeDbInstancesPage>("describe-db-instances", &args)
            .await?;
        instances
            .into_iter()
            .find(|i| i.identifier == identifier)
            .ok_or_else(|| Error::Aws {
                code: "DBInstanceNotFound".into(),
                operation: "DescribeDBInstances".into(),
                message: format!("DBInstance {identifier} not found."),
            })
    }
}
