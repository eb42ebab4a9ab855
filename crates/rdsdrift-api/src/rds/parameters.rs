// RDS parameter group endpoints
//
// `describe-db-parameters` does not support server-side name filters, so
// the full group is always fetched and callers narrow it down.

use tracing::debug;

use crate::error::Error;
use crate::rds::client::RdsClient;
use crate::rds::models::{DbParameter, DescribeDbParametersPage};

impl RdsClient {
    /// Fetch every parameter of a DB parameter group.
    ///
    /// `aws rds describe-db-parameters --db-parameter-group-name {name}`
    pub async fn describe_db_parameters(&self, group: &str) -> Result<Vec<DbParameter>, Error> {
        debug!(group, "describing db parameters");
        let args = ["--db-parameter-group-name".to_owned(), group.to_owned()];
        self.paginate::<DescribeDbParametersPage>("describe-db-parameters", &args)
            .await
    }
}
