// rdsdrift-api: raw clients for the RDS metadata API (via the AWS CLI)
// and for PostgreSQL runtime settings (via sqlx).

pub mod error;
pub mod postgres;
pub mod rds;
pub mod transport;

pub use error::Error;
pub use postgres::{LiveConnection, PgSettingRow, fetch_runtime_settings, redact_url};
pub use rds::{DbInstance, DbParameter, Endpoint, ParameterGroupStatus, RdsClient};
pub use transport::AwsCliConfig;
