// RDS metadata client modules
//
// Instance and parameter-group lookups, performed through the AWS
// command line with JSON output.

pub mod client;
pub mod instances;
pub mod models;
pub mod parameters;

pub use client::RdsClient;
pub use models::{DbInstance, DbParameter, Endpoint, ParameterGroupStatus};
