// RDS response models
//
// Shapes of the `describe-db-instances` and `describe-db-parameters`
// JSON documents as emitted by `aws --output json`. Only the fields the
// auditor reads are modelled; everything else is ignored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One page of a paginated CLI response.
///
/// The CLI emits `NextToken` when `--max-items` truncated the result;
/// feeding it back through `--starting-token` yields the next page.
pub trait Page: DeserializeOwned {
    type Item;

    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

/// A database instance as reported by `describe-db-instances`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DbInstance {
    #[serde(rename = "DBInstanceIdentifier")]
    pub identifier: String,
    #[serde(rename = "DBInstanceClass", default)]
    pub instance_class: Option<String>,
    #[serde(rename = "Engine", default)]
    pub engine: Option<String>,
    #[serde(rename = "EngineVersion", default)]
    pub engine_version: Option<String>,
    #[serde(rename = "DBInstanceStatus", default)]
    pub status: Option<String>,
    #[serde(rename = "Endpoint", default)]
    pub endpoint: Option<Endpoint>,
    #[serde(rename = "DBParameterGroups", default)]
    pub parameter_groups: Vec<ParameterGroupStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Endpoint {
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Port", default)]
    pub port: Option<u16>,
}

/// Parameter group attachment of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ParameterGroupStatus {
    #[serde(rename = "DBParameterGroupName")]
    pub name: String,
    #[serde(rename = "ParameterApplyStatus", default)]
    pub apply_status: Option<String>,
}

/// A single parameter of a DB parameter group.
///
/// `value` is `None` when the group leaves the parameter at the engine
/// default. The unit, when there is one, lives at the start of the
/// description, e.g. `"(8kB) Sets the number of ..."`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DbParameter {
    #[serde(rename = "ParameterName")]
    pub name: String,
    #[serde(rename = "ParameterValue", default)]
    pub value: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Source", default)]
    pub source: Option<String>,
    #[serde(rename = "ApplyType", default)]
    pub apply_type: Option<String>,
    #[serde(rename = "DataType", default)]
    pub data_type: Option<String>,
    #[serde(rename = "AllowedValues", default)]
    pub allowed_values: Option<String>,
    #[serde(rename = "IsModifiable", default)]
    pub is_modifiable: bool,
    #[serde(rename = "ApplyMethod", default)]
    pub apply_method: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DescribeDbInstancesPage {
    #[serde(rename = "DBInstances", default)]
    instances: Vec<DbInstance>,
    #[serde(rename = "NextToken", default)]
    next_token: Option<String>,
}

impl Page for DescribeDbInstancesPage {
    type Item = DbInstance;

    fn into_parts(self) -> (Vec<DbInstance>, Option<String>) {
        (self.instances, self.next_token)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DescribeDbParametersPage {
    #[serde(rename = "Parameters", default)]
    parameters: Vec<DbParameter>,
    #[serde(rename = "NextToken", default)]
    next_token: Option<String>,
}

impl Page for DescribeDbParametersPage {
    type Item = DbParameter;

    fn into_parts(self) -> (Vec<DbParameter>, Option<String>) {
        (self.parameters, self.next_token)
    }
}
