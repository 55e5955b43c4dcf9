// Firewall policy endpoints
//
// All paths are scoped to one ADOM + policy package:
// `/pm/config/adom/{adom}/pkg/{package}/firewall/policy[/{id}[/{field}]]`

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Error;
use crate::jsonrpc::client::FmgClient;
use crate::jsonrpc::models::{Scope, Status};

fn decode<T: serde::de::DeserializeOwned>(data: Value) -> Result<T, Error> {
    serde_json::from_value(data.clone()).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: data.to_string(),
    })
}

impl FmgClient {
    /// List every policy in the package.
    ///
    /// `get .../firewall/policy`. A result without `data` is an empty list.
    pub async fn list_policies(&self, scope: &Scope) -> Result<Vec<Map<String, Value>>, Error> {
        let url = scope.policies_url();
        debug!(adom = %scope.adom, package = %scope.package, "listing policies");
        match self.call("get", &url, None).await?.data {
            Some(data) => decode(data),
            None => Ok(Vec::new()),
        }
    }

    /// Fetch one full policy.
    ///
    /// `get .../firewall/policy/{id}`. A result without `data` is an empty object.
    pub async fn get_policy(
        &self,
        scope: &Scope,
        policy_id: u64,
    ) -> Result<Map<String, Value>, Error> {
        let url = scope.policy_url(policy_id);
        debug!(policy_id, "fetching policy");
        match self.call("get", &url, None).await?.data {
            Some(data) => decode(data),
            None => Ok(Map::new()),
        }
    }

    /// Update the given fields of a policy in one call.
    ///
    /// `update .../firewall/policy/{id}` with `data = fields`.
    pub async fn update_policy(
        &self,
        scope: &Scope,
        policy_id: u64,
        fields: &Map<String, Value>,
    ) -> Result<Status, Error> {
        let url = scope.policy_url(policy_id);
        debug!(policy_id, fields = fields.len(), "updating policy");
        let data = Value::Object(fields.clone());
        Ok(self.call("update", &url, Some(&data)).await?.status())
    }

    /// Replace one list field: clear it, then append `values`.
    ///
    /// 1. `update .../firewall/policy/{id}` with `{field: []}`
    /// 2. `add .../firewall/policy/{id}/{field}` with `data = values`,
    ///    skipped when `values` is empty (a synthesized success is returned).
    pub async fn clear_and_set_field(
        &self,
        scope: &Scope,
        policy_id: u64,
        field: &str,
        values: &[String],
    ) -> Result<Status, Error> {
        let mut cleared = Map::new();
        cleared.insert(field.to_owned(), Value::Array(Vec::new()));
        debug!(policy_id, field, "clearing field");
        self.call(
            "update",
            &scope.policy_url(policy_id),
            Some(&Value::Object(cleared)),
        )
        .await?;

        if values.is_empty() {
            return Ok(Status::ok("Field cleared"));
        }

        debug!(policy_id, field, count = values.len(), "appending field values");
        let data = Value::from(values.to_vec());
        Ok(self
            .call("add", &scope.policy_field_url(policy_id, field), Some(&data))
            .await?
            .status())
    }
}
