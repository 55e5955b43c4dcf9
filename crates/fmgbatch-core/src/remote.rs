// ── Remote policy package ──
//
// `PolicyApi` is the seam between the workflow (apply, download) and the
// appliance. `PolicyPackage` implements it over the JSON-RPC client for a
// single ADOM + package; tests substitute an in-memory fake.

use std::future::Future;

use fmgbatch_api::{FmgClient, Scope, Status};
use serde_json::{Map, Value};

use crate::config::ManagerConfig;
use crate::error::CoreError;
use crate::model::{PolicyId, PolicyRecord};

/// Policy operations against one package.
pub trait PolicyApi {
    /// Every policy summary in the package.
    fn list_policies(&self) -> impl Future<Output = Result<Vec<PolicyRecord>, CoreError>> + Send;

    fn get_policy(
        &self,
        id: PolicyId,
    ) -> impl Future<Output = Result<PolicyRecord, CoreError>> + Send;

    /// Update several fields of one policy in a single call.
    fn update_policy(
        &self,
        id: PolicyId,
        fields: &Map<String, Value>,
    ) -> impl Future<Output = Result<Status, CoreError>> + Send;

    /// Empty one list field, then set it to `values`.
    fn clear_and_set_field(
        &self,
        id: PolicyId,
        field: &str,
        values: &[String],
    ) -> impl Future<Output = Result<Status, CoreError>> + Send;

    /// End the session. Never fails.
    fn logout(&self) -> impl Future<Output = ()> + Send;
}

/// A FortiManager policy package reached through [`FmgClient`].
pub struct PolicyPackage {
    client: FmgClient,
    scope: Scope,
}

impl PolicyPackage {
    pub fn new(client: FmgClient, scope: Scope) -> Self {
        Self { client, scope }
    }

    /// Build the HTTP client for `config`. No request is sent until the
    /// first policy call, which logs in.
    pub fn connect(config: &ManagerConfig) -> Result<Self, CoreError> {
        let client = FmgClient::new(
            &config.url,
            config.username.clone(),
            config.password.clone(),
            &config.transport(),
        )?;
        Ok(Self::new(client, config.scope.clone()))
    }

    pub fn client(&self) -> &FmgClient {
        &self.client
    }
}

impl PolicyApi for PolicyPackage {
    async fn list_policies(&self) -> Result<Vec<PolicyRecord>, CoreError> {
        let items = self.client.list_policies(&self.scope).await?;
        Ok(items.into_iter().map(PolicyRecord::new).collect())
    }

    async fn get_policy(&self, id: PolicyId) -> Result<PolicyRecord, CoreError> {
        let fields = self.client.get_policy(&self.scope, id.get()).await?;
        Ok(PolicyRecord::new(fields))
    }

    async fn update_policy(
        &self,
        id: PolicyId,
        fields: &Map<String, Value>,
    ) -> Result<Status, CoreError> {
        Ok(self
            .client
            .update_policy(&self.scope, id.get(), fields)
            .await?)
    }

    async fn clear_and_set_field(
        &self,
        id: PolicyId,
        field: &str,
        values: &[String],
    ) -> Result<Status, CoreError> {
        Ok(self
            .client
            .clear_and_set_field(&self.scope, id.get(), field, values)
            .await?)
    }

    async fn logout(&self) {
        self.client.logout().await;
    }
}
