//! Asynchronous instances client implementation.

use crate::models::{
    Instance, InstanceCloneOptions, InstanceCreateOptions, InstanceMigrateOptions,
    InstanceRebuildOptions, InstanceRescueOptions, InstanceResizeOptions, InstanceTransfer,
    InstanceUpdateOptions,
};
use crate::Result;
use linode_core::client::{ClientConfig, RetryPolicy, ServiceClient, ServiceClientBuilder};
use linode_core::ids::{ConfigId, InstanceId};
use linode_core::pagination::{ListOptions, PagedList};
use linode_core::CancellationToken;
use reqwest::Method;
use serde::Serialize;
use tracing::debug;
use url::Url;

const INSTANCES_PATH: &str = "linode/instances";

/// Optional configuration profile for boot and reboot.
#[derive(Debug, Serialize)]
struct ConfigSelection {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_id: Option<ConfigId>,
}

/// Builder for [`InstancesClient`].
#[derive(Debug, Clone)]
pub struct InstancesClientBuilder {
    inner: ServiceClientBuilder,
}

impl InstancesClientBuilder {
    /// Create a builder for the specified API host.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            inner: ServiceClientBuilder::new(base_url)?,
        })
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.inner = self.inner.with_retry_policy(retry);
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.inner = self.inner.with_http_config(config);
        self
    }

    /// Configure the personal access token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.inner = self.inner.with_token(token);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<InstancesClient> {
        let inner = self.inner.build()?;
        Ok(InstancesClient { inner })
    }
}

/// Asynchronous client for `linode/instances`.
#[derive(Clone)]
pub struct InstancesClient {
    inner: ServiceClient,
}

impl InstancesClient {
    /// Construct a client directly from the API host.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        InstancesClientBuilder::new(base_url)?.build()
    }

    /// Wrap an existing transport.
    #[must_use]
    pub const fn from_service_client(inner: ServiceClient) -> Self {
        Self { inner }
    }

    /// Return a client whose requests observe `token`.
    #[must_use]
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            inner: self.inner.with_cancellation(token),
        }
    }

    /// Return the versioned API root.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// List instances.
    pub async fn list_instances(&self, options: &ListOptions) -> Result<PagedList<Instance>> {
        self.inner.list(INSTANCES_PATH, options).await
    }

    /// Fetch a single instance.
    pub async fn get_instance(&self, id: InstanceId) -> Result<Instance> {
        let path = instance_path(id);
        self.get_json(&path).await
    }

    /// Fetch this month's network transfer for an instance.
    pub async fn get_instance_transfer(&self, id: InstanceId) -> Result<InstanceTransfer> {
        let path = format!("{}/transfer", instance_path(id));
        self.get_json(&path).await
    }

    /// Create an instance.
    pub async fn create_instance(&self, options: &InstanceCreateOptions) -> Result<Instance> {
        self.inner
            .send_json(Method::POST, INSTANCES_PATH, Some(options), &[])
            .await
    }

    /// Update an instance.
    pub async fn update_instance(
        &self,
        id: InstanceId,
        options: &InstanceUpdateOptions,
    ) -> Result<Instance> {
        let path = instance_path(id);
        self.inner
            .send_json(Method::PUT, &path, Some(options), &[])
            .await
    }

    /// Change an instance's label.
    pub async fn rename_instance(&self, id: InstanceId, label: impl Into<String>) -> Result<Instance> {
        let options = InstanceUpdateOptions {
            label: Some(label.into()),
            ..InstanceUpdateOptions::default()
        };
        self.update_instance(id, &options).await
    }

    /// Delete an instance.
    pub async fn delete_instance(&self, id: InstanceId) -> Result<()> {
        let path = instance_path(id);
        self.inner
            .send_empty::<()>(Method::DELETE, &path, None)
            .await
    }

    /// Boot an instance. Without a config the API picks the last booted one.
    pub async fn boot_instance(&self, id: InstanceId, config: Option<ConfigId>) -> Result<()> {
        let path = action_path(id, "boot");
        let body = config.map(|config_id| ConfigSelection {
            config_id: Some(config_id),
        });
        debug!(instance = %id, ?config, "Booting instance");
        self.inner
            .send_empty(Method::POST, &path, body.as_ref())
            .await
    }

    /// Reboot an instance. A body is always sent, `{}` when no config is given.
    pub async fn reboot_instance(&self, id: InstanceId, config: Option<ConfigId>) -> Result<()> {
        let path = action_path(id, "reboot");
        let body = ConfigSelection { config_id: config };
        debug!(instance = %id, ?config, "Rebooting instance");
        self.inner
            .send_empty(Method::POST, &path, Some(&body))
            .await
    }

    /// Clone an instance's disks and configs into a new or existing instance.
    pub async fn clone_instance(
        &self,
        id: InstanceId,
        options: &InstanceCloneOptions,
    ) -> Result<Instance> {
        let path = action_path(id, "clone");
        self.inner
            .send_json(Method::POST, &path, Some(options), &[])
            .await
    }

    /// Delete all disks and configs, then deploy a fresh image.
    pub async fn rebuild_instance(
        &self,
        id: InstanceId,
        options: &InstanceRebuildOptions,
    ) -> Result<Instance> {
        let path = action_path(id, "rebuild");
        self.inner
            .send_json(Method::POST, &path, Some(options), &[])
            .await
    }

    /// Reboot into the rescue environment.
    pub async fn rescue_instance(
        &self,
        id: InstanceId,
        options: &InstanceRescueOptions,
    ) -> Result<()> {
        let path = action_path(id, "rescue");
        self.inner
            .send_empty(Method::POST, &path, Some(options))
            .await
    }

    /// Move an instance to another plan.
    pub async fn resize_instance(
        &self,
        id: InstanceId,
        options: &InstanceResizeOptions,
    ) -> Result<()> {
        let path = action_path(id, "resize");
        self.inner
            .send_empty(Method::POST, &path, Some(options))
            .await
    }

    /// Shut an instance down.
    pub async fn shutdown_instance(&self, id: InstanceId) -> Result<()> {
        self.simple_action(id, "shutdown").await
    }

    /// Upgrade an instance to its plan's next generation.
    pub async fn mutate_instance(&self, id: InstanceId) -> Result<()> {
        self.simple_action(id, "mutate").await
    }

    /// Migrate an instance to another host or region.
    pub async fn migrate_instance(
        &self,
        id: InstanceId,
        options: &InstanceMigrateOptions,
    ) -> Result<()> {
        let path = action_path(id, "migrate");
        self.inner
            .send_empty(Method::POST, &path, Some(options))
            .await
    }

    async fn simple_action(&self, id: InstanceId, action: &str) -> Result<()> {
        let path = action_path(id, action);
        debug!(instance = %id, action, "Instance action");
        self.inner.send_empty::<()>(Method::POST, &path, None).await
    }

    async fn get_json<T>(&self, path: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.inner
            .send_json::<(), T>(Method::GET, path, None, &[])
            .await
    }
}

fn instance_path(id: InstanceId) -> String {
    format!("{INSTANCES_PATH}/{id}")
}

fn action_path(id: InstanceId, action: &str) -> String {
    format!("{INSTANCES_PATH}/{id}/{action}")
}
