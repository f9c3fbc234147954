//! # linode-client
//!
//! One entry point for the Linode API. [`LinodeClient`] owns a single
//! authenticated transport and hands out resource clients that share its
//! connection pool.
//!
//! ```no_run
//! use linode_client::LinodeClient;
//!
//! # async fn run() -> linode_client::Result<()> {
//! let client = LinodeClient::from_env()?;
//! let instances = client
//!     .instances()
//!     .list_instances(&client.list_options())
//!     .await?;
//! for instance in &instances {
//!     println!("{} {}", instance.id, instance.label);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub use linode_account::EventsClient;
pub use linode_core::{
    CancellationToken, Error, LinodeClientConfig, ListOptions, PagedList, ServiceClient,
    ServiceClientBuilder,
};
pub use linode_instances::InstancesClient;
pub use linode_placement::PlacementGroupsClient;

use tracing::debug;
use url::Url;

/// Convenient result alias that reuses the shared Linode error type.
pub type Result<T> = linode_core::Result<T>;

/// Facade over every supported Linode resource.
#[derive(Clone)]
pub struct LinodeClient {
    inner: ServiceClient,
    page_size: Option<u32>,
}

impl LinodeClient {
    /// Build a client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be constructed.
    pub fn from_config(config: &LinodeClientConfig) -> Result<Self> {
        let inner = ServiceClientBuilder::from_config(config)?.build()?;
        debug!(
            root = %inner.base_url(),
            authenticated = config.has_token(),
            "Linode client ready"
        );
        Ok(Self {
            inner,
            page_size: config.page_size,
        })
    }

    /// Build a client from `LINODE_TOKEN`, `LINODE_URL` and
    /// `LINODE_API_VERSION`.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&LinodeClientConfig::from_env()?)
    }

    /// Wrap an existing transport.
    #[must_use]
    pub const fn from_service_client(inner: ServiceClient) -> Self {
        Self {
            inner,
            page_size: None,
        }
    }

    /// Return a client whose requests, and those of every resource client
    /// derived from it, observe `token`.
    #[must_use]
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            inner: self.inner.with_cancellation(token),
            page_size: self.page_size,
        }
    }

    /// Return the versioned API root.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// Listing options carrying the configured default page size.
    #[must_use]
    pub fn list_options(&self) -> ListOptions {
        let options = ListOptions::new();
        match self.page_size {
            Some(page_size) => options.with_page_size(page_size),
            None => options,
        }
    }

    /// Instances client.
    #[must_use]
    pub fn instances(&self) -> InstancesClient {
        InstancesClient::from_service_client(self.inner.clone())
    }

    /// Account events client.
    #[must_use]
    pub fn events(&self) -> EventsClient {
        EventsClient::from_service_client(self.inner.clone())
    }

    /// Placement groups client.
    #[must_use]
    pub fn placement_groups(&self) -> PlacementGroupsClient {
        PlacementGroupsClient::from_service_client(self.inner.clone())
    }
}
