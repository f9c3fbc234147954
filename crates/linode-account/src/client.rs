//! Asynchronous account events client implementation.

use crate::models::Event;
use crate::Result;
use linode_core::client::{ClientConfig, RetryPolicy, ServiceClient, ServiceClientBuilder};
use linode_core::ids::EventId;
use linode_core::pagination::{ListOptions, PagedList};
use linode_core::CancellationToken;
use reqwest::Method;
use tracing::debug;
use url::Url;

const EVENTS_PATH: &str = "account/events";

/// Builder for [`EventsClient`].
#[derive(Debug, Clone)]
pub struct EventsClientBuilder {
    inner: ServiceClientBuilder,
}

impl EventsClientBuilder {
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
    pub fn build(self) -> Result<EventsClient> {
        let inner = self.inner.build()?;
        Ok(EventsClient { inner })
    }
}

/// Asynchronous client for `account/events`.
#[derive(Clone)]
pub struct EventsClient {
    inner: ServiceClient,
}

impl EventsClient {
    /// Construct a client directly from the API host.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        EventsClientBuilder::new(base_url)?.build()
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

    /// List events, newest first.
    pub async fn list_events(&self, options: &ListOptions) -> Result<PagedList<Event>> {
        self.inner.list(EVENTS_PATH, options).await
    }

    /// Fetch a single event.
    pub async fn get_event(&self, id: EventId) -> Result<Event> {
        let path = format!("{EVENTS_PATH}/{id}");
        self.inner
            .send_json::<(), Event>(Method::GET, &path, None, &[])
            .await
    }

    /// Mark one event as read.
    pub async fn mark_event_read(&self, id: EventId) -> Result<()> {
        debug!(event = %id, "Marking event read");
        let path = format!("{EVENTS_PATH}/{id}/read");
        self.inner.send_empty::<()>(Method::POST, &path, None).await
    }

    /// Mark this event and every older one as seen.
    pub async fn mark_events_seen(&self, id: EventId) -> Result<()> {
        debug!(event = %id, "Marking events seen");
        let path = format!("{EVENTS_PATH}/{id}/seen");
        self.inner.send_empty::<()>(Method::POST, &path, None).await
    }
}
