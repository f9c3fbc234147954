//! HTTP client utilities and retry logic.
//!
//! This module provides the HTTP layer every resource client sits on:
//! [`ClientConfig`] and [`RetryPolicy`] describe transport behaviour, and
//! [`ServiceClient`] issues authenticated JSON requests, retries transient
//! failures with exponential backoff, classifies non-2xx responses into
//! [`ApiError`] and honours an optional [`CancellationToken`].

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, info};
use url::Url;

use crate::cancel::CancellationToken;
use crate::config::LinodeClientConfig;
use crate::decode;
use crate::error::{ApiError, Error, Result};
use crate::pagination::{EndpointPages, ListOptions, PageEnvelope, PagedList, Paginator};
use crate::types::ApiVersion;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT: u64 = 30;

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

/// Header carrying the JSON listing filter
pub const FILTER_HEADER: &str = "X-Filter";

// Connection pool settings

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

// Retry settings

/// Default maximum number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default initial retry delay in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Default maximum retry delay in milliseconds (for exponential backoff)
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 5000;

const DEFAULT_USER_AGENT: &str = concat!("linode-rust/", env!("CARGO_PKG_VERSION"));

/// Retry policy with exponential backoff.
///
/// Configures how HTTP requests should be retried on failure, using exponential
/// backoff to avoid overwhelming a struggling API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_retries: u32,

    /// Initial delay before first retry
    pub initial_delay: Duration,

    /// Maximum delay between retries (cap for exponential backoff)
    pub max_delay: Duration,

    /// Backoff multiplier (typically 2 for exponential backoff)
    pub backoff_multiplier: u32,
}

impl RetryPolicy {
    /// Create a new retry policy with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_RETRY_MAX_DELAY_MS),
            backoff_multiplier: 2,
        }
    }

    /// Create a retry policy with no retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_millis(0),
            max_delay: Duration::from_millis(0),
            backoff_multiplier: 1,
        }
    }

    /// Set the maximum number of retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the initial delay.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff multiplier.
    #[must_use]
    pub const fn with_backoff_multiplier(mut self, multiplier: u32) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Calculate delay for a given attempt number.
    ///
    /// Uses exponential backoff: delay = min(initial_delay * multiplier^(attempt-1), max_delay)
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::from_secs(0);
        }

        let multiplier = self.backoff_multiplier.saturating_pow(attempt - 1);
        let initial_ms = u64::try_from(self.initial_delay.as_millis()).unwrap_or(u64::MAX);
        let delay = Duration::from_millis(initial_ms.saturating_mul(u64::from(multiplier)));

        std::cmp::min(delay, self.max_delay)
    }

    /// Check if retries are enabled.
    #[must_use]
    pub const fn has_retries(&self) -> bool {
        self.max_retries > 0
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client configuration.
///
/// Configures HTTP client behavior including timeouts, retries, and connection pooling.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Retry policy
    pub retry_policy: RetryPolicy,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Enable request/response logging
    pub enable_logging: bool,

    /// Enable response compression
    pub enable_compression: bool,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            retry_policy: RetryPolicy::new(),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            enable_logging: true,
            enable_compression: true,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Disable retries.
    #[must_use]
    pub const fn without_retries(mut self) -> Self {
        self.retry_policy = RetryPolicy::no_retry();
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Enable or disable logging.
    #[must_use]
    pub const fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`ServiceClient`].
#[derive(Debug, Clone)]
pub struct ServiceClientBuilder {
    base_url: Url,
    api_version: ApiVersion,
    user_agent: String,
    http_config: ClientConfig,
    token: Option<SecretString>,
}

impl ServiceClientBuilder {
    /// Create a builder for the given API host (e.g. `https://api.linode.com`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the URL cannot be parsed.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let url = Url::parse(base_url.as_ref()).map_err(|err| {
            Error::ConfigError(format!(
                "Invalid API base URL `{}`: {err}",
                base_url.as_ref()
            ))
        })?;

        Ok(Self {
            base_url: url,
            api_version: ApiVersion::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_config: ClientConfig::new(),
            token: None,
        })
    }

    /// Create a builder from a validated [`LinodeClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn from_config(config: &LinodeClientConfig) -> Result<Self> {
        config.ensure_valid()?;

        let http_config = ClientConfig::new()
            .with_timeout(config.timeout())
            .with_retry_policy(RetryPolicy::new().with_max_retries(config.max_retries));

        let mut builder = Self::new(&config.api_url)?
            .with_api_version(config.api_version)
            .with_http_config(http_config);

        if let Some(user_agent) = &config.user_agent {
            builder = builder.with_user_agent(user_agent.clone());
        }
        if let Some(token) = &config.token {
            builder = builder.with_token(token.expose_secret());
        }

        Ok(builder)
    }

    /// Select the API version path segment.
    #[must_use]
    pub const fn with_api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = version;
        self
    }

    /// Override the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.http_config.retry_policy = retry;
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Configure the personal access token sent as a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the token is not a valid header value
    /// or the HTTP client cannot be constructed.
    pub fn build(self) -> Result<ServiceClient> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|err| Error::ConfigError(format!("Invalid API token: {err}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = ClientBuilder::new()
            .timeout(self.http_config.timeout)
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT))
            .user_agent(self.user_agent)
            .default_headers(headers)
            .pool_idle_timeout(self.http_config.pool_idle_timeout)
            .pool_max_idle_per_host(self.http_config.pool_max_idle_per_host);

        if !self.http_config.enable_compression {
            builder = builder.no_gzip();
        }

        let http = builder
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        let root = api_root(self.base_url, self.api_version)?;

        Ok(ServiceClient {
            http,
            root,
            retry_policy: self.http_config.retry_policy,
            enable_logging: self.http_config.enable_logging,
            cancellation: None,
        })
    }
}

fn api_root(mut base: Url, version: ApiVersion) -> Result<Url> {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(&format!("{version}/"))?)
}

/// Authenticated JSON transport shared by every resource client.
///
/// Cloning is cheap: clones share the underlying connection pool.
#[derive(Clone)]
pub struct ServiceClient {
    http: Client,
    root: Url,
    retry_policy: RetryPolicy,
    enable_logging: bool,
    cancellation: Option<CancellationToken>,
}

impl ServiceClient {
    /// Construct a client for the given API host with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        ServiceClientBuilder::new(base_url)?.build()
    }

    /// Return the versioned API root every path is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.root
    }

    /// Return the retry policy in effect.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Return a clone of this client whose requests observe `token`.
    ///
    /// Once the token is cancelled, in-flight requests fail with
    /// [`Error::Cancelled`] and no new request is sent.
    #[must_use]
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        let mut client = self.clone();
        client.cancellation = Some(token);
        client
    }

    /// Return the cancellation token bound to this client, if any.
    #[must_use]
    pub const fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    /// Send a request and decode the JSON response body into `R`.
    ///
    /// The body, if any, is serialized before anything touches the network.
    ///
    /// # Errors
    ///
    /// [`Error::SerializationError`] for unencodable bodies,
    /// [`Error::DecodeError`] for unexpected response shapes, and any error
    /// surfaced by [`ServiceClient::execute_with_retry`].
    pub async fn send_json<B, R>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        params: &[(&'static str, String)],
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let payload = body.map(encode_body).transpose()?;
        let bytes = self
            .request_bytes(method, path, payload, params, None)
            .await?;

        decode::from_slice(&bytes, &format!("response for `{path}`"))
    }

    /// Send a request whose response body carries nothing of interest.
    ///
    /// # Errors
    ///
    /// Same as [`ServiceClient::send_json`], minus response decoding.
    pub async fn send_empty<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let payload = body.map(encode_body).transpose()?;
        self.request_bytes(method, path, payload, &[], None)
            .await
            .map(|_| ())
    }

    /// Fetch a single page of a listing endpoint.
    ///
    /// # Errors
    ///
    /// Returns any transport, API or decode error for that page.
    pub async fn get_page<T>(
        &self,
        path: &str,
        options: &ListOptions,
        page: u32,
    ) -> Result<PageEnvelope<T>>
    where
        T: DeserializeOwned,
    {
        let params = options.query_pairs(page);
        let bytes = self
            .request_bytes(Method::GET, path, None, &params, options.filter.as_deref())
            .await?;

        decode::from_slice(&bytes, &format!("page {page} of `{path}`"))
    }

    /// Fetch every page of a listing endpoint, in order.
    ///
    /// # Errors
    ///
    /// Returns the first page error; records from earlier pages are discarded.
    pub async fn list<T>(&self, path: &str, options: &ListOptions) -> Result<PagedList<T>>
    where
        T: DeserializeOwned + Send,
    {
        let source = EndpointPages::<T>::new(self, path, options);
        Paginator::new(&source, options).fetch_all().await
    }

    /// Execute a request, retrying transient failures per the retry policy.
    ///
    /// `configure` is applied to a fresh request builder on every attempt.
    /// Non-2xx responses are converted into [`Error::ApiError`].
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted, the first
    /// non-retryable error, or [`Error::Cancelled`].
    pub async fn execute_with_retry<F>(
        &self,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
        configure: F,
    ) -> Result<Response>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let url = self.build_url(path)?;
        let mut attempt: u32 = 0;

        loop {
            self.ensure_active(path)?;

            let request = configure(self.http.request(method.clone(), url.clone()).query(params));

            if self.enable_logging {
                info!(method = %method, path, attempt, "Linode API request");
            }

            let outcome = self
                .cancellable(path, async {
                    let response = request.send().await?;
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let text = response.text().await.unwrap_or_default();
                    debug!(%status, path, "Linode API returned error status");
                    Err(Error::ApiError(ApiError::from_response(status, &text)))
                })
                .await;

            match outcome {
                Ok(response) => return Ok(response),
                Err(err)
                    if should_retry(&method, &err) && attempt < self.retry_policy.max_retries =>
                {
                    attempt += 1;
                    let delay = self.retry_policy.delay_for_attempt(attempt);
                    debug!(path, attempt, error = %err, "Retrying Linode API request after {:?}", delay);
                    if !delay.is_zero() {
                        self.cancellable(path, async {
                            sleep(delay).await;
                            Ok(())
                        })
                        .await?;
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn request_bytes(
        &self,
        method: Method,
        path: &str,
        payload: Option<Vec<u8>>,
        params: &[(&'static str, String)],
        filter: Option<&str>,
    ) -> Result<Vec<u8>> {
        let response = self
            .execute_with_retry(method, path, params, |mut request| {
                if let Some(filter) = filter {
                    request = request.header(FILTER_HEADER, filter);
                }
                if let Some(body) = &payload {
                    request = request
                        .header(CONTENT_TYPE, "application/json")
                        .body(body.clone());
                }
                request
            })
            .await?;

        self.cancellable(path, async {
            let bytes = response.bytes().await?;
            Ok(bytes.to_vec())
        })
        .await
    }

    async fn cancellable<F, T>(&self, path: &str, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match &self.cancellation {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => Err(cancelled(path)),
                    result = future => result,
                }
            }
            None => future.await,
        }
    }

    fn ensure_active(&self, path: &str) -> Result<()> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => Err(cancelled(path)),
            _ => Ok(()),
        }
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        let normalized = path.trim_start_matches('/');

        self.root
            .join(normalized)
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid API path `{path}`: {err}")))
    }
}

/// Transport failures may hide a request the server already applied, so only
/// idempotent methods are re-sent after one. Retryable API statuses are always
/// retried.
fn should_retry(method: &Method, err: &Error) -> bool {
    match err {
        Error::TransportError(_) | Error::Timeout(_) => method.is_idempotent(),
        other => other.is_retryable(),
    }
}

fn cancelled(path: &str) -> Error {
    Error::Cancelled(format!("request to `{path}` was cancelled"))
}

fn encode_body<B>(body: &B) -> Result<Vec<u8>>
where
    B: Serialize + ?Sized,
{
    serde_json::to_vec(body).map_err(|err| Error::SerializationError(err.to_string()))
}
