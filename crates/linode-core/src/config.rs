//! Configuration structures for Linode clients.
//!
//! [`LinodeClientConfig`] collects everything needed to reach the API: the
//! host, API version, access token and transport limits. It can be built in
//! code, deserialized from a config file, or read from the environment.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use validator::Validate;

use crate::types::{ApiVersion, DEFAULT_API_URL};
use crate::Error;

/// Environment variable holding the personal access token.
pub const TOKEN_ENV: &str = "LINODE_TOKEN";

/// Environment variable overriding the API host.
pub const URL_ENV: &str = "LINODE_URL";

/// Environment variable selecting the API version.
pub const API_VERSION_ENV: &str = "LINODE_API_VERSION";

/// Configuration for a Linode client instance.
///
/// The access token is never serialized; supply it with
/// [`LinodeClientConfig::with_token`] or through [`TOKEN_ENV`].
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LinodeClientConfig {
    /// API host, without the version segment
    #[validate(url)]
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API version path segment
    #[serde(default)]
    pub api_version: ApiVersion,

    /// Personal access token
    #[serde(skip)]
    pub token: Option<SecretString>,

    /// Custom user agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of retry attempts
    #[validate(range(min = 0, max = 10))]
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Page size applied to listings that do not set one
    #[validate(range(min = 25, max = 500))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_max_retries() -> u32 {
    3
}

impl LinodeClientConfig {
    /// Create a configuration for the given API host.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or validation fails.
    pub fn new(api_url: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            api_url: api_url.into(),
            ..Self::default()
        };

        config.ensure_valid()?;
        Ok(config)
    }

    /// Build a configuration from `LINODE_TOKEN`, `LINODE_URL` and
    /// `LINODE_API_VERSION`, falling back to defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = read(URL_ENV) {
            config.api_url = url.trim().to_string();
        }
        if let Some(version) = read(API_VERSION_ENV) {
            config.api_version = version.parse()?;
        }
        if let Some(token) = read(TOKEN_ENV) {
            config.token = Some(SecretString::from(token.trim().to_string()));
        }

        config.ensure_valid()?;
        Ok(config)
    }

    /// Set the personal access token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Select the API version.
    #[must_use]
    pub const fn with_api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = version;
        self
    }

    /// Set a custom user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set maximum retry attempts.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the default listing page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns true if an access token is configured.
    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Parse the API host URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_api_url(&self) -> Result<Url, Error> {
        Url::parse(&self.api_url)
            .map_err(|e| Error::ConfigError(format!("Invalid API URL: {e}")))
    }

    /// Validate field ranges and the URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing the first invalid field.
    pub fn ensure_valid(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))
    }
}

impl Default for LinodeClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_version: ApiVersion::default(),
            token: None,
            user_agent: None,
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            page_size: None,
        }
    }
}
