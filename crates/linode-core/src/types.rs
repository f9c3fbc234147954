//! Core Linode domain types shared across resource crates.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Default API host.
pub const DEFAULT_API_URL: &str = "https://api.linode.com";

/// Supported API versions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    /// Stable API
    #[default]
    V4,
    /// Beta API exposing preview features
    V4beta,
}

impl ApiVersion {
    /// Returns the path segment for this version.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::V4 => "v4",
            Self::V4beta => "v4beta",
        }
    }
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "v4" => Ok(Self::V4),
            "v4beta" => Ok(Self::V4beta),
            _ => Err(Error::ConfigError(format!("Unknown API version: {s}"))),
        }
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

crate::api_enum! {
    /// Affinity policy for instances in a placement group.
    pub enum PlacementGroupAffinityType {
        AntiAffinityLocal => "anti_affinity:local",
        AffinityLocal => "affinity:local",
    }
}
