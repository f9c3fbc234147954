//! Strongly-typed integer identifiers for Linode resources.
//!
//! This module provides type-safe wrappers around the numeric IDs the API
//! hands out, preventing ID mix-ups at compile time, plus [`EntityId`] for the
//! event fields whose identifier may be either a number or a string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Macro to generate strongly-typed ID wrapper types.
macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $doc:expr) => {
        $(#[$meta])*
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new ID wrapper.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the raw numeric ID.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }

            /// Parses an ID from a string.
            ///
            /// # Errors
            ///
            /// Returns an error if the string is not an unsigned integer.
            pub fn parse_str(input: &str) -> Result<Self> {
                input
                    .trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| {
                        Error::ValidationError(format!(
                            "invalid {}: `{input}`",
                            stringify!($name)
                        ))
                    })
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(wrapper: $name) -> Self {
                wrapper.0
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse_str(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(InstanceId, "Compute instance (Linode) ID");
id_type!(EventId, "Account event ID");
id_type!(PlacementGroupId, "Placement group ID");
id_type!(ConfigId, "Instance configuration profile ID");
id_type!(DiskId, "Instance disk ID");
id_type!(VolumeId, "Block storage volume ID");
id_type!(StackScriptId, "StackScript ID");
id_type!(BackupId, "Instance backup ID");
id_type!(FirewallId, "Cloud firewall ID");
id_type!(SubnetId, "VPC subnet ID");

/// Identifier of an event's related entity.
///
/// Most entity types use numeric IDs, but some (domains records, tickets,
/// account-level entities) are keyed by strings. The variant is picked from
/// the JSON token type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    /// Numeric identifier
    Int(i64),
    /// String identifier
    Str(String),
}

impl EntityId {
    /// Returns the numeric form, if this is a numeric ID.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(id) => Some(*id),
            Self::Str(_) => None,
        }
    }

    /// Returns the string form, if this is a string ID.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Int(_) => None,
            Self::Str(id) => Some(id),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self::Str(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_id_roundtrip_display() {
        let id = InstanceId::new(123);
        assert_eq!(id.get(), 123);
        assert_eq!(id.to_string(), "123");
        assert_eq!(u64::from(id), 123);
    }

    #[test]
    fn test_id_parse_str() {
        assert_eq!(EventId::parse_str(" 42 ").unwrap(), EventId::new(42));
        let err = EventId::parse_str("abc").unwrap_err();
        assert!(matches!(err, Error::ValidationError(_)));
        assert!(err.to_string().contains("EventId"));
    }

    #[test]
    fn test_id_from_str() {
        let id: PlacementGroupId = "9".parse().unwrap();
        assert_eq!(id, PlacementGroupId::from(9));
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = InstanceId::new(77);
        assert_eq!(serde_json::to_string(&id).unwrap(), "77");
        let back: InstanceId = serde_json::from_str("77").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_entity_id_resolves_by_token_type() {
        let numeric: EntityId = serde_json::from_str("123").unwrap();
        assert_eq!(numeric, EntityId::Int(123));
        assert_eq!(numeric.as_int(), Some(123));

        let textual: EntityId = serde_json::from_str("\"example.com\"").unwrap();
        assert_eq!(textual, EntityId::Str("example.com".to_string()));
        assert_eq!(textual.as_str(), Some("example.com"));
        assert_eq!(textual.as_int(), None);
    }

    #[test]
    fn test_entity_id_numeric_string_stays_string() {
        let id: EntityId = serde_json::from_str("\"123\"").unwrap();
        assert_eq!(id, EntityId::Str("123".to_string()));
        assert_eq!(id.to_string(), "123");
    }

    #[test]
    fn test_entity_id_serialize() {
        assert_eq!(serde_json::to_string(&EntityId::Int(5)).unwrap(), "5");
        assert_eq!(
            serde_json::to_string(&EntityId::from("x".to_string())).unwrap(),
            "\"x\""
        );
    }

    #[test]
    fn test_entity_id_rejects_other_tokens() {
        assert!(serde_json::from_str::<EntityId>("true").is_err());
        assert!(serde_json::from_str::<EntityId>("{}").is_err());
    }
}
