//! Placement group client and data models for the Linode API.
//!
//! Placement groups spread instances across hosts (anti-affinity) or pack
//! them together (affinity) within a region.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{PlacementGroupsClient, PlacementGroupsClientBuilder};
pub use linode_core::types::PlacementGroupAffinityType;
pub use models::{
    PlacementGroup, PlacementGroupAssignOptions, PlacementGroupCreateOptions,
    PlacementGroupMember, PlacementGroupUnassignOptions, PlacementGroupUpdateOptions,
};

/// Convenient result alias that reuses the shared Linode error type.
pub type Result<T> = linode_core::Result<T>;
