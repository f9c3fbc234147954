//! Compute instance client and data models for the Linode API.
//!
//! Provides typed records, option payloads and an asynchronous client for the
//! `linode/instances` endpoints, including power and lifecycle actions.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{InstancesClient, InstancesClientBuilder};
pub use models::{
    BackupSchedule, ConfigInterfacePurpose, Instance, InstanceAlert, InstanceBackup,
    InstanceCloneOptions, InstanceConfigDevice, InstanceConfigDeviceMap, InstanceCreateOptions,
    InstanceInterfaceOptions, InstanceMetadataOptions, InstanceMigrateOptions,
    InstanceMigrationType, InstancePlacementGroup, InstancePlacementGroupOptions,
    InstanceRebuildOptions, InstanceRescueOptions, InstanceResizeOptions, InstanceSpec,
    InstanceStatus, InstanceTransfer, InstanceUpdateOptions, VpcIpv4Options,
};

/// Convenient result alias that reuses the shared Linode error type.
pub type Result<T> = linode_core::Result<T>;
