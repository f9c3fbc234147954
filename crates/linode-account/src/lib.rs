//! Account event client and data models for the Linode API.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{EventsClient, EventsClientBuilder};
pub use models::{EntityType, Event, EventAction, EventEntity, EventStatus};

/// Convenient result alias that reuses the shared Linode error type.
pub type Result<T> = linode_core::Result<T>;
