//! # linode-core
//!
//! Core types and utilities for working with the Linode API.
//!
//! This crate provides the foundations every resource crate builds on: the
//! error hierarchy, tolerant decoders for inconsistently encoded fields,
//! typed identifiers, the HTTP transport and the paginator.
//!
//! ## Modules
//!
//! - [`error`] - Error types and API error classification
//! - [`decode`] - Tolerant timestamp, duration and null decoders
//! - [`ids`] - Strongly-typed identifiers for Linode resources
//! - [`enums`] - Open string enumerations
//! - [`types`] - Shared domain types
//! - [`config`] - Client configuration
//! - [`cancel`] - Cooperative cancellation
//! - [`client`] - HTTP client utilities and retry logic
//! - [`pagination`] - Paged listing

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cancel;
pub mod client;
pub mod config;
pub mod decode;
pub mod enums;
pub mod error;
pub mod ids;
pub mod pagination;
pub mod types;

// Re-export commonly used types
pub use cancel::CancellationToken;
pub use client::{ClientConfig, RetryPolicy, ServiceClient, ServiceClientBuilder};
pub use config::LinodeClientConfig;
pub use error::{ApiError, Error, ErrorReason, Result};
pub use pagination::{ListOptions, PagedList};

#[doc(hidden)]
pub use serde as __serde;
