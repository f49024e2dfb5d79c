//! # imageforge-core
//!
//! Core types and utilities for building server images against a cloud
//! compute provider.
//!
//! ## Modules
//!
//! - [`error`] - Error types and HTTP status code mapping
//! - [`id`] - Strongly-typed opaque identifiers for provider resources
//! - [`config`] - Configuration structures for provider clients
//! - [`client`] - HTTP client utilities and retry logic
//! - [`query`] - Query parameter helpers

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod id;
pub mod query;

// Re-export commonly used types
pub use error::{Error, Result};
pub use id::{ImageId, ServerId};
