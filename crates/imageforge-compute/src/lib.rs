//! Compute provider binding for imageforge.
//!
//! Provides typed models for servers and server images, the
//! [`ComputeProvider`] capability trait, and an asynchronous HTTP client
//! implementing it.

#![deny(missing_docs)]

pub mod client;
pub mod models;
pub mod provider;

pub use client::{ComputeClient, ComputeClientBuilder};
pub use models::{
    CreateServerImageRequest, CreateServerImageResponse, Image, ImageListParams, ImageStatus,
    Server, ServerListParams,
};
pub use provider::ComputeProvider;

/// Convenient result alias that reuses the shared imageforge error type.
pub type Result<T> = imageforge_core::Result<T>;
