//! Create-and-await server image build workflow.
//!
//! Resolves a source server, requests an image build from the compute
//! provider, and optionally polls the image list until the build reaches a
//! terminal state, producing a structured [`Outcome`] for the invoking
//! harness.

#![deny(missing_docs)]

pub mod builder;
pub mod request;

pub use builder::{ImageBuilder, POLL_INTERVAL};
pub use request::{ImageRequest, Outcome, ServerRef, SuccessIds, DEFAULT_WAIT_TIMEOUT};

/// Convenient result alias that reuses the shared imageforge error type.
pub type Result<T> = imageforge_core::Result<T>;
