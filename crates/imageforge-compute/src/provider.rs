//! Capability trait abstracting the compute provider.
//!
//! The image build workflow only needs four provider operations; putting
//! them behind a trait lets tests substitute a fake provider and keeps the
//! workflow free of any concrete SDK binding.

use crate::models::{Image, ImageListParams, Server, ServerListParams};
use crate::Result;
use async_trait::async_trait;
use imageforge_core::{ImageId, ServerId};

/// Operations the image build workflow requires from a compute provider.
#[async_trait]
pub trait ComputeProvider: Send + Sync {
    /// List servers, optionally filtered.
    async fn list_servers(&self, params: &ServerListParams) -> Result<Vec<Server>>;

    /// Fetch a single server by id.
    async fn get_server(&self, id: &ServerId) -> Result<Server>;

    /// Request an image build from a server. Returns the provider-assigned
    /// image id immediately; the build continues asynchronously.
    async fn create_image(&self, server: &ServerId, image_name: &str) -> Result<ImageId>;

    /// List images, optionally filtered.
    async fn list_images(&self, params: &ImageListParams) -> Result<Vec<Image>>;
}

#[async_trait]
impl<P: ComputeProvider + ?Sized> ComputeProvider for &P {
    async fn list_servers(&self, params: &ServerListParams) -> Result<Vec<Server>> {
        (**self).list_servers(params).await
    }

    async fn get_server(&self, id: &ServerId) -> Result<Server> {
        (**self).get_server(id).await
    }

    async fn create_image(&self, server: &ServerId, image_name: &str) -> Result<ImageId> {
        (**self).create_image(server, image_name).await
    }

    async fn list_images(&self, params: &ImageListParams) -> Result<Vec<Image>> {
        (**self).list_images(params).await
    }
}
