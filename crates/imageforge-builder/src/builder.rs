//! The image build workflow: resolve a server, request an image build,
//! and optionally poll until the image reaches a terminal state.
//!
//! The provider offers no "get image by creation handle" call, so
//! completion is observed by re-listing images and correlating records by
//! exact id (name substring as a secondary guard, since the provider may
//! suffix the requested name).

use crate::request::{ImageRequest, Outcome, ServerRef};
use imageforge_compute::models::{ImageListParams, ImageStatus, Server, ServerListParams};
use imageforge_compute::ComputeProvider;
use imageforge_core::{Error, ImageId, Result};
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Fixed interval between polling iterations.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Drives the create-and-await workflow against a compute provider.
///
/// The provider handle is passed in at construction; one builder can serve
/// multiple independent invocations.
#[derive(Debug, Clone)]
pub struct ImageBuilder<P> {
    provider: P,
}

impl<P: ComputeProvider> ImageBuilder<P> {
    /// Create a builder over the given provider.
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Resolve a server reference to exactly one server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when nothing matches (including a failed
    /// get-by-id lookup) and [`Error::AmbiguousMatch`] when a name matches
    /// more than one server.
    pub async fn resolve_server(&self, server: &ServerRef) -> Result<Server> {
        match server {
            ServerRef::Name(name) => {
                let servers = self
                    .provider
                    .list_servers(&ServerListParams::exact_name(name))
                    .await?;

                let mut servers = servers.into_iter();
                match (servers.next(), servers.next()) {
                    (Some(server), None) => Ok(server),
                    (Some(_), Some(_)) => Err(Error::AmbiguousMatch(format!(
                        "multiple servers match name `{name}`"
                    ))),
                    (None, _) => Err(Error::NotFound(format!(
                        "no server matches name `{name}`"
                    ))),
                }
            }
            ServerRef::Id(id) => self.provider.get_server(id).await.map_err(|err| {
                tracing::debug!(server = %id, error = %err, "server lookup by id failed");
                Error::NotFound(format!("no server matches id `{id}`"))
            }),
        }
    }

    /// Request an image build and return the provider-assigned image id.
    ///
    /// The call acknowledges immediately; it does not wait for the build.
    ///
    /// # Errors
    ///
    /// Surfaces the provider error when the create call itself fails.
    pub async fn create_image(&self, server: &Server, image_name: &str) -> Result<ImageId> {
        let image_id = self.provider.create_image(&server.id, image_name).await?;
        tracing::info!(
            server = %server.id,
            image = %image_id,
            name = image_name,
            "image build requested"
        );
        Ok(image_id)
    }

    /// Track the build to completion and assemble the final outcome.
    ///
    /// Without `wait` this returns immediately and performs no list call.
    /// With `wait` it samples the image list every [`POLL_INTERVAL`] until
    /// every matching record is terminal or `wait_timeout` seconds elapse
    /// (zero means wait forever). Records still pending at loop exit are
    /// reported as timed out; a record that never became visible is
    /// reported under its creation id.
    ///
    /// # Errors
    ///
    /// Only transport failures of the list call abort; build error and
    /// timeout are soft failures carried in the returned [`Outcome`].
    pub async fn await_completion(
        &self,
        image_name: &str,
        image_id: &ImageId,
        wait: bool,
        wait_timeout: u64,
    ) -> Result<Outcome> {
        if !wait {
            return Ok(Outcome::immediate(image_name, image_id.clone()));
        }

        let deadline =
            (wait_timeout != 0).then(|| Instant::now() + Duration::from_secs(wait_timeout));
        let params = ImageListParams::default();
        let mut observed;

        loop {
            observed = self
                .provider
                .list_images(&params)
                .await?
                .into_iter()
                .filter(|img| img.id == *image_id && img.name.contains(image_name))
                .collect::<Vec<_>>();

            let still_pending = observed.is_empty()
                || observed.iter().any(|img| !img.classify().is_terminal());
            if !still_pending {
                break;
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                tracing::warn!(image = %image_id, "deadline reached with build still pending");
                break;
            }

            tracing::debug!(image = %image_id, "image build still pending");
            sleep(POLL_INTERVAL).await;
        }

        // Final classification of the last sample; no re-query.
        let mut success = Vec::new();
        let mut error = Vec::new();
        let mut timeout = Vec::new();

        if observed.is_empty() {
            timeout.push(image_id.clone());
        } else {
            for image in observed {
                match image.classify() {
                    ImageStatus::Active => success.push(image.id),
                    ImageStatus::Error => error.push(image.id),
                    ImageStatus::Pending => timeout.push(image.id),
                }
            }
        }

        Ok(Outcome::from_classification(
            image_name, success, error, timeout,
        ))
    }

    /// Run the whole workflow: resolve, create, await.
    ///
    /// # Errors
    ///
    /// Hard failures (lookup, create, list transport) abort with `Err`;
    /// soft failures come back as an [`Outcome`] carrying a message.
    pub async fn build(&self, server: &ServerRef, request: &ImageRequest) -> Result<Outcome> {
        let server = self.resolve_server(server).await?;
        let image_id = self.create_image(&server, &request.image_name).await?;
        self.await_completion(
            &request.image_name,
            &image_id,
            request.wait,
            request.wait_timeout,
        )
        .await
    }
}
