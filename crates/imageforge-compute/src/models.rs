//! Compute provider models for servers and server images.

use chrono::{DateTime, Utc};
use imageforge_core::query::QueryParams;
use imageforge_core::{ImageId, ServerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Image status string for a completed build.
pub const STATUS_ACTIVE: &str = "ACTIVE";

/// Image status string for a failed build.
pub const STATUS_ERROR: &str = "ERROR";

/// Parameters supported by the `/servers` list endpoint.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServerListParams {
    /// Filter by server name. The provider treats the value as a regular
    /// expression, so an anchored pattern gives exact matching.
    pub name: Option<String>,
    /// Filter by server status (active, building, etc.).
    pub status: Option<String>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Pagination offset.
    pub offset: Option<u32>,
}

impl ServerListParams {
    /// Build parameters that match a server name exactly.
    #[must_use]
    pub fn exact_name(name: &str) -> Self {
        Self {
            name: Some(format!("^{name}$")),
            ..Self::default()
        }
    }

    /// Convert the parameters into URL query pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = QueryParams::new();
        params.push_opt("name", self.name.as_deref());
        params.push_opt("status", self.status.as_deref());
        params.push_opt("limit", self.limit);
        params.push_opt("offset", self.offset);

        params.into_pairs()
    }
}

/// Parameters supported by the `/images` list endpoint.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImageListParams {
    /// Filter by image name.
    pub name: Option<String>,
    /// Filter by image status.
    pub status: Option<String>,
    /// Filter by source server.
    pub server: Option<ServerId>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Pagination marker.
    pub marker: Option<String>,
}

impl ImageListParams {
    /// Convert the parameters into URL query pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = QueryParams::new();
        params.push_opt("name", self.name.as_deref());
        params.push_opt("status", self.status.as_deref());
        params.push_opt("server", self.server.as_ref());
        params.push_opt("limit", self.limit);
        params.push_opt("marker", self.marker.as_deref());

        params.into_pairs()
    }
}

/// Representation of a compute server as returned by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Server {
    /// Server identifier.
    pub id: ServerId,
    /// Server name (not guaranteed unique).
    pub name: String,
    /// Current server status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    /// Arbitrary provider metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

/// Representation of a server image as returned by the provider.
///
/// `status` carries the provider's raw vocabulary (`QUEUED`, `SAVING`,
/// `ACTIVE`, `ERROR`, ...); [`Image::classify`] collapses it into the
/// explicit states the poller works with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Image {
    /// Image identifier.
    pub id: ImageId,
    /// Image name. The provider may append suffixes to the requested name.
    pub name: String,
    /// Current image status.
    pub status: String,
    /// Build progress percentage, when the provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
    /// Identifier of the server the image was captured from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerId>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    /// Minimum disk required to boot the image, in GiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_disk: Option<u64>,
    /// Minimum RAM required to boot the image, in MiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ram: Option<u64>,
    /// Arbitrary provider metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

impl Image {
    /// Classify the image's raw status.
    #[must_use]
    pub fn classify(&self) -> ImageStatus {
        ImageStatus::classify(&self.status)
    }
}

/// Explicit classification of an image's build state.
///
/// Anything that is not `ACTIVE` or `ERROR` is still in flight; the
/// provider defines further intermediate values (`QUEUED`, `SAVING`, ...)
/// that all collapse to [`ImageStatus::Pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageStatus {
    /// Build completed; the image is usable.
    Active,
    /// Build failed on the provider side.
    Error,
    /// Build still in flight.
    Pending,
}

impl ImageStatus {
    /// Classify a raw provider status string.
    #[must_use]
    pub fn classify(status: &str) -> Self {
        match status {
            STATUS_ACTIVE => Self::Active,
            STATUS_ERROR => Self::Error,
            _ => Self::Pending,
        }
    }

    /// Returns true when no further transitions are expected.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Request body for the create-image server action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateServerImageRequest {
    /// The action payload.
    #[serde(rename = "createImage")]
    pub create_image: CreateImageParams,
}

/// Parameters of the create-image action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateImageParams {
    /// Name for the new image.
    pub name: String,
}

impl CreateServerImageRequest {
    /// Build a create-image action request.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            create_image: CreateImageParams { name: name.into() },
        }
    }
}

/// Response body of the create-image server action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateServerImageResponse {
    /// Identifier assigned to the image being built.
    pub image_id: ImageId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exact_name_is_anchored() {
        let params = ServerListParams::exact_name("web1");
        assert_eq!(params.name.as_deref(), Some("^web1$"));
        assert_eq!(params.to_pairs(), vec![("name", "^web1$".to_string())]);
    }

    #[test]
    fn image_list_params_to_pairs() {
        let params = ImageListParams {
            name: Some("web1-snap".to_string()),
            server: Some(ServerId::new("srv-1")),
            ..ImageListParams::default()
        };
        assert_eq!(
            params.to_pairs(),
            vec![
                ("name", "web1-snap".to_string()),
                ("server", "srv-1".to_string())
            ]
        );
    }

    #[test]
    fn classify_terminal_states() {
        assert_eq!(ImageStatus::classify("ACTIVE"), ImageStatus::Active);
        assert_eq!(ImageStatus::classify("ERROR"), ImageStatus::Error);
        assert!(ImageStatus::Active.is_terminal());
        assert!(ImageStatus::Error.is_terminal());
    }

    #[test]
    fn classify_everything_else_as_pending() {
        for status in ["QUEUED", "SAVING", "DELETED", "active", ""] {
            assert_eq!(ImageStatus::classify(status), ImageStatus::Pending);
            assert!(!ImageStatus::classify(status).is_terminal());
        }
    }

    #[test]
    fn image_deserializes_with_minimal_fields() {
        let image: Image = serde_json::from_value(json!({
            "id": "img-123",
            "name": "web1-snap",
            "status": "SAVING"
        }))
        .unwrap();
        assert_eq!(image.id, "img-123");
        assert_eq!(image.classify(), ImageStatus::Pending);
        assert!(image.server.is_none());
    }

    #[test]
    fn create_image_request_wire_shape() {
        let request = CreateServerImageRequest::new("web1-snap");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({"createImage": {"name": "web1-snap"}}));
    }
}
