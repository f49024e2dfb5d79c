//! Caller-facing request and result types for the build workflow.

use imageforge_core::{Error, ImageId, Result, ServerId};
use serde::{Deserialize, Serialize};

/// Default number of seconds to wait for an image build.
pub const DEFAULT_WAIT_TIMEOUT: u64 = 300;

/// Identifies the server to capture an image from.
///
/// Exactly one of name or id must be supplied by the caller; the
/// constructor defends against harnesses that fail to enforce that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerRef {
    /// Look the server up by exact name match.
    Name(String),
    /// Look the server up by its provider id.
    Id(ServerId),
}

impl ServerRef {
    /// Reference a server by exact name.
    #[must_use]
    pub fn by_name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Reference a server by id.
    #[must_use]
    pub fn by_id(id: impl Into<ServerId>) -> Self {
        Self::Id(id.into())
    }

    /// Build a reference from optional harness parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when both or neither of name and id are
    /// supplied.
    pub fn from_options(name: Option<String>, id: Option<String>) -> Result<Self> {
        match (name, id) {
            (Some(name), None) => Ok(Self::Name(name)),
            (None, Some(id)) => Ok(Self::Id(ServerId::new(id))),
            (Some(_), Some(_)) => Err(Error::Config(
                "name and id are mutually exclusive".to_string(),
            )),
            (None, None) => Err(Error::Config(
                "one of name or id is required".to_string(),
            )),
        }
    }
}

/// Parameters of a single image build invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    /// Name for the image to be created.
    pub image_name: String,
    /// Whether to block until the image reaches a terminal state.
    #[serde(default)]
    pub wait: bool,
    /// How long to wait before giving up, in seconds. Zero waits forever.
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout: u64,
}

const fn default_wait_timeout() -> u64 {
    DEFAULT_WAIT_TIMEOUT
}

impl ImageRequest {
    /// Create a request with the default no-wait behavior.
    #[must_use]
    pub fn new(image_name: impl Into<String>) -> Self {
        Self {
            image_name: image_name.into(),
            wait: false,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }

    /// Enable or disable waiting for completion.
    #[must_use]
    pub const fn with_wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    /// Set the wait timeout in seconds (zero waits forever).
    #[must_use]
    pub const fn with_wait_timeout(mut self, seconds: u64) -> Self {
        self.wait_timeout = seconds;
        self
    }
}

/// Image ids that reached a successful state.
///
/// Without waiting the workflow only knows the single id the create call
/// returned; with waiting it reports every id observed ACTIVE. The harness
/// contract keeps the single-id case as a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuccessIds {
    /// The id returned by the create call (no polling performed).
    One(ImageId),
    /// Ids observed in ACTIVE state after polling.
    Many(Vec<ImageId>),
}

impl SuccessIds {
    /// Returns true when no ids are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(_) => false,
            Self::Many(ids) => ids.is_empty(),
        }
    }
}

/// Final result of one build invocation, returned to the harness.
///
/// A present `message` signals overall failure; its absence signals
/// success. Soft failures (build error, wait timeout) are reported here
/// rather than as raised errors, because the create call itself succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Whether the invocation changed provider state.
    pub changed: bool,
    /// The performed action, always `create`.
    pub action: String,
    /// The requested image name.
    pub image: String,
    /// Ids that completed successfully.
    pub success: SuccessIds,
    /// Ids whose build ended in ERROR.
    pub error: Vec<ImageId>,
    /// Ids still pending when the deadline was reached.
    pub timeout: Vec<ImageId>,
    /// Failure summary, absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

const TIMEOUT_MESSAGE: &str = "Timeout waiting for image to build";
const FAILED_MESSAGE: &str = "Failed to build an image";

impl Outcome {
    /// Outcome for a create without waiting.
    #[must_use]
    pub fn immediate(image_name: impl Into<String>, image_id: ImageId) -> Self {
        Self {
            changed: true,
            action: "create".to_string(),
            image: image_name.into(),
            success: SuccessIds::One(image_id),
            error: Vec::new(),
            timeout: Vec::new(),
            message: None,
        }
    }

    /// Outcome assembled from the poller's final classification.
    #[must_use]
    pub fn from_classification(
        image_name: impl Into<String>,
        success: Vec<ImageId>,
        error: Vec<ImageId>,
        timeout: Vec<ImageId>,
    ) -> Self {
        let message = if !timeout.is_empty() {
            Some(TIMEOUT_MESSAGE.to_string())
        } else if !error.is_empty() {
            Some(FAILED_MESSAGE.to_string())
        } else {
            None
        };

        Self {
            changed: true,
            action: "create".to_string(),
            image: image_name.into(),
            success: SuccessIds::Many(success),
            error,
            timeout,
            message,
        }
    }

    /// Returns true when the build completed successfully.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.message.is_none()
    }
}
