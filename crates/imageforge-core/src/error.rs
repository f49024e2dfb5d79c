//! Error types for image build operations.
//!
//! A single error enum covers configuration problems, server lookup
//! failures, and transport-level faults from the compute provider. Build
//! timeouts and failed builds are deliberately absent: those are soft
//! failures reported through the structured outcome, not raised errors.

use serde::Serialize;
use thiserror::Error;

/// Main error type for imageforge operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid caller-supplied configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// No server matched the given name or id
    #[error("Not found: {0}")]
    NotFound(String),

    /// More than one server matched the given name
    #[error("Ambiguous match: {0}")]
    AmbiguousMatch(String),

    /// Compute provider is unavailable
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Request timed out at the transport level
    #[error("Timeout talking to provider: {0}")]
    Timeout(String),

    /// Failed to parse a provider response
    #[error("Failed to parse provider response: {0}")]
    ParseError(String),

    /// Request rejected by the provider
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Invalid endpoint URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for imageforge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Structured error response for serialization.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,
}

/// Error detail structure.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorDetail {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl Error {
    /// Returns the stable error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::AmbiguousMatch(_) => "AMBIGUOUS_MATCH",
            Self::ProviderUnavailable(_) => "PROVIDER_UNAVAILABLE",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::ParseError(_) => "PARSE_ERROR",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }

    /// Returns true when a retry of the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_) | Self::Timeout(_))
    }

    /// Converts the error into an [`ErrorResponse`].
    #[must_use]
    pub fn into_error_response(self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
            },
        }
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ProviderUnavailable(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::Config("x".to_string()).error_code(), "CONFIG_ERROR");
        assert_eq!(Error::NotFound("x".to_string()).error_code(), "NOT_FOUND");
        assert_eq!(
            Error::AmbiguousMatch("x".to_string()).error_code(),
            "AMBIGUOUS_MATCH"
        );
        assert_eq!(
            Error::ProviderUnavailable("x".to_string()).error_code(),
            "PROVIDER_UNAVAILABLE"
        );
        assert_eq!(Error::HttpError("x".to_string()).error_code(), "HTTP_ERROR");
        assert_eq!(Error::Timeout("x".to_string()).error_code(), "TIMEOUT");
        assert_eq!(
            Error::ParseError("x".to_string()).error_code(),
            "PARSE_ERROR"
        );
        assert_eq!(
            Error::InvalidRequest("x".to_string()).error_code(),
            "INVALID_REQUEST"
        );
        assert_eq!(
            Error::ValidationError("x".to_string()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            Error::InvalidEndpoint("x".to_string()).error_code(),
            "INVALID_ENDPOINT"
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::NotFound("server web1".to_string());
        assert_eq!(err.to_string(), "Not found: server web1");

        let err = Error::AmbiguousMatch("2 servers named web1".to_string());
        assert_eq!(err.to_string(), "Ambiguous match: 2 servers named web1");
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::ProviderUnavailable("x".to_string()).is_retryable());
        assert!(Error::Timeout("x".to_string()).is_retryable());

        assert!(!Error::NotFound("x".to_string()).is_retryable());
        assert!(!Error::Config("x".to_string()).is_retryable());
        assert!(!Error::HttpError("x".to_string()).is_retryable());
    }

    #[test]
    fn test_into_error_response() {
        let err = Error::NotFound("server-123".to_string());
        let response = err.into_error_response();

        assert_eq!(response.error.code, "NOT_FOUND");
        assert_eq!(response.error.message, "Not found: server-123");
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let forge_err: Error = err.into();
        assert!(matches!(forge_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{bad json}").unwrap_err();
        let forge_err: Error = err.into();
        assert!(matches!(forge_err, Error::ParseError(_)));
    }

    #[test]
    fn test_error_response_serialization() {
        let response = Error::AmbiguousMatch("web1".to_string()).into_error_response();

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("AMBIGUOUS_MATCH"));
        assert!(json.contains("web1"));
    }
}
