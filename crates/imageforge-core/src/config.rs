//! Configuration for compute provider clients.
//!
//! The harness resolves credentials and region ahead of time; this module
//! only carries the validated connection settings a client needs.

use crate::Error;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Configuration for a compute provider client instance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ComputeConfig {
    /// Compute API base URL
    #[validate(url)]
    pub endpoint: String,

    /// Optional API token for authentication
    #[serde(skip_serializing, default)]
    pub api_token: Option<SecretString>,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of retry attempts for transport failures
    #[validate(range(min = 0, max = 10))]
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

const fn default_tls_verify() -> bool {
    true
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_max_retries() -> u32 {
    3
}

impl ComputeConfig {
    /// Create a new configuration for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid URL or validation
    /// fails.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            endpoint: endpoint.into(),
            api_token: None,
            tls_verify: default_tls_verify(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
        };

        config
            .validate()
            .map_err(|e| Error::Config(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Set the API token used for authentication.
    #[must_use]
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(SecretString::from(token.into()));
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set the maximum retry attempts.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Get the request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse and validate the endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_endpoint(&self) -> Result<Url, Error> {
        Url::parse(&self.endpoint)
            .map_err(|e| Error::Config(format!("Invalid endpoint URL: {e}")))
    }
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            api_token: None,
            tls_verify: default_tls_verify(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_new_with_valid_endpoint() {
        let config = ComputeConfig::new("https://compute.example.com").unwrap();
        assert_eq!(config.endpoint, "https://compute.example.com");
        assert!(config.tls_verify);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_new_rejects_bad_endpoint() {
        let err = ComputeConfig::new("not-a-url").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_builder_methods() {
        let config = ComputeConfig::new("https://compute.example.com")
            .unwrap()
            .with_api_token("secret-token")
            .with_tls_verify(false)
            .with_timeout(60)
            .with_max_retries(5);

        assert_eq!(
            config.api_token.as_ref().unwrap().expose_secret(),
            "secret-token"
        );
        assert!(!config.tls_verify);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.max_retries, 5);
    }

    #[test]
    fn test_token_not_serialized() {
        let config = ComputeConfig::new("https://compute.example.com")
            .unwrap()
            .with_api_token("secret-token");

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret-token"));
    }

    #[test]
    fn test_deserialization_defaults() {
        let config: ComputeConfig =
            serde_json::from_str(r#"{"endpoint": "https://compute.example.com"}"#).unwrap();
        assert!(config.tls_verify);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_parse_endpoint() {
        let config = ComputeConfig::new("https://compute.example.com").unwrap();
        let url = config.parse_endpoint().unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn test_validation_bounds() {
        let config = ComputeConfig::new("https://compute.example.com")
            .unwrap()
            .with_timeout(0);
        assert!(config.validate().is_err());

        let config = ComputeConfig::new("https://compute.example.com")
            .unwrap()
            .with_max_retries(11);
        assert!(config.validate().is_err());
    }
}
