//! HTTP client utilities and retry logic.
//!
//! This module provides the shared HTTP client used by provider bindings,
//! including timeout configuration and a retry policy with exponential
//! backoff for transport-level failures.

use crate::error::{Error, Result};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use url::Url;

/// Default timeout for compute (server) requests
pub const COMPUTE_DEFAULT_TIMEOUT: u64 = 30;

/// Default timeout for image requests (larger for image operations)
pub const IMAGE_DEFAULT_TIMEOUT: u64 = 60;

// Connection pool settings

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

// Retry settings

/// Default maximum number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default initial retry delay in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Default maximum retry delay in milliseconds (for exponential backoff)
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 5000;

/// Retry policy with exponential backoff.
///
/// Configures how HTTP requests should be retried on transport failure,
/// using exponential backoff to avoid hammering a struggling provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_retries: u32,

    /// Initial delay before first retry
    pub initial_delay: Duration,

    /// Maximum delay between retries (cap for exponential backoff)
    pub max_delay: Duration,

    /// Backoff multiplier (typically 2 for exponential backoff)
    pub backoff_multiplier: u32,
}

impl RetryPolicy {
    /// Create a new retry policy with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_RETRY_MAX_DELAY_MS),
            backoff_multiplier: 2,
        }
    }

    /// Create a retry policy with no retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_millis(0),
            max_delay: Duration::from_millis(0),
            backoff_multiplier: 1,
        }
    }

    /// Set the maximum number of retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the initial delay.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Calculate delay for a given attempt number.
    ///
    /// Uses exponential backoff: delay = min(initial_delay * multiplier^(attempt-1), max_delay)
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::from_secs(0);
        }

        let multiplier = self.backoff_multiplier.saturating_pow(attempt - 1);
        let delay_ms = self.initial_delay.as_millis() as u64 * u64::from(multiplier);
        let delay = Duration::from_millis(delay_ms);

        std::cmp::min(delay, self.max_delay)
    }

    /// Check if retries are enabled.
    #[must_use]
    pub const fn has_retries(&self) -> bool {
        self.max_retries > 0
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Retry policy
    pub retry_policy: RetryPolicy,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Verify TLS certificates
    pub tls_verify: bool,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Duration::from_secs(COMPUTE_DEFAULT_TIMEOUT),
            retry_policy: RetryPolicy::new(),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            tls_verify: true,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Disable retries.
    #[must_use]
    pub const fn without_retries(mut self) -> Self {
        self.retry_policy = RetryPolicy::no_retry();
        self
    }

    /// Enable or disable TLS certificate verification.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Authentication applied to outgoing requests.
#[derive(Debug, Clone)]
enum Auth {
    None,
    Token(String),
    Basic { username: String, password: String },
}

/// Builder for [`ServiceClient`].
#[derive(Debug, Clone)]
pub struct ServiceClientBuilder {
    service: &'static str,
    base_url: String,
    config: ClientConfig,
    user_agent: Option<String>,
    auth: Auth,
}

impl ServiceClientBuilder {
    /// Create a builder for a named provider service at the given base URL.
    pub fn new(service: &'static str, base_url: impl AsRef<str>, timeout: Duration) -> Self {
        Self {
            service,
            base_url: base_url.as_ref().to_string(),
            config: ClientConfig::new().with_timeout(timeout),
            user_agent: None,
            auth: Auth::None,
        }
    }

    /// Override the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.config.retry_policy = retry;
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure HTTP basic authentication credentials.
    #[must_use]
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.auth = Auth::Basic {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    /// Configure an X-Auth-Token header.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth = Auth::Token(token.into());
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the underlying HTTP
    /// client cannot be constructed.
    pub fn build(self) -> Result<ServiceClient> {
        let mut base_url = Url::parse(&self.base_url)?;
        // Relative path joins drop the last segment without this.
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut builder = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .pool_idle_timeout(self.config.pool_idle_timeout)
            .pool_max_idle_per_host(self.config.pool_max_idle_per_host)
            .danger_accept_invalid_certs(!self.config.tls_verify);

        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(ServiceClient {
            service: self.service,
            http,
            base_url,
            retry: self.config.retry_policy,
            auth: self.auth,
        })
    }
}

/// Shared HTTP client for a provider service.
///
/// Handles URL construction, authentication, and retry of transport-level
/// failures. Service bindings supply a closure to finish each request and a
/// status-to-error mapping for their endpoint semantics.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    service: &'static str,
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
    auth: Auth,
}

impl ServiceClient {
    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Execute a request, retrying retryable failures per the retry policy.
    ///
    /// `customize` finishes the request (headers, body) and may be invoked
    /// once per attempt; `map_status` converts non-success status codes into
    /// domain errors.
    ///
    /// # Errors
    ///
    /// Returns the mapped error once retries are exhausted, or immediately
    /// for non-retryable failures.
    pub async fn execute_with_retry<F, M>(
        &self,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
        customize: F,
        map_status: M,
    ) -> Result<Response>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
        M: Fn(StatusCode, String) -> Error,
    {
        let url = self.request_url(path, params)?;
        let mut attempt: u32 = 0;

        loop {
            let delay = self.retry.delay_for_attempt(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let mut request = self.http.request(method.clone(), url.clone());
            request = self.apply_auth(request);
            request = customize(request);

            tracing::debug!(
                service = self.service,
                %method,
                %url,
                attempt,
                "sending provider request"
            );

            let outcome = match request.send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    map_status(status, text)
                }
                Err(err) => Error::from(err),
            };

            if outcome.is_retryable() && attempt < self.retry.max_retries {
                tracing::warn!(
                    service = self.service,
                    attempt,
                    error = %outcome,
                    "retrying provider request"
                );
                attempt += 1;
                continue;
            }

            return Err(outcome);
        }
    }

    fn request_url(&self, path: &str, params: &[(&'static str, String)]) -> Result<Url> {
        let mut url = self.base_url.join(path)?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::None => request,
            Auth::Token(token) => request.header("X-Auth-Token", token),
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
        }
    }
}
