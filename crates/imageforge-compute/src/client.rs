//! Asynchronous compute provider client implementation.

use crate::models::{
    CreateServerImageRequest, CreateServerImageResponse, Image, ImageListParams, Server,
    ServerListParams,
};
use crate::provider::ComputeProvider;
use crate::Result;
use async_trait::async_trait;
use imageforge_core::client::{
    ClientConfig, RetryPolicy, ServiceClient, ServiceClientBuilder, COMPUTE_DEFAULT_TIMEOUT,
};
use imageforge_core::config::ComputeConfig;
use imageforge_core::{Error, ImageId, ServerId};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("imageforge-compute/", env!("CARGO_PKG_VERSION"));

/// Builder for [`ComputeClient`].
#[derive(Debug, Clone)]
pub struct ComputeClientBuilder {
    inner: ServiceClientBuilder,
}

impl ComputeClientBuilder {
    /// Create a builder for the specified base URL.
    pub fn new(base_url: impl AsRef<str>) -> Self {
        let builder = ServiceClientBuilder::new(
            "compute",
            base_url,
            Duration::from_secs(COMPUTE_DEFAULT_TIMEOUT),
        )
        .with_user_agent(USER_AGENT);

        Self { inner: builder }
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.inner = self.inner.with_retry_policy(retry);
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.inner = self.inner.with_http_config(config);
        self
    }

    /// Configure HTTP basic authentication credentials.
    #[must_use]
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.inner = self.inner.with_basic_auth(username, password);
        self
    }

    /// Configure an X-Auth-Token header.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.inner = self.inner.with_token(token);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn build(self) -> Result<ComputeClient> {
        let inner = self.inner.build()?;
        Ok(ComputeClient { inner })
    }
}

/// Asynchronous compute provider client.
#[derive(Debug, Clone)]
pub struct ComputeClient {
    inner: ServiceClient,
}

impl ComputeClient {
    /// Construct a client directly from the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        ComputeClientBuilder::new(base_url).build()
    }

    /// Construct a client from a validated [`ComputeConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured endpoint is invalid.
    pub fn from_config(config: &ComputeConfig) -> Result<Self> {
        let mut builder = ComputeClientBuilder::new(&config.endpoint).with_http_config(
            ClientConfig::new()
                .with_timeout(config.timeout())
                .with_retry_policy(RetryPolicy::new().with_max_retries(config.max_retries))
                .with_tls_verify(config.tls_verify),
        );

        if let Some(token) = &config.api_token {
            builder = builder.with_token(token.expose_secret());
        }

        builder.build()
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// List servers.
    pub async fn list_servers(&self, params: &ServerListParams) -> Result<Vec<Server>> {
        self.get_json("servers", &params.to_pairs()).await
    }

    /// Fetch a single server by id.
    pub async fn get_server(&self, id: &ServerId) -> Result<Server> {
        let path = format!("servers/{id}");
        self.get_json(&path, &[]).await
    }

    /// Request an image build from a server.
    ///
    /// The provider acknowledges with the new image's id; the build itself
    /// continues asynchronously and is observable through `list_images`.
    pub async fn create_image(&self, server: &ServerId, image_name: &str) -> Result<ImageId> {
        let path = format!("servers/{server}/action");
        let request = CreateServerImageRequest::new(image_name);
        let response: CreateServerImageResponse =
            self.send_json(Method::POST, &path, Some(&request), &[]).await?;
        Ok(response.image_id)
    }

    /// List images.
    pub async fn list_images(&self, params: &ImageListParams) -> Result<Vec<Image>> {
        self.get_json("images", &params.to_pairs()).await
    }

    async fn get_json<T>(&self, path: &str, params: &[(&'static str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.send_json::<(), T>(Method::GET, path, None, params)
            .await
    }

    async fn send_json<B, R>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        params: &[(&'static str, String)],
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .inner
            .execute_with_retry(
                method,
                path,
                params,
                |mut request| {
                    request = request.header("Accept", "application/json");
                    if let Some(payload) = body {
                        request = request.json(payload);
                    }
                    request
                },
                map_status_to_error,
            )
            .await?;

        response.json::<R>().await.map_err(|err| {
            Error::ParseError(format!("Failed to parse compute response for `{path}`: {err}"))
        })
    }
}

#[async_trait]
impl ComputeProvider for ComputeClient {
    async fn list_servers(&self, params: &ServerListParams) -> Result<Vec<Server>> {
        Self::list_servers(self, params).await
    }

    async fn get_server(&self, id: &ServerId) -> Result<Server> {
        Self::get_server(self, id).await
    }

    async fn create_image(&self, server: &ServerId, image_name: &str) -> Result<ImageId> {
        Self::create_image(self, server, image_name).await
    }

    async fn list_images(&self, params: &ImageListParams) -> Result<Vec<Image>> {
        Self::list_images(self, params).await
    }
}

fn map_status_to_error(status: StatusCode, text: String) -> Error {
    match status {
        StatusCode::NOT_FOUND => Error::NotFound(text),
        StatusCode::BAD_REQUEST => Error::InvalidRequest(text),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::InvalidRequest(format!("Compute authentication failed: {text}"))
        }
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => {
            Error::ProviderUnavailable(format!("Compute API temporarily unavailable: {text}"))
        }
        status if status.is_server_error() => {
            Error::ProviderUnavailable(format!("Compute API server error {status}: {text}"))
        }
        _ => Error::HttpError(format!("Compute API error {status}: {text}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> ComputeClient {
        ComputeClient::new(server.uri()).unwrap()
    }

    #[tokio::test]
    async fn list_servers_filters_by_anchored_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/servers"))
            .and(query_param("name", "^web1$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": "srv-1",
                    "name": "web1",
                    "status": "ACTIVE"
                }
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let servers = client
            .list_servers(&ServerListParams::exact_name("web1"))
            .await
            .unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].name, "web1");
    }

    #[tokio::test]
    async fn get_server_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/servers/srv-missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .get_server(&ServerId::new("srv-missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn create_image_posts_action_and_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/servers/srv-1/action"))
            .and(body_json(json!({"createImage": {"name": "web1-snap"}})))
            .respond_with(
                ResponseTemplate::new(202).set_body_json(json!({"image_id": "img-123"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let image_id = client
            .create_image(&ServerId::new("srv-1"), "web1-snap")
            .await
            .unwrap();
        assert_eq!(image_id, "img-123");
    }

    #[tokio::test]
    async fn create_image_surfaces_provider_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/servers/srv-1/action"))
            .respond_with(ResponseTemplate::new(400).set_body_string("snapshot quota exceeded"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .create_image(&ServerId::new("srv-1"), "web1-snap")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(ref msg) if msg.contains("quota")));
    }

    #[tokio::test]
    async fn list_images_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/images"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": "img-123",
                    "name": "web1-snap",
                    "status": "SAVING",
                    "progress": 40,
                    "server": "srv-1"
                }
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let images = client
            .list_images(&ImageListParams::default())
            .await
            .unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].status, "SAVING");
        assert_eq!(images[0].server.as_ref().unwrap(), &ServerId::new("srv-1"));
    }

    #[tokio::test]
    async fn from_config_applies_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/images"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let config = ComputeConfig::new(server.uri()).unwrap().with_max_retries(0);
        let client = ComputeClient::from_config(&config).unwrap();
        let images = client
            .list_images(&ImageListParams::default())
            .await
            .unwrap();
        assert!(images.is_empty());
    }
}
