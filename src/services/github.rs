use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Url,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use serde_json::Value;
use thiserror::Error;

use crate::{
    config::settings::Config,
    models::endpoint::{ApiEndpoint, HttpMethod},
    utils::decode::{DecodeError, JsonDecodable},
};

const ACCEPT_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to send request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("GitHub API error ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("response body is not valid JSON: {0}")]
    MalformedBody(String),
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to decode response: {0}")]
    Decode(#[from] DecodeError),
}

/// A fully-resolved request, handed to a [`Transport`] as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: Url,
    pub method: HttpMethod,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn perform_request(&self, request: &HttpRequest) -> Result<Value, TransportError>;
}

/// Transport backed by a single shared `reqwest::Client` and its connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn perform_request(&self, request: &HttpRequest) -> Result<Value, TransportError> {
        let response = self
            .client
            .request(request.method.into(), request.url.clone())
            .headers(request.headers.clone())
            .query(&request.query)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response_text = response.text().await?;

        serde_json::from_str(&response_text).map_err(|e| TransportError::MalformedBody(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct GitHubClient<T = ReqwestTransport> {
    transport: T,
    base_url: Url,
    headers: HeaderMap,
}

impl GitHubClient<ReqwestTransport> {
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.request_timeout_secs))?;

        Self::with_transport(transport, &config.github_api_url, &config.user_agent)
    }
}

impl<T: Transport> GitHubClient<T> {
    pub fn with_transport(transport: T, base_url: &str, user_agent: &str) -> Result<Self, TransportError> {
        // Without a trailing slash `Url::join` would drop the last path segment.
        let normalized = match base_url.ends_with('/') {
            true => base_url.to_string(),
            false => format!("{}/", base_url),
        };

        let base_url =
            Url::parse(&normalized).map_err(|e| TransportError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let mut headers = HeaderMap::new();

        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_MEDIA_TYPE));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).map_err(|_| TransportError::InvalidHeader("User-Agent"))?,
        );

        Ok(Self {
            transport,
            base_url,
            headers,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn build_request<E: ApiEndpoint>(&self, endpoint: &E) -> Result<HttpRequest, TransportError> {
        let path = endpoint.path().trim_start_matches('/');

        let url = self
            .base_url
            .join(path)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", path, e)))?;

        Ok(HttpRequest {
            url,
            method: endpoint.method(),
            headers: self.headers.clone(),
            query: endpoint.parameters().query_pairs(),
        })
    }

    /// Performs the request and returns the raw JSON body, undecoded.
    pub async fn send<E: ApiEndpoint>(&self, endpoint: &E) -> Result<Value, TransportError> {
        let request = self.build_request(endpoint)?;

        tracing::debug!("GitHub request: {:?} {} {:?}", request.method, request.url, request.query);

        let body = self.transport.perform_request(&request).await;

        if let Err(e) = &body {
            tracing::warn!("GitHub request to {} failed: {}", request.url, e);
        }

        body
    }

    /// Performs the request and decodes the body into the endpoint's response type.
    pub async fn request<E: ApiEndpoint>(&self, endpoint: &E) -> Result<E::Response, ApiError> {
        let body = self.send(endpoint).await?;

        E::Response::decode_value(&body).map_err(|e| {
            tracing::error!("Failed to decode response from {}: {}", endpoint.path(), e);
            ApiError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::always;
    use serde_json::json;

    use super::*;
    use crate::models::endpoint::SearchRepositories;

    fn client(transport: MockTransport, base_url: &str) -> GitHubClient<MockTransport> {
        GitHubClient::with_transport(transport, base_url, "gitsearch-test").unwrap()
    }

    #[test]
    fn test_build_request_uses_path_and_filtered_parameters() {
        let client = client(MockTransport::new(), "https://api.github.com");
        let request = client
            .build_request(&SearchRepositories::new("swift", 3))
            .unwrap();

        assert_eq!(request.url.as_str(), "https://api.github.com/search/repositories");
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(
            request.query,
            vec![
                ("q".to_string(), "swift".to_string()),
                ("page".to_string(), "3".to_string()),
            ]
        );
        assert_eq!(request.headers[ACCEPT], "application/vnd.github.v3+json");
        assert_eq!(request.headers[USER_AGENT], "gitsearch-test");
    }

    #[test]
    fn test_build_request_keeps_base_path_prefix() {
        let client = client(MockTransport::new(), "http://localhost:8080/api/v3");
        let request = client
            .build_request(&SearchRepositories::new("swift", 1))
            .unwrap();

        assert_eq!(
            request.url.as_str(),
            "http://localhost:8080/api/v3/search/repositories"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = GitHubClient::with_transport(MockTransport::new(), "not a url", "gitsearch-test");

        assert!(matches!(result, Err(TransportError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_send_hands_back_raw_body() {
        let mut transport = MockTransport::new();
        transport
            .expect_perform_request()
            .with(always())
            .times(1)
            .returning(|_| Ok(json!({"anything": [1, 2, 3]})));

        let client = client(transport, "https://api.github.com/");
        let body = client.send(&SearchRepositories::new("swift", 1)).await.unwrap();

        assert_eq!(body, json!({"anything": [1, 2, 3]}));
    }

    #[tokio::test]
    async fn test_request_surfaces_decode_errors() {
        let mut transport = MockTransport::new();
        transport
            .expect_perform_request()
            .times(1)
            .returning(|_| Ok(json!({"total_count": 0, "items": []})));

        let client = client(transport, "https://api.github.com/");
        let err = client
            .request(&SearchRepositories::new("swift", 1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::Decode(DecodeError::MissingKey(ref key)) if key == "incomplete_results"
        ));
    }

    #[tokio::test]
    async fn test_request_surfaces_transport_errors() {
        let mut transport = MockTransport::new();
        transport.expect_perform_request().times(1).returning(|_| {
            Err(TransportError::Status {
                status: 422,
                body: "Validation Failed".to_string(),
            })
        });

        let client = client(transport, "https://api.github.com/");
        let err = client
            .request(&SearchRepositories::new("swift", 1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::Transport(TransportError::Status { status: 422, .. })
        ));
    }
}
