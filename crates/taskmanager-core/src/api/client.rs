//! HTTP pipeline shared by every service.
//!
//! `ApiClient` owns the base URL, timeout and default headers. It reads the
//! token store before each request and attaches the bearer header when a
//! token exists. Responses are logged and handed back unchanged; mapping
//! statuses to domain errors is the caller's job.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, trace, warn, Level};

use crate::auth::TokenStore;
use crate::redact;

use super::ApiError;

/// Settings for the shared HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Normalized base URL, no trailing slash
    pub base_url: String,
    pub timeout: Duration,
    /// Sent with every request on top of the JSON content headers
    pub default_headers: BTreeMap<String, String>,
}

/// API client for the Task Manager server.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in &config.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::Request(format!("invalid header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::Request(format!("invalid value for header '{}': {}", name, e)))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Request(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The store the bearer token is read from on every request
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Headers derived from the token store at call time.
    fn auth_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        let token = self
            .tokens
            .read()
            .map_err(|e| ApiError::TokenStore(format!("{:#}", e)))?;
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::Request("stored token is not a valid header value".to_string()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path);
        debug!(method = %method, url = %url, "Request");
        Ok(self.client.request(method, url).headers(self.auth_headers()?))
    }

    fn with_body<B: Serialize + ?Sized>(builder: RequestBuilder, body: &B) -> RequestBuilder {
        if tracing::enabled!(Level::TRACE) {
            trace!(body = %redact::sanitized(body), "Request body");
        }
        builder.json(body)
    }

    /// Send the request and split success from failure by status.
    async fn dispatch(builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, timeout = e.is_timeout(), "Request failed without a response");
            ApiError::from_transport(e)
        })?;
        Self::check_response(response).await
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        let url = response.url().clone();
        if status.is_success() {
            debug!(status = status.as_u16(), url = %url, "Response");
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), url = %url, "Error response");
            trace!(body = %redact::sanitize_body(&body), "Error response body");
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let text = response
            .text()
            .await
            .map_err(ApiError::from_transport)?;
        trace!(body = %redact::sanitize_body(&text), "Response body");
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("failed to parse response: {}", e)))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = Self::dispatch(self.request(Method::GET, path)?).await?;
        Self::decode(response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = Self::with_body(self.request(Method::POST, path)?, body);
        let response = Self::dispatch(builder).await?;
        Self::decode(response).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = Self::with_body(self.request(Method::PUT, path)?, body);
        let response = Self::dispatch(builder).await?;
        Self::decode(response).await
    }

    /// PUT whose response body, if any, is ignored
    pub async fn put_no_content<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let builder = Self::with_body(self.request(Method::PUT, path)?, body);
        Self::dispatch(builder).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        Self::dispatch(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }
}
