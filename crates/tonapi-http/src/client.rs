//! HTTP request path backed by `reqwest`.
//!
//! Sends arbitrary `method path?query` requests against the API root and
//! returns the raw JSON body. Generated endpoint bindings sit on top of
//! [`HttpClient::request`]; this layer knows nothing about payload schemas
//! and never retries.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::error::HttpError;
use crate::throttle::{RateLimiterConfig, ThrottledTransport};
use crate::transport::HttpTransport;

const CONTENT_TYPE_JSON: &str = "application/json";

/// Configuration for `HttpClient`.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub request_timeout: Duration,
    /// Client-side throttling; `None` sends requests as fast as they come.
    pub rate_limiter: Option<RateLimiterConfig>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            rate_limiter: None,
        }
    }
}

/// Plain request client for the REST surface.
pub struct HttpClient {
    server_url: Url,
    token: Option<String>,
    transport: Arc<dyn HttpTransport>,
}

impl HttpClient {
    /// Create a client for `server_url` using a fresh `reqwest` client.
    ///
    /// An empty or absent token sends no `Authorization` header.
    pub fn new(
        server_url: &str,
        token: Option<String>,
        config: HttpClientConfig,
    ) -> Result<Self, HttpError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let transport: Arc<dyn HttpTransport> = match config.rate_limiter {
            Some(limits) => Arc::new(ThrottledTransport::new(http, limits)),
            None => Arc::new(http),
        };
        Self::with_transport(server_url, token, transport)
    }

    /// Create a client that sends everything through `transport`.
    pub fn with_transport(
        server_url: &str,
        token: Option<String>,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, HttpError> {
        let server_url = Url::parse(server_url)
            .map_err(|e| HttpError::InvalidUrl(format!("{server_url}: {e}")))?;
        Ok(Self {
            server_url,
            token: token.filter(|t| !t.is_empty()),
            transport,
        })
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    /// Send `method path` with `query` pairs and an optional JSON `body`.
    ///
    /// `path` is resolved against the server URL, so `v2/status` and
    /// `/v2/status` both address `https://host/v2/status`. Repeated query
    /// keys are sent as given.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> Result<Value, HttpError> {
        let mut url = self
            .server_url
            .join(path)
            .map_err(|e| HttpError::InvalidUrl(format!("{path}: {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        let mut req = reqwest::Request::new(method, url);
        let headers = req.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| HttpError::InvalidToken(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        if let Some(body) = body {
            *req.body_mut() = Some(body.into());
        }

        tracing::debug!(method = %req.method(), url = %req.url(), "sending request");
        let resp = self.transport.execute(req).await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::debug!(status = %status, "request failed");
            return Err(HttpError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
