//! The injectable base transport.

use async_trait::async_trait;

use crate::error::HttpError;

/// Executes one prepared HTTP request.
///
/// Implemented for `reqwest::Client`; wrap it (see
/// [`ThrottledTransport`](crate::throttle::ThrottledTransport)) or replace it
/// to add throttling, proxies or recording in tests.
#[async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    async fn execute(&self, req: reqwest::Request) -> Result<reqwest::Response, HttpError>;
}

#[async_trait]
impl HttpTransport for reqwest::Client {
    async fn execute(&self, req: reqwest::Request) -> Result<reqwest::Response, HttpError> {
        reqwest::Client::execute(self, req)
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))
    }
}
