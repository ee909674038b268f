//! tonapi: real-time TON blockchain streaming.
//!
//! One entry point over three transports:
//! - a multiplexed WebSocket JSON-RPC connection ([`StreamingApi::websocket_handle_requests`]),
//! - independent SSE subscriptions (`subscribe_to_*`),
//! - a plain HTTP request path ([`StreamingApi::http_client`]).
//!
//! # Quick start
//! ```rust,no_run
//! use tonapi::{CancellationToken, StreamingApi};
//!
//! # async fn run() -> Result<(), tonapi::StreamError> {
//! let api = StreamingApi::builder().testnet().token("YOUR_TOKEN").build();
//! let cancel = CancellationToken::new();
//!
//! api.websocket_handle_requests(&cancel, |conn, token| async move {
//!     conn.set_block_handler(|block| println!("block {}", block.seqno));
//!     conn.subscribe_to_blocks(Some(-1)).await?;
//!     // returning would end the connection
//!     token.cancelled().await;
//!     Ok::<(), tonapi::StreamError>(())
//! })
//! .await
//! # }
//! ```

pub mod config;
pub mod logging;

use std::future::Future;
use std::sync::Arc;

pub use config::StreamingConfig;
pub use logging::{init_tracing, LogConfig};
pub use tokio_util::sync::CancellationToken;
pub use tonapi_core::{
    AccountId, BlockEventData, MempoolEventData, StreamError, TraceEventData, TransactionEventData,
};
pub use tonapi_http::{HttpClient, HttpClientConfig, HttpError, RateLimiterConfig};
pub use tonapi_sse::SseSubscriber;
pub use tonapi_ws::WsConnection;

/// Mainnet API root.
pub const TONAPI_URL: &str = "https://tonapi.io";
/// Testnet API root.
pub const TESTNET_TONAPI_URL: &str = "https://testnet.tonapi.io";

/// Streaming client bound to one endpoint and token.
#[derive(Debug, Clone)]
pub struct StreamingApi {
    endpoint: String,
    token: Option<String>,
    sse: SseSubscriber,
}

/// Builder for [`StreamingApi`].
#[derive(Debug, Clone)]
pub struct StreamingApiBuilder {
    endpoint: String,
    token: Option<String>,
}

impl Default for StreamingApiBuilder {
    fn default() -> Self {
        Self {
            endpoint: TONAPI_URL.to_string(),
            token: None,
        }
    }
}

impl StreamingApiBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn testnet(self) -> Self {
        self.endpoint(TESTNET_TONAPI_URL)
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn build(self) -> StreamingApi {
        let token = self.token.filter(|t| !t.is_empty());
        StreamingApi {
            sse: SseSubscriber::new(token.clone()),
            endpoint: self.endpoint,
            token,
        }
    }
}

impl StreamingApi {
    pub fn builder() -> StreamingApiBuilder {
        StreamingApiBuilder::default()
    }

    pub fn from_config(config: &StreamingConfig) -> Self {
        let mut builder = Self::builder().endpoint(config.endpoint.clone());
        if let Some(token) = &config.token {
            builder = builder.token(token.clone());
        }
        builder.build()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Dial the websocket and run `configurator` next to the read loop.
    ///
    /// Returns when `cancel` fires, the configurator fails, or the stream
    /// breaks. The connection is closed in every case and never redialed.
    pub async fn websocket_handle_requests<F, Fut>(
        &self,
        cancel: &CancellationToken,
        configurator: F,
    ) -> Result<(), StreamError>
    where
        F: FnOnce(Arc<WsConnection>, CancellationToken) -> Fut,
        Fut: Future<Output = Result<(), StreamError>>,
    {
        let api_key = self.token.as_deref().unwrap_or_default();
        tracing::debug!(endpoint = %self.endpoint, authenticated = self.token.is_some(), "dialing streaming websocket");
        let conn = match tonapi_ws::connect(&self.endpoint, api_key, cancel).await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(endpoint = %self.endpoint, error = %e, "websocket dial failed");
                return Err(e);
            }
        };
        let res = tonapi_ws::run_json_rpc(Arc::new(conn), cancel, configurator).await;
        tracing::debug!(endpoint = %self.endpoint, ok = res.is_ok(), "websocket session finished");
        res
    }

    /// SSE trace stream; all accounts when `accounts` is empty.
    pub async fn subscribe_to_traces(
        &self,
        accounts: &[String],
        cancel: &CancellationToken,
        handler: impl FnMut(TraceEventData) + Send,
    ) -> Result<(), StreamError> {
        self.sse
            .subscribe_to_traces(&self.endpoint, accounts, cancel, handler)
            .await
    }

    pub async fn subscribe_to_mempool(
        &self,
        accounts: &[String],
        cancel: &CancellationToken,
        handler: impl FnMut(MempoolEventData) + Send,
    ) -> Result<(), StreamError> {
        self.sse
            .subscribe_to_mempool(&self.endpoint, accounts, cancel, handler)
            .await
    }

    pub async fn subscribe_to_transactions(
        &self,
        accounts: &[String],
        operations: &[String],
        cancel: &CancellationToken,
        handler: impl FnMut(TransactionEventData) + Send,
    ) -> Result<(), StreamError> {
        self.sse
            .subscribe_to_transactions(&self.endpoint, accounts, operations, cancel, handler)
            .await
    }

    pub async fn subscribe_to_blocks(
        &self,
        workchain: Option<i32>,
        cancel: &CancellationToken,
        handler: impl FnMut(BlockEventData) + Send,
    ) -> Result<(), StreamError> {
        self.sse
            .subscribe_to_blocks(&self.endpoint, workchain, cancel, handler)
            .await
    }

    /// Plain HTTP client sharing this endpoint and token.
    pub fn http_client(&self, config: HttpClientConfig) -> Result<HttpClient, HttpError> {
        HttpClient::new(&self.endpoint, self.token.clone(), config)
    }
}
