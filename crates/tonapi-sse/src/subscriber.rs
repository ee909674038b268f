//! One long-lived SSE stream per subscription.
//!
//! Frames named `heartbeat` are dropped, frames named `message` are handed to
//! the callback, everything else is ignored. A frame whose payload fails to
//! decode is logged and skipped; only transport failures end the stream.
//! Nothing reconnects: callers that want resilience call `subscribe_*` again.

use futures::StreamExt;
use reqwest::header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use tonapi_core::events::{BlockEventData, MempoolEventData, TraceEventData, TransactionEventData};
use tonapi_core::StreamError;

use crate::decoder::SseFrameDecoder;
use crate::topics;

/// Keep-alive frames.
pub const HEARTBEAT_EVENT: &str = "heartbeat";
/// Frames carrying an event payload.
pub const MESSAGE_EVENT: &str = "message";

/// SSE client shared by all topic subscriptions.
///
/// Cheap to clone; subscriptions hold no shared state and may run in parallel.
#[derive(Debug, Clone)]
pub struct SseSubscriber {
    http: reqwest::Client,
    token: Option<String>,
}

impl SseSubscriber {
    /// Create a subscriber; an empty or absent token sends no auth header.
    pub fn new(token: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), token)
    }

    /// Create a subscriber on top of a preconfigured `reqwest` client.
    pub fn with_client(http: reqwest::Client, token: Option<String>) -> Self {
        Self {
            http,
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Stream `url` and call `on_message` with the data of every `message` frame.
    ///
    /// Blocks until the stream fails ([`StreamError::Http`]), ends
    /// ([`StreamError::ConnectionClosed`]) or `cancel` fires
    /// ([`StreamError::Cancelled`]).
    pub async fn subscribe(
        &self,
        url: &str,
        cancel: &CancellationToken,
        mut on_message: impl FnMut(&str) + Send,
    ) -> Result<(), StreamError> {
        let mut req = self
            .http
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache");
        if let Some(token) = &self.token {
            req = req.header(AUTHORIZATION, format!("bearer {token}"));
        }

        tracing::info!(url = %url, "opening SSE stream");
        let resp = tokio::select! {
            resp = req.send() => resp.map_err(|e| StreamError::Http {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            })?,
            _ = cancel.cancelled() => return Err(StreamError::Cancelled),
        };

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "SSE endpoint rejected subscription");
            return Err(StreamError::Http {
                status: Some(status.as_u16()),
                message: status.to_string(),
            });
        }

        let mut body = resp.bytes_stream();
        let mut decoder = SseFrameDecoder::new();
        loop {
            let chunk = tokio::select! {
                chunk = body.next() => chunk,
                _ = cancel.cancelled() => return Err(StreamError::Cancelled),
            };
            let chunk = match chunk {
                None => {
                    tracing::info!(url = %url, "SSE stream ended");
                    return Err(StreamError::ConnectionClosed);
                }
                Some(Err(e)) => {
                    tracing::warn!(url = %url, error = %e, "SSE stream failed");
                    return Err(StreamError::Http {
                        status: None,
                        message: e.to_string(),
                    });
                }
                Some(Ok(chunk)) => chunk,
            };

            for frame in decoder.feed(&chunk) {
                match frame.event.as_deref() {
                    Some(HEARTBEAT_EVENT) => tracing::trace!(url = %url, "heartbeat"),
                    Some(MESSAGE_EVENT) => on_message(&frame.data),
                    other => tracing::trace!(url = %url, event = ?other, "ignoring SSE frame"),
                }
            }
        }
    }

    /// Completed traces of `accounts` (all accounts when empty).
    pub async fn subscribe_to_traces(
        &self,
        endpoint: &str,
        accounts: &[String],
        cancel: &CancellationToken,
        handler: impl FnMut(TraceEventData) + Send,
    ) -> Result<(), StreamError> {
        let url = topics::traces_url(endpoint, accounts);
        self.subscribe_decoded(&url, "trace", cancel, handler).await
    }

    /// Mempool messages, only those involving `accounts` when non-empty.
    pub async fn subscribe_to_mempool(
        &self,
        endpoint: &str,
        accounts: &[String],
        cancel: &CancellationToken,
        handler: impl FnMut(MempoolEventData) + Send,
    ) -> Result<(), StreamError> {
        let url = topics::mempool_url(endpoint, accounts);
        self.subscribe_decoded(&url, "mempool", cancel, handler).await
    }

    /// New transactions of `accounts` (all accounts when empty), optionally
    /// only those carrying one of `operations`.
    pub async fn subscribe_to_transactions(
        &self,
        endpoint: &str,
        accounts: &[String],
        operations: &[String],
        cancel: &CancellationToken,
        handler: impl FnMut(TransactionEventData) + Send,
    ) -> Result<(), StreamError> {
        let url = topics::transactions_url(endpoint, accounts, operations);
        self.subscribe_decoded(&url, "transaction", cancel, handler).await
    }

    /// New blocks of `workchain`, or of every workchain when `None`.
    pub async fn subscribe_to_blocks(
        &self,
        endpoint: &str,
        workchain: Option<i32>,
        cancel: &CancellationToken,
        handler: impl FnMut(BlockEventData) + Send,
    ) -> Result<(), StreamError> {
        let url = topics::blocks_url(endpoint, workchain);
        self.subscribe_decoded(&url, "block", cancel, handler).await
    }

    async fn subscribe_decoded<T: DeserializeOwned>(
        &self,
        url: &str,
        topic: &'static str,
        cancel: &CancellationToken,
        mut handler: impl FnMut(T) + Send,
    ) -> Result<(), StreamError> {
        self.subscribe(url, cancel, |data| match serde_json::from_str::<T>(data) {
            Ok(event) => handler(event),
            Err(e) => {
                tracing::error!(topic, error = %e, "sse connection received invalid {topic} event data");
            }
        })
        .await
    }
}
