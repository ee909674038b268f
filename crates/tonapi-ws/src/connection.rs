//! The connection multiplexer: one socket, many logical subscriptions.
//!
//! Every command is a single JSON-RPC request written under the writer lock.
//! Request IDs are assigned under that same lock, so the order of IDs on the
//! wire always matches the order of writes. Server acknowledgements are not
//! awaited; a write that succeeds locally counts as accepted.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use tonapi_core::events::{BlockEventData, MempoolEventData, TraceEventData, TransactionEventData};
use tonapi_core::request::methods;
use tonapi_core::{FrameSink, FrameSource, JsonRpcRequest, PushEvent, StreamError};

use crate::handlers::HandlerSlots;

struct Writer {
    sink: Box<dyn FrameSink>,
    request_id: u64,
    closed: bool,
}

/// A live websocket JSON-RPC connection.
///
/// Shared as `Arc<WsConnection>` between the read loop and the configurator.
pub struct WsConnection {
    writer: Mutex<Writer>,
    reader: Mutex<Option<Box<dyn FrameSource>>>,
    handlers: HandlerSlots,
}

impl fmt::Debug for WsConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("WsConnection");
        if let Ok(writer) = self.writer.try_lock() {
            s.field("last_request_id", &writer.request_id);
            s.field("closed", &writer.closed);
        }
        s.finish_non_exhaustive()
    }
}

impl WsConnection {
    /// Wrap an already established socket. All handlers start as no-ops.
    pub fn new(sink: impl FrameSink, source: impl FrameSource) -> Self {
        Self {
            writer: Mutex::new(Writer {
                sink: Box::new(sink),
                request_id: 0,
                closed: false,
            }),
            reader: Mutex::new(Some(Box::new(source))),
            handlers: HandlerSlots::new(),
        }
    }

    /// Subscribe to new transactions of `accounts` (all accounts when empty).
    ///
    /// When `operations` is non-empty every account is sent as
    /// `"<account>;operations=op1,op2"`. Operations are message op names such
    /// as `JettonBurn` or hex op codes such as `0x595f07bc`.
    pub async fn subscribe_to_transactions(
        &self,
        accounts: &[String],
        operations: &[String],
    ) -> Result<(), StreamError> {
        let params = if operations.is_empty() {
            accounts.to_vec()
        } else {
            let ops = format!("operations={}", operations.join(","));
            accounts.iter().map(|account| format!("{account};{ops}")).collect()
        };
        self.send(methods::SUBSCRIBE_ACCOUNT, params).await
    }

    pub async fn unsubscribe_from_transactions(&self, accounts: &[String]) -> Result<(), StreamError> {
        self.send(methods::UNSUBSCRIBE_ACCOUNT, accounts.to_vec()).await
    }

    /// Subscribe to completed traces touching `accounts`.
    pub async fn subscribe_to_traces(&self, accounts: &[String]) -> Result<(), StreamError> {
        self.send(methods::SUBSCRIBE_TRACE, accounts.to_vec()).await
    }

    pub async fn unsubscribe_from_traces(&self, accounts: &[String]) -> Result<(), StreamError> {
        self.send(methods::UNSUBSCRIBE_TRACE, accounts.to_vec()).await
    }

    /// Subscribe to mempool messages, optionally only those involving `accounts`.
    pub async fn subscribe_to_mempool(&self, accounts: &[String]) -> Result<(), StreamError> {
        let params = if accounts.is_empty() {
            Vec::new()
        } else {
            vec![format!("accounts={}", accounts.join(","))]
        };
        self.send(methods::SUBSCRIBE_MEMPOOL, params).await
    }

    pub async fn unsubscribe_from_mempool(&self) -> Result<(), StreamError> {
        self.send(methods::UNSUBSCRIBE_MEMPOOL, Vec::new()).await
    }

    /// Subscribe to new blocks of `workchain`, or of every workchain when `None`.
    pub async fn subscribe_to_blocks(&self, workchain: Option<i32>) -> Result<(), StreamError> {
        let params = workchain
            .map(|wc| vec![format!("workchain={wc}")])
            .unwrap_or_default();
        self.send(methods::SUBSCRIBE_BLOCK, params).await
    }

    pub async fn unsubscribe_from_blocks(&self) -> Result<(), StreamError> {
        self.send(methods::UNSUBSCRIBE_BLOCK, Vec::new()).await
    }

    pub fn set_mempool_handler(&self, handler: impl Fn(MempoolEventData) + Send + Sync + 'static) {
        self.handlers.set_mempool(Arc::new(handler));
    }

    pub fn set_transaction_handler(
        &self,
        handler: impl Fn(TransactionEventData) + Send + Sync + 'static,
    ) {
        self.handlers.set_transaction(Arc::new(handler));
    }

    pub fn set_trace_handler(&self, handler: impl Fn(TraceEventData) + Send + Sync + 'static) {
        self.handlers.set_trace(Arc::new(handler));
    }

    pub fn set_block_handler(&self, handler: impl Fn(BlockEventData) + Send + Sync + 'static) {
        self.handlers.set_block(Arc::new(handler));
    }

    async fn send(&self, method: &str, params: Vec<String>) -> Result<(), StreamError> {
        let mut writer = self.writer.lock().await;
        if writer.closed {
            return Err(StreamError::ConnectionClosed);
        }
        writer.request_id += 1;
        let request = JsonRpcRequest::new(writer.request_id, method, params);
        let text = serde_json::to_string(&request)?;
        tracing::debug!(id = request.id, method, "sending JSON-RPC request");
        writer.sink.send_text(text).await
    }

    /// Read frames and dispatch them until the stream fails or `cancel` fires.
    ///
    /// Any decode failure is fatal. Only one read loop may run per connection.
    pub(crate) async fn read_loop(&self, cancel: &CancellationToken) -> Result<(), StreamError> {
        let mut source = self
            .reader
            .lock()
            .await
            .take()
            .ok_or_else(|| StreamError::Other("read loop already started".into()))?;

        loop {
            let frame = tokio::select! {
                frame = source.next_text() => frame,
                _ = cancel.cancelled() => return Err(StreamError::Cancelled),
            };
            let text = match frame {
                None => return Err(StreamError::ConnectionClosed),
                Some(frame) => frame?,
            };
            match PushEvent::decode(&text) {
                Ok(Some(event)) => self.handlers.dispatch(event),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "undecodable JSON-RPC frame, closing connection");
                    return Err(e.into());
                }
            }
        }
    }

    /// Close the socket. Later calls, and commands issued afterwards, are no-ops
    /// or fail with [`StreamError::ConnectionClosed`].
    pub async fn close(&self) {
        let mut writer = self.writer.lock().await;
        if writer.closed {
            return;
        }
        writer.closed = true;
        if let Err(e) = writer.sink.close().await {
            tracing::debug!(error = %e, "error while closing websocket");
        }
    }

    /// Returns `true` once [`close`](Self::close) has run.
    pub async fn is_closed(&self) -> bool {
        self.writer.lock().await.closed
    }
}
