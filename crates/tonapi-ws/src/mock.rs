//! In-memory socket for multiplexer tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use tonapi_core::{FrameSink, FrameSource, JsonRpcRequest, StreamError};

use crate::connection::WsConnection;

#[derive(Default)]
struct Recorded {
    written: Mutex<Vec<String>>,
    closes: AtomicUsize,
    fail_writes: AtomicBool,
}

pub(crate) struct MockSink(Arc<Recorded>);

#[async_trait]
impl FrameSink for MockSink {
    async fn send_text(&mut self, text: String) -> Result<(), StreamError> {
        if self.0.fail_writes.load(Ordering::SeqCst) {
            return Err(StreamError::Write("broken pipe".into()));
        }
        self.0.written.lock().unwrap().push(text);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), StreamError> {
        self.0.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) struct MockSource(mpsc::UnboundedReceiver<Result<String, StreamError>>);

#[async_trait]
impl FrameSource for MockSource {
    async fn next_text(&mut self) -> Option<Result<String, StreamError>> {
        self.0.recv().await
    }
}

/// The server side of a mock connection.
pub(crate) struct MockPeer {
    recorded: Arc<Recorded>,
    inbound: Mutex<Option<mpsc::UnboundedSender<Result<String, StreamError>>>>,
}

impl MockPeer {
    /// Frames written by the client, in write order.
    pub fn written(&self) -> Vec<String> {
        self.recorded.written.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<JsonRpcRequest> {
        self.written()
            .iter()
            .map(|t| serde_json::from_str(t).unwrap())
            .collect()
    }

    pub fn close_count(&self) -> usize {
        self.recorded.closes.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self) {
        self.recorded.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Queue a frame for the client's read loop.
    pub fn push(&self, text: &str) {
        if let Some(tx) = self.inbound.lock().unwrap().as_ref() {
            let _ = tx.send(Ok(text.to_string()));
        }
    }

    /// End the inbound stream after the queued frames.
    pub fn hang_up(&self) {
        self.inbound.lock().unwrap().take();
    }
}

pub(crate) fn mock_connection() -> (WsConnection, MockPeer) {
    let recorded = Arc::new(Recorded::default());
    let (tx, rx) = mpsc::unbounded_channel();
    let conn = WsConnection::new(MockSink(recorded.clone()), MockSource(rx));
    let peer = MockPeer {
        recorded,
        inbound: Mutex::new(Some(tx)),
    };
    (conn, peer)
}
