//! Frame-level transport traits: the seam between the multiplexer and a
//! physical socket.

use async_trait::async_trait;

use crate::error::StreamError;

/// Write half of a message-oriented socket.
///
/// # Thread Safety
/// Implementations must be `Send` so the owning connection can be shared
/// across Tokio tasks behind a lock.
#[async_trait]
pub trait FrameSink: Send + 'static {
    /// Write one text frame.
    async fn send_text(&mut self, text: String) -> Result<(), StreamError>;

    /// Close the socket. Called at most once per connection.
    async fn close(&mut self) -> Result<(), StreamError>;
}

/// Read half of a message-oriented socket.
#[async_trait]
pub trait FrameSource: Send + 'static {
    /// Wait for the next data frame.
    ///
    /// Returns `None` once the peer has closed the stream. Control frames are
    /// handled by the implementation and never surface here.
    async fn next_text(&mut self) -> Option<Result<String, StreamError>>;
}
