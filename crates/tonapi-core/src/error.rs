//! Streaming error types.

use thiserror::Error;

/// Errors that can occur on a streaming transport (WebSocket or SSE).
#[derive(Debug, Error)]
pub enum StreamError {
    /// The endpoint URL could not be parsed or rewritten.
    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// TCP/TLS/WebSocket handshake failed.
    #[error("dial {url} failed: {reason}")]
    Dial { url: String, reason: String },

    /// WebSocket read error on an established connection.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// A frame or payload could not be decoded (or a request encoded).
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Socket write failed for a subscribe/unsubscribe command.
    #[error("write failed: {0}")]
    Write(String),

    /// The remote side closed the connection or the stream ended.
    #[error("connection closed")]
    ConnectionClosed,

    /// The SSE endpoint answered with a non-success status or the body failed.
    #[error("HTTP error: {message}")]
    Http { status: Option<u16>, message: String },

    /// The caller's cancellation token fired.
    #[error("cancelled")]
    Cancelled,

    /// The caller-supplied configurator failed.
    #[error("configurator failed: {0}")]
    Configurator(String),

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

impl StreamError {
    /// Returns `true` if the error ends the stream it occurred on.
    ///
    /// A write error only fails the single subscribe/unsubscribe call.
    pub fn is_fatal_to_stream(&self) -> bool {
        !matches!(self, Self::Write(_))
    }

    /// Returns `true` if re-dialing or re-subscribing may succeed.
    ///
    /// Useful for caller-owned reconnect loops; the SDK never retries itself.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Dial { .. } | Self::WebSocket(_) | Self::ConnectionClosed | Self::Write(_) => true,
            Self::Http { status, .. } => match status {
                None => true,
                Some(code) => *code == 429 || *code >= 500,
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_error_is_not_fatal() {
        assert!(!StreamError::Write("broken pipe".into()).is_fatal_to_stream());
        assert!(StreamError::ConnectionClosed.is_fatal_to_stream());
    }

    #[test]
    fn retryable_classification() {
        assert!(StreamError::ConnectionClosed.is_retryable());
        assert!(StreamError::Http { status: Some(503), message: "unavailable".into() }.is_retryable());
        assert!(!StreamError::Http { status: Some(401), message: "unauthorized".into() }.is_retryable());
        assert!(!StreamError::Cancelled.is_retryable());
    }

    #[test]
    fn http_display() {
        let err = StreamError::Http { status: Some(404), message: "404 Not Found".into() };
        assert_eq!(err.to_string(), "HTTP error: 404 Not Found");
    }
}
