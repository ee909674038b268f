//! Errors of the plain request path.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    /// The server URL or the request path could not be turned into a URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The configured token cannot be sent as an `Authorization` header.
    #[error("invalid API token: {0}")]
    InvalidToken(String),

    /// The request never produced a response (connection refused, timeout, ...).
    #[error("HTTP transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    ///
    /// Displays as the status line, e.g. `405 Method Not Allowed`.
    #[error("{code} {reason}")]
    Status { code: u16, reason: String },

    /// The response body is not valid JSON.
    #[error("invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}
