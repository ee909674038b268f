//! tonapi-http: plain HTTP request path.
//!
//! [`HttpClient::request`] sends `method path?query` with an optional JSON
//! body and hands back the decoded JSON. The transport underneath is a trait
//! object, so callers can wrap it in a [`ThrottledTransport`] or replace it
//! outright.

pub mod client;
pub mod error;
pub mod throttle;
pub mod transport;

pub use client::{HttpClient, HttpClientConfig};
pub use error::HttpError;
pub use throttle::{RateLimiter, RateLimiterConfig, ThrottledTransport};
pub use transport::HttpTransport;
