//! tonapi-sse: Server-Sent-Events subscriptions.
//!
//! Each subscription is one streaming HTTP GET against a topic endpoint
//! (traces, transactions, mempool, blocks). Subscriptions share no state and
//! do not reconnect on their own.
//!
//! # Usage
//! ```rust,no_run
//! use tonapi_sse::SseSubscriber;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() {
//! let sse = SseSubscriber::new(None);
//! let cancel = CancellationToken::new();
//! let res = sse
//!     .subscribe_to_traces("https://tonapi.io", &[], &cancel, |trace| {
//!         println!("trace {}", trace.hash);
//!     })
//!     .await;
//! # let _ = res;
//! # }
//! ```

pub mod decoder;
pub mod subscriber;
pub mod topics;

pub use decoder::{SseFrame, SseFrameDecoder};
pub use subscriber::{SseSubscriber, HEARTBEAT_EVENT, MESSAGE_EVENT};
