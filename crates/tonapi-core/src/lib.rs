//! tonapi-core: foundation types for the tonapi streaming SDK.
//!
//! # Overview
//!
//! The core crate defines what both streaming transports share:
//!
//! - [`StreamError`]: structured error type
//! - [`JsonRpcRequest`] / [`PushEvent`]: websocket wire types and codec
//! - [`events`]: the four event payloads handed to callbacks
//! - [`FrameSink`] / [`FrameSource`]: the socket seam used by the multiplexer

pub mod error;
pub mod events;
pub mod request;
pub mod transport;

pub use error::StreamError;
pub use events::{AccountId, BlockEventData, MempoolEventData, TraceEventData, TransactionEventData};
pub use request::{methods, JsonRpcMessage, JsonRpcRequest, PushEvent};
pub use transport::{FrameSink, FrameSource};
