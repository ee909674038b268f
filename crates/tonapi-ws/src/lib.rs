//! tonapi-ws: multiplexed WebSocket JSON-RPC subscriptions.
//!
//! # Features
//! - One socket carries transaction, trace, mempool and block subscriptions
//! - Serialized writes with strictly increasing request IDs
//! - Per-topic handler slots, replaceable while the stream is live
//! - A caller configurator running alongside the read loop
//!
//! There is no automatic reconnect: when [`run_json_rpc`] returns, the
//! connection is gone and the caller decides whether to dial again.

pub mod connection;
pub mod dialer;
pub mod handlers;
pub mod runner;

#[cfg(test)]
mod mock;

pub use connection::WsConnection;
pub use dialer::{connect, websocket_url, WsSink, WsSource};
pub use handlers::{BlockHandler, HandlerSlots, MempoolHandler, TraceHandler, TransactionHandler};
pub use runner::run_json_rpc;
