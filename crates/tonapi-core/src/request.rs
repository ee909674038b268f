//! JSON-RPC wire types for the `/v2/websocket` endpoint.
//!
//! Outgoing commands carry string-encoded filter clauses as params. Incoming
//! frames are classified by `method` only; request IDs are never matched
//! against responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::events::{BlockEventData, MempoolEventData, TraceEventData, TransactionEventData};

/// Command method names understood by the server.
pub mod methods {
    pub const SUBSCRIBE_ACCOUNT: &str = "subscribe_account";
    pub const UNSUBSCRIBE_ACCOUNT: &str = "unsubscribe_account";
    pub const SUBSCRIBE_TRACE: &str = "subscribe_trace";
    pub const UNSUBSCRIBE_TRACE: &str = "unsubscribe_trace";
    pub const SUBSCRIBE_MEMPOOL: &str = "subscribe_mempool";
    pub const UNSUBSCRIBE_MEMPOOL: &str = "unsubscribe_mempool";
    pub const SUBSCRIBE_BLOCK: &str = "subscribe_block";
    pub const UNSUBSCRIBE_BLOCK: &str = "unsubscribe_block";

    /// Push notification methods.
    pub const TRACE: &str = "trace";
    pub const ACCOUNT_TRANSACTION: &str = "account_transaction";
    pub const MEMPOOL_MESSAGE: &str = "mempool_message";
    pub const BLOCK: &str = "block";
}

/// A JSON-RPC 2.0 request.
///
/// Serializes with fields in wire order: `id`, `jsonrpc`, `method`, `params`.
/// Empty `params` are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub id: u64,
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request.
    pub fn new(id: u64, method: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            id,
            jsonrpc: "2.0".into(),
            method: method.into(),
            params,
        }
    }
}

/// Any frame received on the websocket: push notifications and whatever
/// acknowledgements the server chooses to send.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonRpcMessage {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub params: Option<Value>,
}

/// A decoded push notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    Trace(TraceEventData),
    Transaction(TransactionEventData),
    Mempool(MempoolEventData),
    Block(BlockEventData),
}

impl PushEvent {
    /// Decode a raw websocket frame.
    ///
    /// Returns `Ok(None)` for frames whose method is unknown or absent.
    /// A malformed envelope, or a known method whose payload does not match
    /// its type, is an error.
    pub fn decode(text: &str) -> Result<Option<Self>, serde_json::Error> {
        let msg: JsonRpcMessage = serde_json::from_str(text)?;
        Self::from_message(msg)
    }

    /// Decode the typed payload of an already parsed envelope.
    pub fn from_message(msg: JsonRpcMessage) -> Result<Option<Self>, serde_json::Error> {
        let Some(method) = msg.method.as_deref() else {
            return Ok(None);
        };
        let params = msg.params.unwrap_or(Value::Null);
        let event = match method {
            methods::TRACE => Self::Trace(serde_json::from_value(params)?),
            methods::ACCOUNT_TRANSACTION => Self::Transaction(serde_json::from_value(params)?),
            methods::MEMPOOL_MESSAGE => Self::Mempool(serde_json::from_value(params)?),
            methods::BLOCK => Self::Block(serde_json::from_value(params)?),
            other => {
                tracing::trace!(method = other, "ignoring unrecognized push method");
                return Ok(None);
            }
        };
        Ok(Some(event))
    }

    /// The push method name this event arrived under.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Trace(_) => methods::TRACE,
            Self::Transaction(_) => methods::ACCOUNT_TRANSACTION,
            Self::Mempool(_) => methods::MEMPOOL_MESSAGE,
            Self::Block(_) => methods::BLOCK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_without_params() {
        let req = JsonRpcRequest::new(1, methods::SUBSCRIBE_BLOCK, vec![]);
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"id":1,"jsonrpc":"2.0","method":"subscribe_block"}"#);
    }

    #[test]
    fn request_with_params() {
        let req = JsonRpcRequest::new(1, methods::SUBSCRIBE_BLOCK, vec!["workchain=-1".into()]);
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(
            json,
            r#"{"id":1,"jsonrpc":"2.0","method":"subscribe_block","params":["workchain=-1"]}"#
        );
    }

    #[test]
    fn decode_trace_push() {
        let text = r#"{"jsonrpc":"2.0","method":"trace","params":{"accounts":["0:01"],"hash":"h1"}}"#;
        let ev = PushEvent::decode(text).unwrap().unwrap();
        assert_eq!(ev.method(), "trace");
        match ev {
            PushEvent::Trace(t) => assert_eq!(t.hash, "h1"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn decode_transaction_push() {
        let text = r#"{"method":"account_transaction","params":{"account_id":"0:01","lt":7,"tx_hash":"t"}}"#;
        let ev = PushEvent::decode(text).unwrap().unwrap();
        assert_eq!(
            ev,
            PushEvent::Transaction(TransactionEventData {
                account_id: "0:01".into(),
                lt: 7,
                tx_hash: "t".into(),
            })
        );
    }

    #[test]
    fn acknowledgement_is_ignored() {
        let text = r#"{"id":3,"jsonrpc":"2.0","result":"success! 1 new subscriptions created"}"#;
        assert!(PushEvent::decode(text).unwrap().is_none());
    }

    #[test]
    fn unknown_method_is_ignored() {
        let text = r#"{"method":"something_new","params":{"x":1}}"#;
        assert!(PushEvent::decode(text).unwrap().is_none());
    }

    #[test]
    fn malformed_envelope_is_error() {
        assert!(PushEvent::decode("{not json").is_err());
    }

    #[test]
    fn pushes_with_missing_or_null_fields_are_delivered() {
        let missing = r#"{"method":"trace","params":{"hash":"h"}}"#;
        match PushEvent::decode(missing).unwrap().unwrap() {
            PushEvent::Trace(t) => {
                assert!(t.account_ids.is_empty());
                assert_eq!(t.hash, "h");
            }
            other => panic!("unexpected event: {other:?}"),
        }

        let null_accounts = r#"{"method":"trace","params":{"accounts":null,"hash":"h"}}"#;
        assert!(matches!(PushEvent::decode(null_accounts), Ok(Some(PushEvent::Trace(_)))));

        let null_boc = r#"{"method":"mempool_message","params":{"boc":null}}"#;
        match PushEvent::decode(null_boc).unwrap().unwrap() {
            PushEvent::Mempool(m) => assert!(m.boc.is_empty()),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn known_method_with_bad_payload_is_error() {
        let text = r#"{"method":"block","params":{"workchain":"zero"}}"#;
        assert!(PushEvent::decode(text).is_err());
        let missing = r#"{"method":"trace"}"#;
        assert!(PushEvent::decode(missing).is_err());
    }
}
