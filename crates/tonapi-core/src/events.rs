//! Event payloads delivered by the streaming transports.
//!
//! The same four payload types are produced by the WebSocket JSON-RPC channel
//! (as `params` of a push message) and by the SSE endpoints (as the `data` of
//! a `message` frame).

use serde::{Deserialize, Deserializer, Serialize};

/// Raw textual account address, e.g. `"-1:5555…5555"` or `"0:abcd…"`.
pub type AccountId = String;

/// A new message entered the mempool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MempoolEventData {
    /// Serialized message bag-of-cells (base64 on the wire, `null` reads as empty).
    #[serde(with = "base64_bytes")]
    pub boc: Vec<u8>,
    /// Accounts involved in the emulated trace of the message.
    ///
    /// Only present when the subscription named a set of accounts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub involved_accounts: Option<Vec<AccountId>>,
}

/// A new transaction was committed for a watched account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionEventData {
    #[serde(deserialize_with = "null_as_default")]
    pub account_id: AccountId,
    /// Logical time of the transaction within the account.
    #[serde(deserialize_with = "null_as_default")]
    pub lt: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub tx_hash: String,
}

/// A trace touching the watched accounts has completed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceEventData {
    #[serde(rename = "accounts", deserialize_with = "null_as_default")]
    pub account_ids: Vec<AccountId>,
    #[serde(deserialize_with = "null_as_default")]
    pub hash: String,
}

/// A new block was produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockEventData {
    #[serde(deserialize_with = "null_as_default")]
    pub workchain: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub shard: String,
    #[serde(deserialize_with = "null_as_default")]
    pub seqno: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub root_hash: String,
    #[serde(deserialize_with = "null_as_default")]
    pub file_hash: String,
}

// Missing fields come from the container default; explicit nulls land here.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(encoded) => STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}
