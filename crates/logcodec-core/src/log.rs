//! Raw and decoded log types.

use crate::value::FieldValue;
use alloy_primitives::{Address, Bytes, B256};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A raw, undecoded log as returned by `eth_getLogs` or pushed by an
/// `eth_subscribe("logs")` subscription. This is the input to every decoder.
///
/// Field names and quantity encoding follow the Ethereum JSON-RPC shape, so a
/// node response deserializes directly into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    /// Contract that emitted the log
    pub address: Address,
    /// topics[0] is the event signature hash; topics[1..] carry indexed arguments
    #[serde(default)]
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed arguments
    #[serde(default)]
    pub data: Bytes,
    #[serde(default, with = "alloy_serde::quantity")]
    pub block_number: u64,
    #[serde(default)]
    pub block_hash: B256,
    #[serde(default)]
    pub transaction_hash: B256,
    #[serde(default, with = "alloy_serde::quantity")]
    pub transaction_index: u64,
    #[serde(default, with = "alloy_serde::quantity")]
    pub log_index: u64,
    /// Set when a chain reorganisation invalidated this log
    #[serde(default)]
    pub removed: bool,
}

impl RawLog {
    /// Build a log carrying only an address, topics and data.
    /// Positional metadata is zeroed.
    pub fn new(address: Address, topics: Vec<B256>, data: impl Into<Bytes>) -> Self {
        Self {
            address,
            topics,
            data: data.into(),
            block_number: 0,
            block_hash: B256::ZERO,
            transaction_hash: B256::ZERO,
            transaction_index: 0,
            log_index: 0,
            removed: false,
        }
    }

    /// The event signature hash, if the log has any topics.
    pub fn topic0(&self) -> Option<&B256> {
        self.topics.first()
    }

    /// Positional metadata copied into every output record.
    pub fn meta(&self) -> LogMeta {
        LogMeta {
            emitting_address: self.address,
            block_number: self.block_number,
            block_hash: self.block_hash,
            tx_hash: self.transaction_hash,
            tx_index: self.transaction_index,
            log_index: self.log_index,
            removed: self.removed,
        }
    }

    /// `"<txHash>:<logIndex>"` identifies a log across redeliveries. A reorg
    /// removal gets a `:removed` suffix so it is never folded into the
    /// original delivery.
    pub fn dedup_key(&self) -> String {
        dedup_key(&self.transaction_hash, self.log_index, self.removed)
    }
}

/// Shared by raw logs and decoded records so both produce the same key.
pub fn dedup_key(tx_hash: &B256, log_index: u64, removed: bool) -> String {
    if removed {
        format!("{tx_hash:#x}:{log_index}:removed")
    } else {
        format!("{tx_hash:#x}:{log_index}")
    }
}

/// Where a log sits on chain. Carried unchanged from the raw log into the
/// emitted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMeta {
    pub emitting_address: Address,
    pub block_number: u64,
    pub block_hash: B256,
    pub tx_hash: B256,
    pub tx_index: u64,
    pub log_index: u64,
    pub removed: bool,
}

/// A log matched against an ABI event and decoded into named values.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedLog {
    /// Name of the matched ABI event
    pub event: String,
    /// keccak256 of the event's canonical signature (equals `log.topics[0]`)
    pub selector: B256,
    /// Indexed and non-indexed arguments merged, in ABI declaration order
    pub fields: IndexMap<String, FieldValue>,
    /// The originating log
    pub log: RawLog,
}

impl DecodedLog {
    /// Get a decoded argument by name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn meta(&self) -> LogMeta {
        self.log.meta()
    }
}
