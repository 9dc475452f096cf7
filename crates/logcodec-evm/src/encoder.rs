//! Log encoder — the inverse of the decoder.
//!
//! Builds `topics` and `data` for an event from values given in
//! declaration order. Indexed `string` / `bytes` values are hashed, as the
//! EVM does when emitting them.
//!
//! # Usage
//! ```ignore
//! let encoder = LogEncoder::new(abi.clone());
//! let log = encoder.encode("FundsAdded", &[
//!     FieldValue::Address(funder),
//!     FieldValue::Uint(U256::from(1_000u64), 256),
//! ], contract)?;
//! ```

use alloy_core::dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256};
use logcodec_core::{FieldValue, RawLog};
use std::sync::Arc;
use thiserror::Error;

use crate::abi::{AbiHandle, EventSignature};
use crate::fingerprint;
use crate::normalizer;
use crate::topic::{self, TopicKind};

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("event '{0}' not found in ABI")]
    UnknownEvent(String),

    #[error("{event}: expected {expected} values, got {got}")]
    Arity {
        event: String,
        expected: usize,
        got: usize,
    },

    #[error("{event}.{param}: {reason}")]
    Value {
        event: String,
        param: String,
        reason: String,
    },
}

/// Encodes event values into raw logs for one ABI.
#[derive(Debug, Clone)]
pub struct LogEncoder {
    abi: Arc<AbiHandle>,
}

impl LogEncoder {
    pub fn new(abi: Arc<AbiHandle>) -> Self {
        Self { abi }
    }

    /// Encode the named event. Positional metadata on the returned log is zeroed.
    pub fn encode(
        &self,
        event: &str,
        values: &[FieldValue],
        emitter: Address,
    ) -> Result<RawLog, EncodeError> {
        let sig = self
            .abi
            .event(event)
            .ok_or_else(|| EncodeError::UnknownEvent(event.to_string()))?;
        let (topics, data) = encode_with(sig, values)?;
        Ok(RawLog::new(emitter, topics, data))
    }
}

/// Encode `values` (declaration order) for `sig` into `(topics, data)`.
pub fn encode_with(
    sig: &EventSignature,
    values: &[FieldValue],
) -> Result<(Vec<B256>, Vec<u8>), EncodeError> {
    if values.len() != sig.inputs.len() {
        return Err(EncodeError::Arity {
            event: sig.name.clone(),
            expected: sig.inputs.len(),
            got: values.len(),
        });
    }

    let mut topics = Vec::with_capacity(sig.expected_topics());
    if !sig.anonymous {
        topics.push(sig.selector);
    }
    let mut data_values = Vec::new();

    for (input, value) in sig.inputs.iter().zip(values) {
        let value_err = |reason: String| EncodeError::Value {
            event: sig.name.clone(),
            param: input.name.clone(),
            reason,
        };

        if !input.indexed {
            data_values.push(normalizer::to_dyn_value(value, &input.ty).map_err(value_err)?);
            continue;
        }

        let word = match (topic::topic_kind(&input.ty), value) {
            // A precomputed hash is accepted for any non-value type
            (TopicKind::Hash | TopicKind::Opaque, FieldValue::TopicHash(h)) => *h,
            (TopicKind::Hash, FieldValue::String(s)) => fingerprint::keccak256(s.as_bytes()),
            (TopicKind::Hash, FieldValue::Bytes(b)) => fingerprint::keccak256(b),
            (TopicKind::Value, v) => {
                let dyn_val = normalizer::to_dyn_value(v, &input.ty).map_err(value_err)?;
                dyn_val
                    .as_word()
                    .ok_or_else(|| value_err(format!("{} does not fit one word", input.ty)))?
            }
            (_, v) => {
                return Err(value_err(format!(
                    "indexed {} needs its topic hash, got {}",
                    input.ty,
                    v.kind()
                )))
            }
        };
        topics.push(word);
    }

    let data = if data_values.is_empty() {
        Vec::new()
    } else {
        DynSolValue::Tuple(data_values).abi_encode_params()
    };
    Ok((topics, data))
}
