//! Decoding of indexed event arguments from their 32-byte topics.
//!
//! # EVM indexed-parameter encoding rules
//! - **Value types** (address, intN, uintN, bool, bytesN) are ABI-encoded
//!   into exactly one word and can be read back.
//! - **`string` / `bytes`** are stored as `keccak256` of the value. The
//!   original is unrecoverable; the hash is kept as-is.
//! - **Arrays, tuples, function pointers** have no single-word reading here;
//!   the raw topic is kept and the caller warns.

use alloy_dyn_abi::DynSolType;
use alloy_primitives::{Address, B256, I256, U256};
use logcodec_core::FieldValue;

/// How a topic relates to the value of its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
    /// The word is the value
    Value,
    /// The word is the keccak256 of a dynamic value
    Hash,
    /// The word cannot be read back as a typed value
    Opaque,
}

pub fn topic_kind(ty: &DynSolType) -> TopicKind {
    match ty {
        DynSolType::Address
        | DynSolType::Uint(_)
        | DynSolType::Int(_)
        | DynSolType::Bool
        | DynSolType::FixedBytes(_) => TopicKind::Value,
        DynSolType::String | DynSolType::Bytes => TopicKind::Hash,
        _ => TopicKind::Opaque,
    }
}

/// Reinterpret one topic according to the declared argument type.
///
/// Signed integers are read as two's complement over the full word so a
/// negative value round-trips; unsigned integers are the plain big-endian
/// value.
pub fn decode_indexed(word: B256, ty: &DynSolType) -> FieldValue {
    match ty {
        DynSolType::Address => FieldValue::Address(Address::from_word(word)),
        DynSolType::Uint(bits) => FieldValue::Uint(U256::from_be_bytes(word.0), *bits),
        DynSolType::Int(bits) => {
            FieldValue::Int(I256::from_raw(U256::from_be_bytes(word.0)), *bits)
        }
        DynSolType::Bool => FieldValue::Bool(!word.is_zero()),
        DynSolType::FixedBytes(size) => FieldValue::FixedBytes(word, *size),
        _ => FieldValue::TopicHash(word),
    }
}
