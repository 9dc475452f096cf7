//! Typed values produced by the ABI decoder.
//!
//! Values keep their EVM representation (`U256`, `Address`, 32-byte words)
//! so the mapper can assert on exact types. The accessors return `None` on a
//! type mismatch; callers treat that as "field absent" rather than failing.

use alloy_primitives::{Address, B256, I256, U256};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::fmt;

/// A single decoded event argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Address(Address),
    /// Unsigned integer with its declared bit width
    Uint(U256, usize),
    /// Signed integer with its declared bit width
    Int(I256, usize),
    Bool(bool),
    /// `bytesN`: the 32-byte word holding the value, and N
    FixedBytes(B256, usize),
    Bytes(Vec<u8>),
    String(String),
    /// Indexed value whose topic holds only a hash (`string`, `bytes`) or whose
    /// type cannot be read back from a single word (arrays, tuples)
    TopicHash(B256),
    Array(Vec<FieldValue>),
    Tuple(Vec<FieldValue>),
}

impl FieldValue {
    pub fn as_address(&self) -> Option<Address> {
        match self {
            FieldValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            FieldValue::Uint(u, _) => Some(*u),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            FieldValue::Int(i, _) => Some(*i),
            _ => None,
        }
    }

    /// A full 32-byte word: `bytes32` or a topic hash.
    pub fn as_word(&self) -> Option<B256> {
        match self {
            FieldValue::FixedBytes(w, 32) => Some(*w),
            FieldValue::TopicHash(h) => Some(*h),
            _ => None,
        }
    }

    /// The significant bytes of a `bytesN` value.
    pub fn as_fixed_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::FixedBytes(w, n) => Some(&w[..*n]),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(v) => Some(v),
            _ => None,
        }
    }

    /// An `address[]`. Returns `None` if any element is not an address.
    pub fn as_address_array(&self) -> Option<Vec<Address>> {
        self.as_array()?.iter().map(FieldValue::as_address).collect()
    }

    /// Short type label used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Address(_) => "address",
            FieldValue::Uint(..) => "uint",
            FieldValue::Int(..) => "int",
            FieldValue::Bool(_) => "bool",
            FieldValue::FixedBytes(..) => "fixed_bytes",
            FieldValue::Bytes(_) => "bytes",
            FieldValue::String(_) => "string",
            FieldValue::TopicHash(_) => "topic_hash",
            FieldValue::Array(_) => "array",
            FieldValue::Tuple(_) => "tuple",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Address(a) => write!(f, "{}", a.to_checksum(None)),
            FieldValue::Uint(u, _) => write!(f, "{u}"),
            FieldValue::Int(i, _) => write!(f, "{i}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::FixedBytes(w, n) => write!(f, "0x{}", hex::encode(&w[..*n])),
            FieldValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::TopicHash(h) => write!(f, "{h:#x}"),
            FieldValue::Array(v) | FieldValue::Tuple(v) => {
                let parts: Vec<_> = v.iter().map(|x| x.to_string()).collect();
                if matches!(self, FieldValue::Tuple(_)) {
                    write!(f, "({})", parts.join(", "))
                } else {
                    write!(f, "[{}]", parts.join(", "))
                }
            }
        }
    }
}

/// JSON form: integers as decimal strings (they overflow JSON numbers),
/// addresses checksummed, bytes and hashes as 0x-hex, containers as arrays.
impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Array(v) | FieldValue::Tuple(v) => {
                let mut seq = serializer.serialize_seq(Some(v.len()))?;
                for item in v {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            other => serializer.collect_str(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn accessors_reject_other_types() {
        let v = FieldValue::Uint(U256::from(100u64), 256);
        assert_eq!(v.as_uint(), Some(U256::from(100u64)));
        assert!(v.as_address().is_none());
        assert!(v.as_str().is_none());
        assert!(v.as_word().is_none());
    }

    #[test]
    fn word_accepts_bytes32_and_topic_hash_only() {
        let w = B256::repeat_byte(0xab);
        assert_eq!(FieldValue::FixedBytes(w, 32).as_word(), Some(w));
        assert_eq!(FieldValue::TopicHash(w).as_word(), Some(w));
        assert!(FieldValue::FixedBytes(w, 4).as_word().is_none());
        assert_eq!(
            FieldValue::FixedBytes(w, 4).as_fixed_bytes(),
            Some(&[0xab, 0xab, 0xab, 0xab][..])
        );
    }

    #[test]
    fn address_array_requires_every_element() {
        let a = address!("d8da6bf26964af9d7eed9e03e53415d37aa96045");
        let good = FieldValue::Array(vec![FieldValue::Address(a), FieldValue::Address(a)]);
        assert_eq!(good.as_address_array(), Some(vec![a, a]));

        let mixed = FieldValue::Array(vec![
            FieldValue::Address(a),
            FieldValue::Uint(U256::from(1u8), 8),
        ]);
        assert!(mixed.as_address_array().is_none());
    }

    #[test]
    fn serializes_to_readable_json() {
        let a = address!("d8da6bf26964af9d7eed9e03e53415d37aa96045");
        let v = FieldValue::Array(vec![
            FieldValue::Address(a),
            FieldValue::Uint(U256::from(1_000_000u64), 256),
            FieldValue::Bool(true),
            FieldValue::Bytes(vec![0xde, 0xad]),
        ]);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045",
                "1000000",
                true,
                "0xdead"
            ])
        );
    }

    #[test]
    fn negative_int_displays_signed() {
        let v = FieldValue::Int(I256::try_from(-5i64).unwrap(), 256);
        assert_eq!(v.to_string(), "-5");
    }
}
