//! Conversions between alloy `DynSolValue` and `FieldValue`.

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::Function;
use logcodec_core::FieldValue;

/// Convert a decoded `DynSolValue` into a `FieldValue`.
pub fn normalize(val: DynSolValue) -> FieldValue {
    match val {
        DynSolValue::Bool(b) => FieldValue::Bool(b),
        DynSolValue::Int(i, bits) => FieldValue::Int(i, bits),
        DynSolValue::Uint(u, bits) => FieldValue::Uint(u, bits),
        DynSolValue::FixedBytes(word, size) => FieldValue::FixedBytes(word, size),
        DynSolValue::Address(a) => FieldValue::Address(a),
        // 20-byte address + 4-byte selector
        DynSolValue::Function(f) => FieldValue::Bytes(f.to_vec()),
        DynSolValue::Bytes(b) => FieldValue::Bytes(b),
        DynSolValue::String(s) => FieldValue::String(s),
        DynSolValue::Array(vals) | DynSolValue::FixedArray(vals) => {
            FieldValue::Array(vals.into_iter().map(normalize).collect())
        }
        DynSolValue::Tuple(vals) => FieldValue::Tuple(vals.into_iter().map(normalize).collect()),
    }
}

/// Convert a `FieldValue` back to a `DynSolValue` of the expected type.
/// Returns a short reason on mismatch.
pub fn to_dyn_value(val: &FieldValue, expected: &DynSolType) -> Result<DynSolValue, String> {
    match (val, expected) {
        (FieldValue::Address(a), DynSolType::Address) => Ok(DynSolValue::Address(*a)),
        (FieldValue::Uint(u, _), DynSolType::Uint(bits)) => Ok(DynSolValue::Uint(*u, *bits)),
        (FieldValue::Int(i, _), DynSolType::Int(bits)) => Ok(DynSolValue::Int(*i, *bits)),
        (FieldValue::Bool(b), DynSolType::Bool) => Ok(DynSolValue::Bool(*b)),
        (FieldValue::FixedBytes(w, _), DynSolType::FixedBytes(n)) => {
            Ok(DynSolValue::FixedBytes(*w, *n))
        }
        (FieldValue::Bytes(b), DynSolType::Bytes) => Ok(DynSolValue::Bytes(b.clone())),
        (FieldValue::Bytes(b), DynSolType::Function) => {
            if b.len() != 24 {
                return Err(format!("function: got {} bytes, need 24", b.len()));
            }
            Ok(DynSolValue::Function(Function::from_slice(b)))
        }
        (FieldValue::String(s), DynSolType::String) => Ok(DynSolValue::String(s.clone())),
        (FieldValue::Array(elems), DynSolType::Array(inner)) => {
            let vals: Result<Vec<_>, _> = elems.iter().map(|e| to_dyn_value(e, inner)).collect();
            Ok(DynSolValue::Array(vals?))
        }
        (FieldValue::Array(elems), DynSolType::FixedArray(inner, len)) => {
            if elems.len() != *len {
                return Err(format!(
                    "fixed array length mismatch: expected {len}, got {}",
                    elems.len()
                ));
            }
            let vals: Result<Vec<_>, _> = elems.iter().map(|e| to_dyn_value(e, inner)).collect();
            Ok(DynSolValue::FixedArray(vals?))
        }
        (FieldValue::Tuple(elems), DynSolType::Tuple(types)) => {
            if elems.len() != types.len() {
                return Err(format!(
                    "tuple arity mismatch: expected {}, got {}",
                    types.len(),
                    elems.len()
                ));
            }
            let vals: Result<Vec<_>, _> = elems
                .iter()
                .zip(types.iter())
                .map(|(e, t)| to_dyn_value(e, t))
                .collect();
            Ok(DynSolValue::Tuple(vals?))
        }
        (v, t) => Err(format!("cannot encode {} as {t}", v.kind())),
    }
}
