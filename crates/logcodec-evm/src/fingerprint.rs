//! Event selector computation.
//!
//! The selector of a non-anonymous EVM event is the keccak256 hash of its
//! canonical signature string, e.g.:
//!   keccak256("Transfer(address,address,uint256)")
//!   → 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef
//!
//! Logs carry it as `topics[0]`.

use alloy_primitives::B256;
use tiny_keccak::{Hasher, Keccak};

/// keccak256 of arbitrary bytes.
pub fn keccak256(bytes: impl AsRef<[u8]>) -> B256 {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(bytes.as_ref());
    hasher.finalize(&mut output);
    B256::from(output)
}

/// Compute the selector of an event signature string.
/// Input: `"EventName(type1,type2,...)"` — the canonical ABI signature.
pub fn keccak256_signature(signature: &str) -> B256 {
    keccak256(signature.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    #[test]
    fn erc20_transfer_selector() {
        assert_eq!(
            keccak256_signature("Transfer(address,address,uint256)"),
            b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")
        );
    }

    #[test]
    fn role_granted_selector() {
        assert_eq!(
            keccak256_signature("RoleGranted(bytes32,address,address)"),
            b256!("2f8788117e7eff1d82e926ec794901d17c78024a50270940304540a733656f0d")
        );
    }

    #[test]
    fn empty_input_hash() {
        // keccak256("") is a well-known constant
        assert_eq!(
            keccak256(b""),
            b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
        );
    }
}
