//! # logcodec-evm
//!
//! EVM event-log decoder implementing the `LogDecoder` trait.
//!
//! ## Implementation notes
//! - Uses `alloy-json-abi` to parse contract ABIs and `alloy-dyn-abi` to
//!   resolve parameter types and unpack `data`
//! - Topics[0] → event selector (keccak256 of the canonical signature)
//! - Topics[1..] → indexed parameters (each 32 bytes)
//! - `data` → non-indexed parameters (ABI-encoded tuple)

pub mod abi;
pub mod decoder;
pub mod encoder;
pub mod fingerprint;
pub mod normalizer;
pub mod sample;
pub mod topic;

pub use abi::{AbiHandle, EventInput, EventSignature};
pub use decoder::EvmDecoder;
pub use encoder::{EncodeError, LogEncoder};
pub use sample::{generate_logs, SampleOptions};
