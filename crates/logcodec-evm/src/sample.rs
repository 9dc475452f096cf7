//! Sample log generator.
//!
//! Produces random but well-formed logs for every matchable event of an ABI,
//! for exercising decoders and pipelines without a node. Values are random;
//! indexed `string` / `bytes` arguments are hashed like real emissions.

use alloy_dyn_abi::DynSolType;
use alloy_primitives::{address, Address, B256, I256, U256};
use logcodec_core::{FieldValue, RawLog};
use tracing::{debug, warn};

use crate::abi::AbiHandle;
use crate::encoder;
use crate::fingerprint;

/// Emitting address used when none is configured.
pub const PLACEHOLDER_ADDRESS: Address = address!("dc3a01348fe1a4a0d58494559a5c1f4836f1de75");

/// Logs packed into one simulated block.
pub const LOGS_PER_BLOCK: u64 = 5;

#[derive(Debug, Clone)]
pub struct SampleOptions {
    pub count_per_event: usize,
    pub start_block: u64,
    pub start_log_index: u64,
    pub emitter: Address,
    /// Fixed seed for reproducible output
    pub seed: Option<u64>,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            count_per_event: 10,
            start_block: 15_000_000,
            start_log_index: 0,
            emitter: PLACEHOLDER_ADDRESS,
            seed: None,
        }
    }
}

/// Generate `count_per_event` logs for each non-anonymous event, in ABI order.
///
/// Log `i` (counted across all events) lands in block
/// `start_block + i / LOGS_PER_BLOCK` at transaction index `i % LOGS_PER_BLOCK`;
/// log indices are sequential from `start_log_index`.
pub fn generate_logs(abi: &AbiHandle, opts: &SampleOptions) -> Vec<RawLog> {
    let mut rng = match opts.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let mut logs = Vec::new();
    let mut i: u64 = 0;

    for sig in abi.matchable_events() {
        debug!(event = %sig.name, count = opts.count_per_event, "generating sample logs");
        for _ in 0..opts.count_per_event {
            let values: Vec<FieldValue> =
                sig.inputs.iter().map(|p| random_value(&mut rng, &p.ty)).collect();
            let (topics, data) = match encoder::encode_with(sig, &values) {
                Ok(encoded) => encoded,
                Err(e) => {
                    warn!(event = %sig.name, error = %e, "cannot generate logs for event");
                    break;
                }
            };

            let block_number = opts.start_block + i / LOGS_PER_BLOCK;
            let mut log = RawLog::new(opts.emitter, topics, data);
            log.block_number = block_number;
            log.block_hash = fingerprint::keccak256(block_number.to_be_bytes());
            log.transaction_hash = random_word(&mut rng);
            log.transaction_index = i % LOGS_PER_BLOCK;
            log.log_index = opts.start_log_index + i;
            logs.push(log);
            i += 1;
        }
    }
    logs
}

fn random_word(rng: &mut fastrand::Rng) -> B256 {
    let mut w = [0u8; 32];
    rng.fill(&mut w);
    B256::from(w)
}

fn random_uint(rng: &mut fastrand::Rng, bits: usize) -> U256 {
    let v = U256::from(rng.u128(..));
    if bits >= 256 {
        v
    } else {
        v & ((U256::from(1u8) << bits) - U256::from(1u8))
    }
}

/// Produce a random value of the given type.
pub fn random_value(rng: &mut fastrand::Rng, ty: &DynSolType) -> FieldValue {
    match ty {
        DynSolType::Address => {
            let mut a = [0u8; 20];
            rng.fill(&mut a);
            FieldValue::Address(Address::from(a))
        }
        DynSolType::Bool => FieldValue::Bool(rng.bool()),
        DynSolType::Uint(bits) => FieldValue::Uint(random_uint(rng, *bits), *bits),
        DynSolType::Int(bits) => {
            let half = 1i64 << ((*bits).min(64) - 2);
            let v = rng.i64(-half..half);
            FieldValue::Int(I256::try_from(v).unwrap_or(I256::ZERO), *bits)
        }
        DynSolType::FixedBytes(size) => {
            let mut w = [0u8; 32];
            rng.fill(&mut w[..*size]);
            FieldValue::FixedBytes(B256::from(w), *size)
        }
        DynSolType::Bytes => {
            let mut b = vec![0u8; rng.usize(0..64)];
            rng.fill(&mut b);
            FieldValue::Bytes(b)
        }
        DynSolType::Function => {
            let mut b = vec![0u8; 24];
            rng.fill(&mut b);
            FieldValue::Bytes(b)
        }
        DynSolType::String => FieldValue::String(format!("sample-{:08x}", rng.u32(..))),
        DynSolType::Array(inner) => {
            let n = rng.usize(0..4);
            FieldValue::Array((0..n).map(|_| random_value(rng, inner)).collect())
        }
        DynSolType::FixedArray(inner, n) => {
            FieldValue::Array((0..*n).map(|_| random_value(rng, inner)).collect())
        }
        DynSolType::Tuple(types) => {
            FieldValue::Tuple(types.iter().map(|t| random_value(rng, t)).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::EvmDecoder;
    use logcodec_core::{ErrorMode, LogDecoder};
    use std::sync::Arc;

    const ABI: &str = r#"[
        {"type":"event","name":"FundsAdded","anonymous":false,"inputs":[
            {"name":"funder","type":"address","indexed":true},
            {"name":"amount","type":"uint256","indexed":false}]},
        {"type":"event","name":"Mixed","anonymous":false,"inputs":[
            {"name":"note","type":"string","indexed":true},
            {"name":"flags","type":"bytes4[2]","indexed":false},
            {"name":"small","type":"int8","indexed":false},
            {"name":"pair","type":"tuple","indexed":false,"components":[
                {"name":"a","type":"uint64"},{"name":"b","type":"bool"}]},
            {"name":"blob","type":"bytes","indexed":false}]},
        {"type":"event","name":"Ghost","anonymous":true,"inputs":[]}
    ]"#;

    fn abi() -> Arc<AbiHandle> {
        Arc::new(AbiHandle::from_json(ABI).unwrap())
    }

    #[test]
    fn generated_logs_all_decode() {
        let abi = abi();
        let opts = SampleOptions {
            count_per_event: 7,
            seed: Some(42),
            ..Default::default()
        };
        let logs = generate_logs(&abi, &opts);
        assert_eq!(logs.len(), 14);

        let res = EvmDecoder::new(abi)
            .decode_batch(&logs, ErrorMode::Collect, None)
            .unwrap();
        assert!(res.errors.is_empty(), "{:?}", res.errors);
        assert!(res.unmatched.is_empty());
        assert_eq!(res.decoded.len(), 14);
    }

    #[test]
    fn positions_follow_block_packing() {
        let opts = SampleOptions {
            count_per_event: 6,
            start_block: 100,
            start_log_index: 3,
            seed: Some(1),
            ..Default::default()
        };
        let logs = generate_logs(&abi(), &opts);
        assert_eq!(logs[0].block_number, 100);
        assert_eq!(logs[4].block_number, 100);
        assert_eq!(logs[5].block_number, 101);
        assert_eq!(logs[5].transaction_index, 0);
        assert_eq!(logs[7].transaction_index, 2);
        assert_eq!(logs[11].log_index, 14);
        assert!(logs.iter().all(|l| l.address == PLACEHOLDER_ADDRESS));
        assert_eq!(logs[0].block_hash, logs[4].block_hash);
        assert_ne!(logs[4].block_hash, logs[5].block_hash);
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let opts = SampleOptions {
            count_per_event: 3,
            seed: Some(9),
            ..Default::default()
        };
        assert_eq!(generate_logs(&abi(), &opts), generate_logs(&abi(), &opts));
    }

    #[test]
    fn uint_respects_bit_width() {
        let mut rng = fastrand::Rng::with_seed(5);
        for _ in 0..32 {
            let v = random_value(&mut rng, &DynSolType::Uint(8)).as_uint().unwrap();
            assert!(v < U256::from(256u32));
        }
    }
}
