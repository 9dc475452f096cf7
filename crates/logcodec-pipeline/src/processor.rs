//! Decode and map a single raw log.

use alloy_primitives::Address;
use logcodec_core::{DecodeError, LogDecoder, RawLog};
use logcodec_evm::{AbiHandle, EvmDecoder};
use logcodec_feem::{map_event, DecodedEvent, MapError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Why a matched log produced no event.
#[derive(Debug)]
pub enum SkipReason {
    Decode(DecodeError),
    Unhandled(MapError),
}

impl SkipReason {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::Decode(DecodeError::TopicCount { .. }) => "topic_count",
            SkipReason::Decode(DecodeError::DataUnpack { .. }) => "data_unpack",
            SkipReason::Unhandled(_) => "unhandled",
        }
    }
}

/// Result of processing one log. Only `Emitted` reaches a sink.
#[derive(Debug)]
pub enum Outcome {
    Emitted(DecodedEvent),
    /// No topics, unknown selector, or a different emitting contract
    NoMatch,
    Skipped(SkipReason),
}

pub struct LogProcessor {
    decoder: EvmDecoder,
    contract: Option<Address>,
}

impl LogProcessor {
    pub fn new(abi: Arc<AbiHandle>) -> Self {
        Self {
            decoder: EvmDecoder::new(abi),
            contract: None,
        }
    }

    /// Ignore logs not emitted by `contract`.
    pub fn with_contract(mut self, contract: Option<Address>) -> Self {
        self.contract = contract;
        self
    }

    pub fn abi(&self) -> &AbiHandle {
        self.decoder.abi()
    }

    /// Never fails: every per-log problem becomes an `Outcome`.
    pub fn process(&self, log: &RawLog) -> Outcome {
        if let Some(contract) = self.contract {
            if log.address != contract {
                debug!(log = %log.dedup_key(), emitter = %log.address, "log from another contract");
                return Outcome::NoMatch;
            }
        }

        let decoded = match self.decoder.decode_log(log) {
            Ok(Some(decoded)) => decoded,
            Ok(None) => {
                debug!(
                    log = %log.dedup_key(),
                    topic0 = ?log.topic0(),
                    "no ABI event matches log"
                );
                return Outcome::NoMatch;
            }
            Err(e) => {
                warn!(
                    event = e.event(),
                    log = %log.dedup_key(),
                    block = log.block_number,
                    error = %e,
                    "skipping undecodable log"
                );
                return Outcome::Skipped(SkipReason::Decode(e));
            }
        };

        match map_event(&decoded) {
            Ok(event) => Outcome::Emitted(event),
            Err(e) => {
                warn!(event = %decoded.event, error = %e, "skipping unhandled event");
                Outcome::Skipped(SkipReason::Unhandled(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, B256, U256};
    use logcodec_core::FieldValue;
    use logcodec_evm::LogEncoder;

    const ABI: &str = r#"[
        {"type":"event","name":"FundsAdded","anonymous":false,"inputs":[
            {"name":"funder","type":"address","indexed":true},
            {"name":"amount","type":"uint256","indexed":false}]},
        {"type":"event","name":"Paused","anonymous":false,"inputs":[
            {"name":"account","type":"address","indexed":false}]}
    ]"#;

    const EMITTER: Address = address!("0b5f073135df3f5671710f08b08c0c9258aecc35");

    fn abi() -> Arc<AbiHandle> {
        Arc::new(AbiHandle::from_json(ABI).unwrap())
    }

    fn funds_added() -> RawLog {
        LogEncoder::new(abi())
            .encode(
                "FundsAdded",
                &[
                    FieldValue::Address(address!("d8da6bf26964af9d7eed9e03e53415d37aa96045")),
                    FieldValue::Uint(U256::from(5u64), 256),
                ],
                EMITTER,
            )
            .unwrap()
    }

    #[test]
    fn emits_mapped_event() {
        let outcome = LogProcessor::new(abi()).process(&funds_added());
        match outcome {
            Outcome::Emitted(ev) => assert_eq!(ev.event_name(), "FundsAdded"),
            other => panic!("expected Emitted, got {other:?}"),
        }
    }

    #[test]
    fn unknown_selector_is_no_match() {
        let log = RawLog::new(EMITTER, vec![B256::repeat_byte(9)], vec![]);
        assert!(matches!(
            LogProcessor::new(abi()).process(&log),
            Outcome::NoMatch
        ));
    }

    #[test]
    fn other_contract_is_no_match() {
        let p = LogProcessor::new(abi()).with_contract(Some(Address::ZERO));
        assert!(matches!(p.process(&funds_added()), Outcome::NoMatch));
    }

    #[test]
    fn wrong_topic_count_is_skipped() {
        let mut log = funds_added();
        log.topics.truncate(1);
        match LogProcessor::new(abi()).process(&log) {
            Outcome::Skipped(reason) => assert_eq!(reason.label(), "topic_count"),
            other => panic!("expected Skipped, got {other:?}"),
        }
    }

    #[test]
    fn event_without_mapping_is_skipped_as_unhandled() {
        let log = LogEncoder::new(abi())
            .encode("Paused", &[FieldValue::Address(EMITTER)], EMITTER)
            .unwrap();
        match LogProcessor::new(abi()).process(&log) {
            Outcome::Skipped(reason) => assert_eq!(reason.label(), "unhandled"),
            other => panic!("expected Skipped, got {other:?}"),
        }
    }
}
