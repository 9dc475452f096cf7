//! Queue-style envelopes for decoded events.

use logcodec_feem::DecodedEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A JSON payload with string attributes, shaped for pub/sub consumers that
/// route or filter on attributes without parsing the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMessage {
    pub data: serde_json::Value,
    pub attributes: BTreeMap<String, String>,
}

impl EventMessage {
    pub fn from_event(event: &DecodedEvent) -> Result<Self, serde_json::Error> {
        let data = serde_json::to_value(event)?;
        let mut attributes = BTreeMap::new();
        attributes.insert("eventName".to_string(), event.event_name().to_string());
        attributes.insert("txHash".to_string(), format!("{:#x}", event.meta.tx_hash));
        attributes.insert("logIndex".to_string(), event.meta.log_index.to_string());
        attributes.insert("blockNumber".to_string(), event.meta.block_number.to_string());
        Ok(Self { data, attributes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{B256, U256};
    use logcodec_core::LogMeta;
    use logcodec_feem::FeemEvent;

    #[test]
    fn attributes_mirror_metadata() {
        let ev = DecodedEvent {
            event: FeemEvent::SfcFeeUpdated {
                fee: Some(U256::from(12u64)),
            },
            meta: LogMeta {
                emitting_address: Default::default(),
                block_number: 99,
                block_hash: B256::ZERO,
                tx_hash: B256::repeat_byte(0xab),
                tx_index: 0,
                log_index: 5,
                removed: false,
            },
        };
        let msg = EventMessage::from_event(&ev).unwrap();
        assert_eq!(msg.attributes["eventName"], "SfcFeeUpdated");
        assert_eq!(msg.attributes["logIndex"], "5");
        assert_eq!(msg.attributes["blockNumber"], "99");
        assert_eq!(msg.attributes["txHash"], format!("{:#x}", B256::repeat_byte(0xab)));
        assert_eq!(msg.data["fee"], "12");
    }
}
