//! Flat analytical rows.
//!
//! One wide, all-optional row shape for every event kind, with snake_case
//! column names, decimal strings for integers and hex for hashes. Suited to
//! warehouse tables that cannot hold a sum type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::event::{Column, DecodedEvent};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoch_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_epoch_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_ammount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewards_recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_from_epoch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contracts: Option<Vec<String>>,
    /// The `contractAddress` event argument; `contract_address` is the emitter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address_param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_on_epoch_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended_on_epoch_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_admin_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_admin_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sfc_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,

    // metadata
    pub event_name: String,
    pub contract_address: String,
    pub block_number: u64,
    pub block_hash: String,
    pub tx_hash: String,
    pub tx_index: u64,
    pub log_index: u64,
    pub removed: bool,
    pub pipeline_time: DateTime<Utc>,
}

impl EventRow {
    pub fn from_event(ev: &DecodedEvent, pipeline_time: DateTime<Utc>) -> Self {
        let m = &ev.meta;
        let mut row = EventRow {
            event_name: ev.event_name().to_string(),
            contract_address: m.emitting_address.to_checksum(None),
            block_number: m.block_number,
            block_hash: format!("{:#x}", m.block_hash),
            tx_hash: format!("{:#x}", m.tx_hash),
            tx_index: m.tx_index,
            log_index: m.log_index,
            removed: m.removed,
            pipeline_time,
            ..Default::default()
        };

        for (name, value) in ev.event.columns() {
            if let Column::Addresses(list) = &value {
                row.contracts = Some(list.iter().map(|a| a.to_checksum(None)).collect());
                continue;
            }
            let text = Some(value.to_text());
            match name {
                "amount" => row.amount = text,
                "projectId" => row.project_id = text,
                "epochNumber" => row.epoch_number = text,
                "funder" => row.funder = text,
                "recipient" => row.recipient = text,
                "version" => row.version = text,
                "requestEpochNumber" => row.request_epoch_number = text,
                "diffAmmount" => row.diff_ammount = text,
                "owner" => row.owner = text,
                "rewardsRecipient" => row.rewards_recipient = text,
                "metadataUri" => row.metadata_uri = text,
                "activeFromEpoch" => row.active_from_epoch = text,
                "contractAddress" => row.contract_address_param = text,
                "enabledOnEpochNumber" => row.enabled_on_epoch_number = text,
                "suspendedOnEpochNumber" => row.suspended_on_epoch_number = text,
                "limit" => row.limit = text,
                "role" => row.role = text,
                "previousAdminRole" => row.previous_admin_role = text,
                "newAdminRole" => row.new_admin_role = text,
                "account" => row.account = text,
                "sender" => row.sender = text,
                "sfcAddress" => row.sfc_address = text,
                "implementation" => row.implementation = text,
                "fee" => row.fee = text,
                _ => {}
            }
        }
        row
    }
}

/// A row for a log seen more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateRow {
    #[serde(flatten)]
    pub row: EventRow,
    pub duplicate_detection_time: DateTime<Utc>,
}

impl DuplicateRow {
    pub fn from_event(ev: &DecodedEvent, pipeline_time: DateTime<Utc>) -> Self {
        Self {
            row: EventRow::from_event(ev, pipeline_time),
            duplicate_detection_time: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::FeemEvent;
    use alloy_primitives::{address, B256, U256};
    use logcodec_core::LogMeta;

    fn event(ev: FeemEvent) -> DecodedEvent {
        DecodedEvent {
            event: ev,
            meta: LogMeta {
                emitting_address: address!("0b5f073135df3f5671710f08b08c0c9258aecc35"),
                block_number: 22_000_001,
                block_hash: B256::repeat_byte(1),
                tx_hash: B256::repeat_byte(2),
                tx_index: 3,
                log_index: 4,
                removed: false,
            },
        }
    }

    #[test]
    fn row_uses_decimal_and_checksummed_strings() {
        let ev = event(FeemEvent::FundsWithdrawn {
            recipient: Some(address!("0000000000000000000000000000000000000002")),
            amount: Some(U256::from(100u64)),
        });
        let row = EventRow::from_event(&ev, Utc::now());
        assert_eq!(row.amount.as_deref(), Some("100"));
        assert_eq!(
            row.recipient.as_deref(),
            Some("0x0000000000000000000000000000000000000002")
        );
        assert_eq!(row.event_name, "FundsWithdrawn");
        assert_eq!(row.tx_index, 3);
        assert!(row.project_id.is_none());
    }

    #[test]
    fn contract_argument_does_not_clash_with_emitter() {
        let arg = address!("1f9840a85d5af5bf1d1762f925bdaddc4201f984");
        let ev = event(FeemEvent::ProjectContractAdded {
            project_id: Some(U256::from(1u64)),
            contract_address: Some(arg),
        });
        let row = EventRow::from_event(&ev, Utc::now());
        assert_eq!(row.contract_address_param, Some(arg.to_checksum(None)));
        assert_eq!(row.contract_address, "0x0B5f073135dF3f5671710F08b08C0c9258aECc35");
    }

    #[test]
    fn contracts_become_a_list() {
        let a = address!("1f9840a85d5af5bf1d1762f925bdaddc4201f984");
        let ev = event(FeemEvent::ProjectAdded {
            project_id: None,
            owner: None,
            rewards_recipient: None,
            metadata_uri: Some("ipfs://x".into()),
            active_from_epoch: None,
            contracts: Some(vec![a, a]),
        });
        let row = EventRow::from_event(&ev, Utc::now());
        assert_eq!(row.contracts.map(|c| c.len()), Some(2));
        assert_eq!(row.metadata_uri.as_deref(), Some("ipfs://x"));
    }

    #[test]
    fn duplicate_row_serializes_flat() {
        let ev = event(FeemEvent::SfcFeeUpdated {
            fee: Some(U256::from(7u64)),
        });
        let dup = DuplicateRow::from_event(&ev, Utc::now());
        let json = serde_json::to_value(&dup).unwrap();
        assert_eq!(json["fee"], "7");
        assert_eq!(json["event_name"], "SfcFeeUpdated");
        assert!(json.get("duplicate_detection_time").is_some());
        assert!(json.get("amount").is_none());
    }
}
