//! Typed events of the fee-monetization (FeeM) contract.
//!
//! `FeemEvent` has one variant per contract event. Every field is optional:
//! a field the mapper could not read with the expected type is left unset
//! while the rest of the record survives.

use alloy_primitives::{Address, B256, U256};
use logcodec_core::LogMeta;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A single set field of an event, in its output form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    Uint(U256),
    Address(Address),
    Hash(B256),
    Text(String),
    Addresses(Vec<Address>),
}

impl From<U256> for Column {
    fn from(v: U256) -> Self {
        Column::Uint(v)
    }
}

impl From<Address> for Column {
    fn from(v: Address) -> Self {
        Column::Address(v)
    }
}

impl From<B256> for Column {
    fn from(v: B256) -> Self {
        Column::Hash(v)
    }
}

impl From<String> for Column {
    fn from(v: String) -> Self {
        Column::Text(v)
    }
}

impl From<Vec<Address>> for Column {
    fn from(v: Vec<Address>) -> Self {
        Column::Addresses(v)
    }
}

impl Column {
    /// Scalar text form: decimal integers, checksummed addresses, 0x-hex hashes.
    /// Address lists are comma-joined.
    pub fn to_text(&self) -> String {
        match self {
            Column::Uint(v) => v.to_string(),
            Column::Address(a) => a.to_checksum(None),
            Column::Hash(h) => format!("{h:#x}"),
            Column::Text(s) => s.clone(),
            Column::Addresses(list) => list
                .iter()
                .map(|a| a.to_checksum(None))
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl Serialize for Column {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Column::Addresses(list) => {
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for a in list {
                    seq.serialize_element(&a.to_checksum(None))?;
                }
                seq.end()
            }
            other => serializer.serialize_str(&other.to_text()),
        }
    }
}

/// Declares `FeemEvent` with its `name()` and `columns()` accessors.
/// Each field is listed as `rust_name: Type => "outputName"`.
macro_rules! feem_events {
    ($( $variant:ident { $( $field:ident : $ty:ty => $col:literal ),* $(,)? } ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum FeemEvent {
            $( $variant { $( $field: Option<$ty> ),* } ),*
        }

        impl FeemEvent {
            /// The contract event name; equals the matched ABI event name.
            pub fn name(&self) -> &'static str {
                match self {
                    $( FeemEvent::$variant { .. } => stringify!($variant) ),*
                }
            }

            /// The set fields, in declaration order, keyed by output name.
            pub fn columns(&self) -> Vec<(&'static str, Column)> {
                let mut out = Vec::new();
                match self {
                    $( FeemEvent::$variant { $( $field ),* } => {
                        $( if let Some(v) = $field {
                            out.push(($col, Column::from(v.clone())));
                        } )*
                    } ),*
                }
                out
            }

            /// Every event name this type can represent.
            pub const NAMES: &'static [&'static str] = &[ $( stringify!($variant) ),* ];
        }
    };
}

feem_events! {
    FundsAdded {
        funder: Address => "funder",
        amount: U256 => "amount",
    },
    FundsWithdrawn {
        recipient: Address => "recipient",
        amount: U256 => "amount",
    },
    Initialized {
        version: U256 => "version",
    },
    InvalidRewardClaimAmount {
        project_id: U256 => "projectId",
        request_epoch_number: U256 => "requestEpochNumber",
        amount: U256 => "amount",
        // the contract ABI spells it this way
        diff_amount: U256 => "diffAmmount",
    },
    ProjectAdded {
        project_id: U256 => "projectId",
        owner: Address => "owner",
        rewards_recipient: Address => "rewardsRecipient",
        metadata_uri: String => "metadataUri",
        active_from_epoch: U256 => "activeFromEpoch",
        contracts: Vec<Address> => "contracts",
    },
    ProjectContractAdded {
        project_id: U256 => "projectId",
        contract_address: Address => "contractAddress",
    },
    ProjectContractRemoved {
        project_id: U256 => "projectId",
        contract_address: Address => "contractAddress",
    },
    ProjectCreated {
        project_id: U256 => "projectId",
        amount: U256 => "amount",
    },
    ProjectEnabled {
        project_id: U256 => "projectId",
        enabled_on_epoch_number: U256 => "enabledOnEpochNumber",
    },
    ProjectMetadataUriUpdated {
        project_id: U256 => "projectId",
        metadata_uri: String => "metadataUri",
    },
    ProjectOwnerUpdated {
        project_id: U256 => "projectId",
        owner: Address => "owner",
    },
    ProjectRewardsRecipientUpdated {
        project_id: U256 => "projectId",
        recipient: Address => "recipient",
    },
    ProjectSuspended {
        project_id: U256 => "projectId",
        suspended_on_epoch_number: U256 => "suspendedOnEpochNumber",
    },
    RewardClaimCanceled {
        project_id: U256 => "projectId",
        epoch_number: U256 => "epochNumber",
    },
    RewardClaimCompleted {
        project_id: U256 => "projectId",
        epoch_number: U256 => "epochNumber",
        amount: U256 => "amount",
    },
    RewardClaimConfirmationsLimitUpdated {
        limit: U256 => "limit",
    },
    RewardClaimEpochsLimitUpdated {
        limit: U256 => "limit",
    },
    RewardClaimRequested {
        project_id: U256 => "projectId",
        request_epoch_number: U256 => "requestEpochNumber",
    },
    RoleAdminChanged {
        role: B256 => "role",
        previous_admin_role: B256 => "previousAdminRole",
        new_admin_role: B256 => "newAdminRole",
    },
    RoleGranted {
        role: B256 => "role",
        account: Address => "account",
        sender: Address => "sender",
    },
    RoleRevoked {
        role: B256 => "role",
        account: Address => "account",
        sender: Address => "sender",
    },
    SfcAddressUpdated {
        sfc_address: Address => "sfcAddress",
    },
    SfcFeeUpdated {
        fee: U256 => "fee",
    },
    Upgraded {
        implementation: Address => "implementation",
    },
}

/// A mapped event plus the positional metadata of its originating log.
///
/// Serialized flat: `eventName`, then the set event fields, then the
/// metadata fields (`emittingAddress`, `blockNumber`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    pub event: FeemEvent,
    pub meta: LogMeta,
}

impl DecodedEvent {
    pub fn event_name(&self) -> &'static str {
        self.event.name()
    }

    /// Same key as the raw log it was decoded from.
    pub fn dedup_key(&self) -> String {
        logcodec_core::dedup_key(&self.meta.tx_hash, self.meta.log_index, self.meta.removed)
    }
}

impl Serialize for DecodedEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns = self.event.columns();
        let mut map = serializer.serialize_map(Some(columns.len() + 8))?;
        map.serialize_entry("eventName", self.event.name())?;
        for (name, value) in &columns {
            map.serialize_entry(name, value)?;
        }
        let m = &self.meta;
        map.serialize_entry("emittingAddress", &m.emitting_address.to_checksum(None))?;
        map.serialize_entry("blockNumber", &m.block_number)?;
        map.serialize_entry("blockHash", &m.block_hash)?;
        map.serialize_entry("txHash", &m.tx_hash)?;
        map.serialize_entry("txIndex", &m.tx_index)?;
        map.serialize_entry("logIndex", &m.log_index)?;
        map.serialize_entry("removed", &m.removed)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    fn meta() -> LogMeta {
        LogMeta {
            emitting_address: address!("0b5f073135df3f5671710f08b08c0c9258aecc35"),
            block_number: 7,
            block_hash: B256::repeat_byte(0xbb),
            tx_hash: B256::repeat_byte(0xaa),
            tx_index: 1,
            log_index: 4,
            removed: false,
        }
    }

    #[test]
    fn columns_skip_unset_fields() {
        let ev = FeemEvent::RewardClaimCompleted {
            project_id: Some(U256::from(3u64)),
            epoch_number: None,
            amount: Some(U256::from(10u64)),
        };
        let cols = ev.columns();
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0], ("projectId", Column::Uint(U256::from(3u64))));
        assert_eq!(cols[1].0, "amount");
        assert_eq!(ev.name(), "RewardClaimCompleted");
    }

    #[test]
    fn serializes_flat_with_event_name_tag() {
        let ev = DecodedEvent {
            event: FeemEvent::InvalidRewardClaimAmount {
                project_id: Some(U256::from(9u64)),
                request_epoch_number: None,
                amount: Some(U256::from(1000u64)),
                diff_amount: Some(U256::from(25u64)),
            },
            meta: meta(),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["eventName"], "InvalidRewardClaimAmount");
        assert_eq!(json["projectId"], "9");
        assert_eq!(json["diffAmmount"], "25");
        assert!(json.get("requestEpochNumber").is_none());
        assert_eq!(json["blockNumber"], 7);
        assert_eq!(json["logIndex"], 4);
        assert_eq!(json["emittingAddress"], "0x0B5f073135dF3f5671710F08b08C0c9258aECc35");
    }

    #[test]
    fn address_list_serializes_as_array() {
        let a = address!("1f9840a85d5af5bf1d1762f925bdaddc4201f984");
        let json = serde_json::to_value(Column::Addresses(vec![a])).unwrap();
        assert_eq!(
            json,
            serde_json::json!(["0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984"])
        );
    }

    #[test]
    fn dedup_key_matches_raw_log_format() {
        let ev = DecodedEvent {
            event: FeemEvent::SfcFeeUpdated { fee: None },
            meta: meta(),
        };
        assert_eq!(ev.dedup_key(), format!("{:#x}:4", B256::repeat_byte(0xaa)));
    }

    #[test]
    fn names_cover_every_variant() {
        assert_eq!(FeemEvent::NAMES.len(), 24);
        assert!(FeemEvent::NAMES.contains(&"ProjectCreated"));
    }
}
