//! Maps generically decoded logs onto `FeemEvent` variants.

use alloy_primitives::{Address, B256, U256};
use logcodec_core::{DecodedLog, FieldValue};
use thiserror::Error;
use tracing::warn;

use crate::event::{DecodedEvent, FeemEvent};

#[derive(Debug, Error)]
pub enum MapError {
    /// The log decoded fine but no mapping exists for its event.
    #[error("no mapping for event '{event}' (log {key})")]
    Unhandled { event: String, key: String },
}

/// Typed lookups into a decoded log's fields.
///
/// A missing field is `None`. A field present with an unexpected type is
/// also `None`, with a warning.
struct Fields<'a> {
    decoded: &'a DecodedLog,
}

impl<'a> Fields<'a> {
    fn get<T>(
        &self,
        name: &str,
        want: &str,
        f: impl FnOnce(&FieldValue) -> Option<T>,
    ) -> Option<T> {
        let value = self.decoded.field(name)?;
        let out = f(value);
        if out.is_none() {
            warn!(
                event = %self.decoded.event,
                field = name,
                expected = want,
                got = value.kind(),
                log = %self.decoded.log.dedup_key(),
                "unexpected field type; leaving unset"
            );
        }
        out
    }

    fn uint(&self, name: &str) -> Option<U256> {
        self.get(name, "uint", FieldValue::as_uint)
    }

    fn address(&self, name: &str) -> Option<Address> {
        self.get(name, "address", FieldValue::as_address)
    }

    fn word(&self, name: &str) -> Option<B256> {
        self.get(name, "bytes32", FieldValue::as_word)
    }

    fn string(&self, name: &str) -> Option<String> {
        self.get(name, "string", |v| v.as_str().map(str::to_owned))
    }

    fn addresses(&self, name: &str) -> Option<Vec<Address>> {
        self.get(name, "address[]", FieldValue::as_address_array)
    }
}

/// Build the typed event for a decoded log.
///
/// Fields with the wrong type are left unset; the record is still produced.
/// An event this contract does not define yields `MapError::Unhandled`.
pub fn map_event(decoded: &DecodedLog) -> Result<DecodedEvent, MapError> {
    let f = Fields { decoded };

    let event = match decoded.event.as_str() {
        "FundsAdded" => FeemEvent::FundsAdded {
            funder: f.address("funder"),
            amount: f.uint("amount"),
        },
        "FundsWithdrawn" => FeemEvent::FundsWithdrawn {
            recipient: f.address("recipient"),
            amount: f.uint("amount"),
        },
        "Initialized" => FeemEvent::Initialized {
            version: f.uint("version"),
        },
        "InvalidRewardClaimAmount" => FeemEvent::InvalidRewardClaimAmount {
            project_id: f.uint("projectId"),
            request_epoch_number: f.uint("requestEpochNumber"),
            amount: f.uint("amount"),
            diff_amount: f.uint("diffAmmount"),
        },
        "ProjectAdded" => FeemEvent::ProjectAdded {
            project_id: f.uint("projectId"),
            owner: f.address("owner"),
            rewards_recipient: f.address("rewardsRecipient"),
            metadata_uri: f.string("metadataUri"),
            active_from_epoch: f.uint("activeFromEpoch"),
            contracts: f.addresses("contracts"),
        },
        "ProjectContractAdded" => FeemEvent::ProjectContractAdded {
            project_id: f.uint("projectId"),
            contract_address: f.address("contractAddress"),
        },
        "ProjectContractRemoved" => FeemEvent::ProjectContractRemoved {
            project_id: f.uint("projectId"),
            contract_address: f.address("contractAddress"),
        },
        "ProjectCreated" => FeemEvent::ProjectCreated {
            project_id: f.uint("projectId"),
            amount: f.uint("amount"),
        },
        "ProjectEnabled" => FeemEvent::ProjectEnabled {
            project_id: f.uint("projectId"),
            enabled_on_epoch_number: f.uint("enabledOnEpochNumber"),
        },
        "ProjectMetadataUriUpdated" => FeemEvent::ProjectMetadataUriUpdated {
            project_id: f.uint("projectId"),
            metadata_uri: f.string("metadataUri"),
        },
        "ProjectOwnerUpdated" => FeemEvent::ProjectOwnerUpdated {
            project_id: f.uint("projectId"),
            owner: f.address("owner"),
        },
        "ProjectRewardsRecipientUpdated" => FeemEvent::ProjectRewardsRecipientUpdated {
            project_id: f.uint("projectId"),
            recipient: f.address("recipient"),
        },
        "ProjectSuspended" => FeemEvent::ProjectSuspended {
            project_id: f.uint("projectId"),
            suspended_on_epoch_number: f.uint("suspendedOnEpochNumber"),
        },
        "RewardClaimCanceled" => FeemEvent::RewardClaimCanceled {
            project_id: f.uint("projectId"),
            epoch_number: f.uint("epochNumber"),
        },
        "RewardClaimCompleted" => FeemEvent::RewardClaimCompleted {
            project_id: f.uint("projectId"),
            epoch_number: f.uint("epochNumber"),
            amount: f.uint("amount"),
        },
        "RewardClaimConfirmationsLimitUpdated" => {
            FeemEvent::RewardClaimConfirmationsLimitUpdated {
                limit: f.uint("limit"),
            }
        }
        "RewardClaimEpochsLimitUpdated" => FeemEvent::RewardClaimEpochsLimitUpdated {
            limit: f.uint("limit"),
        },
        "RewardClaimRequested" => FeemEvent::RewardClaimRequested {
            project_id: f.uint("projectId"),
            request_epoch_number: f.uint("requestEpochNumber"),
        },
        "RoleAdminChanged" => FeemEvent::RoleAdminChanged {
            role: f.word("role"),
            previous_admin_role: f.word("previousAdminRole"),
            new_admin_role: f.word("newAdminRole"),
        },
        "RoleGranted" => FeemEvent::RoleGranted {
            role: f.word("role"),
            account: f.address("account"),
            sender: f.address("sender"),
        },
        "RoleRevoked" => FeemEvent::RoleRevoked {
            role: f.word("role"),
            account: f.address("account"),
            sender: f.address("sender"),
        },
        "SfcAddressUpdated" => FeemEvent::SfcAddressUpdated {
            sfc_address: f.address("sfcAddress"),
        },
        "SfcFeeUpdated" => FeemEvent::SfcFeeUpdated {
            fee: f.uint("fee"),
        },
        "Upgraded" => FeemEvent::Upgraded {
            implementation: f.address("implementation"),
        },
        other => {
            return Err(MapError::Unhandled {
                event: other.to_string(),
                key: decoded.log.dedup_key(),
            })
        }
    };

    Ok(DecodedEvent {
        event,
        meta: decoded.meta(),
    })
}
