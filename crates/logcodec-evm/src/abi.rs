//! Contract ABI loading and event signature lookup.
//!
//! An `AbiHandle` is parsed once at startup and shared (usually behind an
//! `Arc`) by every decoder and mapper. It is immutable after construction.

use alloy_dyn_abi::{DynSolType, Specifier};
use alloy_json_abi::{Event, JsonAbi};
use alloy_primitives::B256;
use logcodec_core::AbiError;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::fingerprint;

/// One argument of an event, with its type resolved for decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct EventInput {
    /// Declared name, or the positional index when the ABI leaves it blank
    pub name: String,
    pub ty: DynSolType,
    pub indexed: bool,
}

/// A declared event: name, canonical signature and ordered arguments.
#[derive(Debug, Clone)]
pub struct EventSignature {
    pub name: String,
    /// Canonical form, e.g. `Transfer(address,address,uint256)`
    pub signature: String,
    /// keccak256 of `signature`; equals `topics[0]` of matching logs
    pub selector: B256,
    pub inputs: Vec<EventInput>,
    pub anonymous: bool,
    /// Tuple of the non-indexed argument types, as laid out in `data`
    data_type: DynSolType,
}

impl EventSignature {
    /// Build from an alloy event, resolving every parameter type.
    pub fn from_event(event: &Event) -> Result<Self, String> {
        let mut inputs = Vec::with_capacity(event.inputs.len());
        for (i, param) in event.inputs.iter().enumerate() {
            let ty = param
                .resolve()
                .map_err(|e| format!("event {} param {i} ({}): {e}", event.name, param.ty))?;
            let name = if param.name.is_empty() {
                i.to_string()
            } else {
                param.name.clone()
            };
            inputs.push(EventInput {
                name,
                ty,
                indexed: param.indexed,
            });
        }

        let data_type = DynSolType::Tuple(
            inputs
                .iter()
                .filter(|p| !p.indexed)
                .map(|p| p.ty.clone())
                .collect(),
        );
        let signature = event.signature();
        let selector = fingerprint::keccak256_signature(&signature);

        Ok(Self {
            name: event.name.clone(),
            signature,
            selector,
            inputs,
            anonymous: event.anonymous,
            data_type,
        })
    }

    pub fn indexed(&self) -> impl Iterator<Item = &EventInput> {
        self.inputs.iter().filter(|p| p.indexed)
    }

    pub fn non_indexed(&self) -> impl Iterator<Item = &EventInput> {
        self.inputs.iter().filter(|p| !p.indexed)
    }

    pub fn indexed_count(&self) -> usize {
        self.indexed().count()
    }

    /// The number of topics a log of this event must carry.
    pub fn expected_topics(&self) -> usize {
        self.indexed_count() + 1
    }

    pub fn data_type(&self) -> &DynSolType {
        &self.data_type
    }

    pub fn has_data(&self) -> bool {
        self.inputs.iter().any(|p| !p.indexed)
    }
}

/// A parsed contract ABI with its events indexed by selector.
#[derive(Debug, Clone)]
pub struct AbiHandle {
    origin: String,
    events: Vec<EventSignature>,
    by_selector: HashMap<B256, usize>,
    function_count: usize,
    error_count: usize,
}

impl AbiHandle {
    /// Read and parse an ABI JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AbiError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        if origin.is_empty() {
            return Err(AbiError::Io {
                path: origin,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "ABI file path is empty",
                ),
            });
        }
        let raw = std::fs::read_to_string(path).map_err(|source| AbiError::Io {
            path: origin.clone(),
            source,
        })?;
        Self::parse(&raw, origin)
    }

    /// Parse an ABI from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        Self::parse(json, "<inline>".to_string())
    }

    fn parse(raw: &str, origin: String) -> Result<Self, AbiError> {
        if raw.trim().is_empty() {
            return Err(AbiError::Empty { origin });
        }
        let abi: JsonAbi = serde_json::from_str(raw).map_err(|e| AbiError::Parse {
            origin: origin.clone(),
            reason: e.to_string(),
        })?;
        Self::from_abi(&abi, origin)
    }

    /// Index an already-parsed alloy ABI.
    pub fn from_abi(abi: &JsonAbi, origin: impl Into<String>) -> Result<Self, AbiError> {
        let origin = origin.into();
        let mut events = Vec::new();
        let mut by_selector = HashMap::new();

        for event in abi.events() {
            let sig = EventSignature::from_event(event).map_err(|reason| AbiError::Parse {
                origin: origin.clone(),
                reason,
            })?;
            if !sig.anonymous {
                if by_selector.contains_key(&sig.selector) {
                    warn!(
                        signature = %sig.signature,
                        "duplicate event signature in ABI; keeping the first"
                    );
                } else {
                    by_selector.insert(sig.selector, events.len());
                }
            }
            events.push(sig);
        }

        debug!(
            origin = %origin,
            events = events.len(),
            indexed = by_selector.len(),
            "ABI loaded"
        );

        Ok(Self {
            origin,
            events,
            by_selector,
            function_count: abi.functions().count(),
            error_count: abi.errors().count(),
        })
    }

    /// Where the ABI came from (file path or `<inline>`).
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// All declared events, anonymous ones included.
    pub fn events(&self) -> impl Iterator<Item = &EventSignature> {
        self.events.iter()
    }

    /// Events a log can be matched against by `topics[0]`.
    pub fn matchable_events(&self) -> impl Iterator<Item = &EventSignature> {
        self.events.iter().filter(|e| !e.anonymous)
    }

    /// First non-anonymous event with the given name.
    pub fn event(&self, name: &str) -> Option<&EventSignature> {
        self.matchable_events().find(|e| e.name == name)
    }

    /// The event whose selector equals `topic0`. Anonymous events never match.
    pub fn event_by_selector(&self, topic0: &B256) -> Option<&EventSignature> {
        self.by_selector.get(topic0).map(|&i| &self.events[i])
    }

    pub fn anonymous_count(&self) -> usize {
        self.events.iter().filter(|e| e.anonymous).count()
    }

    pub fn function_count(&self) -> usize {
        self.function_count
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }
}
