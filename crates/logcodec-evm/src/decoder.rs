//! `EvmDecoder` — the `LogDecoder` implementation for EVM contract ABIs.

use alloy_core::dyn_abi::DynSolValue;
use indexmap::IndexMap;
use logcodec_core::{
    decoder::{BatchDecodeResult, ErrorMode, LogDecoder, ProgressCallback},
    error::{BatchDecodeError, DecodeError},
    log::{DecodedLog, RawLog},
    value::FieldValue,
};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::warn;

use crate::abi::{AbiHandle, EventSignature};
use crate::normalizer;
use crate::topic::{self, TopicKind};

/// Decodes logs against one contract ABI.
/// Cheap to clone; the ABI is shared.
#[derive(Debug, Clone)]
pub struct EvmDecoder {
    abi: Arc<AbiHandle>,
}

impl EvmDecoder {
    pub fn new(abi: Arc<AbiHandle>) -> Self {
        Self { abi }
    }

    pub fn abi(&self) -> &AbiHandle {
        &self.abi
    }
}

/// Decode a log already matched to `sig`.
///
/// Indexed arguments consume `topics[1..]` in declaration order; the topic
/// count must be exactly one more than the number of indexed arguments.
pub fn decode_with(sig: &EventSignature, log: &RawLog) -> Result<DecodedLog, DecodeError> {
    let indexed = sig.indexed_count();
    if log.topics.len() != indexed + 1 {
        return Err(DecodeError::TopicCount {
            event: sig.name.clone(),
            indexed,
            expected: indexed + 1,
            got: log.topics.len(),
        });
    }

    let mut data_values = decode_data(sig, &log.data)?.into_iter();

    let mut topics = log.topics[1..].iter();
    let mut fields = IndexMap::with_capacity(sig.inputs.len());
    for input in &sig.inputs {
        let value = if input.indexed {
            // count checked above
            let Some(word) = topics.next() else { break };
            if topic::topic_kind(&input.ty) == TopicKind::Opaque {
                warn!(
                    event = %sig.name,
                    param = %input.name,
                    ty = %input.ty,
                    "indexed type has no word decoding; keeping raw topic"
                );
            }
            topic::decode_indexed(*word, &input.ty)
        } else {
            let Some(v) = data_values.next() else { break };
            v
        };
        fields.insert(input.name.clone(), value);
    }

    Ok(DecodedLog {
        event: sig.name.clone(),
        selector: sig.selector,
        fields,
        log: log.clone(),
    })
}

/// Decode the non-indexed arguments from the log's `data` payload.
/// Events without non-indexed arguments ignore `data` entirely.
fn decode_data(sig: &EventSignature, data: &[u8]) -> Result<Vec<FieldValue>, DecodeError> {
    if !sig.has_data() {
        return Ok(Vec::new());
    }
    let decoded = sig
        .data_type()
        .abi_decode_params(data)
        .map_err(|e| DecodeError::DataUnpack {
            event: sig.name.clone(),
            reason: e.to_string(),
        })?;
    let values = match decoded {
        DynSolValue::Tuple(vals) => vals,
        other => vec![other],
    };
    Ok(values.into_iter().map(normalizer::normalize).collect())
}

impl LogDecoder for EvmDecoder {
    fn decode_log(&self, log: &RawLog) -> Result<Option<DecodedLog>, DecodeError> {
        let Some(topic0) = log.topic0() else {
            return Ok(None);
        };
        let Some(sig) = self.abi.event_by_selector(topic0) else {
            return Ok(None);
        };
        decode_with(sig, log).map(Some)
    }

    /// Override default batch with Rayon parallel decode.
    fn decode_batch(
        &self,
        logs: &[RawLog],
        mode: ErrorMode,
        progress: Option<&dyn ProgressCallback>,
    ) -> Result<BatchDecodeResult, BatchDecodeError> {
        // Progress callbacks want ordered, incremental reporting
        if progress.is_some() {
            let mut out = BatchDecodeResult::with_capacity(logs.len());
            for (idx, log) in logs.iter().enumerate() {
                out.absorb(idx, self.decode_log(log), mode)?;
                if let Some(cb) = progress {
                    cb.on_progress(idx + 1, logs.len());
                }
            }
            return Ok(out);
        }

        let results: Vec<Result<Option<DecodedLog>, DecodeError>> =
            logs.par_iter().map(|log| self.decode_log(log)).collect();

        let mut out = BatchDecodeResult::with_capacity(logs.len());
        for (idx, result) in results.into_iter().enumerate() {
            out.absorb(idx, result, mode)?;
        }
        Ok(out)
    }
}
