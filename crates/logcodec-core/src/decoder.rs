//! The `LogDecoder` trait and associated progress/batch types.
//!
//! The trait is object-safe so decoders can be stored as
//! `Arc<dyn LogDecoder>` and shared between the pipeline's tasks.

use crate::error::{BatchDecodeError, DecodeError};
use crate::log::{DecodedLog, RawLog};

/// Callback invoked during long-running batch decodes.
/// `processed` is the number of logs handled so far; `total` is the batch size.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, processed: usize, total: usize);
}

/// Blanket impl so closures can be used as progress callbacks.
impl<F: Fn(usize, usize) + Send + Sync> ProgressCallback for F {
    fn on_progress(&self, processed: usize, total: usize) {
        self(processed, total)
    }
}

/// Controls how a batch decode reacts to individual decode failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Drop logs that fail to decode.
    #[default]
    Skip,
    /// Collect decode errors alongside successes and return both at the end.
    Collect,
    /// Abort the entire batch on first error.
    Throw,
}

/// The output of a batch decode.
#[derive(Debug, Default)]
pub struct BatchDecodeResult {
    pub decoded: Vec<DecodedLog>,
    /// Indices of logs that matched no event
    pub unmatched: Vec<usize>,
    /// Populated only when `ErrorMode::Collect` is used.
    pub errors: Vec<(usize, DecodeError)>,
}

impl BatchDecodeResult {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            decoded: Vec::with_capacity(n),
            unmatched: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Fold the result of decoding the log at `index` into the batch.
    pub fn absorb(
        &mut self,
        index: usize,
        result: Result<Option<DecodedLog>, DecodeError>,
        mode: ErrorMode,
    ) -> Result<(), BatchDecodeError> {
        match result {
            Ok(Some(log)) => self.decoded.push(log),
            Ok(None) => self.unmatched.push(index),
            Err(err) => match mode {
                ErrorMode::Skip => {}
                ErrorMode::Collect => self.errors.push((index, err)),
                ErrorMode::Throw => {
                    return Err(BatchDecodeError::ItemFailed { index, source: err })
                }
            },
        }
        Ok(())
    }
}

/// A decoder turning raw logs into named, typed fields.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so they can be shared across
/// Tokio tasks and Rayon threads without additional locking.
pub trait LogDecoder: Send + Sync {
    /// Decode one log.
    ///
    /// Returns `Ok(None)` when the log has no topics or its `topics[0]`
    /// matches no known event. That is the expected outcome for foreign
    /// logs and must not be reported as a failure.
    fn decode_log(&self, log: &RawLog) -> Result<Option<DecodedLog>, DecodeError>;

    /// Decode a batch of logs.
    ///
    /// The default implementation calls `decode_log` for each log in order.
    /// Implementations can override this for parallelism.
    fn decode_batch(
        &self,
        logs: &[RawLog],
        mode: ErrorMode,
        progress: Option<&dyn ProgressCallback>,
    ) -> Result<BatchDecodeResult, BatchDecodeError> {
        let mut out = BatchDecodeResult::with_capacity(logs.len());
        for (idx, log) in logs.iter().enumerate() {
            out.absorb(idx, self.decode_log(log), mode)?;
            if let Some(cb) = progress {
                cb.on_progress(idx + 1, logs.len());
            }
        }
        Ok(out)
    }
}
