//! # logcodec-core
//!
//! Core types shared across all LogCodec crates: the raw log as delivered
//! by a node, the typed values an ABI decoder produces, the error taxonomy
//! of the decode path and the `LogDecoder` trait every decoder implements.

pub mod decoder;
pub mod error;
pub mod log;
pub mod value;

pub use decoder::{BatchDecodeResult, ErrorMode, LogDecoder, ProgressCallback};
pub use error::{AbiError, BatchDecodeError, DecodeError};
pub use log::{dedup_key, DecodedLog, LogMeta, RawLog};
pub use value::FieldValue;
