//! Error types for the pipeline.

use logcodec_core::AbiError;
use thiserror::Error;

/// Errors produced by a log source.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("RPC connection failed: {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("subscription rejected by {url}: {reason}")]
    Subscription { url: String, reason: String },

    #[error("stream closed unexpectedly")]
    Closed,

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// One unreadable entry; the source keeps going.
    #[error("malformed log in {origin}: {reason}")]
    Malformed { origin: String, reason: String },
}

/// Errors while loading or validating a pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {origin}: {reason}")]
    Parse { origin: String, reason: String },

    #[error("invalid pipeline config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Errors while writing to a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors that stop a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Abi(#[from] AbiError),

    #[error(transparent)]
    Source(#[from] StreamError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("source {source_name} unavailable after {attempts} reconnection attempts")]
    RetriesExhausted { source_name: String, attempts: u32 },
}
