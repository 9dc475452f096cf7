//! Error types for the LogCodec decode path.
//!
//! A log that matches no event is not an error: decoders return `Ok(None)`
//! for it. The variants here cover the failures that do need reporting.

use thiserror::Error;

/// Errors raised while loading a contract ABI. All of them are fatal to
/// startup: there is no usable partial ABI.
#[derive(Debug, Error)]
pub enum AbiError {
    #[error("failed to read ABI file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ABI input {origin} is empty")]
    Empty { origin: String },

    #[error("failed to parse ABI {origin}: {reason}")]
    Parse { origin: String, reason: String },
}

/// Errors that can occur while decoding a single matched log.
/// The caller logs and skips the log; the stream continues.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{event}: expected {expected} topics ({indexed} indexed + signature), got {got}")]
    TopicCount {
        event: String,
        indexed: usize,
        expected: usize,
        got: usize,
    },

    #[error("{event}: failed to unpack data: {reason}")]
    DataUnpack { event: String, reason: String },
}

impl DecodeError {
    /// Name of the event the log matched before decoding failed.
    pub fn event(&self) -> &str {
        match self {
            DecodeError::TopicCount { event, .. } | DecodeError::DataUnpack { event, .. } => event,
        }
    }
}

/// Errors that abort a batch decode.
#[derive(Debug, Error)]
pub enum BatchDecodeError {
    #[error("decode error at index {index}: {source}")]
    ItemFailed {
        index: usize,
        #[source]
        source: DecodeError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_count_message_names_the_event() {
        let err = DecodeError::TopicCount {
            event: "Transfer".into(),
            indexed: 2,
            expected: 3,
            got: 2,
        };
        assert_eq!(err.event(), "Transfer");
        assert_eq!(
            err.to_string(),
            "Transfer: expected 3 topics (2 indexed + signature), got 2"
        );
    }

    #[test]
    fn batch_error_keeps_source() {
        use std::error::Error as _;
        let err = BatchDecodeError::ItemFailed {
            index: 4,
            source: DecodeError::DataUnpack {
                event: "FundsAdded".into(),
                reason: "buffer overrun".into(),
            },
        };
        assert!(err.to_string().starts_with("decode error at index 4"));
        assert!(err.source().is_some());
    }
}
