//! # logcodec-pipeline
//!
//! Streaming orchestration for LogCodec.
//!
//! Reads raw logs from a file or a live `eth_subscribe("logs")` WebSocket
//! subscription, decodes and maps each one, drops redeliveries and writes
//! the resulting events as JSON lines.
//!
//! ## Architecture
//! ```text
//! LogSource (file | WebSocket, reconnected with backoff)
//!       │
//!       ▼
//! LogProcessor (EvmDecoder → map_event)
//!       │  NoMatch / Skipped → counted, logged, dropped
//!       ▼
//! Deduplicator (txHash:logIndex window)
//!       │                      │
//!       ▼ first                ▼ repeat
//! EventSink (main)        EventSink (duplicates)
//! ```

pub mod config;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod message;
pub mod processor;
pub mod sink;
pub mod source;
pub mod ws_source;

pub use config::{DedupConfig, OutputFormat, PipelineConfig, SinkConfig, SourceConfig};
pub use dedup::Deduplicator;
pub use engine::{Pipeline, PipelineMetrics};
pub use error::{ConfigError, PipelineError, SinkError, StreamError};
pub use message::EventMessage;
pub use processor::{LogProcessor, Outcome, SkipReason};
pub use sink::{encode_record, open_sink, EventSink, JsonLinesSink, MemorySink};
pub use source::{source_from_config, FileSource, LogSource, RawLogStream, VecSource};
pub use ws_source::WsLogSource;
