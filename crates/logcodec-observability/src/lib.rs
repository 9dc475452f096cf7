//! # logcodec-observability
//!
//! Logging and metrics plumbing shared by the pipeline and the CLI.
//!
//! ## Built-in metrics
//! - `logcodec.logs_received`     — counter
//! - `logcodec.events_emitted`    — counter, tagged with event
//! - `logcodec.logs_unmatched`    — counter
//! - `logcodec.decode_errors`     — counter, tagged with error_type
//! - `logcodec.unhandled_events`  — counter, tagged with event
//! - `logcodec.duplicates`        — counter, tagged with event
//! - `logcodec.decode_latency_ms` — histogram
//!
//! ## Structured logging
//! Plain-text or JSON logs through `tracing-subscriber`, with a global
//! level and per-crate overrides.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::PipelineInstruments;
pub use tracing_setup::{init_tracing, LogConfig};
