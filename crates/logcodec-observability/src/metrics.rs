//! Pipeline metric instruments.
//!
//! All metrics use OpenTelemetry conventions. Without an installed meter
//! provider the global meter is a no-op, so recording is always safe.

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

/// Central metrics handle for the log pipeline.
#[derive(Clone)]
pub struct PipelineInstruments {
    pub logs_received: Counter<u64>,
    pub events_emitted: Counter<u64>,
    pub logs_unmatched: Counter<u64>,
    pub decode_errors: Counter<u64>,
    pub unhandled_events: Counter<u64>,
    pub duplicates: Counter<u64>,
    pub decode_latency_ms: Histogram<f64>,
}

impl PipelineInstruments {
    pub fn new(meter: &Meter) -> Self {
        Self {
            logs_received: meter
                .u64_counter("logcodec.logs_received")
                .with_description("Raw logs read from the source")
                .build(),
            events_emitted: meter
                .u64_counter("logcodec.events_emitted")
                .with_description("Decoded events written to the main sink")
                .build(),
            logs_unmatched: meter
                .u64_counter("logcodec.logs_unmatched")
                .with_description("Logs whose first topic matched no ABI event")
                .build(),
            decode_errors: meter
                .u64_counter("logcodec.decode_errors")
                .with_description("Logs that matched an event but failed to decode")
                .build(),
            unhandled_events: meter
                .u64_counter("logcodec.unhandled_events")
                .with_description("Decoded logs with no typed event mapping")
                .build(),
            duplicates: meter
                .u64_counter("logcodec.duplicates")
                .with_description("Events routed to the duplicate sink")
                .build(),
            decode_latency_ms: meter
                .f64_histogram("logcodec.decode_latency_ms")
                .with_description("Time to decode and map a single log in milliseconds")
                .build(),
        }
    }

    /// Instruments on the global meter provider.
    pub fn global() -> Self {
        Self::new(&global::meter("logcodec"))
    }

    pub fn record_received(&self) {
        self.logs_received.add(1, &[]);
    }

    pub fn record_emitted(&self, event: &str) {
        self.events_emitted
            .add(1, &[KeyValue::new("event", event.to_string())]);
    }

    pub fn record_unmatched(&self) {
        self.logs_unmatched.add(1, &[]);
    }

    pub fn record_error(&self, error_type: &str) {
        self.decode_errors
            .add(1, &[KeyValue::new("error_type", error_type.to_string())]);
    }

    pub fn record_unhandled(&self, event: &str) {
        self.unhandled_events
            .add(1, &[KeyValue::new("event", event.to_string())]);
    }

    pub fn record_duplicate(&self, event: &str) {
        self.duplicates
            .add(1, &[KeyValue::new("event", event.to_string())]);
    }

    pub fn record_latency(&self, ms: f64) {
        self.decode_latency_ms.record(ms, &[]);
    }
}

impl std::fmt::Debug for PipelineInstruments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineInstruments").finish_non_exhaustive()
    }
}
