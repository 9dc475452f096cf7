//! Event sinks.

use async_trait::async_trait;
use chrono::Utc;
use logcodec_feem::{DecodedEvent, DuplicateRow, EventRow};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::config::{OutputFormat, SinkConfig};
use crate::error::SinkError;
use crate::message::EventMessage;

#[async_trait]
pub trait EventSink: Send {
    async fn write(&mut self, event: &DecodedEvent) -> Result<(), SinkError>;

    async fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Render one event in the given output format. `duplicate` selects the
/// duplicate row shape for `Rows`.
pub fn encode_record(
    event: &DecodedEvent,
    format: OutputFormat,
    duplicate: bool,
) -> Result<serde_json::Value, serde_json::Error> {
    let now = Utc::now();
    match format {
        OutputFormat::Events => serde_json::to_value(event),
        OutputFormat::Rows if duplicate => {
            serde_json::to_value(DuplicateRow::from_event(event, now))
        }
        OutputFormat::Rows => serde_json::to_value(EventRow::from_event(event, now)),
        OutputFormat::Messages => serde_json::to_value(EventMessage::from_event(event)?),
    }
}

/// Writes one JSON document per line to any async writer.
pub struct JsonLinesSink<W> {
    writer: W,
    format: OutputFormat,
    duplicate: bool,
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesSink<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            duplicate: false,
        }
    }

    /// Mark this sink as the duplicate sink.
    pub fn for_duplicates(mut self) -> Self {
        self.duplicate = true;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesSink<BufWriter<tokio::fs::File>> {
    /// Create (or truncate) `path`, creating parent directories.
    pub async fn create(path: impl AsRef<Path>, format: OutputFormat) -> Result<Self, SinkError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = tokio::fs::File::create(path).await?;
        Ok(Self::new(BufWriter::new(file), format))
    }
}

impl JsonLinesSink<tokio::io::Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(tokio::io::stdout(), format)
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> EventSink for JsonLinesSink<W> {
    async fn write(&mut self, event: &DecodedEvent) -> Result<(), SinkError> {
        let record = encode_record(event, self.format, self.duplicate)?;
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush().await?;
        Ok(())
    }
}

/// Build the sink a config names.
pub async fn open_sink(
    config: &SinkConfig,
    duplicate: bool,
) -> Result<Box<dyn EventSink>, SinkError> {
    let sink: Box<dyn EventSink> = match config {
        SinkConfig::Stdout { format } => {
            let s = JsonLinesSink::stdout(*format);
            Box::new(if duplicate { s.for_duplicates() } else { s })
        }
        SinkConfig::File { path, format } => {
            let s = JsonLinesSink::create(path, *format).await?;
            Box::new(if duplicate { s.for_duplicates() } else { s })
        }
    };
    Ok(sink)
}

/// Collects events in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<DecodedEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DecodedEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EventSink for MemorySink {
    async fn write(&mut self, event: &DecodedEvent) -> Result<(), SinkError> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{B256, U256};
    use logcodec_core::LogMeta;
    use logcodec_feem::FeemEvent;

    fn event(log_index: u64) -> DecodedEvent {
        DecodedEvent {
            event: FeemEvent::RewardClaimCompleted {
                project_id: Some(U256::from(42u64)),
                epoch_number: Some(U256::from(311u64)),
                amount: Some(U256::from(777u64)),
            },
            meta: LogMeta {
                emitting_address: Default::default(),
                block_number: 1,
                block_hash: B256::ZERO,
                tx_hash: B256::repeat_byte(1),
                tx_index: 0,
                log_index,
                removed: false,
            },
        }
    }

    async fn lines(format: OutputFormat, duplicate: bool) -> Vec<serde_json::Value> {
        let mut sink = JsonLinesSink::new(Vec::new(), format);
        if duplicate {
            sink = sink.for_duplicates();
        }
        sink.write(&event(1)).await.unwrap();
        sink.write(&event(2)).await.unwrap();
        sink.flush().await.unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        out.lines().map(|l| serde_json::from_str(l).unwrap()).collect()
    }

    #[tokio::test]
    async fn events_format() {
        let out = lines(OutputFormat::Events, false).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["eventName"], "RewardClaimCompleted");
        assert_eq!(out[0]["amount"], "777");
        assert_eq!(out[1]["logIndex"], 2);
    }

    #[tokio::test]
    async fn rows_format() {
        let out = lines(OutputFormat::Rows, false).await;
        assert_eq!(out[0]["event_name"], "RewardClaimCompleted");
        assert_eq!(out[0]["epoch_number"], "311");
        assert!(out[0].get("duplicate_detection_time").is_none());
    }

    #[tokio::test]
    async fn duplicate_rows_carry_detection_time() {
        let out = lines(OutputFormat::Rows, true).await;
        assert!(out[0].get("duplicate_detection_time").is_some());
    }

    #[tokio::test]
    async fn messages_format() {
        let out = lines(OutputFormat::Messages, false).await;
        assert_eq!(out[0]["attributes"]["eventName"], "RewardClaimCompleted");
        assert_eq!(out[0]["data"]["projectId"], "42");
    }

    #[tokio::test]
    async fn memory_sink_clones_share_buffer() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.write(&event(1)).await.unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.events()[0].meta.log_index, 1);
    }
}
