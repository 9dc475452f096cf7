//! `LogSource` trait — abstraction over where raw logs come from.
//!
//! Finite sources (files, in-memory lists) end their stream when drained.
//! Live sources end it only on disconnect, and the pipeline reopens them.

use async_trait::async_trait;
use futures::{stream, Stream};
use logcodec_core::RawLog;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use crate::config::{PipelineConfig, SourceConfig};
use crate::error::{ConfigError, StreamError};
use crate::ws_source::WsLogSource;

/// A stream of raw logs from a single source.
pub type RawLogStream = Pin<Box<dyn Stream<Item = Result<RawLog, StreamError>> + Send>>;

#[async_trait]
pub trait LogSource: Send + Sync {
    /// Human-readable origin, used in logs and errors.
    fn name(&self) -> &str;

    /// Connect (or open) and start streaming raw logs.
    async fn open(&self) -> Result<RawLogStream, StreamError>;

    /// `true` when the stream ending means a lost connection rather than
    /// the end of the data.
    fn is_live(&self) -> bool {
        false
    }
}

/// Reads a file holding either a JSON array of logs or one log per line.
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LogSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open(&self) -> Result<RawLogStream, StreamError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| StreamError::Io {
                path: self.name.clone(),
                source,
            })?;
        let items = parse_logs(&text, &self.name);
        Ok(Box::pin(stream::iter(items)))
    }
}

/// Parse a JSON array of logs or JSON lines. A bad entry becomes a
/// `Malformed` item; it does not abort the rest.
pub fn parse_logs(text: &str, origin: &str) -> Vec<Result<RawLog, StreamError>> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        return match serde_json::from_str::<Vec<serde_json::Value>>(trimmed) {
            Ok(values) => values
                .into_iter()
                .enumerate()
                .map(|(i, v)| {
                    serde_json::from_value(v).map_err(|e| StreamError::Malformed {
                        origin: format!("{origin}[{i}]"),
                        reason: e.to_string(),
                    })
                })
                .collect(),
            Err(e) => vec![Err(StreamError::Malformed {
                origin: origin.to_string(),
                reason: e.to_string(),
            })],
        };
    }

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| StreamError::Malformed {
                origin: format!("{origin}:{}", i + 1),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Serves a fixed list of logs.
pub struct VecSource {
    logs: Vec<RawLog>,
}

impl VecSource {
    pub fn new(logs: Vec<RawLog>) -> Self {
        Self { logs }
    }
}

#[async_trait]
impl LogSource for VecSource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn open(&self) -> Result<RawLogStream, StreamError> {
        let items: Vec<Result<RawLog, StreamError>> = self.logs.iter().cloned().map(Ok).collect();
        Ok(Box::pin(stream::iter(items)))
    }
}

/// Build the source a config names. WebSocket sources filter on the
/// configured contract and buffer `channel_capacity` logs.
pub fn source_from_config(config: &PipelineConfig) -> Result<Box<dyn LogSource>, ConfigError> {
    Ok(match &config.source {
        SourceConfig::File { path } => Box::new(FileSource::new(path.clone())),
        SourceConfig::Websocket { url, .. } => Box::new(
            WsLogSource::new(url.clone())
                .with_addresses(config.contract()?)
                .with_buffer(config.channel_capacity),
        ),
    })
}
