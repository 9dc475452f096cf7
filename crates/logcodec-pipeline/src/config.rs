//! Pipeline configuration, loaded from YAML.
//!
//! ```yaml
//! abi_path: abi/feem.json
//! contract_address: "0x0B5f073135dF3f5671710F08b08C0c9258aECc35"
//! source:
//!   type: websocket
//!   url: wss://rpc.soniclabs.com
//! sink:
//!   type: file
//!   path: out/events.jsonl
//!   format: rows
//! duplicate_sink:
//!   type: stdout
//! dedup:
//!   window: 50000
//! ```

use alloy_primitives::Address;
use logcodec_observability::LogConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConfigError;

/// Where raw logs come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    /// A JSON array or JSON-lines file of RPC-shaped logs.
    File { path: PathBuf },
    /// A live `eth_subscribe("logs")` subscription.
    Websocket {
        /// `ws://` or `wss://` endpoint
        url: String,
        /// Maximum consecutive reconnection attempts
        #[serde(default = "default_max_retries")]
        max_retries: u32,
        /// Initial backoff in milliseconds, doubled per attempt
        #[serde(default = "default_backoff_ms")]
        backoff_ms: u64,
    },
}

fn default_max_retries() -> u32 {
    5
}
fn default_backoff_ms() -> u64 {
    500
}

/// Shape of each written JSON line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The mapped event, camelCase, with log metadata
    #[default]
    Events,
    /// Flat snake_case analytical rows
    Rows,
    /// `{data, attributes}` envelopes for queue-style consumers
    Messages,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "events" => Ok(OutputFormat::Events),
            "rows" => Ok(OutputFormat::Rows),
            "messages" => Ok(OutputFormat::Messages),
            other => Err(format!(
                "unknown format '{other}' (expected events, rows or messages)"
            )),
        }
    }
}

/// Where decoded events go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SinkConfig {
    Stdout {
        #[serde(default)]
        format: OutputFormat,
    },
    File {
        path: PathBuf,
        #[serde(default)]
        format: OutputFormat,
    },
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig::Stdout {
            format: OutputFormat::Events,
        }
    }
}

impl SinkConfig {
    pub fn format(&self) -> OutputFormat {
        match self {
            SinkConfig::Stdout { format } | SinkConfig::File { format, .. } => *format,
        }
    }
}

/// Redelivery detection keyed by `txHash:logIndex`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    /// Number of most recent keys remembered
    #[serde(default = "default_dedup_window")]
    pub window: usize,
}

fn bool_true() -> bool {
    true
}
fn default_dedup_window() -> usize {
    10_000
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window: default_dedup_window(),
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Contract ABI JSON file
    #[serde(default)]
    pub abi_path: PathBuf,
    /// Only logs emitted by this contract are decoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    pub source: SourceConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    /// Receives events already seen within the dedup window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_sink: Option<SinkConfig>,
    #[serde(default)]
    pub dedup: DedupConfig,
    /// Buffer between a live source and the decoder
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_channel_capacity() -> usize {
    1_024
}

impl PipelineConfig {
    /// A config reading a log file and writing events to stdout.
    pub fn from_file_source(abi_path: impl Into<PathBuf>, logs: impl Into<PathBuf>) -> Self {
        Self {
            abi_path: abi_path.into(),
            contract_address: None,
            source: SourceConfig::File { path: logs.into() },
            sink: SinkConfig::default(),
            duplicate_sink: None,
            dedup: DedupConfig::default(),
            channel_capacity: default_channel_capacity(),
            log: LogConfig::default(),
        }
    }

    /// Read, parse and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Parse and validate YAML text. `origin` names the input in errors.
    pub fn parse(yaml: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
                origin: origin.to_string(),
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field and report all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.abi_path.as_os_str().is_empty() {
            problems.push("abi_path is required".to_string());
        }
        if let Some(addr) = &self.contract_address {
            if Address::from_str(addr).is_err() {
                problems.push(format!("contract_address '{addr}' is not a valid address"));
            }
        }
        match &self.source {
            SourceConfig::File { path } if path.as_os_str().is_empty() => {
                problems.push("source.path is required".to_string());
            }
            SourceConfig::Websocket { url, .. }
                if !(url.starts_with("ws://") || url.starts_with("wss://")) =>
            {
                problems.push(format!("source.url '{url}' must be a ws:// or wss:// URL"));
            }
            _ => {}
        }
        for (name, sink) in std::iter::once(("sink", Some(&self.sink)))
            .chain(std::iter::once(("duplicate_sink", self.duplicate_sink.as_ref())))
        {
            if let Some(SinkConfig::File { path, .. }) = sink {
                if path.as_os_str().is_empty() {
                    problems.push(format!("{name}.path is required"));
                }
            }
        }
        if self.dedup.enabled && self.dedup.window == 0 {
            problems.push("dedup.window must be greater than 0".to_string());
        }
        if self.channel_capacity == 0 {
            problems.push("channel_capacity must be greater than 0".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    /// The parsed contract filter.
    pub fn contract(&self) -> Result<Option<Address>, ConfigError> {
        self.contract_address
            .as_deref()
            .map(|a| {
                Address::from_str(a).map_err(|e| {
                    ConfigError::Invalid(vec![format!(
                        "contract_address '{a}' is not a valid address: {e}"
                    )])
                })
            })
            .transpose()
    }

    /// `(max_retries, backoff_ms)` for live sources; `(0, 0)` otherwise.
    pub fn retry_policy(&self) -> (u32, u64) {
        match &self.source {
            SourceConfig::Websocket {
                max_retries,
                backoff_ms,
                ..
            } => (*max_retries, *backoff_ms),
            SourceConfig::File { .. } => (0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_file_config_with_defaults() {
        let cfg = PipelineConfig::parse(
            "abi_path: abi/feem.json\nsource:\n  type: file\n  path: logs.jsonl\n",
            "inline",
        )
        .unwrap();
        assert_eq!(cfg.sink, SinkConfig::default());
        assert!(cfg.duplicate_sink.is_none());
        assert!(cfg.dedup.enabled);
        assert_eq!(cfg.dedup.window, 10_000);
        assert_eq!(cfg.channel_capacity, 1_024);
        assert_eq!(cfg.log.level, "info");
        assert_eq!(cfg.retry_policy(), (0, 0));
    }

    #[test]
    fn parses_websocket_config() {
        let yaml = r#"
abi_path: abi/feem.json
contract_address: "0x0b5f073135df3f5671710f08b08c0c9258aecc35"
source:
  type: websocket
  url: wss://rpc.example.org
  max_retries: 3
sink:
  type: file
  path: out/events.jsonl
  format: rows
duplicate_sink:
  type: stdout
  format: messages
dedup:
  window: 500
log:
  level: debug
  json: true
"#;
        let cfg = PipelineConfig::parse(yaml, "inline").unwrap();
        assert_eq!(cfg.retry_policy(), (3, 500));
        assert_eq!(cfg.sink.format(), OutputFormat::Rows);
        assert_eq!(
            cfg.duplicate_sink.as_ref().map(SinkConfig::format),
            Some(OutputFormat::Messages)
        );
        assert_eq!(cfg.dedup.window, 500);
        assert!(cfg.log.json);
        assert!(cfg.contract().unwrap().is_some());
    }

    #[test]
    fn validate_reports_every_problem() {
        let yaml = r#"
contract_address: "0x1234"
source:
  type: websocket
  url: https://not-a-socket
dedup:
  window: 0
channel_capacity: 0
"#;
        match PipelineConfig::parse(yaml, "inline") {
            Err(ConfigError::Invalid(problems)) => {
                assert_eq!(problems.len(), 5, "{problems:?}");
                assert!(problems[0].contains("abi_path"));
                assert!(problems[1].contains("contract_address"));
                assert!(problems[2].contains("source.url"));
                assert!(problems[3].contains("dedup.window"));
                assert!(problems[4].contains("channel_capacity"));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn zero_window_is_fine_when_dedup_is_off() {
        let mut cfg = PipelineConfig::from_file_source("abi.json", "logs.json");
        cfg.dedup = DedupConfig {
            enabled: false,
            window: 0,
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn unknown_source_type_is_a_parse_error() {
        let err = PipelineConfig::parse("abi_path: a.json\nsource:\n  type: kafka\n", "inline")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!("ROWS".parse::<OutputFormat>(), Ok(OutputFormat::Rows));
        assert!("csv".parse::<OutputFormat>().is_err());
    }
}
