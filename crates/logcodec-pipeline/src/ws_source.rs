//! `WsLogSource` — live `LogSource` over an Ethereum JSON-RPC WebSocket
//! subscription (`eth_subscribe("logs", filter)`).
//!
//! # Usage
//! ```no_run
//! use logcodec_pipeline::WsLogSource;
//! use alloy_primitives::address;
//!
//! let source = WsLogSource::new("wss://rpc.soniclabs.com")
//!     .with_address(address!("0b5f073135df3f5671710f08b08c0c9258aecc35"));
//! ```

use alloy_primitives::Address;
use async_trait::async_trait;
use futures::{channel::mpsc, SinkExt, StreamExt};
use logcodec_core::RawLog;
use serde_json::Value;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::error::StreamError;
use crate::source::{LogSource, RawLogStream};

const DEFAULT_BUFFER: usize = 512;

/// EVM WebSocket log source.
///
/// Reconnection is handled by the `Pipeline`, which calls `open()` again
/// when the stream ends.
pub struct WsLogSource {
    url: String,
    /// Contract addresses to filter on (empty = all)
    filter_addresses: Vec<Address>,
    buffer: usize,
    connected: Arc<AtomicBool>,
}

impl WsLogSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            filter_addresses: vec![],
            buffer: DEFAULT_BUFFER,
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_address(mut self, addr: Address) -> Self {
        self.filter_addresses.push(addr);
        self
    }

    pub fn with_addresses(mut self, addrs: impl IntoIterator<Item = Address>) -> Self {
        self.filter_addresses.extend(addrs);
        self
    }

    /// Logs buffered between the socket task and the consumer.
    pub fn with_buffer(mut self, capacity: usize) -> Self {
        self.buffer = capacity.max(1);
        self
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LogSource for WsLogSource {
    fn name(&self) -> &str {
        &self.url
    }

    fn is_live(&self) -> bool {
        true
    }

    async fn open(&self) -> Result<RawLogStream, StreamError> {
        let (tx, rx) = mpsc::channel::<Result<RawLog, StreamError>>(self.buffer);

        let url = self.url.clone();
        let filter = build_log_filter(&self.filter_addresses);
        let connected = Arc::clone(&self.connected);

        tokio::spawn(async move {
            run_ws_subscription(url, filter, connected, tx).await;
        });

        Ok(Box::pin(rx))
    }
}

// ─── Internal WebSocket loop ──────────────────────────────────────────────────

async fn run_ws_subscription(
    url: String,
    filter: Value,
    connected: Arc<AtomicBool>,
    mut tx: mpsc::Sender<Result<RawLog, StreamError>>,
) {
    info!(%url, "connecting to WebSocket");

    let ws_stream = match connect_async(&url).await {
        Ok((ws, _)) => {
            connected.store(true, Ordering::Relaxed);
            info!(%url, "WebSocket connected");
            ws
        }
        Err(e) => {
            connected.store(false, Ordering::Relaxed);
            error!(%url, error = %e, "WebSocket connect failed");
            let _ = tx
                .send(Err(StreamError::ConnectionFailed {
                    url: url.clone(),
                    reason: e.to_string(),
                }))
                .await;
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();

    let sub_msg = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "eth_subscribe",
        "params": ["logs", filter]
    });

    if let Err(e) = write.send(Message::Text(sub_msg.to_string())).await {
        error!(error = %e, "failed to send eth_subscribe");
        connected.store(false, Ordering::Relaxed);
        let _ = tx.send(Err(StreamError::Closed)).await;
        return;
    }

    while let Some(msg_result) = read.next().await {
        match msg_result {
            Err(e) => {
                warn!(error = %e, "WebSocket error");
                let _ = tx.send(Err(StreamError::Closed)).await;
                break;
            }
            Ok(Message::Text(text)) => {
                debug!(message = %text.chars().take(120).collect::<String>(), "WS message");
                if let Some(item) = parse_ws_message(&text, &url) {
                    if tx.send(item).await.is_err() {
                        // consumer dropped
                        break;
                    }
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket closed by server");
                let _ = tx.send(Err(StreamError::Closed)).await;
                break;
            }
            Ok(Message::Ping(data)) => {
                let _ = write.send(Message::Pong(data)).await;
            }
            Ok(_) => {} // binary / pong
        }
    }

    connected.store(false, Ordering::Relaxed);
    info!("WebSocket subscription loop ended");
}

// ─── Message parsing ─────────────────────────────────────────────────────────

/// Interpret one server message.
///
/// Returns `None` for the subscription confirmation and unrelated traffic,
/// `Some(Err(Subscription))` if the server rejected `eth_subscribe`, and the
/// log itself for `eth_subscription` notifications. Removed (reorged) logs
/// are passed through with `removed` set.
fn parse_ws_message(text: &str, url: &str) -> Option<Result<RawLog, StreamError>> {
    let v: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            return Some(Err(StreamError::Malformed {
                origin: url.to_string(),
                reason: e.to_string(),
            }))
        }
    };

    if let Some(err) = v.get("error") {
        return Some(Err(StreamError::Subscription {
            url: url.to_string(),
            reason: err.to_string(),
        }));
    }

    if v.get("method")?.as_str()? != "eth_subscription" {
        return None;
    }

    let result = v.get("params")?.get("result")?.clone();
    Some(
        serde_json::from_value::<RawLog>(result).map_err(|e| StreamError::Malformed {
            origin: url.to_string(),
            reason: e.to_string(),
        }),
    )
}

fn build_log_filter(addresses: &[Address]) -> Value {
    if addresses.is_empty() {
        serde_json::json!({})
    } else {
        serde_json::json!({ "address": addresses })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const URL: &str = "wss://node.example";

    #[test]
    fn parse_subscription_log() {
        let msg = r#"{
            "jsonrpc":"2.0","method":"eth_subscription",
            "params":{
                "subscription":"0xabc",
                "result":{
                    "address":"0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
                    "topics":["0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"],
                    "data":"0x0000000000000000000000000000000000000000000000000000000000000001",
                    "blockNumber":"0x1234","logIndex":"0x0","transactionIndex":"0x2",
                    "blockHash":"0x00000000000000000000000000000000000000000000000000000000000000bb",
                    "transactionHash":"0x00000000000000000000000000000000000000000000000000000000000000aa",
                    "removed":false
                }
            }
        }"#;
        let log = parse_ws_message(msg, URL).unwrap().unwrap();
        assert_eq!(log.block_number, 0x1234);
        assert_eq!(log.transaction_index, 2);
        assert_eq!(log.topics.len(), 1);
        assert_eq!(log.data.len(), 32);
    }

    #[test]
    fn skip_subscription_confirmation() {
        let msg = r#"{"jsonrpc":"2.0","id":1,"result":"0xsubid"}"#;
        assert!(parse_ws_message(msg, URL).is_none());
    }

    #[test]
    fn removed_log_is_kept_and_flagged() {
        let msg = r#"{
            "jsonrpc":"2.0","method":"eth_subscription",
            "params":{"subscription":"0x1","result":{
                "address":"0x0000000000000000000000000000000000000001","topics":[],"data":"0x","removed":true,
                "blockNumber":"0x1","logIndex":"0x0"
            }}
        }"#;
        let log = parse_ws_message(msg, URL).unwrap().unwrap();
        assert!(log.removed);
    }

    #[test]
    fn rejected_subscription_is_an_error() {
        let msg = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"invalid params"}}"#;
        assert!(matches!(
            parse_ws_message(msg, URL),
            Some(Err(StreamError::Subscription { .. }))
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            parse_ws_message("not json", URL),
            Some(Err(StreamError::Malformed { .. }))
        ));
    }

    #[test]
    fn filter_lists_addresses() {
        assert_eq!(build_log_filter(&[]), serde_json::json!({}));
        let f = build_log_filter(&[address!("0b5f073135df3f5671710f08b08c0c9258aecc35")]);
        assert_eq!(
            f["address"][0].as_str().map(str::to_lowercase).as_deref(),
            Some("0x0b5f073135df3f5671710f08b08c0c9258aecc35")
        );
    }
}
