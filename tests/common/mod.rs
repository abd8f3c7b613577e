//! Shared fixtures: an in-process Socket.IO server and a recording ledger.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use inscription_sdk::ledger::{
    LedgerClient, LedgerError, Operator, TransactionReceipt, SUCCESS_STATUS,
};
use inscription_sdk::network::Network;
use inscription_sdk::prelude::{ProgressCallback, ProgressEvent};
use inscription_sdk::ws::protocol::{EnginePacket, SocketPacket};
use inscription_sdk::ws::START_INSCRIPTION_EVENT;

/// 1×1 PNG, base64.
pub const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

pub const ED25519_KEY: &str =
    "302e020100300506032b6570042204200101010101010101010101010101010101010101010101010101010101010101";

// ─── Socket.IO server ────────────────────────────────────────────────────────

/// Answers `start-inscription` with `ack`, then pushes `events` in order.
pub struct FakeSocketServer {
    pub url: String,
    pub started: Arc<Mutex<Vec<Value>>>,
    pub connections: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl FakeSocketServer {
    pub async fn start(ack: Value, events: Vec<(&'static str, Value)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let started = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));

        let handle = {
            let started = Arc::clone(&started);
            let connections = Arc::clone(&connections);
            tokio::spawn(async move {
                while let Ok((tcp, _)) = listener.accept().await {
                    connections.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(serve(
                        tcp,
                        ack.clone(),
                        events.clone(),
                        Arc::clone(&started),
                    ));
                }
            })
        };

        Self {
            url,
            started,
            connections,
            handle,
        }
    }

    pub fn started_payloads(&self) -> Vec<Value> {
        self.started.lock().unwrap().clone()
    }
}

impl Drop for FakeSocketServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(
    tcp: tokio::net::TcpStream,
    ack: Value,
    events: Vec<(&'static str, Value)>,
    started: Arc<Mutex<Vec<Value>>>,
) {
    let Ok(ws) = tokio_tungstenite::accept_async(tcp).await else {
        return;
    };
    let (mut sink, mut stream) = ws.split();

    let open = json!({
        "sid": "fake-sid",
        "upgrades": [],
        "pingInterval": 25000,
        "pingTimeout": 20000,
        "maxPayload": 1000000
    });
    if sink.send(Message::Text(format!("0{open}").into())).await.is_err() {
        return;
    }

    while let Some(Ok(msg)) = stream.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => return,
            _ => continue,
        };
        let text: &str = text.as_ref();
        let Ok(EnginePacket::Message(payload)) = EnginePacket::decode(text) else {
            continue;
        };
        let replies = match SocketPacket::decode(&payload) {
            Ok(SocketPacket::Connect(_)) => {
                vec![SocketPacket::Connect(Some(json!({ "sid": "ns-sid" }))).to_frame()]
            }
            Ok(SocketPacket::Event {
                id: Some(id),
                name,
                args,
            }) if name == START_INSCRIPTION_EVENT => {
                started
                    .lock()
                    .unwrap()
                    .push(args.first().cloned().unwrap_or(Value::Null));
                let mut frames = vec![SocketPacket::Ack {
                    id,
                    args: vec![ack.clone()],
                }
                .to_frame()];
                frames.extend(
                    events
                        .iter()
                        .map(|(name, body)| SocketPacket::event(name, vec![body.clone()], None).to_frame()),
                );
                frames
            }
            Ok(SocketPacket::Disconnect) => return,
            _ => Vec::new(),
        };
        for frame in replies {
            if sink.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
    }
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// Ledger stand-in returning a fixed receipt and counting calls.
#[derive(Debug)]
pub struct RecordingLedger {
    pub status: String,
    pub transaction_id: String,
    pub calls: Mutex<Vec<(Network, String, Vec<u8>)>>,
}

impl RecordingLedger {
    pub fn succeeding(transaction_id: &str) -> Arc<Self> {
        Arc::new(Self {
            status: SUCCESS_STATUS.to_string(),
            transaction_id: transaction_id.to_string(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LedgerClient for RecordingLedger {
    async fn sign_and_execute(
        &self,
        network: Network,
        operator: Operator<'_>,
        transaction_bytes: &[u8],
    ) -> Result<TransactionReceipt, LedgerError> {
        self.calls.lock().unwrap().push((
            network,
            operator.account_id.to_string(),
            transaction_bytes.to_vec(),
        ));
        Ok(TransactionReceipt {
            transaction_id: self.transaction_id.clone(),
            status: self.status.clone(),
        })
    }
}

// ─── Progress ────────────────────────────────────────────────────────────────

/// Callback that records every event it sees.
pub fn recording_callback() -> (ProgressCallback, Arc<Mutex<Vec<ProgressEvent>>>) {
    let events: Arc<Mutex<Vec<ProgressEvent>>> = Arc::default();
    let sink = Arc::clone(&events);
    let callback: ProgressCallback =
        Arc::new(move |event: &ProgressEvent| sink.lock().unwrap().push(event.clone()));
    (callback, events)
}

pub fn assert_non_decreasing(events: &[ProgressEvent]) {
    for pair in events.windows(2) {
        assert!(
            pair[1].progress_percent >= pair[0].progress_percent,
            "progress regressed: {} -> {}",
            pair[0].progress_percent,
            pair[1].progress_percent
        );
    }
}
