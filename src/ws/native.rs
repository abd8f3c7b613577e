//! Native Socket.IO session — `tokio-tungstenite`.
//!
//! - Engine.IO handshake plus Socket.IO namespace connect with API-key auth
//! - Background tokio task owning the socket
//! - Server ping answered with pong; the session closes when pings stop
//! - Ack rendezvous for emitted events, keyed by ack id
//! - Server events delivered through an unbounded mpsc channel; none are dropped

use std::collections::HashMap;
use std::sync::atomic::{AtomicU16, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::WsError;
use crate::ws::protocol::{
    connect_error_message, socket_io_url, EnginePacket, OpenHandshake, SocketPacket,
};
use crate::ws::{InscriptionEvent, ReadyState};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Sink = SplitSink<WsStream, Message>;
type Stream = SplitStream<WsStream>;

// ─── Commands from public API to background task ─────────────────────────────

enum Command {
    Emit {
        packet: SocketPacket,
        ack: Option<(u64, oneshot::Sender<Vec<Value>>)>,
    },
    Disconnect,
}

// ─── Background task state ───────────────────────────────────────────────────

struct TaskState {
    event_tx: mpsc::UnboundedSender<InscriptionEvent>,
    cmd_rx: mpsc::Receiver<Command>,
    pending_acks: HashMap<u64, oneshot::Sender<Vec<Value>>>,
    ready_state: Arc<AtomicU16>,
    liveness: Duration,
}

impl TaskState {
    fn emit(&self, event: InscriptionEvent) {
        // Fails only once the session handle is gone.
        if self.event_tx.send(event).is_err() {
            tracing::debug!("WebSocket event with no receiver");
        }
    }
}

// ─── Public WsSession ────────────────────────────────────────────────────────

/// One authenticated Socket.IO session.
///
/// Created connected by [`WsSession::connect`]; the background task owns the
/// socket and the public API talks to it over channels.
pub struct WsSession {
    cmd_tx: mpsc::Sender<Command>,
    event_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<InscriptionEvent>>,
    task_handle: tokio::sync::Mutex<Option<JoinHandle<()>>>,
    ready_state: Arc<AtomicU16>,
    next_ack_id: AtomicU64,
    sid: String,
}

impl std::fmt::Debug for WsSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsSession")
            .field("sid", &self.sid)
            .field("ready_state", &self.ready_state())
            .finish_non_exhaustive()
    }
}

impl WsSession {
    /// Open a session against a Socket.IO endpoint.
    ///
    /// `base_url` may use `http(s)` or `ws(s)`. Fails with
    /// `WsError::ConnectionFailed` if the handshake is rejected or does not
    /// finish within `timeout`.
    pub async fn connect(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, WsError> {
        let url = socket_io_url(base_url)?;
        let (sink, stream, open) = tokio::time::timeout(timeout, handshake(&url, api_key))
            .await
            .map_err(|_| WsError::ConnectionFailed("WebSocket connection timeout".into()))??;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let ready_state = Arc::new(AtomicU16::new(ReadyState::Open as u16));

        let state = TaskState {
            event_tx,
            cmd_rx,
            pending_acks: HashMap::new(),
            ready_state: Arc::clone(&ready_state),
            liveness: Duration::from_millis(open.ping_interval + open.ping_timeout),
        };
        let handle = tokio::spawn(run_task(state, sink, stream));

        tracing::info!(sid = %open.sid, "WebSocket connected");

        Ok(Self {
            cmd_tx,
            event_rx: tokio::sync::Mutex::new(event_rx),
            task_handle: tokio::sync::Mutex::new(Some(handle)),
            ready_state,
            next_ack_id: AtomicU64::new(0),
            sid: open.sid,
        })
    }

    /// Bounded connectivity check: true if a full handshake completes within
    /// `timeout`. The probe session is always closed.
    pub async fn probe(base_url: &str, api_key: &str, timeout: Duration) -> bool {
        match Self::connect(base_url, api_key, timeout).await {
            Ok(session) => {
                session.disconnect().await;
                true
            }
            Err(e) => {
                tracing::debug!("WebSocket probe failed: {}", e);
                false
            }
        }
    }

    /// Emit an event and wait for the server's acknowledgment arguments.
    pub async fn emit_with_ack(
        &self,
        event: &str,
        args: Vec<Value>,
        timeout: Duration,
    ) -> Result<Vec<Value>, WsError> {
        let id = self.next_ack_id.fetch_add(1, Ordering::SeqCst);
        let (ack_tx, ack_rx) = oneshot::channel();
        let packet = SocketPacket::event(event, args, Some(id));

        self.cmd_tx
            .send(Command::Emit {
                packet,
                ack: Some((id, ack_tx)),
            })
            .await
            .map_err(|_| WsError::NotConnected)?;

        match tokio::time::timeout(timeout, ack_rx).await {
            Ok(Ok(args)) => Ok(args),
            Ok(Err(_)) => Err(WsError::Closed {
                reason: "Connection closed before acknowledgment".into(),
            }),
            Err(_) => Err(WsError::Timeout),
        }
    }

    /// Emit an event without an ack.
    pub fn emit(&self, event: &str, args: Vec<Value>) -> Result<(), WsError> {
        let packet = SocketPacket::event(event, args, None);
        self.cmd_tx
            .try_send(Command::Emit { packet, ack: None })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    WsError::SendFailed("Command channel full".into())
                }
                mpsc::error::TrySendError::Closed(_) => WsError::NotConnected,
            })
    }

    /// Next server event, or `None` once the session is gone.
    pub async fn next_event(&self) -> Option<InscriptionEvent> {
        self.event_rx.lock().await.recv().await
    }

    /// Discard queued server events. Skipped while another task is reading.
    pub fn drain_events(&self) -> usize {
        let Ok(mut rx) = self.event_rx.try_lock() else {
            return 0;
        };
        let mut drained = 0;
        while rx.try_recv().is_ok() {
            drained += 1;
        }
        drained
    }

    /// Close the session and wait for the background task to finish.
    pub async fn disconnect(&self) {
        let _ = self.cmd_tx.send(Command::Disconnect).await;
        let handle = self.task_handle.lock().await.take();
        if let Some(handle) = handle {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }
        self.ready_state
            .store(ReadyState::Closed as u16, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.ready_state() == ReadyState::Open
    }

    pub fn ready_state(&self) -> ReadyState {
        ReadyState::from(self.ready_state.load(Ordering::SeqCst))
    }

    /// Engine.IO session id.
    pub fn sid(&self) -> &str {
        &self.sid
    }
}

impl Drop for WsSession {
    fn drop(&mut self) {
        if let Some(handle) = self.task_handle.get_mut().take() {
            handle.abort();
        }
    }
}

// ─── Handshake ───────────────────────────────────────────────────────────────

async fn handshake(url: &str, api_key: &str) -> Result<(Sink, Stream, OpenHandshake), WsError> {
    let (ws_stream, _) = connect_async(url)
        .await
        .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;
    let (mut sink, mut stream) = ws_stream.split();

    let open = loop {
        match next_engine_packet(&mut stream).await? {
            EnginePacket::Open(open) => break open,
            EnginePacket::Close => {
                return Err(WsError::ConnectionFailed("Closed during handshake".into()))
            }
            _ => {}
        }
    };

    let connect = SocketPacket::Connect(Some(json!({ "apiKey": api_key })));
    send_frame(&mut sink, connect.to_frame()).await?;

    loop {
        match next_engine_packet(&mut stream).await? {
            EnginePacket::Ping(data) => {
                send_frame(&mut sink, EnginePacket::Pong(data).encode()).await?;
            }
            EnginePacket::Message(payload) => match SocketPacket::decode(&payload)? {
                SocketPacket::Connect(_) => return Ok((sink, stream, open)),
                SocketPacket::ConnectError(data) => {
                    return Err(WsError::ConnectionFailed(connect_error_message(&data)))
                }
                other => tracing::debug!("Ignoring packet before connect: {:?}", other),
            },
            EnginePacket::Close => {
                return Err(WsError::ConnectionFailed("Closed during handshake".into()))
            }
            _ => {}
        }
    }
}

async fn next_engine_packet(stream: &mut Stream) -> Result<EnginePacket, WsError> {
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                let text_str: &str = text.as_ref();
                return EnginePacket::decode(text_str);
            }
            Some(Ok(Message::Close(frame))) => {
                let (_, reason) = extract_close(frame.as_ref());
                return Err(WsError::Closed { reason });
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(WsError::ConnectionFailed(e.to_string())),
            None => {
                return Err(WsError::Closed {
                    reason: "Stream ended".into(),
                })
            }
        }
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

async fn run_task(mut state: TaskState, mut sink: Sink, mut stream: Stream) {
    let reason = run_connected(&mut state, &mut sink, &mut stream).await;
    state
        .ready_state
        .store(ReadyState::Closed as u16, Ordering::SeqCst);
    // Dropping the senders fails any ack still waiting.
    state.pending_acks.clear();
    tracing::info!("WebSocket disconnected: {}", reason);
    state.emit(InscriptionEvent::Disconnected { reason });
}

async fn run_connected(state: &mut TaskState, sink: &mut Sink, stream: &mut Stream) -> String {
    let liveness = tokio::time::sleep(state.liveness);
    tokio::pin!(liveness);

    loop {
        tokio::select! {
            // ── a) Incoming WS message ───────────────────────────────────
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let text_str: &str = text.as_ref();
                        match EnginePacket::decode(text_str) {
                            Ok(EnginePacket::Ping(data)) => {
                                liveness.as_mut().reset(tokio::time::Instant::now() + state.liveness);
                                if let Err(e) = send_frame(sink, EnginePacket::Pong(data).encode()).await {
                                    tracing::warn!("Failed to send pong: {}", e);
                                }
                            }
                            Ok(EnginePacket::Message(payload)) => {
                                if let Some(reason) = handle_socket_packet(state, &payload) {
                                    return reason;
                                }
                            }
                            Ok(EnginePacket::Close) => return "Server closed the session".into(),
                            Ok(_) => {}
                            Err(e) => tracing::warn!("WS protocol error: {} (raw: {})", e, text_str),
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (_, reason) = extract_close(frame.as_ref());
                        return reason;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        let reason = e.to_string();
                        tracing::error!("WebSocket error: {}", reason);
                        return reason;
                    }
                    None => return "Stream ended".into(),
                }
            }

            // ── b) Command from public API ───────────────────────────────
            cmd = state.cmd_rx.recv() => {
                match cmd {
                    Some(Command::Emit { packet, ack }) => {
                        if let Some((id, tx)) = ack {
                            state.pending_acks.insert(id, tx);
                        }
                        if let Err(e) = send_frame(sink, packet.to_frame()).await {
                            tracing::warn!("Send failed: {}", e);
                        }
                    }
                    Some(Command::Disconnect) | None => {
                        let _ = send_frame(sink, SocketPacket::Disconnect.to_frame()).await;
                        let _ = sink.send(Message::Close(Some(CloseFrame {
                            code: CloseCode::Normal,
                            reason: "Client disconnect".into(),
                        }))).await;
                        return "Client disconnect".into();
                    }
                }
            }

            // ── c) Server stopped pinging ────────────────────────────────
            () = &mut liveness => {
                tracing::warn!("No ping from server within {}ms", state.liveness.as_millis());
                let _ = sink.close().await;
                return "Ping timeout".into();
            }
        }
    }
}

/// Route one Socket.IO packet. Returns a reason when the session should end.
fn handle_socket_packet(state: &mut TaskState, payload: &str) -> Option<String> {
    match SocketPacket::decode(payload) {
        Ok(SocketPacket::Event { name, args, .. }) => {
            state.emit(InscriptionEvent::from_socket_event(name, args));
            None
        }
        Ok(SocketPacket::Ack { id, args }) => {
            match state.pending_acks.remove(&id) {
                Some(tx) => {
                    let _ = tx.send(args);
                }
                None => tracing::debug!("Ack {} has no waiter", id),
            }
            None
        }
        Ok(SocketPacket::Disconnect) => Some("Server disconnected the namespace".into()),
        Ok(SocketPacket::ConnectError(data)) => Some(connect_error_message(&data)),
        Ok(SocketPacket::Connect(_)) => None,
        Err(e) => {
            tracing::warn!("Socket.IO decode error: {}", e);
            None
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn send_frame(sink: &mut Sink, frame: String) -> Result<(), WsError> {
    sink.send(Message::Text(frame.into()))
        .await
        .map_err(|e| WsError::SendFailed(e.to_string()))
}

fn extract_close(frame: Option<&CloseFrame>) -> (u16, String) {
    match frame {
        Some(f) => (f.code.into(), f.reason.to_string()),
        None => (1006, "No close frame".into()),
    }
}
