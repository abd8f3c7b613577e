//! Engine.IO v4 / Socket.IO v5 text packet codec.
//!
//! Only the default namespace and text frames are supported. A Socket.IO
//! packet travels inside an Engine.IO `message` packet, so the string on the
//! wire for an event is `42["name",{...}]`.

use serde::Deserialize;
use serde_json::Value;

use crate::error::WsError;

/// Path the Socket.IO server listens on.
pub const SOCKET_IO_PATH: &str = "/socket.io/";

/// Build the WebSocket URL for a Socket.IO endpoint.
///
/// `http(s)` schemes are mapped to `ws(s)`; a bare host path gets the
/// default Socket.IO path appended.
pub fn socket_io_url(base: &str) -> Result<String, WsError> {
    let trimmed = base.trim().trim_end_matches('/');
    let rest = if let Some(rest) = trimmed.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if trimmed.starts_with("wss://") || trimmed.starts_with("ws://") {
        trimmed.to_string()
    } else {
        return Err(WsError::ConnectionFailed(format!(
            "Unsupported WebSocket URL: {base}"
        )));
    };

    let with_path = if rest.contains("/socket.io") {
        format!("{}/", rest.trim_end_matches('/'))
    } else {
        format!("{rest}{SOCKET_IO_PATH}")
    };
    Ok(format!("{with_path}?EIO=4&transport=websocket"))
}

// ─── Engine.IO ───────────────────────────────────────────────────────────────

/// Payload of the Engine.IO `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHandshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(OpenHandshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn encode(&self) -> String {
        match self {
            EnginePacket::Open(_) => "0".to_string(),
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping(data) => format!("2{data}"),
            EnginePacket::Pong(data) => format!("3{data}"),
            EnginePacket::Message(data) => format!("4{data}"),
            EnginePacket::Upgrade => "5".to_string(),
            EnginePacket::Noop => "6".to_string(),
        }
    }

    pub fn decode(text: &str) -> Result<Self, WsError> {
        let mut chars = text.chars();
        let kind = chars
            .next()
            .ok_or_else(|| WsError::ProtocolError("Empty Engine.IO packet".into()))?;
        let rest = chars.as_str();
        match kind {
            '0' => serde_json::from_str(rest)
                .map(EnginePacket::Open)
                .map_err(|e| WsError::ProtocolError(format!("Invalid open packet: {e}"))),
            '1' => Ok(EnginePacket::Close),
            '2' => Ok(EnginePacket::Ping(rest.to_string())),
            '3' => Ok(EnginePacket::Pong(rest.to_string())),
            '4' => Ok(EnginePacket::Message(rest.to_string())),
            '5' => Ok(EnginePacket::Upgrade),
            '6' => Ok(EnginePacket::Noop),
            other => Err(WsError::ProtocolError(format!(
                "Unknown Engine.IO packet type: {other}"
            ))),
        }
    }
}

// ─── Socket.IO ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect(Option<Value>),
    Disconnect,
    Event {
        id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        id: u64,
        args: Vec<Value>,
    },
    ConnectError(Value),
}

impl SocketPacket {
    pub fn event(name: &str, args: Vec<Value>, id: Option<u64>) -> Self {
        SocketPacket::Event {
            id,
            name: name.to_string(),
            args,
        }
    }

    /// Socket.IO encoding, without the Engine.IO `4` prefix.
    pub fn encode(&self) -> String {
        match self {
            SocketPacket::Connect(None) => "0".to_string(),
            SocketPacket::Connect(Some(auth)) => format!("0{auth}"),
            SocketPacket::Disconnect => "1".to_string(),
            SocketPacket::Event { id, name, args } => {
                let mut array = Vec::with_capacity(args.len() + 1);
                array.push(Value::String(name.clone()));
                array.extend(args.iter().cloned());
                let id = id.map(|i| i.to_string()).unwrap_or_default();
                format!("2{id}{}", Value::Array(array))
            }
            SocketPacket::Ack { id, args } => format!("3{id}{}", Value::Array(args.clone())),
            SocketPacket::ConnectError(data) => format!("4{data}"),
        }
    }

    /// Wrap in an Engine.IO message packet, ready for the wire.
    pub fn to_frame(&self) -> String {
        EnginePacket::Message(self.encode()).encode()
    }

    pub fn decode(text: &str) -> Result<Self, WsError> {
        let mut chars = text.chars();
        let kind = chars
            .next()
            .ok_or_else(|| WsError::ProtocolError("Empty Socket.IO packet".into()))?;
        let mut rest = chars.as_str();

        // Skip a non-default namespace prefix ("/admin,").
        if rest.starts_with('/') {
            rest = match rest.find(',') {
                Some(idx) => &rest[idx + 1..],
                None => "",
            };
        }

        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        let (id_text, body) = rest.split_at(digits);
        let id = if id_text.is_empty() {
            None
        } else {
            Some(
                id_text
                    .parse::<u64>()
                    .map_err(|e| WsError::ProtocolError(format!("Invalid ack id: {e}")))?,
            )
        };

        let json = |body: &str| -> Result<Option<Value>, WsError> {
            if body.is_empty() {
                return Ok(None);
            }
            serde_json::from_str(body)
                .map(Some)
                .map_err(|e| WsError::ProtocolError(format!("Invalid Socket.IO payload: {e}")))
        };

        match kind {
            '0' => Ok(SocketPacket::Connect(json(body)?)),
            '1' => Ok(SocketPacket::Disconnect),
            '2' => {
                let mut items = match json(body)? {
                    Some(Value::Array(items)) => items,
                    _ => {
                        return Err(WsError::ProtocolError(
                            "Event payload must be an array".into(),
                        ))
                    }
                };
                if items.is_empty() {
                    return Err(WsError::ProtocolError("Event without a name".into()));
                }
                let name = match items.remove(0) {
                    Value::String(name) => name,
                    _ => return Err(WsError::ProtocolError("Event name must be a string".into())),
                };
                Ok(SocketPacket::Event {
                    id,
                    name,
                    args: items,
                })
            }
            '3' => {
                let id = id.ok_or_else(|| WsError::ProtocolError("Ack without an id".into()))?;
                let args = match json(body)? {
                    Some(Value::Array(items)) => items,
                    Some(other) => vec![other],
                    None => Vec::new(),
                };
                Ok(SocketPacket::Ack { id, args })
            }
            '4' => Ok(SocketPacket::ConnectError(json(body)?.unwrap_or(Value::Null))),
            '5' | '6' => Err(WsError::ProtocolError(
                "Binary Socket.IO packets are not supported".into(),
            )),
            other => Err(WsError::ProtocolError(format!(
                "Unknown Socket.IO packet type: {other}"
            ))),
        }
    }
}

/// Human-readable reason from a `CONNECT_ERROR` payload.
pub fn connect_error_message(data: &Value) -> String {
    data.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| data.to_string())
}
