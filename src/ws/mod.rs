//! WebSocket layer — Socket.IO session, inscription events, ack payloads.
//!
//! The transport lives in `native.rs` (tokio-tungstenite with a background
//! task). This module defines the payload and event types shared with the
//! orchestration layer.

pub mod native;
pub mod protocol;

use serde::Deserialize;
use serde_json::{Map, Value};

pub use native::WsSession;

/// Event emitted to request an inscription over an open session.
pub const START_INSCRIPTION_EVENT: &str = "start-inscription";
pub const PROGRESS_EVENT: &str = "inscription-progress";
pub const COMPLETE_EVENT: &str = "inscription-complete";
pub const ERROR_EVENT: &str = "inscription-error";

// ─── Ack ─────────────────────────────────────────────────────────────────────

/// Acknowledgment payload of `start-inscription`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartAck {
    #[serde(default)]
    pub success: bool,
    #[serde(default, rename = "jobId")]
    pub job_id: Option<String>,
    #[serde(default)]
    pub tx_id: Option<String>,
    #[serde(default, rename = "transactionBytes")]
    pub transaction_bytes: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StartAck {
    /// `jobId`, falling back to `tx_id`.
    pub fn job_id(&self) -> Option<&str> {
        self.job_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.tx_id.as_deref().filter(|s| !s.is_empty()))
    }
}

// ─── Server events ───────────────────────────────────────────────────────────

/// Topic id as sent by the server, which uses both spellings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TopicFields {
    #[serde(default, rename = "topicId")]
    topic_id_camel: Option<String>,
    #[serde(default, rename = "topic_id")]
    topic_id_snake: Option<String>,
}

impl TopicFields {
    pub fn topic_id(&self) -> Option<&str> {
        self.topic_id_camel
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.topic_id_snake.as_deref().filter(|s| !s.is_empty()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProgressPayload {
    #[serde(default, rename = "jobId")]
    pub job_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(flatten)]
    pub topic: TopicFields,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProgressPayload {
    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some("completed") || self.progress == Some(100.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompletePayload {
    #[serde(flatten)]
    pub topic: TopicFields,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorPayload {
    pub error: Option<String>,
    pub extra: Map<String, Value>,
}

impl ErrorPayload {
    /// Accepts any payload shape; only a string `error` field is kept as the message.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut extra) => {
                let error = match extra.remove("error") {
                    Some(Value::String(message)) => Some(message),
                    Some(other) => {
                        extra.insert("error".into(), other);
                        None
                    }
                    None => None,
                };
                ErrorPayload { error, extra }
            }
            _ => ErrorPayload::default(),
        }
    }
}

/// Server-pushed events delivered by a [`WsSession`].
#[derive(Debug, Clone, PartialEq)]
pub enum InscriptionEvent {
    Progress(ProgressPayload),
    Complete(CompletePayload),
    Error(ErrorPayload),
    /// Any other named event.
    Other { name: String, args: Vec<Value> },
    /// The session ended.
    Disconnected { reason: String },
}

impl InscriptionEvent {
    /// Classify a Socket.IO event by name, parsing its first argument.
    pub fn from_socket_event(name: String, args: Vec<Value>) -> Self {
        let first = args.first().cloned().unwrap_or(Value::Object(Map::new()));
        let parsed = match name.as_str() {
            PROGRESS_EVENT => serde_json::from_value(first).map(InscriptionEvent::Progress),
            COMPLETE_EVENT => serde_json::from_value(first).map(InscriptionEvent::Complete),
            ERROR_EVENT => return InscriptionEvent::Error(ErrorPayload::from_value(first)),
            _ => return InscriptionEvent::Other { name, args },
        };
        match parsed {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Malformed {} payload: {}", name, e);
                InscriptionEvent::Other { name, args }
            }
        }
    }
}

// ─── Ready state ─────────────────────────────────────────────────────────────

/// Connection state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ReadyState {
    Connecting = 0,
    Open = 1,
    Closing = 2,
    Closed = 3,
}

impl From<u16> for ReadyState {
    fn from(value: u16) -> Self {
        match value {
            0 => ReadyState::Connecting,
            1 => ReadyState::Open,
            2 => ReadyState::Closing,
            _ => ReadyState::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ack_job_id_falls_back_to_tx_id() {
        let ack: StartAck =
            serde_json::from_value(json!({"success": true, "tx_id": "0.0.1@1.2", "transactionBytes": "AA=="}))
                .unwrap();
        assert_eq!(ack.job_id(), Some("0.0.1@1.2"));

        let ack: StartAck = serde_json::from_value(json!({"success": false, "error": "boom"})).unwrap();
        assert!(!ack.success);
        assert_eq!(ack.error.as_deref(), Some("boom"));
        assert!(ack.job_id().is_none());
    }

    #[test]
    fn test_error_event_is_terminal_for_any_payload() {
        let event = InscriptionEvent::from_socket_event(ERROR_EVENT.into(), vec![json!("boom")]);
        assert_eq!(event, InscriptionEvent::Error(ErrorPayload::default()));

        let event = InscriptionEvent::from_socket_event(
            ERROR_EVENT.into(),
            vec![json!({"error": {"code": 5}})],
        );
        match event {
            InscriptionEvent::Error(e) => {
                assert!(e.error.is_none());
                assert_eq!(e.extra["error"], json!({"code": 5}));
            }
            other => panic!("expected error, got {other:?}"),
        }

        let event = InscriptionEvent::from_socket_event(ERROR_EVENT.into(), vec![]);
        assert!(matches!(event, InscriptionEvent::Error(ref e) if e.error.is_none()));

        let event = InscriptionEvent::from_socket_event(
            ERROR_EVENT.into(),
            vec![json!({"error": "Topic creation failed", "jobId": "j"})],
        );
        match event {
            InscriptionEvent::Error(e) => {
                assert_eq!(e.error.as_deref(), Some("Topic creation failed"));
                assert_eq!(e.extra["jobId"], "j");
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn test_progress_event_accepts_both_topic_spellings() {
        let event = InscriptionEvent::from_socket_event(
            PROGRESS_EVENT.into(),
            vec![json!({"status": "processing", "progress": 40, "topic_id": "0.0.5"})],
        );
        match event {
            InscriptionEvent::Progress(p) => {
                assert_eq!(p.topic.topic_id(), Some("0.0.5"));
                assert_eq!(p.progress, Some(40.0));
                assert!(!p.is_completed());
            }
            other => panic!("expected progress, got {other:?}"),
        }

        let event = InscriptionEvent::from_socket_event(
            PROGRESS_EVENT.into(),
            vec![json!({"progress": 100, "topicId": "0.0.6"})],
        );
        match event {
            InscriptionEvent::Progress(p) => {
                assert_eq!(p.topic.topic_id(), Some("0.0.6"));
                assert!(p.is_completed());
            }
            other => panic!("expected progress, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_event_is_other() {
        let event = InscriptionEvent::from_socket_event("hello".into(), vec![json!(1)]);
        assert!(matches!(event, InscriptionEvent::Other { ref name, .. } if name == "hello"));
    }

    #[test]
    fn test_ready_state_from_u16() {
        assert_eq!(ReadyState::from(1), ReadyState::Open);
        assert_eq!(ReadyState::from(42), ReadyState::Closed);
    }
}
