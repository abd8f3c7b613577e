//! Transport layer — how an inscription request reaches the service.
//!
//! Two [`SubmissionChannel`] strategies turn a request into a
//! [`PendingTransaction`]: [`HttpSubmission`] posts it, [`WsSubmission`]
//! emits it over a Socket.IO session. [`TransportSelector`] decides which one
//! a call uses.

pub mod http;
pub mod selector;
pub mod websocket;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::job::PendingTransaction;
use crate::domain::request::InscriptionRequest;
use crate::error::{SdkError, ValidationError};

pub use http::HttpSubmission;
pub use selector::{ConnectivityProbe, EndpointCache, SocketIoProbe, TransportSelector};
pub use websocket::WsSubmission;

/// Caller-configured transport policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    Http,
    #[default]
    #[serde(rename = "websocket")]
    WebSocket,
    /// WebSocket when a quick probe succeeds, HTTP otherwise.
    Auto,
}

impl ConnectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::WebSocket => "websocket",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "websocket" | "ws" => Ok(Self::WebSocket),
            "auto" => Ok(Self::Auto),
            other => Err(ValidationError::new(format!(
                "Invalid connection mode: {}. Must be one of: http, websocket, auto",
                other
            ))),
        }
    }
}

/// Transport chosen for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    Http,
    WebSocket,
}

/// Turns a validated request into signable transaction bytes.
#[async_trait]
pub trait SubmissionChannel: Send + Sync {
    fn kind(&self) -> TransportKind;

    async fn submit(&self, request: &InscriptionRequest) -> Result<PendingTransaction, SdkError>;
}
