//! Unified SDK error types.

use thiserror::Error;

/// Top-level SDK error.
///
/// The orchestration variants (`Validation`, `Submission`, `Execution`,
/// `CompletionTimeout`, `RemoteJob`) let a caller tell bad input apart from
/// transport failures and from terminal inscription outcomes.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Failed to execute transaction: {0}")]
    Execution(String),

    #[error("Inscription {job_id} did not complete within {attempts} attempts")]
    CompletionTimeout { job_id: String, attempts: u32 },

    #[error("Inscription failed: {0}")]
    RemoteJob(String),

    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("WebSocket error: {0}")]
    Ws(#[from] WsError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl SdkError {
    /// Caller input violated a precondition.
    pub fn is_validation(&self) -> bool {
        matches!(self, SdkError::Validation(_))
    }

    /// A failure that may succeed if the same call is repeated later.
    pub fn is_transient(&self) -> bool {
        match self {
            SdkError::Http(e) => e.is_transient(),
            SdkError::Ws(WsError::ConnectionFailed(_))
            | SdkError::Ws(WsError::Timeout)
            | SdkError::Ws(WsError::Closed { .. }) => true,
            _ => false,
        }
    }

    /// The inscription itself reached a final, unsuccessful state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SdkError::Execution(_) | SdkError::CompletionTimeout { .. } | SdkError::RemoteJob(_)
        )
    }
}

/// Caller input rejected before anything is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Timeout")]
    Timeout,
}

impl HttpError {
    pub fn is_transient(&self) -> bool {
        match self {
            HttpError::Reqwest(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            HttpError::ServerError { status, .. } => matches!(status, 502..=504),
            HttpError::RateLimited { .. } | HttpError::Timeout => true,
            _ => false,
        }
    }
}

/// WebSocket errors.
#[derive(Error, Debug)]
pub enum WsError {
    #[error("Not connected")]
    NotConnected,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Timed out")]
    Timeout,

    #[error("Connection closed: {reason}")]
    Closed { reason: String },
}

/// Authentication errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Failed to get signature message")]
    MissingChallenge,

    #[error("Failed to sign message: {0}")]
    SigningFailed(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("HTTP request error: {0}")]
    Http(String),
}
