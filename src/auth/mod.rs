//! Authentication: exchange a signed challenge for an API key.
//!
//! ## Flow
//!
//! 1. `GET {auth}/api/auth/request-signature` with `x-session: <accountId>`
//!    returns a challenge `message`.
//! 2. A [`MessageSigner`] signs it. Key-based signers sign the raw message
//!    bytes; wallet signers sign the JSON-encoded message.
//! 3. `POST {auth}/api/auth/authenticate` with the hex signature returns the
//!    API key, provided the response carries a user session token.
//!
//! The signing key never leaves the signer. With the `native-auth` feature,
//! [`native::Ed25519Signer`] signs with a local Ed25519 key.

pub mod client;

#[cfg(feature = "native-auth")]
pub mod native;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::network::{Network, DEFAULT_AUTH_URL};

pub use client::Authenticator;

/// How the challenge is turned into bytes before signing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChallengeEncoding {
    /// The message's UTF-8 bytes.
    #[default]
    Raw,
    /// The message as a JSON string literal (quoted), as wallets expect.
    Json,
}

impl ChallengeEncoding {
    pub fn encode(&self, message: &str) -> Result<Vec<u8>, AuthError> {
        match self {
            Self::Raw => Ok(message.as_bytes().to_vec()),
            Self::Json => serde_json::to_vec(message)
                .map_err(|e| AuthError::SigningFailed(e.to_string())),
        }
    }
}

/// Signs authentication challenges.
#[async_trait]
pub trait MessageSigner: Send + Sync {
    fn encoding(&self) -> ChallengeEncoding {
        ChallengeEncoding::Raw
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, AuthError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub account_id: String,
    pub network: Network,
    pub base_url: String,
}

impl AuthConfig {
    pub fn new(account_id: impl Into<String>, network: Network) -> Self {
        Self {
            account_id: account_id.into(),
            network,
            base_url: DEFAULT_AUTH_URL.to_string(),
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// Outcome of a successful authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthResult {
    pub api_key: String,
}

impl std::fmt::Debug for AuthResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResult").field("api_key", &"<redacted>").finish()
    }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SignatureChallenge {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthenticateRequest<'a> {
    pub auth_data: AuthData<'a>,
    pub include: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AuthData<'a> {
    pub id: &'a str,
    pub signature: String,
    pub data: &'a str,
    pub network: &'static str,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthenticateResponse {
    #[serde(default)]
    pub user: Option<AuthUser>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthUser {
    #[serde(default)]
    pub session_token: Option<String>,
}
