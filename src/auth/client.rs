//! Challenge-response authenticator.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::auth::{
    AuthConfig, AuthData, AuthResult, AuthenticateRequest, AuthenticateResponse, MessageSigner,
    SignatureChallenge,
};
use crate::error::AuthError;
use crate::logging::Logger;

pub struct Authenticator {
    config: AuthConfig,
    signer: Arc<dyn MessageSigner>,
    http: Client,
    logger: Arc<dyn Logger>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    pub fn new(
        config: AuthConfig,
        signer: Arc<dyn MessageSigner>,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AuthError::Http(e.to_string()))?;
        Ok(Self {
            config,
            signer,
            http,
            logger,
        })
    }

    /// Run the full challenge-response exchange and return the API key.
    pub async fn authenticate(&self) -> Result<AuthResult, AuthError> {
        let base = self.config.base_url.trim_end_matches('/');

        let challenge: SignatureChallenge = self
            .http
            .get(format!("{}/api/auth/request-signature", base))
            .header("x-session", &self.config.account_id)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::Http(e.to_string()))?
            .json()
            .await
            .map_err(|_| AuthError::MissingChallenge)?;
        let message = challenge
            .message
            .filter(|m| !m.is_empty())
            .ok_or(AuthError::MissingChallenge)?;

        let payload = self.signer.encoding().encode(&message)?;
        self.logger.debug("Signing authentication challenge");
        let signature = self.signer.sign(&payload).await.map_err(|e| {
            self.logger.error(&format!("Failed to sign message: {}", e));
            e
        })?;

        let body = AuthenticateRequest {
            auth_data: AuthData {
                id: &self.config.account_id,
                signature: hex::encode(signature),
                data: &message,
                network: self.config.network.as_str(),
            },
            include: "apiKey",
        };
        let response: AuthenticateResponse = self
            .http
            .post(format!("{}/api/auth/authenticate", base))
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Http(e.to_string()))?
            .json()
            .await
            .unwrap_or_default();

        let has_session = response
            .user
            .and_then(|u| u.session_token)
            .is_some_and(|t| !t.is_empty());
        if !has_session {
            return Err(AuthError::AuthenticationFailed);
        }
        let api_key = response
            .api_key
            .filter(|k| !k.is_empty())
            .ok_or(AuthError::AuthenticationFailed)?;

        self.logger.info(&format!(
            "Authenticated {} on {}",
            self.config.account_id, self.config.network
        ));
        Ok(AuthResult { api_key })
    }
}
