//! Native auth — challenge signing with a local Ed25519 key.
//!
//! Only available with the `native-auth` feature.

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};

use crate::auth::{ChallengeEncoding, MessageSigner};
use crate::error::AuthError;
use crate::ledger::keys::{parse_private_key, KeyType, KeyTypeSource};

/// Signs the raw challenge bytes with an Ed25519 private key.
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("public_key", &hex::encode(self.public_key()))
            .finish()
    }
}

impl Ed25519Signer {
    /// Accepts a DER-encoded Ed25519 key or a raw 32-byte hex key. DER keys
    /// of any other algorithm are rejected.
    pub fn from_private_key(hex_key: &str) -> Result<Self, AuthError> {
        let parsed = parse_private_key(hex_key)?;
        if parsed.source == KeyTypeSource::DerPrefix && parsed.key_type != KeyType::Ed25519 {
            return Err(AuthError::InvalidKey(format!(
                "expected an ED25519 key, got {}",
                parsed.key_type
            )));
        }
        Ok(Self {
            signing_key: SigningKey::from_bytes(parsed.raw_bytes()),
        })
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }
}

#[async_trait]
impl MessageSigner for Ed25519Signer {
    fn encoding(&self) -> ChallengeEncoding {
        ChallengeEncoding::Raw
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, AuthError> {
        Ok(self.signing_key.sign(message).to_bytes().to_vec())
    }
}
