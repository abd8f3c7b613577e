//! Private key parsing and key-type detection.

use std::fmt;

use crate::error::AuthError;

/// PKCS#8 DER prefix of an Ed25519 private key (followed by 32 key bytes).
pub const ED25519_DER_PREFIX: &str = "302e020100300506032b657004220420";
/// DER prefix of a secp256k1 private key (followed by 32 key bytes).
pub const ECDSA_DER_PREFIX: &str = "3030020100300706052b8104000a04220420";

const RAW_KEY_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Ed25519,
    EcdsaSecp256k1,
}

impl KeyType {
    /// Name used by mirror nodes in `key._type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519 => "ED25519",
            Self::EcdsaSecp256k1 => "ECDSA_SECP256K1",
        }
    }

    pub fn from_mirror_type(value: &str) -> Option<Self> {
        match value {
            "ED25519" => Some(Self::Ed25519),
            "ECDSA_SECP256K1" => Some(Self::EcdsaSecp256k1),
            _ => None,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the key type of a [`ParsedPrivateKey`] was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTypeSource {
    DerPrefix,
    MirrorNode,
    /// Raw key with nothing to go on; ECDSA is assumed.
    Assumed,
}

/// A private key reduced to its raw 32 bytes plus its algorithm.
#[derive(Clone, PartialEq, Eq)]
pub struct ParsedPrivateKey {
    pub key_type: KeyType,
    pub source: KeyTypeSource,
    raw: [u8; RAW_KEY_LEN],
}

impl fmt::Debug for ParsedPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedPrivateKey")
            .field("key_type", &self.key_type)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl ParsedPrivateKey {
    pub fn raw_bytes(&self) -> &[u8; RAW_KEY_LEN] {
        &self.raw
    }

    /// Replace an assumed type with one learned elsewhere.
    pub fn with_resolved_type(mut self, key_type: KeyType) -> Self {
        self.key_type = key_type;
        self.source = KeyTypeSource::MirrorNode;
        self
    }

    pub fn is_ambiguous(&self) -> bool {
        self.source == KeyTypeSource::Assumed
    }
}

/// Parse a hex private key, DER-encoded or raw.
///
/// DER keys carry their algorithm. A raw 32-byte key does not, so it comes
/// back typed ECDSA with [`KeyTypeSource::Assumed`].
pub fn parse_private_key(input: &str) -> Result<ParsedPrivateKey, AuthError> {
    let trimmed = input.trim();
    let hex_str = trimmed.strip_prefix("0x").unwrap_or(trimmed).to_ascii_lowercase();
    if hex_str.is_empty() {
        return Err(AuthError::InvalidKey("private key is empty".into()));
    }

    let (key_type, source, body) = if let Some(body) = hex_str.strip_prefix(ED25519_DER_PREFIX) {
        (KeyType::Ed25519, KeyTypeSource::DerPrefix, body)
    } else if let Some(body) = hex_str.strip_prefix(ECDSA_DER_PREFIX) {
        (KeyType::EcdsaSecp256k1, KeyTypeSource::DerPrefix, body)
    } else {
        (KeyType::EcdsaSecp256k1, KeyTypeSource::Assumed, hex_str.as_str())
    };

    let bytes = hex::decode(body).map_err(|e| AuthError::InvalidKey(e.to_string()))?;
    let raw: [u8; RAW_KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
        AuthError::InvalidKey(format!(
            "expected {} key bytes, got {}",
            RAW_KEY_LEN,
            bytes.len()
        ))
    })?;

    Ok(ParsedPrivateKey {
        key_type,
        source,
        raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "0101010101010101010101010101010101010101010101010101010101010101";

    #[test]
    fn test_der_prefixes_decide_type() {
        let ed = parse_private_key(&format!("{ED25519_DER_PREFIX}{RAW}")).unwrap();
        assert_eq!(ed.key_type, KeyType::Ed25519);
        assert_eq!(ed.source, KeyTypeSource::DerPrefix);
        assert_eq!(ed.raw_bytes(), &[1u8; 32]);

        let ec = parse_private_key(&format!("0x{ECDSA_DER_PREFIX}{RAW}")).unwrap();
        assert_eq!(ec.key_type, KeyType::EcdsaSecp256k1);
        assert!(!ec.is_ambiguous());
    }

    #[test]
    fn test_raw_key_is_assumed_ecdsa() {
        let key = parse_private_key(RAW).unwrap();
        assert_eq!(key.key_type, KeyType::EcdsaSecp256k1);
        assert!(key.is_ambiguous());

        let resolved = key.with_resolved_type(KeyType::Ed25519);
        assert_eq!(resolved.key_type, KeyType::Ed25519);
        assert_eq!(resolved.source, KeyTypeSource::MirrorNode);
    }

    #[test]
    fn test_invalid_keys() {
        assert!(parse_private_key("").is_err());
        assert!(parse_private_key("zz").is_err());
        assert!(parse_private_key("abcd").is_err());
    }

    #[test]
    fn test_debug_hides_key_bytes() {
        let key = parse_private_key(RAW).unwrap();
        assert!(!format!("{key:?}").contains("01, 01"));
        assert!(!format!("{key:?}").contains(RAW));
    }

    #[test]
    fn test_mirror_type_names() {
        assert_eq!(KeyType::from_mirror_type("ED25519"), Some(KeyType::Ed25519));
        assert_eq!(
            KeyType::from_mirror_type("ECDSA_SECP256K1"),
            Some(KeyType::EcdsaSecp256k1)
        );
        assert_eq!(KeyType::from_mirror_type("ProtobufEncoded"), None);
    }
}
