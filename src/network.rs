//! Network selection and service URL constants.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default inscription REST API base URL.
pub const DEFAULT_API_URL: &str = "https://v2-api.tier.bot/api";

/// Default base URL of the challenge-response auth service.
pub const DEFAULT_AUTH_URL: &str = "https://kiloscribe.com";

/// Public mirror node for mainnet.
pub const MAINNET_MIRROR_URL: &str = "https://mainnet-public.mirrornode.hedera.com";

/// Public mirror node for testnet.
pub const TESTNET_MIRROR_URL: &str = "https://testnet.mirrornode.hedera.com";

/// Ledger network an inscription is recorded on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }

    pub fn mirror_node_url(&self) -> &'static str {
        match self {
            Self::Mainnet => MAINNET_MIRROR_URL,
            Self::Testnet => TESTNET_MIRROR_URL,
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Network {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            other => Err(ValidationError::new(format!(
                "Invalid network: {}. Must be one of: mainnet, testnet",
                other
            ))),
        }
    }
}
