//! Ledger collaborators — the seams through which signable transaction bytes
//! become settled transactions.
//!
//! The SDK never builds or signs ledger transactions itself. A
//! [`LedgerClient`] does it with a private key, a [`WalletSigner`] does it
//! through an external wallet. [`TransactionExecutor`] drives either one and
//! checks the receipt.

pub mod executor;
pub mod keys;
pub mod mirror;

use async_trait::async_trait;
use thiserror::Error;

use crate::network::Network;

pub use executor::TransactionExecutor;
pub use keys::{KeyType, ParsedPrivateKey};
pub use mirror::MirrorNode;

/// Receipt status the ledger reports for a settled transaction.
pub const SUCCESS_STATUS: &str = "SUCCESS";

/// Failure reported by a ledger collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct LedgerError(pub String);

impl LedgerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Outcome of executing a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_id: String,
    /// Ledger status code, e.g. `SUCCESS` or `INSUFFICIENT_PAYER_BALANCE`.
    pub status: String,
}

impl TransactionReceipt {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

/// Account and key used to pay for and sign an inscription transaction.
#[derive(Clone)]
pub struct LedgerCredentials {
    pub account_id: String,
    /// DER-encoded or raw 32-byte private key, hex.
    pub private_key: String,
    pub network: Network,
}

impl LedgerCredentials {
    pub fn new(account_id: impl Into<String>, private_key: impl Into<String>, network: Network) -> Self {
        Self {
            account_id: account_id.into(),
            private_key: private_key.into(),
            network,
        }
    }
}

impl std::fmt::Debug for LedgerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerCredentials")
            .field("account_id", &self.account_id)
            .field("private_key", &"<redacted>")
            .field("network", &self.network)
            .finish()
    }
}

/// Operator identity handed to a [`LedgerClient`].
#[derive(Debug, Clone)]
pub struct Operator<'a> {
    pub account_id: &'a str,
    pub key: &'a ParsedPrivateKey,
}

/// Private-key execution against a ledger network.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Decode `transaction_bytes`, sign with the operator key, submit to
    /// `network` and wait for the receipt.
    async fn sign_and_execute(
        &self,
        network: Network,
        operator: Operator<'_>,
        transaction_bytes: &[u8],
    ) -> Result<TransactionReceipt, LedgerError>;
}

/// Execution delegated to an external wallet.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Account the wallet signs for.
    fn account_id(&self) -> &str;

    async fn execute_with_signer(
        &self,
        transaction_bytes: &[u8],
    ) -> Result<TransactionReceipt, LedgerError>;
}
