//! Turns signable transaction bytes into a settled transaction id.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::SdkError;
use crate::ledger::keys::parse_private_key;
use crate::ledger::{
    LedgerClient, LedgerCredentials, MirrorNode, Operator, ParsedPrivateKey, TransactionReceipt,
    WalletSigner,
};
use crate::logging::Logger;

pub struct TransactionExecutor {
    ledger: Option<Arc<dyn LedgerClient>>,
    /// Overrides the per-network public mirror node.
    mirror_url: Option<String>,
    logger: Arc<dyn Logger>,
}

impl std::fmt::Debug for TransactionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionExecutor")
            .field("has_ledger", &self.ledger.is_some())
            .field("mirror_url", &self.mirror_url)
            .finish_non_exhaustive()
    }
}

impl TransactionExecutor {
    pub fn new(
        ledger: Option<Arc<dyn LedgerClient>>,
        mirror_url: Option<String>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            ledger,
            mirror_url,
            logger,
        }
    }

    /// Sign `transaction_bytes` (base64) with the credentials' key, submit,
    /// and return the transaction id.
    ///
    /// Fails with [`SdkError::Execution`] unless the receipt status is
    /// `SUCCESS`.
    pub async fn execute(
        &self,
        transaction_bytes: &str,
        credentials: &LedgerCredentials,
    ) -> Result<String, SdkError> {
        let ledger = self
            .ledger
            .as_ref()
            .ok_or_else(|| SdkError::Execution("No ledger client configured".into()))?;
        let bytes = decode_transaction(transaction_bytes)?;
        let key = self.resolve_key(credentials).await?;

        let operator = Operator {
            account_id: &credentials.account_id,
            key: &key,
        };
        let receipt = ledger
            .sign_and_execute(credentials.network, operator, &bytes)
            .await
            .map_err(|e| SdkError::Execution(e.to_string()))?;

        self.settle(receipt)
    }

    /// Same contract as [`execute`](Self::execute), with signing and
    /// submission delegated to a wallet.
    pub async fn execute_with_signer(
        &self,
        transaction_bytes: &str,
        signer: &dyn WalletSigner,
    ) -> Result<String, SdkError> {
        let bytes = decode_transaction(transaction_bytes)?;
        let receipt = signer
            .execute_with_signer(&bytes)
            .await
            .map_err(|e| SdkError::Execution(e.to_string()))?;

        self.settle(receipt)
    }

    fn settle(&self, receipt: TransactionReceipt) -> Result<String, SdkError> {
        if !receipt.is_success() {
            self.logger
                .error(&format!("Transaction failed with status: {}", receipt.status));
            return Err(SdkError::Execution(format!(
                "Transaction failed with status: {}",
                receipt.status
            )));
        }
        self.logger
            .info(&format!("Transaction {} executed", receipt.transaction_id));
        Ok(receipt.transaction_id)
    }

    /// Parse the key; a raw key takes its type from the account's mirror
    /// node entry, else stays ECDSA.
    async fn resolve_key(&self, credentials: &LedgerCredentials) -> Result<ParsedPrivateKey, SdkError> {
        let key = parse_private_key(&credentials.private_key)
            .map_err(|e| SdkError::Execution(e.to_string()))?;
        if !key.is_ambiguous() {
            return Ok(key);
        }

        let mirror = match &self.mirror_url {
            Some(url) => MirrorNode::new(url),
            None => MirrorNode::for_network(credentials.network),
        };
        let looked_up = match mirror {
            Ok(mirror) => mirror.account_key_type(&credentials.account_id).await,
            Err(e) => Err(e),
        };

        match looked_up {
            Ok(Some(key_type)) => {
                self.logger.debug(&format!(
                    "Resolved key type {} for {} from mirror node",
                    key_type, credentials.account_id
                ));
                Ok(key.with_resolved_type(key_type))
            }
            Ok(None) => {
                self.logger
                    .warn("Key type detection warning: mirror node did not report a key type, assuming ECDSA");
                Ok(key)
            }
            Err(e) => {
                self.logger.warn(&format!(
                    "Key type detection warning: mirror node lookup failed ({}), assuming ECDSA",
                    e
                ));
                Ok(key)
            }
        }
    }
}

fn decode_transaction(transaction_bytes: &str) -> Result<Vec<u8>, SdkError> {
    BASE64
        .decode(transaction_bytes.trim())
        .map_err(|e| SdkError::Execution(format!("Invalid transaction bytes: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::keys::{KeyType, ED25519_DER_PREFIX};
    use crate::ledger::testing::{FakeLedger, FakeWallet};
    use crate::ledger::LedgerError;
    use crate::logging::testing::RecordingLogger;
    use crate::network::Network;

    const RAW: &str = "0202020202020202020202020202020202020202020202020202020202020202";

    fn executor(ledger: Arc<FakeLedger>, mirror_url: Option<String>) -> TransactionExecutor {
        TransactionExecutor::new(
            Some(ledger as Arc<dyn LedgerClient>),
            mirror_url,
            Arc::new(RecordingLogger::default()),
        )
    }

    #[tokio::test]
    async fn test_execute_returns_transaction_id() {
        let ledger = Arc::new(FakeLedger::succeeding("0.0.5@100.1"));
        let creds = LedgerCredentials::new("0.0.5", format!("{ED25519_DER_PREFIX}{RAW}"), Network::Testnet);

        let tx_id = executor(ledger.clone(), None)
            .execute("AQID", &creds)
            .await
            .unwrap();

        assert_eq!(tx_id, "0.0.5@100.1");
        let calls = ledger.calls.lock().unwrap();
        assert_eq!(calls[0].0, Network::Testnet);
        assert_eq!(calls[0].2, KeyType::Ed25519);
        assert_eq!(calls[0].3, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_non_success_status_is_execution_error() {
        let ledger = Arc::new(FakeLedger::with_status("INSUFFICIENT_PAYER_BALANCE"));
        let creds = LedgerCredentials::new("0.0.5", format!("{ED25519_DER_PREFIX}{RAW}"), Network::Testnet);

        let err = executor(ledger, None).execute("AQID", &creds).await.unwrap_err();
        assert!(err.is_terminal());
        assert_eq!(
            err.to_string(),
            "Failed to execute transaction: Transaction failed with status: INSUFFICIENT_PAYER_BALANCE"
        );
    }

    #[tokio::test]
    async fn test_raw_key_resolved_from_mirror_node() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/accounts/0.0.5")
            .with_status(200)
            .with_body(r#"{"key":{"_type":"ED25519","key":"00"}}"#)
            .create_async()
            .await;

        let ledger = Arc::new(FakeLedger::succeeding("0.0.5@1.1"));
        let creds = LedgerCredentials::new("0.0.5", RAW, Network::Testnet);
        executor(ledger.clone(), Some(server.url()))
            .execute("AQID", &creds)
            .await
            .unwrap();

        assert_eq!(ledger.calls.lock().unwrap()[0].2, KeyType::Ed25519);
    }

    #[tokio::test]
    async fn test_raw_key_defaults_to_ecdsa_when_lookup_fails() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/accounts/0.0.5")
            .with_status(500)
            .create_async()
            .await;

        let logger = Arc::new(RecordingLogger::default());
        let ledger = Arc::new(FakeLedger::succeeding("0.0.5@1.1"));
        let exec = TransactionExecutor::new(
            Some(ledger.clone() as Arc<dyn LedgerClient>),
            Some(server.url()),
            logger.clone(),
        );
        let creds = LedgerCredentials::new("0.0.5", RAW, Network::Testnet);
        exec.execute("AQID", &creds).await.unwrap();

        assert_eq!(ledger.calls.lock().unwrap()[0].2, KeyType::EcdsaSecp256k1);
        assert!(logger.contains(tracing::Level::WARN, "assuming ECDSA"));
    }

    #[tokio::test]
    async fn test_invalid_base64_is_execution_error() {
        let ledger = Arc::new(FakeLedger::succeeding("x"));
        let creds = LedgerCredentials::new("0.0.5", format!("{ED25519_DER_PREFIX}{RAW}"), Network::Testnet);
        let err = executor(ledger.clone(), None)
            .execute("not base64!", &creds)
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Execution(_)));
        assert_eq!(ledger.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_ledger_client() {
        let exec = TransactionExecutor::new(None, None, Arc::new(RecordingLogger::default()));
        let creds = LedgerCredentials::new("0.0.5", RAW, Network::Testnet);
        let err = exec.execute("AQID", &creds).await.unwrap_err();
        assert!(matches!(err, SdkError::Execution(ref m) if m == "No ledger client configured"));
    }

    #[tokio::test]
    async fn test_execute_with_signer() {
        let exec = TransactionExecutor::new(None, None, Arc::new(RecordingLogger::default()));

        let ok = FakeWallet {
            result: Ok(TransactionReceipt {
                transaction_id: "0.0.777@2.2".into(),
                status: "SUCCESS".into(),
            }),
        };
        assert_eq!(exec.execute_with_signer("AQID", &ok).await.unwrap(), "0.0.777@2.2");

        let rejected = FakeWallet {
            result: Err(LedgerError::new("User rejected")),
        };
        let err = exec.execute_with_signer("AQID", &rejected).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to execute transaction: User rejected");
    }
}
