//! High-level client — `InscriptionClient` and its builder.
//!
//! The client owns one of each orchestration component and wires them
//! together per call: the selector picks a transport, the matching
//! [`SubmissionChannel`] yields signable bytes, the executor settles them, and
//! completion is either polled ([`CompletionTracker`]) or listened for on the
//! WebSocket session.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthConfig, Authenticator, MessageSigner};
use crate::domain::job::wire::{HolderInscriptionsResponse, InscriptionNumberDetails, InscriptionNumbersParams};
use crate::domain::job::{
    InscriptionJob, InscriptionResult, JobSnapshot, PendingTransaction, ProgressCallback,
    ProgressEvent, ProgressStage,
};
use crate::domain::request::{validate_request, InscriptionRequest};
use crate::error::{SdkError, ValidationError};
use crate::http::retry::{with_retry, Backoff};
use crate::http::InscriptionHttp;
use crate::ledger::{LedgerClient, LedgerCredentials, TransactionExecutor, WalletSigner};
use crate::logging::{default_logger, Logger};
use crate::network::{Network, DEFAULT_API_URL};
use crate::tracker::{CompletionTracker, TrackOptions};
use crate::transport::websocket::WsSubmissionConfig;
use crate::transport::{
    ConnectionMode, ConnectivityProbe, EndpointCache, HttpSubmission, SocketIoProbe,
    SubmissionChannel, TransportKind, TransportSelector, WsSubmission,
};

// ═════════════════════════════════════════════════════════════════════════════
// Configuration
// ═════════════════════════════════════════════════════════════════════════════

pub const ENV_API_KEY: &str = "INSCRIPTION_API_KEY";
pub const ENV_NETWORK: &str = "INSCRIPTION_NETWORK";
pub const ENV_API_URL: &str = "INSCRIPTION_API_URL";
pub const ENV_WS_URL: &str = "INSCRIPTION_WS_URL";
pub const ENV_CONNECTION_MODE: &str = "INSCRIPTION_CONNECTION_MODE";

/// Plain client settings. Collaborators (logger, ledger client) are set on
/// the builder.
#[derive(Clone, PartialEq, Eq)]
pub struct InscriptionConfig {
    pub api_key: String,
    pub network: Network,
    pub base_url: String,
    /// Fetched from `/inscriptions/websocket-servers` when unset.
    pub ws_base_url: Option<String>,
    pub connection_mode: ConnectionMode,
    pub http_timeout: Duration,
    pub probe_timeout: Duration,
    pub ws_connect_timeout: Duration,
    pub ws_completion_timeout: Duration,
    pub status_read_attempts: u32,
    pub status_read_base_delay: Duration,
}

impl std::fmt::Debug for InscriptionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InscriptionConfig")
            .field("network", &self.network)
            .field("base_url", &self.base_url)
            .field("ws_base_url", &self.ws_base_url)
            .field("connection_mode", &self.connection_mode)
            .finish_non_exhaustive()
    }
}

impl Default for InscriptionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            network: Network::default(),
            base_url: DEFAULT_API_URL.to_string(),
            ws_base_url: None,
            connection_mode: ConnectionMode::default(),
            http_timeout: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(3),
            ws_connect_timeout: Duration::from_secs(10),
            ws_completion_timeout: Duration::from_secs(60),
            status_read_attempts: 3,
            status_read_base_delay: Duration::from_secs(1),
        }
    }
}

impl InscriptionConfig {
    /// Read settings from `INSCRIPTION_*` environment variables. Unset
    /// variables keep their defaults; unparseable ones are rejected.
    pub fn from_env() -> Result<Self, SdkError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SdkError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(api_key) = var(ENV_API_KEY) {
            config.api_key = api_key;
        }
        if let Some(network) = var(ENV_NETWORK) {
            config.network = network.parse()?;
        }
        if let Some(url) = var(ENV_API_URL) {
            config.base_url = url;
        }
        config.ws_base_url = var(ENV_WS_URL);
        if let Some(mode) = var(ENV_CONNECTION_MODE) {
            config.connection_mode = mode.parse()?;
        }
        Ok(config)
    }
}

/// How long an execute-and-wait call waits for completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub wait_for_completion: bool,
    pub max_wait_time: Duration,
    pub check_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            wait_for_completion: true,
            max_wait_time: Duration::from_secs(120),
            check_interval: Duration::from_secs(2),
        }
    }
}

impl WaitOptions {
    pub fn no_wait() -> Self {
        Self {
            wait_for_completion: false,
            ..Self::default()
        }
    }

    /// Poll attempts fitting in `max_wait_time`, at least one.
    pub fn poll_attempts(&self) -> u32 {
        let interval = self.check_interval.as_millis().max(1);
        let attempts = self.max_wait_time.as_millis() / interval;
        u32::try_from(attempts).unwrap_or(u32::MAX).max(1)
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Client
// ═════════════════════════════════════════════════════════════════════════════

/// The primary entry point of the SDK.
pub struct InscriptionClient {
    config: InscriptionConfig,
    http: InscriptionHttp,
    http_submission: HttpSubmission,
    ws_submission: WsSubmission,
    selector: TransportSelector,
    executor: TransactionExecutor,
    tracker: CompletionTracker,
    backoff: Backoff,
    logger: Arc<dyn Logger>,
}

impl std::fmt::Debug for InscriptionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InscriptionClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl InscriptionClient {
    pub fn builder() -> InscriptionClientBuilder {
        InscriptionClientBuilder::default()
    }

    /// Authenticate with a signed challenge, then build a client around the
    /// issued API key. The builder's network is replaced by the one
    /// authenticated against.
    pub async fn create_with_auth(
        auth: AuthConfig,
        signer: Arc<dyn MessageSigner>,
        builder: InscriptionClientBuilder,
    ) -> Result<Self, SdkError> {
        let logger = builder.logger.clone().unwrap_or_else(default_logger);
        let network = auth.network;
        let result = Authenticator::new(auth, signer, logger)?.authenticate().await?;
        builder.api_key(&result.api_key).network(network).build()
    }

    pub fn config(&self) -> &InscriptionConfig {
        &self.config
    }

    pub fn connection_mode(&self) -> ConnectionMode {
        self.selector.mode()
    }

    /// Raw HTTP API.
    pub fn http(&self) -> &InscriptionHttp {
        &self.http
    }

    // ── Submission ───────────────────────────────────────────────────────

    /// Start an inscription over HTTP without executing it. The response
    /// carries the job id and the unsigned transaction.
    pub async fn start_inscription(&self, request: &InscriptionRequest) -> Result<JobSnapshot, SdkError> {
        self.http_submission.start(request).await
    }

    /// Submit, execute with a private key, and (by default) wait for
    /// completion.
    ///
    /// The transport follows the configured [`ConnectionMode`]. Over HTTP the
    /// job is polled until every topic its mode needs exists and the job
    /// reports completed. Over WebSocket the session's events decide, and a
    /// quiet session ends with status `"timeout"` instead of an error.
    pub async fn inscribe_and_execute(
        &self,
        request: &InscriptionRequest,
        credentials: &LedgerCredentials,
        on_progress: Option<ProgressCallback>,
        wait: WaitOptions,
    ) -> Result<InscriptionResult, SdkError> {
        if let Err(e) = validate_request(request) {
            self.logger.warn(&format!("Invalid inscription request: {}", e));
            return Err(e.into());
        }

        match self.selector.select().await {
            TransportKind::WebSocket => {
                let _turn = self.ws_submission.begin().await;
                let pending = self.ws_submission.submit(request).await?;
                let transaction_id = self.execute(&pending, credentials).await?;
                notify_executed(on_progress.as_ref(), &pending, &transaction_id);

                if !wait.wait_for_completion {
                    return Ok(InscriptionResult::submitted(pending.job_id, transaction_id));
                }
                self.ws_submission
                    .await_completion(
                        &pending.job_id,
                        &transaction_id,
                        self.config.ws_completion_timeout,
                        on_progress.as_ref(),
                    )
                    .await
            }
            TransportKind::Http => {
                let pending = self.http_submission.submit(request).await?;
                let transaction_id = self.execute(&pending, credentials).await?;
                notify_executed(on_progress.as_ref(), &pending, &transaction_id);

                if !wait.wait_for_completion {
                    return Ok(InscriptionResult::submitted(pending.job_id, transaction_id));
                }
                let options = TrackOptions {
                    max_attempts: wait.poll_attempts(),
                    interval: wait.check_interval,
                    require_completed_flag: true,
                };
                let job = self
                    .tracker
                    .track(&pending.job_id, options, on_progress.as_ref())
                    .await?;
                Ok(InscriptionResult {
                    job_id: pending.job_id,
                    transaction_id,
                    topic_id: job.topic_id().map(str::to_string),
                    status: job.status().map(str::to_string),
                    completed: Some(job.completed),
                })
            }
        }
    }

    /// Submit over HTTP and execute through a wallet. Does not wait for
    /// completion; follow up with [`wait_for_inscription`](Self::wait_for_inscription).
    pub async fn inscribe(
        &self,
        request: &InscriptionRequest,
        signer: &dyn WalletSigner,
    ) -> Result<InscriptionResult, SdkError> {
        let pending = self.http_submission.submit(request).await?;
        let transaction_id = self
            .executor
            .execute_with_signer(&pending.transaction_bytes, signer)
            .await?;
        self.logger.info(&format!(
            "Inscription {} executed by {} as {}",
            pending.job_id,
            signer.account_id(),
            transaction_id
        ));
        Ok(InscriptionResult::submitted(pending.job_id, transaction_id))
    }

    async fn execute(
        &self,
        pending: &PendingTransaction,
        credentials: &LedgerCredentials,
    ) -> Result<String, SdkError> {
        let transaction_id = self
            .executor
            .execute(&pending.transaction_bytes, credentials)
            .await?;
        self.logger.info(&format!(
            "Inscription {} executed as {}",
            pending.job_id, transaction_id
        ));
        Ok(transaction_id)
    }

    // ── Tracking ─────────────────────────────────────────────────────────

    /// Poll a job until it completes. See [`CompletionTracker::track`].
    pub async fn wait_for_inscription(
        &self,
        job_id: &str,
        options: TrackOptions,
        on_progress: Option<ProgressCallback>,
    ) -> Result<InscriptionJob, SdkError> {
        if job_id.trim().is_empty() {
            return Err(ValidationError::new("Transaction ID is required").into());
        }
        self.tracker.track(job_id, options, on_progress.as_ref()).await
    }

    /// Single status read, retried with the client's backoff.
    pub async fn retrieve_inscription(&self, job_id: &str) -> Result<InscriptionJob, SdkError> {
        if job_id.trim().is_empty() {
            return Err(ValidationError::new("Transaction ID is required").into());
        }
        let http = &self.http;
        let snapshot = with_retry(self.backoff, self.logger.as_ref(), move || {
            http.retrieve_inscription(job_id)
        })
        .await?;
        Ok(InscriptionJob::from_snapshot(snapshot))
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub async fn get_inscription_numbers(
        &self,
        params: &InscriptionNumbersParams,
    ) -> Result<Vec<InscriptionNumberDetails>, SdkError> {
        Ok(self.http.inscription_numbers(params).await?)
    }

    pub async fn get_holder_inscriptions(
        &self,
        holder_id: &str,
        include_collections: bool,
    ) -> Result<HolderInscriptionsResponse, SdkError> {
        if holder_id.trim().is_empty() {
            return Err(ValidationError::new("Holder ID is required").into());
        }
        Ok(self
            .http
            .holder_inscriptions(holder_id, include_collections)
            .await?)
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    pub async fn is_connected(&self) -> bool {
        self.ws_submission.is_connected().await
    }

    /// Close the WebSocket session, if one is open.
    pub async fn disconnect(&self) {
        self.ws_submission.disconnect().await;
    }
}

fn notify_executed(on_progress: Option<&ProgressCallback>, pending: &PendingTransaction, transaction_id: &str) {
    if let Some(callback) = on_progress {
        let mut details = serde_json::Map::new();
        details.insert("jobId".into(), pending.job_id.clone().into());
        details.insert("transactionId".into(), transaction_id.into());
        let event = ProgressEvent::new(
            ProgressStage::Confirming,
            "Transaction executed, inscribing to HCS...",
            5.0,
        )
        .with_details(details);
        callback(&event);
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct InscriptionClientBuilder {
    config: InscriptionConfig,
    logger: Option<Arc<dyn Logger>>,
    ledger: Option<Arc<dyn LedgerClient>>,
    mirror_url: Option<String>,
    probe: Option<Arc<dyn ConnectivityProbe>>,
}

impl InscriptionClientBuilder {
    /// Start from a prepared config, e.g. [`InscriptionConfig::from_env`].
    pub fn config(mut self, config: InscriptionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn api_key(mut self, api_key: &str) -> Self {
        self.config.api_key = api_key.to_string();
        self
    }

    pub fn network(mut self, network: Network) -> Self {
        self.config.network = network;
        self
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.config.base_url = url.to_string();
        self
    }

    pub fn ws_base_url(mut self, url: &str) -> Self {
        self.config.ws_base_url = Some(url.to_string());
        self
    }

    pub fn connection_mode(mut self, mode: ConnectionMode) -> Self {
        self.config.connection_mode = mode;
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.probe_timeout = timeout;
        self
    }

    pub fn ws_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.ws_connect_timeout = timeout;
        self
    }

    pub fn ws_completion_timeout(mut self, timeout: Duration) -> Self {
        self.config.ws_completion_timeout = timeout;
        self
    }

    /// Retry budget for each individual status read.
    pub fn status_read_backoff(mut self, attempts: u32, base_delay: Duration) -> Self {
        self.config.status_read_attempts = attempts;
        self.config.status_read_base_delay = base_delay;
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Ledger collaborator used by [`InscriptionClient::inscribe_and_execute`].
    pub fn ledger(mut self, ledger: Arc<dyn LedgerClient>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Mirror node used to resolve the type of raw private keys.
    pub fn mirror_url(mut self, url: &str) -> Self {
        self.mirror_url = Some(url.to_string());
        self
    }

    /// Replace the Socket.IO handshake probe used in `auto` mode.
    pub fn connectivity_probe(mut self, probe: Arc<dyn ConnectivityProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn build(self) -> Result<InscriptionClient, SdkError> {
        let config = self.config;
        if config.api_key.trim().is_empty() {
            return Err(ValidationError::new("API key is required").into());
        }
        let logger = self.logger.unwrap_or_else(default_logger);

        let http = InscriptionHttp::new(&config.base_url, &config.api_key, config.http_timeout)?;
        let endpoint = Arc::new(EndpointCache::new(
            http.clone(),
            config.ws_base_url.clone(),
            Arc::clone(&logger),
        ));
        let probe = self
            .probe
            .unwrap_or_else(|| Arc::new(SocketIoProbe::new(config.api_key.clone())));
        let backoff = Backoff::new(config.status_read_attempts, config.status_read_base_delay);

        let client = InscriptionClient {
            http_submission: HttpSubmission::new(http.clone(), config.network, Arc::clone(&logger)),
            ws_submission: WsSubmission::new(
                WsSubmissionConfig {
                    api_key: config.api_key.clone(),
                    network: config.network,
                    connect_timeout: config.ws_connect_timeout,
                    ack_timeout: config.ws_completion_timeout,
                },
                Arc::clone(&endpoint),
                Arc::clone(&logger),
            ),
            selector: TransportSelector::new(
                config.connection_mode,
                endpoint,
                probe,
                config.probe_timeout,
                Arc::clone(&logger),
            ),
            executor: TransactionExecutor::new(self.ledger, self.mirror_url, Arc::clone(&logger)),
            tracker: CompletionTracker::new(Arc::new(http.clone()), backoff, Arc::clone(&logger)),
            http,
            backoff,
            logger,
            config,
        };
        client.logger.info(&format!(
            "Inscription client ready (network {}, mode {})",
            client.config.network, client.config.connection_mode
        ));
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::testing::{FakeLedger, FakeWallet};
    use crate::ledger::TransactionReceipt;
    use crate::logging::testing::RecordingLogger;
    use crate::domain::request::{FileInput, InscriptionMode};
    use std::collections::HashMap;
    use std::sync::Mutex;

    const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";
    const ED25519_KEY: &str =
        "302e020100300506032b6570042204200101010101010101010101010101010101010101010101010101010101010101";

    fn client(url: &str, ledger: Arc<FakeLedger>) -> InscriptionClient {
        InscriptionClient::builder()
            .api_key("test-key")
            .network(Network::Testnet)
            .base_url(url)
            .connection_mode(ConnectionMode::Http)
            .status_read_backoff(1, Duration::from_millis(1))
            .logger(Arc::new(RecordingLogger::default()))
            .ledger(ledger)
            .build()
            .unwrap()
    }

    fn png_request() -> InscriptionRequest {
        InscriptionRequest::new(FileInput::inline(PNG_1X1, "dot.png"), "0.0.42", InscriptionMode::File)
    }

    fn credentials() -> LedgerCredentials {
        LedgerCredentials::new("0.0.42", ED25519_KEY, Network::Testnet)
    }

    #[test]
    fn test_build_requires_api_key() {
        let err = InscriptionClient::builder().build().unwrap_err();
        assert!(matches!(err, SdkError::Validation(ref v) if v.message() == "API key is required"));
    }

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_KEY, "k"),
            (ENV_NETWORK, "testnet"),
            (ENV_WS_URL, "wss://ws.example"),
            (ENV_CONNECTION_MODE, "auto"),
        ]
        .into_iter()
        .collect();
        let config = InscriptionConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(config.api_key, "k");
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.ws_base_url.as_deref(), Some("wss://ws.example"));
        assert_eq!(config.connection_mode, ConnectionMode::Auto);
    }

    #[test]
    fn test_config_from_lookup_rejects_bad_mode() {
        let err = InscriptionConfig::from_lookup(|name| {
            (name == ENV_CONNECTION_MODE).then(|| "carrier-pigeon".to_string())
        })
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_poll_attempts() {
        assert_eq!(WaitOptions::default().poll_attempts(), 60);
        let short = WaitOptions {
            max_wait_time: Duration::from_millis(500),
            ..WaitOptions::default()
        };
        assert_eq!(short.poll_attempts(), 1);
        let zero_interval = WaitOptions {
            check_interval: Duration::ZERO,
            ..WaitOptions::default()
        };
        assert!(zero_interval.poll_attempts() >= 1);
    }

    #[tokio::test]
    async fn test_invalid_request_fails_before_network() {
        let ledger = Arc::new(FakeLedger::succeeding("0.0.42@1.2"));
        let client = client("http://127.0.0.1:9", ledger.clone());
        let request = png_request().only_json_collection(true);

        let err = client
            .inscribe_and_execute(&request, &credentials(), None, WaitOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(ledger.call_count(), 0);
    }

    #[tokio::test]
    async fn test_inscribe_and_execute_without_wait() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/inscriptions/start-inscription")
            .with_status(200)
            .with_body(r#"{"tx_id":"job-1","transactionBytes":"AQID","status":"pending"}"#)
            .create_async()
            .await;
        let poll = server
            .mock("GET", mockito::Matcher::Regex("^/inscriptions/retrieve-inscription".into()))
            .expect(0)
            .create_async()
            .await;

        let ledger = Arc::new(FakeLedger::succeeding("0.0.42@1.2"));
        let client = client(&server.url(), ledger.clone());
        let events: Arc<Mutex<Vec<ProgressEvent>>> = Arc::default();
        let sink = Arc::clone(&events);
        let callback: ProgressCallback = Arc::new(move |e: &ProgressEvent| sink.lock().unwrap().push(e.clone()));

        let result = client
            .inscribe_and_execute(&png_request(), &credentials(), Some(callback), WaitOptions::no_wait())
            .await
            .unwrap();

        assert_eq!(result.job_id, "job-1");
        assert_eq!(result.transaction_id, "0.0.42@1.2");
        assert!(result.completed.is_none());
        assert_eq!(ledger.call_count(), 1);
        assert_eq!(ledger.calls.lock().unwrap()[0].3, vec![1, 2, 3]);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].stage, ProgressStage::Confirming);
        assert_eq!(events[0].progress_percent, 5.0);
        poll.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_receipt_is_execution_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/inscriptions/start-inscription")
            .with_status(200)
            .with_body(r#"{"tx_id":"job-1","transactionBytes":"AQID"}"#)
            .create_async()
            .await;

        let client = client(&server.url(), Arc::new(FakeLedger::with_status("INVALID_SIGNATURE")));
        let err = client
            .inscribe_and_execute(&png_request(), &credentials(), None, WaitOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Execution(ref m) if m.contains("INVALID_SIGNATURE")));
    }

    #[tokio::test]
    async fn test_inscribe_with_wallet() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/inscriptions/start-inscription")
            .with_status(200)
            .with_body(r#"{"tx_id":"job-7","transactionBytes":"AQID"}"#)
            .create_async()
            .await;

        let client = client(&server.url(), Arc::new(FakeLedger::succeeding("x")));
        let wallet = FakeWallet {
            result: Ok(TransactionReceipt {
                transaction_id: "0.0.777@5.6".into(),
                status: "SUCCESS".into(),
            }),
        };
        let result = client.inscribe(&png_request(), &wallet).await.unwrap();
        assert_eq!(result.job_id, "job-7");
        assert_eq!(result.transaction_id, "0.0.777@5.6");
    }

    #[tokio::test]
    async fn test_retrieve_inscription_normalizes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/inscriptions/retrieve-inscription")
            .match_query(mockito::Matcher::UrlEncoded("id".into(), "job-3".into()))
            .with_status(200)
            .with_body(r#"{"id":"job-3","status":"completed","completed":false,"topic_id":"0.0.9"}"#)
            .create_async()
            .await;

        let client = client(&server.url(), Arc::new(FakeLedger::succeeding("x")));
        let job = client.retrieve_inscription("job-3").await.unwrap();
        assert_eq!(job.job_id, "job-3");
        assert!(job.completed);
        assert_eq!(job.topic_id(), Some("0.0.9"));
    }

    #[tokio::test]
    async fn test_empty_ids_rejected() {
        let client = client("http://127.0.0.1:9", Arc::new(FakeLedger::succeeding("x")));
        assert!(client.retrieve_inscription(" ").await.unwrap_err().is_validation());
        assert!(client
            .get_holder_inscriptions("", false)
            .await
            .unwrap_err()
            .is_validation());
        assert!(client
            .wait_for_inscription("", TrackOptions::default(), None)
            .await
            .unwrap_err()
            .is_validation());
    }

    #[tokio::test]
    async fn test_create_with_auth_uses_issued_key() {
        use crate::auth::ChallengeEncoding;
        use crate::error::AuthError;
        use async_trait::async_trait;

        struct StaticSigner;

        #[async_trait]
        impl MessageSigner for StaticSigner {
            fn encoding(&self) -> ChallengeEncoding {
                ChallengeEncoding::Json
            }

            async fn sign(&self, _message: &[u8]) -> Result<Vec<u8>, AuthError> {
                Ok(vec![0xab])
            }
        }

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/auth/request-signature")
            .with_status(200)
            .with_body(r#"{"message":"m"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/api/auth/authenticate")
            .with_status(200)
            .with_body(r#"{"user":{"sessionToken":"s"},"apiKey":"issued"}"#)
            .create_async()
            .await;
        let holder = server
            .mock("GET", "/inscriptions/holder-inscriptions")
            .match_query(mockito::Matcher::UrlEncoded("holderId".into(), "0.0.5".into()))
            .match_header("x-api-key", "issued")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = InscriptionClient::create_with_auth(
            AuthConfig::new("0.0.5", Network::Testnet).base_url(&server.url()),
            Arc::new(StaticSigner),
            InscriptionClient::builder()
                .base_url(&server.url())
                .logger(Arc::new(RecordingLogger::default())),
        )
        .await
        .unwrap();

        assert_eq!(client.config().network, Network::Testnet);
        assert!(client.get_holder_inscriptions("0.0.5", false).await.unwrap().is_empty());
        holder.assert_async().await;
    }
}
