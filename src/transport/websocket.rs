//! WebSocket submission strategy and event-driven completion.
//!
//! One Socket.IO session per client, opened lazily and reused. Server events
//! are not tagged per job, so only one inscription may use the session at a
//! time; [`WsSubmission::begin`] hands out that turn.

use std::sync::Arc;
use std::time::Duration;

use async_lock::{Mutex, MutexGuard};
use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::domain::job::{InscriptionResult, PendingTransaction, ProgressCallback, ProgressStage};
use crate::domain::request::{validate_request, InscriptionRequest};
use crate::error::{SdkError, WsError};
use crate::logging::Logger;
use crate::network::Network;
use crate::tracker::ProgressReporter;
use crate::transport::selector::EndpointCache;
use crate::transport::{SubmissionChannel, TransportKind};
use crate::ws::{InscriptionEvent, ProgressPayload, StartAck, WsSession, START_INSCRIPTION_EVENT};

#[derive(Debug, Clone)]
pub struct WsSubmissionConfig {
    pub api_key: String,
    pub network: Network,
    pub connect_timeout: Duration,
    /// Upper bound on waiting for the `start-inscription` ack.
    pub ack_timeout: Duration,
}

pub struct WsSubmission {
    config: WsSubmissionConfig,
    endpoint: Arc<EndpointCache>,
    session: Mutex<Option<Arc<WsSession>>>,
    turn: Mutex<()>,
    logger: Arc<dyn Logger>,
}

impl std::fmt::Debug for WsSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsSubmission")
            .field("network", &self.config.network)
            .field("connect_timeout", &self.config.connect_timeout)
            .finish_non_exhaustive()
    }
}

impl WsSubmission {
    pub fn new(config: WsSubmissionConfig, endpoint: Arc<EndpointCache>, logger: Arc<dyn Logger>) -> Self {
        Self {
            config,
            endpoint,
            session: Mutex::new(None),
            turn: Mutex::new(()),
            logger,
        }
    }

    /// Wait for exclusive use of the session. Hold the guard from submission
    /// until completion has been observed.
    pub async fn begin(&self) -> MutexGuard<'_, ()> {
        self.turn.lock().await
    }

    /// The open session, connecting first if there is none.
    pub async fn session(&self) -> Result<Arc<WsSession>, SdkError> {
        let mut slot = self.session.lock().await;
        if let Some(session) = slot.as_ref().filter(|s| s.is_connected()) {
            return Ok(Arc::clone(session));
        }

        let endpoint = self
            .endpoint
            .get()
            .await
            .ok_or_else(|| SdkError::Submission("No WebSocket servers available".into()))?;
        let session = WsSession::connect(&endpoint, &self.config.api_key, self.config.connect_timeout)
            .await
            .map_err(|e| {
                self.logger
                    .error(&format!("WebSocket connection to {} failed: {}", endpoint, e));
                SdkError::Ws(e)
            })?;
        let session = Arc::new(session);
        *slot = Some(Arc::clone(&session));
        Ok(session)
    }

    pub async fn is_connected(&self) -> bool {
        self.session
            .lock()
            .await
            .as_ref()
            .is_some_and(|s| s.is_connected())
    }

    /// Tear down the session, if any. A listener waiting on it sees the
    /// session end.
    pub async fn disconnect(&self) {
        let session = self.session.lock().await.take();
        if let Some(session) = session {
            session.disconnect().await;
            self.logger.info("WebSocket disconnected");
        }
    }

    async fn submit_on(
        &self,
        session: &WsSession,
        request: &InscriptionRequest,
    ) -> Result<PendingTransaction, SdkError> {
        validate_request(request)?;

        let mut payload = match serde_json::to_value(request)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let network = request.network.unwrap_or(self.config.network);
        payload.insert("network".into(), json!(network.as_str()));

        let args = session
            .emit_with_ack(
                START_INSCRIPTION_EVENT,
                vec![Value::Object(payload)],
                self.config.ack_timeout,
            )
            .await
            .map_err(|e| match e {
                WsError::Timeout => {
                    SdkError::Submission("No acknowledgment from WebSocket server".into())
                }
                other => SdkError::Ws(other),
            })?;

        let pending = pending_from_ack(args)?;
        self.logger.info(&format!(
            "WebSocket inscription accepted, job {}",
            pending.job_id
        ));
        Ok(pending)
    }

    /// Listen on the open session until the job completes, fails, or
    /// `timeout` passes.
    ///
    /// A timeout is not an error: the result comes back with status
    /// `"timeout"` and `completed: false`, carrying the last topic id seen.
    pub async fn await_completion(
        &self,
        job_id: &str,
        transaction_id: &str,
        timeout: Duration,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<InscriptionResult, SdkError> {
        let session = self
            .session
            .lock()
            .await
            .clone()
            .ok_or(SdkError::Ws(WsError::NotConnected))?;

        let mut reporter = ProgressReporter::new(on_progress);
        let mut topic_id: Option<String> = None;
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let event = match tokio::time::timeout_at(deadline, session.next_event()).await {
                Ok(Some(event)) => event,
                Ok(None) => {
                    return Err(SdkError::Ws(WsError::Closed {
                        reason: "Session ended".into(),
                    }))
                }
                Err(_) => {
                    self.logger.error(&format!(
                        "WebSocket inscription timeout after {} seconds (job {}, last topic {:?})",
                        timeout.as_secs(),
                        job_id,
                        topic_id
                    ));
                    return Ok(finished(job_id, transaction_id, topic_id, "timeout", false));
                }
            };

            match event {
                InscriptionEvent::Progress(progress) => {
                    if let Some(topic) = progress.topic.topic_id() {
                        topic_id = Some(topic.to_string());
                    }
                    self.logger.debug(&format!(
                        "Progress event: status={:?} progress={:?} topic={:?}",
                        progress.status, progress.progress, topic_id
                    ));

                    let stage = if progress.status.as_deref() == Some("completed") {
                        ProgressStage::Completed
                    } else {
                        ProgressStage::Confirming
                    };
                    reporter.report(
                        stage,
                        format!(
                            "Processing inscription: {}",
                            progress.status.as_deref().unwrap_or("pending")
                        ),
                        progress.progress.unwrap_or(0.0),
                        progress_details(&progress),
                    );

                    if progress.is_completed() {
                        self.logger.info(&format!(
                            "Inscription {} completed via progress event",
                            job_id
                        ));
                        return Ok(finished(job_id, transaction_id, topic_id, "completed", true));
                    }
                }
                InscriptionEvent::Complete(complete) => {
                    let topic = complete
                        .topic
                        .topic_id()
                        .map(str::to_string)
                        .or(topic_id);
                    return Ok(finished(job_id, transaction_id, topic, "completed", true));
                }
                InscriptionEvent::Error(error) => {
                    let message = error
                        .error
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| "Inscription failed".to_string());
                    self.logger
                        .error(&format!("Inscription {} failed: {}", job_id, message));
                    return Err(SdkError::RemoteJob(message));
                }
                InscriptionEvent::Disconnected { reason } => {
                    return Err(SdkError::Ws(WsError::Closed { reason }));
                }
                InscriptionEvent::Other { name, .. } => {
                    self.logger.debug(&format!("Ignoring event {}", name));
                }
            }
        }
    }
}

#[async_trait]
impl SubmissionChannel for WsSubmission {
    fn kind(&self) -> TransportKind {
        TransportKind::WebSocket
    }

    async fn submit(&self, request: &InscriptionRequest) -> Result<PendingTransaction, SdkError> {
        let session = self.session().await?;
        let stale = session.drain_events();
        if stale > 0 {
            self.logger
                .debug(&format!("Discarded {} stale WebSocket event(s)", stale));
        }
        self.submit_on(&session, request).await
    }
}

/// Interpret the `start-inscription` ack arguments.
pub(crate) fn pending_from_ack(args: Vec<Value>) -> Result<PendingTransaction, SdkError> {
    let first = args
        .into_iter()
        .next()
        .ok_or_else(|| SdkError::Submission("Empty acknowledgment from WebSocket server".into()))?;
    let ack: StartAck = serde_json::from_value(first)
        .map_err(|e| SdkError::Submission(format!("Malformed acknowledgment: {}", e)))?;

    if !ack.success {
        return Err(SdkError::Submission(
            ack.error
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Inscription failed".to_string()),
        ));
    }
    let transaction_bytes = ack
        .transaction_bytes
        .clone()
        .filter(|b| !b.is_empty())
        .ok_or_else(|| {
            SdkError::Submission("No transaction bytes returned from WebSocket inscription".into())
        })?;
    let job_id = ack
        .job_id()
        .map(str::to_string)
        .ok_or_else(|| SdkError::Submission("No job ID returned from WebSocket inscription".into()))?;

    Ok(PendingTransaction {
        job_id,
        transaction_bytes,
    })
}

fn finished(
    job_id: &str,
    transaction_id: &str,
    topic_id: Option<String>,
    status: &str,
    completed: bool,
) -> InscriptionResult {
    InscriptionResult {
        job_id: job_id.to_string(),
        transaction_id: transaction_id.to_string(),
        topic_id,
        status: Some(status.to_string()),
        completed: Some(completed),
    }
}

fn progress_details(progress: &ProgressPayload) -> Map<String, Value> {
    let mut details = progress.extra.clone();
    if let Some(job_id) = &progress.job_id {
        details.insert("jobId".into(), json!(job_id));
    }
    if let Some(status) = &progress.status {
        details.insert("status".into(), json!(status));
    }
    if let Some(percent) = progress.progress {
        details.insert("progress".into(), json!(percent));
    }
    if let Some(topic) = progress.topic.topic_id() {
        details.insert("topicId".into(), json!(topic));
    }
    details
}
