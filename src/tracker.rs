//! Completion tracker — polls a job until its mode-specific completion
//! criteria hold or it has to give up.
//!
//! The tracker only needs a job id and a [`JobStatusSource`]; it does not
//! care which transport submitted the job.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::domain::job::{InscriptionJob, JobSnapshot, ProgressCallback, ProgressEvent, ProgressStage};
use crate::error::SdkError;
use crate::http::retry::{with_retry, Backoff};
use crate::http::InscriptionHttp;
use crate::logging::Logger;

/// Single-shot read of a job snapshot.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn fetch_job(&self, job_id: &str) -> Result<JobSnapshot, SdkError>;
}

#[async_trait]
impl JobStatusSource for InscriptionHttp {
    async fn fetch_job(&self, job_id: &str) -> Result<JobSnapshot, SdkError> {
        Ok(self.retrieve_inscription(job_id).await?)
    }
}

/// Polling bounds for one tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackOptions {
    pub max_attempts: u32,
    pub interval: Duration,
    /// Also require the job's own completed flag (normalized) before
    /// declaring success.
    pub require_completed_flag: bool,
}

impl Default for TrackOptions {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(4),
            require_completed_flag: false,
        }
    }
}

/// Delivers progress to the caller's callback, never letting the reported
/// percentage go down.
pub(crate) struct ProgressReporter<'a> {
    callback: Option<&'a ProgressCallback>,
    high_water: f64,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(callback: Option<&'a ProgressCallback>) -> Self {
        Self {
            callback,
            high_water: 0.0,
        }
    }

    pub(crate) fn report(
        &mut self,
        stage: ProgressStage,
        message: impl Into<String>,
        percent: f64,
        details: Map<String, Value>,
    ) {
        self.high_water = self.high_water.max(percent.clamp(0.0, 100.0));
        if let Some(callback) = self.callback {
            let event = ProgressEvent::new(stage, message, self.high_water).with_details(details);
            callback(&event);
        }
    }

    pub(crate) fn current(&self) -> f64 {
        self.high_water
    }
}

pub struct CompletionTracker {
    source: Arc<dyn JobStatusSource>,
    backoff: Backoff,
    logger: Arc<dyn Logger>,
}

impl std::fmt::Debug for CompletionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionTracker")
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl CompletionTracker {
    pub fn new(source: Arc<dyn JobStatusSource>, backoff: Backoff, logger: Arc<dyn Logger>) -> Self {
        Self {
            source,
            backoff,
            logger,
        }
    }

    /// Poll `job_id` until it completes.
    ///
    /// Each status read is retried with the tracker's [`Backoff`]. A job
    /// reporting an `error` fails immediately with [`SdkError::RemoteJob`];
    /// running out of attempts fails with [`SdkError::CompletionTimeout`].
    /// The returned job carries the normalized completed flag.
    pub async fn track(
        &self,
        job_id: &str,
        options: TrackOptions,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<InscriptionJob, SdkError> {
        let max_attempts = options.max_attempts.max(1);
        let mut reporter = ProgressReporter::new(on_progress);

        reporter.report(
            ProgressStage::Confirming,
            "Starting to monitor inscription progress",
            0.0,
            attempt_details(job_id, 0, max_attempts),
        );

        for attempt in 1..=max_attempts {
            reporter.report(
                ProgressStage::Confirming,
                format!("Checking inscription status (attempt {attempt}/{max_attempts})"),
                reporter.current(),
                attempt_details(job_id, attempt, max_attempts),
            );

            let source = &self.source;
            let snapshot = with_retry(self.backoff, self.logger.as_ref(), move || {
                source.fetch_job(job_id)
            })
            .await?;
            let job = InscriptionJob::from_snapshot(snapshot);

            if let Some(error) = job.error() {
                self.logger
                    .error(&format!("Inscription {job_id} failed: {error}"));
                reporter.report(
                    ProgressStage::Verifying,
                    format!("Inscription failed: {error}"),
                    100.0,
                    job_details(&job, job_id, attempt, max_attempts),
                );
                return Err(SdkError::RemoteJob(error.to_string()));
            }

            let percent = job.progress_percent();
            let (stage, message) = if job.completed {
                (ProgressStage::Completed, "Inscription completed".to_string())
            } else {
                (
                    ProgressStage::Confirming,
                    format!(
                        "Inscription in progress: {}",
                        job.status().unwrap_or("pending")
                    ),
                )
            };
            reporter.report(
                stage,
                message,
                percent,
                job_details(&job, job_id, attempt, max_attempts),
            );
            self.logger.debug(&format!(
                "Inscription {job_id} attempt {attempt}/{max_attempts}: status={:?} completed={} progress={percent}",
                job.status(),
                job.completed,
            ));

            if job.satisfies_completion(options.require_completed_flag) {
                reporter.report(
                    ProgressStage::Completed,
                    "Inscription verification complete",
                    100.0,
                    job_details(&job, job_id, attempt, max_attempts),
                );
                return Ok(job);
            }

            if attempt < max_attempts {
                tokio::time::sleep(options.interval).await;
            }
        }

        self.logger.warn(&format!(
            "Inscription {job_id} did not complete within {max_attempts} attempts"
        ));
        reporter.report(
            ProgressStage::Verifying,
            format!("Inscription verification timed out after {max_attempts} attempts"),
            100.0,
            attempt_details(job_id, max_attempts, max_attempts),
        );
        Err(SdkError::CompletionTimeout {
            job_id: job_id.to_string(),
            attempts: max_attempts,
        })
    }
}

fn attempt_details(job_id: &str, attempt: u32, max_attempts: u32) -> Map<String, Value> {
    let mut details = Map::new();
    details.insert("txId".into(), json!(job_id));
    details.insert("currentAttempt".into(), json!(attempt));
    details.insert("maxAttempts".into(), json!(max_attempts));
    details
}

fn job_details(job: &InscriptionJob, job_id: &str, attempt: u32, max_attempts: u32) -> Map<String, Value> {
    let mut details = attempt_details(job_id, attempt, max_attempts);
    if let Ok(value) = serde_json::to_value(job) {
        details.insert("result".into(), value);
    }
    details
}
