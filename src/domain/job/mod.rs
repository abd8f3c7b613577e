//! Inscription job domain — remote job snapshots, normalized completion,
//! progress events and caller-facing results.

pub mod completion;
pub mod wire;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use wire::JobSnapshot;

// ─── InscriptionJob ──────────────────────────────────────────────────────────

/// A job snapshot with a single authoritative `completed` flag.
///
/// The service may report `status: "completed"` while its boolean
/// `completed` still reads `false`. The status string wins: `completed` here
/// is true when either says so, and the wrapped snapshot carries the same
/// value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InscriptionJob {
    #[serde(rename = "jobId")]
    pub job_id: String,
    #[serde(skip)]
    pub completed: bool,
    #[serde(flatten)]
    pub snapshot: JobSnapshot,
}

impl InscriptionJob {
    pub fn from_snapshot(mut snapshot: JobSnapshot) -> Self {
        let completed =
            snapshot.completed.unwrap_or(false) || snapshot.status.as_deref() == Some("completed");
        let job_id = non_empty(&snapshot.id)
            .or_else(|| non_empty(&snapshot.tx_id))
            .unwrap_or_default()
            .to_string();
        snapshot.completed = Some(completed);
        Self {
            job_id,
            completed,
            snapshot,
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.snapshot.status.as_deref()
    }

    pub fn topic_id(&self) -> Option<&str> {
        non_empty(&self.snapshot.topic_id)
    }

    pub fn json_topic_id(&self) -> Option<&str> {
        non_empty(&self.snapshot.json_topic_id)
    }

    pub fn registry_topic_id(&self) -> Option<&str> {
        non_empty(&self.snapshot.registry_topic_id)
    }

    pub fn error(&self) -> Option<&str> {
        non_empty(&self.snapshot.error)
    }

    pub fn mode(&self) -> Option<&str> {
        self.snapshot.mode.as_deref()
    }

    pub fn file_standard(&self) -> Option<&str> {
        self.snapshot.file_standard.as_deref()
    }
}

impl From<JobSnapshot> for InscriptionJob {
    fn from(snapshot: JobSnapshot) -> Self {
        Self::from_snapshot(snapshot)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

// ─── Progress ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStage {
    Preparing,
    Submitting,
    Confirming,
    Completed,
    Verifying,
}

/// One progress notification delivered to the caller's callback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub stage: ProgressStage,
    pub message: String,
    pub progress_percent: f64,
    pub details: Map<String, Value>,
}

impl ProgressEvent {
    pub fn new(stage: ProgressStage, message: impl Into<String>, progress_percent: f64) -> Self {
        Self {
            stage,
            message: message.into(),
            progress_percent,
            details: Map::new(),
        }
    }

    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = details;
        self
    }
}

pub type ProgressCallback = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

// ─── Results ─────────────────────────────────────────────────────────────────

/// Outcome of a submit-and-execute call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InscriptionResult {
    pub job_id: String,
    pub transaction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl InscriptionResult {
    pub fn submitted(job_id: impl Into<String>, transaction_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            transaction_id: transaction_id.into(),
            topic_id: None,
            status: None,
            completed: None,
        }
    }
}

/// Signable output of a submission channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub job_id: String,
    /// Base64-encoded unsigned transaction.
    pub transaction_bytes: String,
}
