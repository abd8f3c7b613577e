//! Mode-specific completion criteria and progress estimation for job snapshots.

use super::InscriptionJob;

/// File standard whose inscriptions need content, metadata and registry topics.
pub const DYNAMIC_FILE_STANDARD: &str = "6";

impl InscriptionJob {
    pub fn is_hashinal(&self) -> bool {
        self.mode() == Some("hashinal")
    }

    pub fn is_dynamic(&self) -> bool {
        self.file_standard().map(str::trim) == Some(DYNAMIC_FILE_STANDARD)
    }

    /// Whether every topic this job's mode needs has been created.
    ///
    /// - dynamic file standard (any mode): content, JSON and registry topics
    /// - hashinal: content and JSON topics
    /// - everything else: the content topic
    pub fn has_required_topics(&self) -> bool {
        if self.is_dynamic() {
            return self.topic_id().is_some()
                && self.json_topic_id().is_some()
                && self.registry_topic_id().is_some();
        }
        if self.is_hashinal() {
            return self.topic_id().is_some() && self.json_topic_id().is_some();
        }
        self.topic_id().is_some()
    }

    /// Whether polling can stop on this snapshot.
    pub fn satisfies_completion(&self, require_completed_flag: bool) -> bool {
        self.has_required_topics() && (!require_completed_flag || self.completed)
    }

    /// Progress estimate for this snapshot alone.
    ///
    /// Message counters are preferred when the service reports them; the
    /// result is not monotonic across snapshots.
    pub fn progress_percent(&self) -> f64 {
        let snapshot = &self.snapshot;
        match (snapshot.messages, snapshot.max_messages) {
            (Some(messages), Some(max)) if max > 0 => {
                if self.completed {
                    100.0
                } else {
                    (5.0 + (messages as f64 / max as f64) * 90.0).min(95.0)
                }
            }
            _ if self.status() == Some("processing") => 10.0,
            _ if self.completed => 100.0,
            _ => 5.0,
        }
    }
}
