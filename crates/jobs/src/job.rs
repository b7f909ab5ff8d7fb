//! Job record and status types.

use std::sync::Arc;

use rapport_core::result::AnalysisResult;
use rapport_core::types::{JobId, Timestamp};
use serde::Serialize;

/// Lifecycle state of an analysis job.
///
/// Transitions are one-way: `Running` -> `Done` or `Running` -> `Error`,
/// never backward, never revisited. Serializes lowercase, matching the
/// progress wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Done,
    Error,
}

impl JobStatus {
    /// Terminal states never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

/// Internal mutable job record. Lives inside the store; pollers only
/// ever see [`JobSnapshot`] copies.
#[derive(Debug, Clone)]
pub(crate) struct Job {
    pub id: JobId,
    pub subject_id: String,
    /// The submitted conversation text.
    pub input: String,
    pub status: JobStatus,
    /// 0-100; monotonically non-decreasing while `Running`.
    pub percent: u8,
    /// Human-readable current-stage description.
    pub message: String,
    /// Populated exactly once, when the job completes. Shared by `Arc`
    /// so concurrent pollers read it without copying.
    pub result: Option<Arc<AnalysisResult>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Job {
    pub fn new(id: JobId, subject_id: String, input: String) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            subject_id,
            input,
            status: JobStatus::Running,
            percent: 0,
            message: "started".to_string(),
            result: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            job_id: self.id.clone(),
            subject_id: self.subject_id.clone(),
            input: self.input.clone(),
            status: self.status,
            percent: self.percent,
            message: self.message.clone(),
            result: self.result.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Read-only copy of a job's state at one point in time.
///
/// The serialized form is the progress payload (`jobId`, `percent`,
/// `status`, `message`, timestamps); the result itself is served by the
/// dedicated result endpoint, so it is skipped here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub job_id: JobId,
    pub subject_id: String,
    /// The submitted conversation text; internal, never serialized.
    #[serde(skip)]
    pub input: String,
    pub status: JobStatus,
    pub percent: u8,
    pub message: String,
    #[serde(skip)]
    pub result: Option<Arc<AnalysisResult>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
