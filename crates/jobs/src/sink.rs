//! Result sink collaborator interface.
//!
//! The sink receives each validated [`AnalysisResult`] after a job
//! completes and serves the history/stats read model. Persistence is
//! best-effort by policy: a sink failure is logged by the scheduler and
//! never flips a completed job back to an error state -- the in-memory
//! result stays retrievable regardless.

use std::collections::HashMap;
use std::sync::RwLock;

use rapport_core::result::AnalysisResult;
use rapport_core::types::{JobId, Timestamp};
use serde::Serialize;

/// The sink could not store the result.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The backing store rejected the write or is unreachable.
    #[error("result sink unavailable: {0}")]
    Unavailable(String),
}

/// One row of a subject's analysis history, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub job_id: JobId,
    pub stored_at: Timestamp,
    pub success_rate: f64,
    pub relationship_stage: String,
    pub summary: String,
}

/// Aggregate statistics over a subject's stored analyses.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkStats {
    pub total_analyses: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_analysis: Option<Timestamp>,
    pub average_success_rate: f64,
}

/// External persistence collaborator for completed analyses.
#[async_trait::async_trait]
pub trait ResultSink: Send + Sync {
    /// Store one validated result under the subject's id.
    async fn store(
        &self,
        subject_id: &str,
        job_id: &str,
        result: &AnalysisResult,
    ) -> Result<(), SinkError>;

    /// Most recent stored analyses for a subject, newest first.
    async fn history(&self, subject_id: &str, limit: usize) -> Vec<HistoryEntry>;

    /// Aggregate statistics for a subject.
    async fn stats(&self, subject_id: &str) -> SinkStats;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

struct StoredResult {
    job_id: JobId,
    stored_at: Timestamp,
    result: AnalysisResult,
}

/// In-process [`ResultSink`] keyed by subject id.
///
/// Backs the binary and the test suite; a durable implementation would
/// live behind the same trait.
#[derive(Default)]
pub struct MemorySink {
    entries: RwLock<HashMap<String, Vec<StoredResult>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ResultSink for MemorySink {
    async fn store(
        &self,
        subject_id: &str,
        job_id: &str,
        result: &AnalysisResult,
    ) -> Result<(), SinkError> {
        let mut entries = self.entries.write().expect("sink lock poisoned");
        entries
            .entry(subject_id.to_string())
            .or_default()
            .push(StoredResult {
                job_id: job_id.to_string(),
                stored_at: chrono::Utc::now(),
                result: result.clone(),
            });
        Ok(())
    }

    async fn history(&self, subject_id: &str, limit: usize) -> Vec<HistoryEntry> {
        let entries = self.entries.read().expect("sink lock poisoned");
        let Some(stored) = entries.get(subject_id) else {
            return Vec::new();
        };
        stored
            .iter()
            .rev()
            .take(limit)
            .map(|entry| HistoryEntry {
                job_id: entry.job_id.clone(),
                stored_at: entry.stored_at,
                success_rate: entry.result.main_results.success_rate,
                relationship_stage: entry.result.main_results.relationship_stage.clone(),
                summary: entry.result.main_results.summary.clone(),
            })
            .collect()
    }

    async fn stats(&self, subject_id: &str) -> SinkStats {
        let entries = self.entries.read().expect("sink lock poisoned");
        let Some(stored) = entries.get(subject_id) else {
            return SinkStats::default();
        };
        if stored.is_empty() {
            return SinkStats::default();
        }
        let total = stored.len() as u64;
        let sum: f64 = stored
            .iter()
            .map(|e| e.result.main_results.success_rate)
            .sum();
        SinkStats {
            total_analyses: total,
            last_analysis: stored.last().map(|e| e.stored_at),
            average_success_rate: sum / total as f64,
        }
    }
}
