//! Concurrent in-memory job registry.
//!
//! One [`JobStore`] instance is constructor-injected wherever it is
//! needed -- there is no global registry, so independent schedulers can
//! be tested in isolation.
//!
//! Concurrency model: many pollers call [`JobStore::get`] while exactly
//! one spawned pipeline task per job id calls the crate-internal
//! mutators. The at-most-one-writer-per-job invariant is structural
//! (only the task spawned for a job ever holds its id for writing), and
//! the store additionally enforces monotonic progress and one-way
//! status transitions so a misbehaving writer cannot violate what
//! pollers observe.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use rapport_core::result::AnalysisResult;
use rapport_core::types::JobId;

use crate::job::{Job, JobSnapshot, JobStatus};

/// In-memory registry of all jobs known to this process.
///
/// Jobs are never evicted; the registry lives and dies with the process
/// (persistence across restarts is explicitly out of scope).
#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job in `Running`/0% state and return its id.
    pub fn create(&self, subject_id: &str, input: &str) -> JobId {
        let id = uuid::Uuid::new_v4().to_string();
        let job = Job::new(id.clone(), subject_id.to_string(), input.to_string());
        self.write().insert(id.clone(), job);
        id
    }

    /// Snapshot a job's current state. `None` for unknown ids.
    pub fn get(&self, job_id: &str) -> Option<JobSnapshot> {
        self.read().get(job_id).map(Job::snapshot)
    }

    /// Number of jobs currently registered (terminal ones included).
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Advance a running job's progress.
    ///
    /// Progress is monotonic: a percent lower than the current value is
    /// lifted to it, so pollers never observe a decrease. No-op on
    /// terminal or unknown jobs.
    pub(crate) fn update_progress(&self, job_id: &str, percent: u8, message: &str) {
        let mut jobs = self.write();
        let Some(job) = jobs.get_mut(job_id) else {
            return;
        };
        if job.status.is_terminal() {
            return;
        }
        job.percent = job.percent.max(percent.min(100));
        job.message = message.to_string();
        job.updated_at = chrono::Utc::now();
    }

    /// Transition a running job to `Done` with its validated result.
    ///
    /// No-op if the job is unknown or already terminal; a terminal job
    /// is immutable.
    pub(crate) fn complete(&self, job_id: &str, result: AnalysisResult) {
        let mut jobs = self.write();
        let Some(job) = jobs.get_mut(job_id) else {
            return;
        };
        if job.status.is_terminal() {
            tracing::warn!(job_id, "Ignoring complete() on a terminal job");
            return;
        }
        job.status = JobStatus::Done;
        job.percent = 100;
        job.message = "complete".to_string();
        job.result = Some(Arc::new(result));
        job.updated_at = chrono::Utc::now();
    }

    /// Transition a running job to `Error` with a terminal message.
    pub(crate) fn fail(&self, job_id: &str, message: &str) {
        let mut jobs = self.write();
        let Some(job) = jobs.get_mut(job_id) else {
            return;
        };
        if job.status.is_terminal() {
            tracing::warn!(job_id, "Ignoring fail() on a terminal job");
            return;
        }
        job.status = JobStatus::Error;
        job.message = message.to_string();
        job.updated_at = chrono::Utc::now();
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<JobId, Job>> {
        self.jobs.read().expect("job store lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<JobId, Job>> {
        self.jobs.write().expect("job store lock poisoned")
    }
}
