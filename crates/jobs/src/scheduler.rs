//! Asynchronous pipeline execution per job.
//!
//! [`JobScheduler::start`] registers a job and spawns its pipeline onto
//! the Tokio runtime, then returns immediately -- the submitting caller
//! never blocks on analysis work. A semaphore bounds how many pipelines
//! run concurrently; submissions beyond the bound queue inside their
//! spawned task, so backpressure is an explicit, configurable policy
//! rather than an accidental resource leak.
//!
//! Each pipeline walks fixed checkpoints, updating the store as it
//! goes: validate input, call the provider, extract and validate the
//! reply, hand the result to the sink, complete. Any stage error ends
//! the job in `Error` with that error's message; there is no automatic
//! retry at this layer.

use std::sync::Arc;

use rapport_core::extract::{extract_json, ExtractError};
use rapport_core::prompt::build_analysis_prompt;
use rapport_core::types::JobId;
use rapport_core::validate::{validate_result, SchemaError};
use rapport_genai::client::{GenerateError, GenerativeClient};
use tokio::sync::Semaphore;

use crate::sink::ResultSink;
use crate::store::JobStore;

/// Pipeline checkpoints, in execution order. Percentages come from the
/// progress contract the frontend polls against.
const PROGRESS_VALIDATING: (u8, &str) = (10, "validating input");
const PROGRESS_CALLING: (u8, &str) = (30, "calling analysis provider");
const PROGRESS_PROCESSING: (u8, &str) = (80, "processing result");
const PROGRESS_STORING: (u8, &str) = (90, "storing result");

/// Synchronous submission failure.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum StartError {
    /// The submission was rejected before any job was registered.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}

/// A pipeline stage failed; the job ends in `Error` with this message.
///
/// Each variant wraps the typed error of one stage so callers (and
/// logs) can match on the kind instead of string-scraping a generic
/// exception message.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl PipelineError {
    /// Stable error-kind label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Generate(e) if e.is_transport() => "transport",
            Self::Generate(_) => "provider",
            Self::Extract(_) => "no_json_found",
            Self::Schema(_) => "schema",
        }
    }
}

/// Dispatches analysis pipelines and tracks them in a [`JobStore`].
///
/// All collaborators are constructor-injected so independent schedulers
/// can run side by side in tests.
pub struct JobScheduler {
    store: Arc<JobStore>,
    client: Arc<dyn GenerativeClient>,
    sink: Arc<dyn ResultSink>,
    permits: Arc<Semaphore>,
}

impl JobScheduler {
    /// Create a scheduler allowing at most `worker_permits` concurrently
    /// running pipelines.
    pub fn new(
        store: Arc<JobStore>,
        client: Arc<dyn GenerativeClient>,
        sink: Arc<dyn ResultSink>,
        worker_permits: usize,
    ) -> Self {
        Self {
            store,
            client,
            sink,
            permits: Arc::new(Semaphore::new(worker_permits.max(1))),
        }
    }

    /// Submit a new analysis job. Returns its id immediately.
    ///
    /// Blank input is the one synchronous failure; everything after
    /// submission surfaces through the job's terminal state.
    pub fn start(&self, input: &str, subject_id: &str) -> Result<JobId, StartError> {
        if input.trim().is_empty() {
            return Err(StartError::InvalidInput(
                "analysis text must not be empty or blank",
            ));
        }

        let job_id = self.store.create(subject_id, input);
        tracing::info!(job_id = %job_id, subject_id, "Analysis job submitted");

        let store = Arc::clone(&self.store);
        let client = Arc::clone(&self.client);
        let sink = Arc::clone(&self.sink);
        let permits = Arc::clone(&self.permits);
        let task_job_id = job_id.clone();
        let input = input.to_string();
        let subject_id = subject_id.to_string();

        tokio::spawn(async move {
            // Queue here, not in start(): the caller returns immediately
            // even when all permits are taken.
            let Ok(_permit) = permits.acquire_owned().await else {
                // The semaphore is never closed while a scheduler is alive.
                store.fail(&task_job_id, "scheduler shut down before execution");
                return;
            };

            let outcome =
                run_pipeline(&store, &*client, &*sink, &task_job_id, &input, &subject_id).await;
            match outcome {
                Ok(()) => {
                    tracing::info!(job_id = %task_job_id, "Analysis job complete");
                }
                Err(e) => {
                    tracing::error!(
                        job_id = %task_job_id,
                        kind = e.kind(),
                        error = %e,
                        "Analysis pipeline failed",
                    );
                    store.fail(&task_job_id, &e.to_string());
                }
            }
        });

        Ok(job_id)
    }

    /// The store this scheduler writes into (shared with pollers).
    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }
}

/// Run the four-stage pipeline for one job, updating progress at each
/// checkpoint. Completes the job on success; the caller handles errors.
async fn run_pipeline(
    store: &JobStore,
    client: &dyn GenerativeClient,
    sink: &dyn ResultSink,
    job_id: &str,
    input: &str,
    subject_id: &str,
) -> Result<(), PipelineError> {
    let (percent, message) = PROGRESS_VALIDATING;
    store.update_progress(job_id, percent, message);
    let prompt = build_analysis_prompt(input);

    let (percent, message) = PROGRESS_CALLING;
    store.update_progress(job_id, percent, message);
    let raw_reply = client.generate(&prompt).await?;

    let (percent, message) = PROGRESS_PROCESSING;
    store.update_progress(job_id, percent, message);
    let candidate = extract_json(&raw_reply)?;
    let result = validate_result(&candidate)?;

    let (percent, message) = PROGRESS_STORING;
    store.update_progress(job_id, percent, message);
    if let Err(e) = sink.store(subject_id, job_id, &result).await {
        // Best-effort persistence: the computed result stays available
        // in memory and the job still completes.
        tracing::warn!(
            job_id,
            error = %e,
            "Result sink write failed; job completes with in-memory result",
        );
    }

    store.complete(job_id, result);
    Ok(())
}
