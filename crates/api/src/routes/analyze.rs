//! Handlers for the `/analyze` resource.
//!
//! Submission is asynchronous: `start_analysis` returns a job id
//! immediately and the client polls `get_progress` until the job is
//! terminal, then fetches the result.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use rapport_core::result::AnalysisResult;
use rapport_jobs::JobStatus;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Routes mounted at `/analyze`.
///
/// ```text
/// POST   /                        -> start_analysis
/// GET    /progress/{job_id}       -> get_progress
/// GET    /result/{job_id}         -> get_result
/// GET    /history/{subject_id}    -> get_history
/// GET    /stats/{subject_id}      -> get_stats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_analysis))
        .route("/progress/{job_id}", get(get_progress))
        .route("/result/{job_id}", get(get_result))
        .route("/history/{subject_id}", get(get_history))
        .route("/stats/{subject_id}", get(get_stats))
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// Request payload for starting an analysis.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartAnalysisRequest {
    /// The conversation text to analyze.
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
    /// Identifier of the requesting subject (e.g. an account email).
    #[validate(length(min = 1, message = "subjectId must not be empty"))]
    pub subject_id: String,
}

/// Response payload: the id to poll.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAnalysisResponse {
    pub job_id: String,
}

/// POST /api/analyze
///
/// Submit a conversation for analysis. Returns 201 with the job id;
/// the pipeline runs in the background. Blank text is rejected with 400
/// before any job is registered.
pub async fn start_analysis(
    State(state): State<AppState>,
    Json(input): Json<StartAnalysisRequest>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let job_id = state.scheduler.start(&input.text, &input.subject_id)?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: StartAnalysisResponse { job_id },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// GET /api/analyze/progress/{job_id}
///
/// Poll a job's progress. The returned percent is monotonically
/// non-decreasing across successive polls of the same job. 404 for
/// unknown ids.
pub async fn get_progress(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let snapshot = state
        .store
        .get(&job_id)
        .ok_or(AppError::JobNotFound(job_id))?;

    Ok(Json(DataResponse { data: snapshot }))
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// GET /api/analyze/result/{job_id}
///
/// Fetch the validated result of a completed job. 404 for unknown ids,
/// 409 while the job has not reached `Done` (including failed jobs --
/// their terminal message is served by the progress endpoint).
pub async fn get_result(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let snapshot = state
        .store
        .get(&job_id)
        .ok_or(AppError::JobNotFound(job_id))?;

    if snapshot.status != JobStatus::Done {
        return Err(AppError::NotReady);
    }

    // Done implies a result was attached; treat a bare Done as not ready
    // rather than panicking on a broken invariant.
    let Some(result) = snapshot.result.as_deref() else {
        return Err(AppError::NotReady);
    };
    let result: AnalysisResult = result.clone();

    Ok(Json(DataResponse { data: result }))
}

// ---------------------------------------------------------------------------
// History / stats
// ---------------------------------------------------------------------------

/// GET /api/analyze/history/{subject_id}
///
/// Recent completed analyses for a subject, newest first.
pub async fn get_history(
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let entries = state
        .sink
        .history(&subject_id, state.config.history_limit)
        .await;
    Ok(Json(DataResponse { data: entries }))
}

/// GET /api/analyze/stats/{subject_id}
///
/// Aggregate statistics over a subject's stored analyses.
pub async fn get_stats(
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let stats = state.sink.stats(&subject_id).await;
    Ok(Json(DataResponse { data: stats }))
}
