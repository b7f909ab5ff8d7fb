pub mod analyze;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /analyze                         submit analysis (POST)
/// /analyze/progress/{job_id}       poll progress (GET)
/// /analyze/result/{job_id}         fetch validated result (GET)
/// /analyze/history/{subject_id}    recent completed analyses (GET)
/// /analyze/stats/{subject_id}      aggregate statistics (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/analyze", analyze::router())
}
