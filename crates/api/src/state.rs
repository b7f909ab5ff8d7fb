use std::sync::Arc;

use rapport_jobs::{JobScheduler, JobStore, ResultSink};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable: every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Job registry read by the progress and result endpoints.
    pub store: Arc<JobStore>,
    /// Pipeline dispatcher backing the submit endpoint.
    pub scheduler: Arc<JobScheduler>,
    /// Result sink read-model backing the history endpoint.
    pub sink: Arc<dyn ResultSink>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
