//! Shared helpers for API integration tests.
//!
//! Builds the full application router -- same middleware stack as
//! production -- on top of a scripted provider client, so tests
//! exercise real routing, extraction, and validation without touching
//! the network.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::Notify;
use tower::ServiceExt;

use rapport_api::config::ServerConfig;
use rapport_api::router::build_app_router;
use rapport_api::state::AppState;
use rapport_genai::client::{GenerateError, GenerativeClient};
use rapport_jobs::{JobScheduler, JobStore, MemorySink};

/// A canned provider reply that passes extraction and validation.
pub const GOOD_REPLY: &str = r#"Here is your analysis:
```json
{
  "mainResults": {
    "successRate": 72,
    "confidenceLevel": 61,
    "relationshipStage": "early interest",
    "summary": "replies are fast and warm"
  },
  "emotionAnalysis": { "positive": 60, "neutral": 25, "negative": 15 }
}
```"#;

/// Provider stub replying with a fixed text, optionally gated on a
/// [`Notify`] so tests can hold a job in `Running` deterministically.
pub struct ScriptedClient {
    pub reply: String,
    pub gate: Option<Arc<Notify>>,
}

impl ScriptedClient {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            gate: None,
        })
    }

    /// A client that answers only after `gate` is notified.
    pub fn gated(reply: &str, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            gate: Some(gate),
        })
    }
}

#[async_trait::async_trait]
impl GenerativeClient for ScriptedClient {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(self.reply.clone())
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        worker_permits: 2,
        history_limit: 20,
    }
}

/// Build the full application router with all middleware layers on top
/// of the given provider client.
///
/// This mirrors the router construction in `main.rs` so integration
/// tests exercise the same stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(client: Arc<dyn GenerativeClient>) -> Router {
    let config = test_config();
    let store = Arc::new(JobStore::new());
    let sink = Arc::new(MemorySink::new());
    let scheduler = Arc::new(JobScheduler::new(
        Arc::clone(&store),
        client,
        sink.clone(),
        config.worker_permits,
    ));

    let state = AppState {
        store,
        scheduler,
        sink,
        config: Arc::new(config.clone()),
    };

    build_app_router(state, &config)
}

/// Send a GET request to the app.
pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("request completes")
}

/// Send a POST request with a JSON body to the app.
pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("request completes")
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is valid JSON")
}

/// Poll the progress endpoint until the job is terminal; returns the
/// last progress payload.
pub async fn wait_terminal(app: &Router, job_id: &str) -> serde_json::Value {
    for _ in 0..500 {
        let response = get(app, &format!("/api/analyze/progress/{job_id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let status = json["data"]["status"].as_str().expect("status is a string");
        if status != "running" {
            return json;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("job {job_id} did not reach a terminal state in time");
}
