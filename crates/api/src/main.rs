use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rapport_api::config::ServerConfig;
use rapport_api::router::build_app_router;
use rapport_api::state::AppState;
use rapport_genai::config::ProviderConfig;
use rapport_jobs::{JobScheduler, JobStore, MemorySink};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rapport_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let provider_config = ProviderConfig::from_env();
    tracing::info!(
        provider = ?provider_config.kind,
        endpoint = %provider_config.endpoint,
        "Loaded provider configuration",
    );

    // --- Collaborators ---
    let client = rapport_genai::client_from_config(&provider_config);
    let store = Arc::new(JobStore::new());
    let sink = Arc::new(MemorySink::new());
    let scheduler = Arc::new(JobScheduler::new(
        Arc::clone(&store),
        client,
        sink.clone(),
        config.worker_permits,
    ));
    tracing::info!(
        worker_permits = config.worker_permits,
        "Job scheduler started",
    );

    // --- App state ---
    let state = AppState {
        store,
        scheduler,
        sink,
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Serve ---
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("HOST/PORT must form a valid socket address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "rapport API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Resolve when the process receives SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
