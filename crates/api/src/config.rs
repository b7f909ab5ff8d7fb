//! Server configuration loaded from environment variables.

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Maximum number of analysis pipelines running concurrently
    /// (default: `2`). Submissions beyond this queue without blocking
    /// the caller.
    pub worker_permits: usize,
    /// Default page size for the history endpoint (default: `20`).
    pub history_limit: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `WORKER_PERMITS`       | `2`                        |
    /// | `HISTORY_LIMIT`        | `20`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let worker_permits: usize = std::env::var("WORKER_PERMITS")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("WORKER_PERMITS must be a valid usize");

        let history_limit: usize = std::env::var("HISTORY_LIMIT")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("HISTORY_LIMIT must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            worker_permits,
            history_limit,
        }
    }
}
