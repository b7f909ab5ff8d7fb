//! The provider-agnostic client trait and shared HTTP plumbing.

use std::time::Duration;

use crate::config::ProviderConfig;

/// Errors from a generative-text provider call.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("provider returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The provider returned 2xx but its response envelope is missing
    /// the expected reply-text node.
    #[error("malformed provider envelope: {0}")]
    Envelope(String),
}

impl GenerateError {
    /// Whether this failure happened before any provider reply arrived.
    ///
    /// Transport failures are the only retryable kind; a provider that
    /// answered (even with an error) is not retried at this layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// A client for one external generative-text provider.
///
/// `generate` returns the provider's raw reply text unmodified.
/// Providers wrap the requested JSON in commentary or markdown fences
/// at will; extraction is delegated downstream, never done here.
#[async_trait::async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Build the shared [`reqwest::Client`] with the configured timeouts.
///
/// Panics on builder failure, which only happens with invalid TLS
/// backends -- fail fast at startup.
pub(crate) fn build_http_client(config: &ProviderConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.read_timeout)
        .build()
        .expect("failed to build HTTP client")
}

/// Ensure the response has a success status code. Returns the response
/// unchanged on success, or a [`GenerateError::Status`] containing the
/// status and body text on failure.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, GenerateError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(GenerateError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Run `call` up to `attempts` times, sleeping `delay` between tries.
///
/// Only transport errors are retried; provider-side errors surface
/// immediately. This is the only retry in the system -- the pipeline
/// above never re-runs a failed job on its own.
pub(crate) async fn with_retry<F, Fut>(
    attempts: u32,
    delay: Duration,
    mut call: F,
) -> Result<String, GenerateError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<String, GenerateError>>,
{
    let attempts = attempts.max(1);
    for attempt in 1..attempts {
        match call().await {
            Ok(text) => return Ok(text),
            Err(e) if e.is_transport() => {
                tracing::warn!(attempt, error = %e, "Provider call failed, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
    // Final attempt; its outcome is the caller's outcome.
    call().await
}
