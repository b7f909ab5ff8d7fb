//! Provider configuration loaded from environment variables.

use std::time::Duration;

/// Which generative-text provider to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Anthropic,
}

/// Configuration for one generative-text provider.
///
/// All fields except the API key have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider selection (default: `gemini`).
    pub kind: ProviderKind,
    /// Full endpoint URL for the generate call.
    pub endpoint: String,
    /// API key / secret for the provider.
    pub api_key: String,
    /// Model identifier (only sent to providers whose wire format
    /// carries it; Gemini encodes the model in the endpoint URL).
    pub model: String,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout (covers reading the reply).
    pub read_timeout: Duration,
    /// Per-call output size cap, in tokens.
    pub max_output_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Top-k sampling cutoff (Gemini only).
    pub top_k: u32,
    /// Top-p nucleus sampling cutoff (Gemini only).
    pub top_p: f64,
    /// How many times a transport failure is retried before giving up.
    pub retry_attempts: u32,
    /// Delay between retry attempts.
    pub retry_delay: Duration,
}

impl ProviderConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                       |
    /// |----------------------------|-------------------------------|
    /// | `GENAI_PROVIDER`           | `gemini`                      |
    /// | `GENAI_ENDPOINT`           | per-provider default endpoint |
    /// | `GENAI_API_KEY`            | *(required)*                  |
    /// | `GENAI_MODEL`              | per-provider default model    |
    /// | `GENAI_CONNECT_TIMEOUT_SECS` | `10`                        |
    /// | `GENAI_READ_TIMEOUT_SECS`  | `30`                          |
    /// | `GENAI_MAX_OUTPUT_TOKENS`  | `8192`                        |
    /// | `GENAI_TEMPERATURE`        | `0.1`                         |
    /// | `GENAI_TOP_K`              | `1`                           |
    /// | `GENAI_TOP_P`              | `0.8`                         |
    /// | `GENAI_RETRY_ATTEMPTS`     | `3`                           |
    /// | `GENAI_RETRY_DELAY_MS`     | `1000`                        |
    ///
    /// Panics when `GENAI_API_KEY` is unset or a numeric variable fails
    /// to parse -- misconfiguration should fail fast at startup.
    pub fn from_env() -> Self {
        let kind = match std::env::var("GENAI_PROVIDER")
            .unwrap_or_else(|_| "gemini".into())
            .to_lowercase()
            .as_str()
        {
            "gemini" => ProviderKind::Gemini,
            "anthropic" => ProviderKind::Anthropic,
            other => panic!("Unknown GENAI_PROVIDER: {other} (expected gemini or anthropic)"),
        };

        let endpoint = std::env::var("GENAI_ENDPOINT").unwrap_or_else(|_| {
            match kind {
                ProviderKind::Gemini => {
                    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash-latest:generateContent"
                }
                ProviderKind::Anthropic => "https://api.anthropic.com/v1/messages",
            }
            .into()
        });

        let api_key = std::env::var("GENAI_API_KEY").expect("GENAI_API_KEY must be set");

        let model = std::env::var("GENAI_MODEL").unwrap_or_else(|_| {
            match kind {
                ProviderKind::Gemini => "gemini-1.5-flash-latest",
                ProviderKind::Anthropic => "claude-3-5-haiku-latest",
            }
            .into()
        });

        Self {
            kind,
            endpoint,
            api_key,
            model,
            connect_timeout: Duration::from_secs(env_parse("GENAI_CONNECT_TIMEOUT_SECS", 10)),
            read_timeout: Duration::from_secs(env_parse("GENAI_READ_TIMEOUT_SECS", 30)),
            max_output_tokens: env_parse("GENAI_MAX_OUTPUT_TOKENS", 8192),
            temperature: env_parse("GENAI_TEMPERATURE", 0.1),
            top_k: env_parse("GENAI_TOP_K", 1),
            top_p: env_parse("GENAI_TOP_P", 0.8),
            retry_attempts: env_parse("GENAI_RETRY_ATTEMPTS", 3),
            retry_delay: Duration::from_millis(env_parse("GENAI_RETRY_DELAY_MS", 1000)),
        }
    }
}

/// Read an env var and parse it, falling back to `default` when unset.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{name} is not valid: {e}")),
        Err(_) => default,
    }
}
