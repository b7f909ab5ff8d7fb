//! Client for the Anthropic Messages endpoint.

use serde_json::Value;

use crate::client::{build_http_client, ensure_success, with_retry, GenerateError, GenerativeClient};
use crate::config::ProviderConfig;

/// Wire protocol version sent in the `anthropic-version` header.
const API_VERSION: &str = "2023-06-01";

/// HTTP client for the Anthropic Messages API.
pub struct AnthropicClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_output_tokens: u32,
    temperature: f64,
    retry_attempts: u32,
    retry_delay: std::time::Duration,
}

impl AnthropicClient {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            http: build_http_client(config),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
            retry_attempts: config.retry_attempts,
            retry_delay: config.retry_delay,
        }
    }

    async fn call_once(&self, prompt: &str) -> Result<String, GenerateError> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_output_tokens,
            "temperature": self.temperature,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let envelope: Value = ensure_success(response).await?.json().await?;
        reply_text(&envelope)
    }
}

#[async_trait::async_trait]
impl GenerativeClient for AnthropicClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        with_retry(self.retry_attempts, self.retry_delay, || {
            self.call_once(prompt)
        })
        .await
    }
}

/// Pull the reply text out of an Anthropic response envelope
/// (`content[0].text`).
fn reply_text(envelope: &Value) -> Result<String, GenerateError> {
    envelope
        .pointer("/content/0/text")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| {
            GenerateError::Envelope("content[0].text missing from Anthropic reply".to_string())
        })
}
