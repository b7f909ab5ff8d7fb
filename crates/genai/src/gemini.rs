//! Client for the Google Gemini `generateContent` endpoint.

use serde_json::Value;

use crate::client::{build_http_client, ensure_success, with_retry, GenerateError, GenerativeClient};
use crate::config::ProviderConfig;

/// HTTP client for the Gemini REST API.
///
/// The API key travels as a `key` query parameter and the model is
/// encoded in the endpoint path, so neither appears in the body.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    max_output_tokens: u32,
    temperature: f64,
    top_k: u32,
    top_p: f64,
    retry_attempts: u32,
    retry_delay: std::time::Duration,
}

impl GeminiClient {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            http: build_http_client(config),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            retry_attempts: config.retry_attempts,
            retry_delay: config.retry_delay,
        }
    }

    async fn call_once(&self, prompt: &str) -> Result<String, GenerateError> {
        let body = serde_json::json!({
            "contents": [{
                "parts": [{ "text": prompt }],
            }],
            "generationConfig": {
                "temperature": self.temperature,
                "topK": self.top_k,
                "topP": self.top_p,
                "maxOutputTokens": self.max_output_tokens,
                "candidateCount": 1,
            },
        });

        let response = self
            .http
            .post(format!("{}?key={}", self.endpoint, self.api_key))
            .json(&body)
            .send()
            .await?;

        let envelope: Value = ensure_success(response).await?.json().await?;
        reply_text(&envelope)
    }
}

#[async_trait::async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        with_retry(self.retry_attempts, self.retry_delay, || {
            self.call_once(prompt)
        })
        .await
    }
}

/// Pull the reply text out of a Gemini response envelope
/// (`candidates[0].content.parts[0].text`).
fn reply_text(envelope: &Value) -> Result<String, GenerateError> {
    envelope
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| {
            GenerateError::Envelope(
                "candidates[0].content.parts[0].text missing from Gemini reply".to_string(),
            )
        })
}
