//! Client crate for external generative-text providers.
//!
//! Exposes the [`client::GenerativeClient`] trait plus one
//! implementation per supported provider (Gemini, Anthropic). The
//! clients return the provider's raw reply text unmodified; isolating
//! the JSON payload inside that text is `rapport_core::extract`'s job,
//! never done here.

pub mod anthropic;
pub mod client;
pub mod config;
pub mod gemini;

use std::sync::Arc;

use crate::anthropic::AnthropicClient;
use crate::client::GenerativeClient;
use crate::config::{ProviderConfig, ProviderKind};
use crate::gemini::GeminiClient;

/// Build the configured provider client.
pub fn client_from_config(config: &ProviderConfig) -> Arc<dyn GenerativeClient> {
    match config.kind {
        ProviderKind::Gemini => Arc::new(GeminiClient::new(config)),
        ProviderKind::Anthropic => Arc::new(AnthropicClient::new(config)),
    }
}
