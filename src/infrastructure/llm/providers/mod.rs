//! # LLM Providers
//!
//! Contains the implementations for the supported planning providers (OpenAI, Anthropic).
//! Each exposes a `chat` function taking the shared HTTP client, its config and a [`Context`].

mod anthropic;
mod openai;

use crate::domain::config::AgentConfig;
use crate::infrastructure::llm::{Context, Error, Provider, Response};

/// Configuration for a provider
#[derive(Clone)]
pub struct ProviderConfig {
    /// API key
    pub api_key: String,
    /// Base URL (for non-default endpoints)
    pub base_url: Option<String>,
    /// Default model
    pub default_model: String,
    /// Timeout in seconds
    pub timeout: Option<u64>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderConfig {
    /// Build the request config for `provider`. Fails when no credential is configured.
    pub fn from_agent_config(provider: Provider, config: &AgentConfig) -> Result<Self, Error> {
        let api_key = match &config.api_key {
            Some(key) if !key.is_empty() => key.clone(),
            _ => {
                let hint = match provider {
                    Provider::OpenAI => "OPENAI_API_KEY",
                    Provider::Anthropic => "ANTHROPIC_API_KEY",
                };
                return Err(Error::new(
                    provider.as_str(),
                    format!("No API key provided - set {} or agents.{}.api_key", hint, provider.as_str()),
                ));
            }
        };

        Ok(Self {
            api_key,
            base_url: config.endpoint.clone(),
            default_model: config
                .model
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| provider.default_model().to_string()),
            timeout: config.timeout,
        })
    }
}

/// Execute a chat request with the specified provider
pub async fn chat(
    http: &reqwest::Client,
    provider: Provider,
    config: &ProviderConfig,
    context: Context,
) -> Result<Response, Error> {
    match provider {
        Provider::OpenAI => openai::chat(http, config, context).await,
        Provider::Anthropic => anthropic::chat(http, config, context).await,
    }
}

/// Pull a human-readable message out of a provider's JSON error body.
fn error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = json.get("error")?;
    let message = error.get("message")?.as_str()?;
    match error.get("type").and_then(|t| t.as_str()) {
        Some(kind) => Some(format!("{}: {}", kind, message)),
        None => Some(message.to_string()),
    }
}
