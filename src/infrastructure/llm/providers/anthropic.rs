//! Anthropic (Claude) messages provider

use serde::{Deserialize, Serialize};

use super::{ProviderConfig, error_message};
use crate::infrastructure::llm::{Context, Error, MessageRole, Response, TokenUsage};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anthropic API request format
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Anthropic message format
#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

/// Anthropic API response format
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<AnthropicResponseContent>,
    usage: AnthropicUsage,
}

/// Anthropic response content
#[derive(Debug, Deserialize)]
struct AnthropicResponseContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic usage information
#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Execute a chat request using Anthropic's API
pub async fn chat(
    http: &reqwest::Client,
    config: &ProviderConfig,
    context: Context,
) -> Result<Response, Error> {
    let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    let model = context
        .model
        .unwrap_or_else(|| config.default_model.clone());

    let url = format!("{}/v1/messages", base_url.trim_end_matches('/'));

    // System messages travel in the top-level `system` field
    let mut system = None;
    let mut messages = Vec::new();
    for msg in context.messages {
        match msg.role {
            MessageRole::System => system = Some(msg.content),
            MessageRole::User => messages.push(AnthropicMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content,
            }),
        }
    }

    let request = AnthropicRequest {
        model,
        max_tokens: context.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        messages,
        system,
        temperature: context.temperature,
    };

    let mut request_builder = http
        .post(&url)
        .header("x-api-key", &config.api_key)
        .header("anthropic-version", API_VERSION)
        .json(&request);

    if let Some(timeout_secs) = config.timeout {
        request_builder = request_builder.timeout(std::time::Duration::from_secs(timeout_secs));
    }

    let response = request_builder
        .send()
        .await
        .map_err(|e| Error::new("anthropic", format!("HTTP request failed: {}", e)))?;

    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        let message =
            error_message(&error_text).unwrap_or_else(|| format!("HTTP {}: {}", status, error_text));
        return Err(Error::new("anthropic", message));
    }

    let anthropic_response: AnthropicResponse = response
        .json()
        .await
        .map_err(|e| Error::new("anthropic", format!("Failed to parse response: {}", e)))?;

    // Only the first block is the plan; a non-text first block reads as `{}`.
    let content = anthropic_response
        .content
        .into_iter()
        .next()
        .filter(|block| block.content_type == "text")
        .and_then(|block| block.text)
        .unwrap_or_else(|| "{}".to_string());

    let usage = &anthropic_response.usage;
    Ok(Response {
        content,
        model: anthropic_response.model,
        usage: TokenUsage {
            prompt_tokens: usage.input_tokens,
            completion_tokens: usage.output_tokens,
            total_tokens: usage.input_tokens + usage.output_tokens,
        },
    })
}
