//! OpenAI chat completions provider

use serde::{Deserialize, Serialize};

use super::{ProviderConfig, error_message};
use crate::infrastructure::llm::{Context, Error, Response, TokenUsage};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI API request format
#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    model: String,
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Execute a chat request using the OpenAI API
pub async fn chat(
    http: &reqwest::Client,
    config: &ProviderConfig,
    context: Context,
) -> Result<Response, Error> {
    let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    let model = context
        .model
        .unwrap_or_else(|| config.default_model.clone());

    let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));

    let request = OpenAIRequest {
        model,
        messages: context
            .messages
            .into_iter()
            .map(|msg| OpenAIMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content,
            })
            .collect(),
        temperature: context.temperature,
        max_tokens: context.max_tokens,
    };

    let mut request_builder = http
        .post(&url)
        .bearer_auth(&config.api_key)
        .json(&request);

    if let Some(timeout_secs) = config.timeout {
        request_builder = request_builder.timeout(std::time::Duration::from_secs(timeout_secs));
    }

    let response = request_builder
        .send()
        .await
        .map_err(|e| Error::new("openai", format!("HTTP request failed: {}", e)))?;

    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        let message =
            error_message(&error_text).unwrap_or_else(|| format!("HTTP {}: {}", status, error_text));
        return Err(Error::new("openai", message));
    }

    let openai_response: OpenAIResponse = response
        .json()
        .await
        .map_err(|e| Error::new("openai", format!("Failed to parse response: {}", e)))?;

    // An empty reply is treated as `{}` and rejected later by the plan shape check.
    let content = openai_response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_else(|| "{}".to_string());

    let usage = openai_response
        .usage
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    Ok(Response {
        content,
        model: openai_response.model,
        usage,
    })
}
