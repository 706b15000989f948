//! # LLM Client
//!
//! Provides the `Client` struct, the [`PlanProvider`] backed by a real provider API.
//! The credential is checked per request, so a selected provider without a key
//! fails the request rather than startup.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::config::AgentConfig;
use crate::domain::traits::PlanProvider;
use crate::infrastructure::llm::providers::{self, ProviderConfig};
use crate::infrastructure::llm::{Context, Error, Provider};

/// Client for a single planning provider
pub struct Client {
    provider: Provider,
    agent: AgentConfig,
    http: reqwest::Client,
}

impl Client {
    pub fn new(provider: Provider, agent: AgentConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| Error::new(provider.as_str(), format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            provider,
            agent,
            http,
        })
    }
}

#[async_trait]
impl PlanProvider for Client {
    async fn plan(&self, prompt: &str, system_instruction: &str) -> Result<String, Error> {
        let config = ProviderConfig::from_agent_config(self.provider, &self.agent)?;

        let context = Context::new()
            .with_model(config.default_model.clone())
            .with_temperature(0.0)
            .add_system_message(system_instruction)
            .add_user_message(prompt);

        let response = providers::chat(&self.http, self.provider, &config, context).await?;

        tracing::debug!(
            provider = self.provider.as_str(),
            model = %response.model,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            total_tokens = response.usage.total_tokens,
            "planner reply received"
        );

        Ok(response.content)
    }

    fn name(&self) -> &str {
        self.provider.as_str()
    }
}
