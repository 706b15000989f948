//! # Domain Traits
//!
//! Abstract interfaces for the pluggable parts of the agent.
//! Allows for swappable implementations in the Infrastructure layer and fakes in tests.

use async_trait::async_trait;

use crate::domain::error::ProviderError;

/// Abstract interface for a planning provider (an LLM API client).
#[async_trait]
pub trait PlanProvider: Send + Sync {
    /// Send the system instruction and the user prompt; return the raw text reply.
    async fn plan(&self, prompt: &str, system_instruction: &str) -> Result<String, ProviderError>;

    /// Short provider name used in logs and errors.
    fn name(&self) -> &str;
}
