//! # Domain Errors
//!
//! Every failure a request can hit, grouped by the stage that produced it.
//! All of them surface at the request boundary as a single failure response.

use crate::domain::types::ActionKind;

/// A plan item that does not match any action variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid action{}: {message}", plan_position(.index))]
pub struct SchemaError {
    /// Position of the offending item in the plan, when known.
    pub index: Option<usize>,
    pub message: String,
}

impl SchemaError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            index: None,
            message: message.into(),
        }
    }

    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

fn plan_position(index: &Option<usize>) -> String {
    index
        .map(|index| format!(" at plan index {}", index))
        .unwrap_or_default()
}

/// Failure reported by (or while talking to) a planning provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{provider}] {message}")]
pub struct ProviderError {
    pub provider: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: &str, message: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

/// A filesystem or process operation that failed while executing an action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} failed: {message}")]
pub struct ExecError {
    pub kind: ActionKind,
    pub message: String,
}

impl ExecError {
    pub fn new(kind: ActionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn io(kind: ActionKind, err: std::io::Error) -> Self {
        Self::new(kind, err.to_string())
    }
}

/// Top-level error of a `/chat` request.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("invalid request: {0}")]
    Input(String),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Execution(#[from] ExecError),
}
