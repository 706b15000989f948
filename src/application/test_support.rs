//! Shared fixtures for orchestrator and request-boundary tests.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

use crate::domain::error::ProviderError;
use crate::domain::paths::PathResolver;
use crate::domain::traits::PlanProvider;
use crate::infrastructure::tools::executor::{ActionExecutor, ToolConfig};

/// Replies with a canned text and records what it was sent.
pub struct FakeProvider {
    reply: Result<String, ProviderError>,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<(String, String)>>,
}

impl FakeProvider {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(ProviderError::new("fake", message)),
            ..Self::replying("")
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlanProvider for FakeProvider {
    async fn plan(&self, prompt: &str, system_instruction: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((prompt.to_string(), system_instruction.to_string()));
        self.reply.clone()
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Executor rooted at `root`, using `sh -c` and an `echo` stand-in for the preview helper.
pub fn executor(root: &TempDir) -> ActionExecutor {
    ActionExecutor::new(
        PathResolver::new(root.path(), "app"),
        ToolConfig {
            shell: "sh".to_string(),
            shell_args: vec!["-c".to_string()],
            preview_command: "echo https://{port}-ws.example.test".to_string(),
            command_timeout: None,
        },
    )
}
