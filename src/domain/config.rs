//! # Configuration
//!
//! Manages the loading and parsing of the agent's configuration file (`config.yaml`),
//! followed by the environment overlay (`PROVIDER`, `OPENAI_API_KEY`, `PORT`, ...).
//! Every section is optional; a missing file yields the defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::domain::paths::{APP_DIR, WORKSPACE_ROOT};

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3030
}

/// Which planning provider to use.
#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderChoice {
    /// First provider with a credential, else the fallback plan.
    #[default]
    Auto,
    #[serde(rename = "openai")]
    OpenAI,
    Anthropic,
}

impl FromStr for ProviderChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" | "" => Ok(ProviderChoice::Auto),
            "openai" => Ok(ProviderChoice::OpenAI),
            "anthropic" => Ok(ProviderChoice::Anthropic),
            other => anyhow::bail!("unknown provider '{}' (expected auto, openai or anthropic)", other),
        }
    }
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct PlannerConfig {
    #[serde(default)]
    pub provider: ProviderChoice,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct AgentsConfig {
    #[serde(default)]
    pub openai: AgentConfig,
    #[serde(default)]
    pub anthropic: AgentConfig,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct AgentConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>, // e.g. "OPENAI_API_KEY"
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Request timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl AgentConfig {
    /// A credential counts only when it is non-empty.
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Where actions run and how commands are spawned.
#[derive(Debug, Deserialize, Clone)]
pub struct WorkspaceConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_app_dir")]
    pub app_dir: String,
    #[serde(default = "default_shell")]
    pub shell: String,
    #[serde(default = "default_shell_args")]
    pub shell_args: Vec<String>,
    /// Helper used by `gpUrl`; `{port}` is substituted.
    #[serde(default = "default_preview_command")]
    pub preview_command: String,
    /// Unset means commands may run forever.
    #[serde(default)]
    pub command_timeout_secs: Option<u64>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            app_dir: default_app_dir(),
            shell: default_shell(),
            shell_args: default_shell_args(),
            preview_command: default_preview_command(),
            command_timeout_secs: None,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(WORKSPACE_ROOT)
}
fn default_app_dir() -> String {
    APP_DIR.to_string()
}
fn default_shell() -> String {
    "bash".to_string()
}
fn default_shell_args() -> Vec<String> {
    vec!["-lc".to_string()]
}
fn default_preview_command() -> String {
    "gp url {port}".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_log_file")]
    pub file: String,
    /// `EnvFilter` directives; `RUST_LOG` takes precedence.
    #[serde(default)]
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file: default_log_file(),
            filter: None,
        }
    }
}

fn default_log_dir() -> String {
    "data".to_string()
}
fn default_log_file() -> String {
    "session.log".to_string()
}

impl AppConfig {
    /// Read `path` if it exists, then apply the process environment.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Self::from_yaml(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Self::default()
        };

        config.overlay_env(|key| std::env::var(key).ok())
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply environment overrides. Empty values count as unset.
    pub fn overlay_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(provider) = get("PROVIDER") {
            self.planner.provider = provider.parse().context("Invalid PROVIDER")?;
        }

        for (agent, key_var, model_var) in [
            (&mut self.agents.openai, "OPENAI_API_KEY", "OPENAI_MODEL"),
            (&mut self.agents.anthropic, "ANTHROPIC_API_KEY", "ANTHROPIC_MODEL"),
        ] {
            if !agent.has_credential() {
                agent.api_key = agent
                    .api_key_env
                    .as_deref()
                    .and_then(|var| get(var))
                    .or_else(|| get(key_var));
            }
            if let Some(model) = get(model_var) {
                agent.model = Some(model);
            }
        }

        if let Some(port) = get("PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid PORT '{}'", port))?;
        }

        Ok(self)
    }
}
