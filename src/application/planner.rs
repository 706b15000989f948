//! # Plan Orchestrator
//!
//! Turns a prompt into a raw plan (via the selected provider, or the fallback plan when
//! none is configured), validates the whole plan, then runs it one action at a time.
//!
//! Execution is strictly sequential. The first failure stops the plan and nothing that
//! already ran is rolled back, so a failed request leaves the workspace in an unknown
//! partial state.

use serde_json::{Value, json};
use std::sync::Arc;

use crate::domain::config::{AppConfig, ProviderChoice};
use crate::domain::error::{AgentError, ProviderError};
use crate::domain::schema;
use crate::domain::traits::PlanProvider;
use crate::domain::types::ActionRecord;
use crate::infrastructure::llm::{self, Provider};
use crate::infrastructure::tools::executor::ActionExecutor;
use crate::strings::{logs, prompts};

/// Dev server port the fallback plan exposes, and the one the instruction suggests.
pub const DEFAULT_PREVIEW_PORT: u16 = 5173;

/// Where plans come from, decided purely from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerSelection {
    Provider(Provider),
    Fallback,
}

/// Explicit choice wins; `auto` takes the first provider with a credential
/// (OpenAI, then Anthropic); otherwise the fallback plan.
pub fn select_planner(config: &AppConfig) -> PlannerSelection {
    match config.planner.provider {
        ProviderChoice::OpenAI => PlannerSelection::Provider(Provider::OpenAI),
        ProviderChoice::Anthropic => PlannerSelection::Provider(Provider::Anthropic),
        ProviderChoice::Auto if config.agents.openai.has_credential() => {
            PlannerSelection::Provider(Provider::OpenAI)
        }
        ProviderChoice::Auto if config.agents.anthropic.has_credential() => {
            PlannerSelection::Provider(Provider::Anthropic)
        }
        ProviderChoice::Auto => PlannerSelection::Fallback,
    }
}

/// Scaffold a Vite React app in `app_dir`, install and run it, then expose the dev server.
pub fn fallback_plan(prompt: &str, app_dir: &str) -> Vec<Value> {
    vec![
        json!({
            "action": "writeFiles",
            "files": {
                "README.md": format!("# App\n\nGenerated from prompt:\n\n{}\n", prompt),
            },
        }),
        json!({
            "action": "runCommands",
            "cwd": app_dir,
            "cmds": [
                "npm create vite@latest . -- --template react",
                "npm install",
                "npm run dev",
            ],
        }),
        json!({ "action": "gpUrl", "port": DEFAULT_PREVIEW_PORT }),
    ]
}

/// Parse a provider reply. It must be a JSON object with an `actions` array; no repair is attempted.
pub fn parse_plan_response(provider: &str, text: &str) -> Result<Vec<Value>, ProviderError> {
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|e| ProviderError::new(provider, format!("Planner reply is not valid JSON: {}", e)))?;

    match value {
        Value::Object(mut object) => match object.remove("actions") {
            Some(Value::Array(actions)) => Ok(actions),
            Some(_) => Err(ProviderError::new(provider, "Planner reply field `actions` is not an array")),
            None => Err(ProviderError::new(provider, "Planner reply has no `actions` field")),
        },
        _ => Err(ProviderError::new(provider, "Planner reply is not a JSON object")),
    }
}

pub struct Orchestrator {
    planner: Option<Arc<dyn PlanProvider>>,
    executor: ActionExecutor,
    app_dir: String,
    instruction: String,
}

impl Orchestrator {
    /// `planner: None` means the fallback plan is used for every prompt.
    pub fn new(planner: Option<Arc<dyn PlanProvider>>, executor: ActionExecutor, app_dir: &str) -> Self {
        Self {
            planner,
            executor,
            app_dir: app_dir.to_string(),
            instruction: prompts::planner_instruction(&schema::describe(), app_dir, DEFAULT_PREVIEW_PORT),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let planner: Option<Arc<dyn PlanProvider>> = match select_planner(config) {
            PlannerSelection::Provider(provider) => {
                let agent = match provider {
                    Provider::OpenAI => config.agents.openai.clone(),
                    Provider::Anthropic => config.agents.anthropic.clone(),
                };
                tracing::info!("{}", logs::planner_selected(provider.as_str()));
                let client: Arc<dyn PlanProvider> = Arc::new(llm::Client::new(provider, agent)?);
                Some(client)
            }
            PlannerSelection::Fallback => {
                tracing::info!("{}", logs::FALLBACK_PLAN);
                None
            }
        };

        Ok(Self::new(
            planner,
            ActionExecutor::from_config(&config.workspace),
            &config.workspace.app_dir,
        ))
    }

    pub fn system_instruction(&self) -> &str {
        &self.instruction
    }

    /// Produce the raw, unvalidated plan for `prompt`.
    pub async fn plan(&self, prompt: &str) -> Result<Vec<Value>, ProviderError> {
        let Some(planner) = &self.planner else {
            return Ok(fallback_plan(prompt, &self.app_dir));
        };

        let text = planner.plan(prompt, &self.instruction).await?;
        let actions = parse_plan_response(planner.name(), &text)?;
        tracing::info!(provider = planner.name(), actions = actions.len(), "plan received");
        Ok(actions)
    }

    /// Plan, validate every item, then execute in order.
    pub async fn run(&self, prompt: &str) -> Result<Vec<ActionRecord>, AgentError> {
        let raw = self.plan(prompt).await?;
        let actions = schema::parse_plan(&raw).inspect_err(|e| {
            tracing::warn!(error = %e, "plan rejected");
        })?;

        let mut outputs = Vec::with_capacity(actions.len());
        for (index, action) in actions.iter().enumerate() {
            let kind = action.kind();
            tracing::info!(index, action = %kind, "executing action");

            let out = self.executor.execute(action).await.inspect_err(|e| {
                tracing::warn!(index, error = %e, "action failed, aborting plan");
            })?;
            outputs.push(ActionRecord { action: kind, out });
        }

        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{FakeProvider, executor};
    use crate::domain::config::AgentConfig;
    use crate::domain::paths::PathResolver;
    use crate::domain::types::{Action, ActionKind};
    use crate::infrastructure::tools::executor::ToolConfig;
    use tempfile::TempDir;

    fn with_key(key: &str) -> AgentConfig {
        AgentConfig {
            api_key: Some(key.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_select_planner() {
        let mut config = AppConfig::default();
        assert_eq!(select_planner(&config), PlannerSelection::Fallback);

        config.agents.anthropic = with_key("sk-ant");
        assert_eq!(select_planner(&config), PlannerSelection::Provider(Provider::Anthropic));

        config.agents.openai = with_key("sk-openai");
        assert_eq!(select_planner(&config), PlannerSelection::Provider(Provider::OpenAI));

        config.planner.provider = ProviderChoice::Anthropic;
        assert_eq!(select_planner(&config), PlannerSelection::Provider(Provider::Anthropic));

        // Explicit choice holds even without a credential.
        let mut config = AppConfig::default();
        config.planner.provider = ProviderChoice::OpenAI;
        assert_eq!(select_planner(&config), PlannerSelection::Provider(Provider::OpenAI));

        let mut config = AppConfig::default();
        config.agents.openai = with_key("");
        assert_eq!(select_planner(&config), PlannerSelection::Fallback);
    }

    #[tokio::test]
    async fn test_unconfigured_auto_uses_fallback_plan() {
        let orchestrator = Orchestrator::from_config(&AppConfig::default()).unwrap();
        let plan = orchestrator.plan("make a todo app").await.unwrap();

        let actions = schema::parse_plan(&plan).unwrap();
        assert_eq!(actions.len(), 3);

        let Action::WriteFiles { files } = &actions[0] else {
            panic!("expected writeFiles, got {:?}", actions[0]);
        };
        assert_eq!(files.len(), 1);
        assert!(files["README.md"].contains("make a todo app"));

        assert_eq!(
            actions[1],
            Action::RunCommands {
                cmds: vec![
                    "npm create vite@latest . -- --template react".to_string(),
                    "npm install".to_string(),
                    "npm run dev".to_string(),
                ],
                cwd: "app".to_string(),
            }
        );
        assert_eq!(actions[2], Action::GpUrl { port: 5173 });
    }

    #[test]
    fn test_parse_plan_response() {
        let actions = parse_plan_response("p", r#"{"actions":[{"action":"mkdir","path":"x"}]}"#).unwrap();
        assert_eq!(actions.len(), 1);
        assert!(parse_plan_response("p", r#"  {"actions":[]}  "#).unwrap().is_empty());

        for bad in [
            "Sure! Here is the plan:",
            "```json\n{\"actions\":[]}\n```",
            "{}",
            r#"{"actions":{"action":"mkdir"}}"#,
            r#"[{"action":"mkdir","path":"x"}]"#,
            "",
        ] {
            let err = parse_plan_response("p", bad).unwrap_err();
            assert_eq!(err.provider, "p", "{}", bad);
        }
    }

    #[tokio::test]
    async fn test_provider_receives_instruction_and_prompt() {
        let root = TempDir::new().unwrap();
        let fake = Arc::new(FakeProvider::replying(
            r#"{"actions":[{"action":"createFile","path":"index.html","content":"<h1>hi</h1>"}]}"#,
        ));
        let orchestrator = Orchestrator::new(Some(fake.clone()), executor(&root), "app");

        let outputs = orchestrator.run("landing page").await.unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].action, ActionKind::CreateFile);
        assert_eq!(
            std::fs::read_to_string(root.path().join("app/index.html")).unwrap(),
            "<h1>hi</h1>"
        );

        let seen = fake.seen.lock().unwrap();
        assert_eq!(seen[0].0, "landing page");
        assert_eq!(seen[0].1, orchestrator.system_instruction());
        assert!(seen[0].1.contains("\"action\": \"runCommands\""));
    }

    #[tokio::test]
    async fn test_invalid_item_fails_before_any_execution() {
        let root = TempDir::new().unwrap();
        let fake = Arc::new(FakeProvider::replying(
            r#"{"actions":[
                {"action":"createFile","path":"first.txt","content":"1"},
                {"action":"formatDisk"},
                {"action":"createFile","path":"third.txt","content":"3"}
            ]}"#,
        ));
        let orchestrator = Orchestrator::new(Some(fake), executor(&root), "app");

        let err = orchestrator.run("anything").await.unwrap_err();
        let AgentError::Schema(err) = err else {
            panic!("expected schema error, got {:?}", err);
        };
        assert_eq!(err.index, Some(1));
        assert!(!root.path().join("app/first.txt").exists());
        assert!(!root.path().join("app/third.txt").exists());
    }

    #[tokio::test]
    async fn test_execution_error_stops_plan_without_rollback() {
        let root = TempDir::new().unwrap();
        let fake = Arc::new(FakeProvider::replying(
            r#"{"actions":[
                {"action":"createFile","path":"kept.txt","content":"1"},
                {"action":"readFile","path":"missing.txt"},
                {"action":"createFile","path":"never.txt","content":"3"}
            ]}"#,
        ));
        let orchestrator = Orchestrator::new(Some(fake), executor(&root), "app");

        let err = orchestrator.run("anything").await.unwrap_err();
        assert!(matches!(err, AgentError::Execution(ref e) if e.kind == ActionKind::ReadFile));
        assert!(root.path().join("app/kept.txt").exists());
        assert!(!root.path().join("app/never.txt").exists());
    }

    #[tokio::test]
    async fn test_actions_see_earlier_effects() {
        let root = TempDir::new().unwrap();
        let fake = Arc::new(FakeProvider::replying(
            r#"{"actions":[
                {"action":"createFile","path":"src/a.txt","content":"alpha"},
                {"action":"renamePath","from":"src/a.txt","to":"lib/b.txt"},
                {"action":"appendFile","path":"lib/b.txt","content":"-beta"},
                {"action":"runCommand","cmd":"cat lib/b.txt"},
                {"action":"gpUrl","port":8080}
            ]}"#,
        ));
        let orchestrator = Orchestrator::new(Some(fake), executor(&root), "app");

        let outputs = orchestrator.run("chain").await.unwrap();
        let json = serde_json::to_value(&outputs).unwrap();
        assert_eq!(json[3]["action"], "runCommand");
        assert_eq!(json[3]["out"]["stdout"], "alpha-beta");
        assert_eq!(json[3]["out"]["exitCode"], 0);
        assert_eq!(json[4]["out"]["url"], "https://8080-ws.example.test");
    }

    #[tokio::test]
    async fn test_provider_errors_are_not_replaced_by_fallback() {
        let root = TempDir::new().unwrap();
        let orchestrator = Orchestrator::new(
            Some(Arc::new(FakeProvider::failing("HTTP 500"))),
            executor(&root),
            "app",
        );
        let err = orchestrator.run("make a todo app").await.unwrap_err();
        assert!(matches!(err, AgentError::Provider(_)));
        assert!(!root.path().join("app/README.md").exists());

        let orchestrator = Orchestrator::new(
            Some(Arc::new(FakeProvider::replying("I cannot help with that."))),
            executor(&root),
            "app",
        );
        let err = orchestrator.run("make a todo app").await.unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[tokio::test]
    async fn test_custom_app_dir_keeps_files_and_commands_together() {
        let root = TempDir::new().unwrap();
        let fake = Arc::new(FakeProvider::replying(
            r#"{"actions":[
                {"action":"createFile","path":"index.html","content":"<h1>web</h1>"},
                {"action":"runCommand","cmd":"pwd; cat index.html"}
            ]}"#,
        ));
        let executor = ActionExecutor::new(
            PathResolver::new(root.path(), "web"),
            ToolConfig {
                shell: "sh".to_string(),
                shell_args: vec!["-c".to_string()],
                preview_command: "echo https://{port}-ws.example.test".to_string(),
                command_timeout: None,
            },
        );
        let orchestrator = Orchestrator::new(Some(fake), executor, "web");
        assert!(orchestrator.system_instruction().contains("'web/'"));

        let outputs = orchestrator.run("static page").await.unwrap();
        let json = serde_json::to_value(&outputs).unwrap();
        let web = root.path().join("web").canonicalize().unwrap();
        assert_eq!(json[1]["out"]["exitCode"], 0);
        assert_eq!(
            json[1]["out"]["stdout"],
            format!("{}\n<h1>web</h1>", web.display())
        );
        assert!(!root.path().join("app").exists());

        let plan = fallback_plan("anything", "web");
        assert_eq!(plan[1]["cwd"], "web");
    }

    #[tokio::test]
    async fn test_explicit_provider_without_key_fails_request() {
        let mut config = AppConfig::default();
        config.planner.provider = ProviderChoice::OpenAI;
        let orchestrator = Orchestrator::from_config(&config).unwrap();

        let err = orchestrator.run("make a todo app").await.unwrap_err();
        let AgentError::Provider(err) = err else {
            panic!("expected provider error, got {:?}", err);
        };
        assert_eq!(err.provider, "openai");
    }
}
