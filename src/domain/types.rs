//! # Domain Types
//!
//! The closed action vocabulary a plan may contain, and the outputs each action produces.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::SchemaError;

/// Working directory used by command actions when the plan omits `cwd`.
/// Stands for the configured app directory, see `PathResolver::resolve_cwd`.
pub const DEFAULT_CWD: &str = "app";

fn default_cwd() -> String {
    DEFAULT_CWD.to_string()
}

/// One validated unit of work.
///
/// The wire form is a JSON object tagged by its `action` field, e.g.
/// `{"action":"readFile","path":"src/main.js"}`. Fields not listed for a kind are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    WriteFiles {
        files: BTreeMap<String, String>,
    },
    CreateFile {
        path: String,
        content: String,
    },
    AppendFile {
        path: String,
        content: String,
    },
    ReadFile {
        path: String,
    },
    Mkdir {
        path: String,
    },
    RemovePath {
        path: String,
    },
    RenamePath {
        from: String,
        to: String,
    },
    RunCommand {
        cmd: String,
        #[serde(default = "default_cwd")]
        cwd: String,
    },
    RunCommands {
        cmds: Vec<String>,
        #[serde(default = "default_cwd")]
        cwd: String,
    },
    GpUrl {
        port: u16,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::WriteFiles { .. } => ActionKind::WriteFiles,
            Action::CreateFile { .. } => ActionKind::CreateFile,
            Action::AppendFile { .. } => ActionKind::AppendFile,
            Action::ReadFile { .. } => ActionKind::ReadFile,
            Action::Mkdir { .. } => ActionKind::Mkdir,
            Action::RemovePath { .. } => ActionKind::RemovePath,
            Action::RenamePath { .. } => ActionKind::RenamePath,
            Action::RunCommand { .. } => ActionKind::RunCommand,
            Action::RunCommands { .. } => ActionKind::RunCommands,
            Action::GpUrl { .. } => ActionKind::GpUrl,
        }
    }
}

/// Discriminator of an [`Action`], as it appears in the `action` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    WriteFiles,
    CreateFile,
    AppendFile,
    ReadFile,
    Mkdir,
    RemovePath,
    RenamePath,
    RunCommand,
    RunCommands,
    GpUrl,
}

impl ActionKind {
    pub const ALL: [ActionKind; 10] = [
        ActionKind::WriteFiles,
        ActionKind::CreateFile,
        ActionKind::AppendFile,
        ActionKind::ReadFile,
        ActionKind::Mkdir,
        ActionKind::RemovePath,
        ActionKind::RenamePath,
        ActionKind::RunCommand,
        ActionKind::RunCommands,
        ActionKind::GpUrl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::WriteFiles => "writeFiles",
            ActionKind::CreateFile => "createFile",
            ActionKind::AppendFile => "appendFile",
            ActionKind::ReadFile => "readFile",
            ActionKind::Mkdir => "mkdir",
            ActionKind::RemovePath => "removePath",
            ActionKind::RenamePath => "renamePath",
            ActionKind::RunCommand => "runCommand",
            ActionKind::RunCommands => "runCommands",
            ActionKind::GpUrl => "gpUrl",
        }
    }
}

/// Exact, case-sensitive lookup of a discriminator string.
impl FromStr for ActionKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s).ok_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
            SchemaError::new(format!(
                "unknown action `{}`, expected one of: {}",
                s,
                known.join(", ")
            ))
        })
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Captured result of one shell invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRun {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

/// Kind-specific payload of a successful action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutputDetail {
    Empty {},
    Content { content: String },
    Command(CommandRun),
    Commands { results: Vec<CommandRun> },
    Url { url: String },
}

/// Outcome of a successful action, serialized as `{"ok":true, ...payload}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutput {
    pub ok: bool,
    #[serde(flatten)]
    pub detail: OutputDetail,
}

impl ActionOutput {
    fn with(detail: OutputDetail) -> Self {
        Self { ok: true, detail }
    }

    pub fn done() -> Self {
        Self::with(OutputDetail::Empty {})
    }

    pub fn content(content: String) -> Self {
        Self::with(OutputDetail::Content { content })
    }

    pub fn command(run: CommandRun) -> Self {
        Self::with(OutputDetail::Command(run))
    }

    pub fn commands(results: Vec<CommandRun>) -> Self {
        Self::with(OutputDetail::Commands { results })
    }

    pub fn url(url: String) -> Self {
        Self::with(OutputDetail::Url { url })
    }
}

/// One entry of a response's `outputs` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    pub action: ActionKind,
    pub out: ActionOutput,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.as_str().parse::<ActionKind>(), Ok(kind));
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                json!(kind.as_str())
            );
        }
        assert!("WriteFiles".parse::<ActionKind>().is_err());
        let err = "deleteEverything".parse::<ActionKind>().unwrap_err();
        assert!(err.message.starts_with("unknown action `deleteEverything`"));
    }

    #[test]
    fn test_output_shapes() {
        assert_eq!(serde_json::to_value(ActionOutput::done()).unwrap(), json!({"ok": true}));
        assert_eq!(
            serde_json::to_value(ActionOutput::content("hi".into())).unwrap(),
            json!({"ok": true, "content": "hi"})
        );
        assert_eq!(
            serde_json::to_value(ActionOutput::url("https://x".into())).unwrap(),
            json!({"ok": true, "url": "https://x"})
        );

        let run = CommandRun {
            cmd: None,
            stdout: "a".into(),
            stderr: String::new(),
            exit_code: Some(0),
        };
        assert_eq!(
            serde_json::to_value(ActionOutput::command(run.clone())).unwrap(),
            json!({"ok": true, "stdout": "a", "stderr": "", "exitCode": 0})
        );

        let batch = CommandRun {
            cmd: Some("echo a".into()),
            ..run
        };
        assert_eq!(
            serde_json::to_value(ActionOutput::commands(vec![batch])).unwrap(),
            json!({"ok": true, "results": [
                {"cmd": "echo a", "stdout": "a", "stderr": "", "exitCode": 0}
            ]})
        );
    }

    #[test]
    fn test_record_uses_wire_kind() {
        let record = ActionRecord {
            action: ActionKind::GpUrl,
            out: ActionOutput::done(),
        };
        assert_eq!(
            serde_json::to_value(record).unwrap(),
            json!({"action": "gpUrl", "out": {"ok": true}})
        );
    }
}
