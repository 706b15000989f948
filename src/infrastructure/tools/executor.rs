//! # Action Executor
//!
//! Performs one validated [`Action`] against the workspace filesystem or a shell.
//!
//! Every path goes through the [`PathResolver`]. Command strings are handed to the
//! configured shell verbatim: nothing is escaped or inspected, so plans must come
//! from a trusted provider.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::domain::config::WorkspaceConfig;
use crate::domain::error::ExecError;
use crate::domain::paths::PathResolver;
use crate::domain::types::{Action, ActionOutput, CommandRun};

/// How shell commands are spawned.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub shell: String,
    pub shell_args: Vec<String>,
    /// Helper behind `gpUrl`; `{port}` is substituted.
    pub preview_command: String,
    pub command_timeout: Option<Duration>,
}

impl From<&WorkspaceConfig> for ToolConfig {
    fn from(config: &WorkspaceConfig) -> Self {
        Self {
            shell: config.shell.clone(),
            shell_args: config.shell_args.clone(),
            preview_command: config.preview_command.clone(),
            command_timeout: config.command_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Executes actions. Holds no mutable state, so one instance serves every request.
#[derive(Debug, Clone)]
pub struct ActionExecutor {
    paths: PathResolver,
    config: ToolConfig,
}

impl ActionExecutor {
    pub fn new(paths: PathResolver, config: ToolConfig) -> Self {
        Self { paths, config }
    }

    pub fn from_config(config: &WorkspaceConfig) -> Self {
        Self::new(
            PathResolver::new(config.root.clone(), config.app_dir.clone()),
            ToolConfig::from(config),
        )
    }

    pub async fn execute(&self, action: &Action) -> Result<ActionOutput, ExecError> {
        let kind = action.kind();
        let io = |e: std::io::Error| ExecError::io(kind, e);

        match action {
            Action::WriteFiles { files } => {
                for (rel, content) in files {
                    write_file(&self.paths.resolve(rel), content).await.map_err(io)?;
                }
                Ok(ActionOutput::done())
            }
            Action::CreateFile { path, content } => {
                write_file(&self.paths.resolve(path), content).await.map_err(io)?;
                Ok(ActionOutput::done())
            }
            Action::AppendFile { path, content } => {
                append_file(&self.paths.resolve(path), content).await.map_err(io)?;
                Ok(ActionOutput::done())
            }
            Action::ReadFile { path } => {
                let abs = self.paths.resolve(path);
                let content = tokio::fs::read_to_string(&abs)
                    .await
                    .map_err(|e| ExecError::new(kind, format!("{}: {}", abs.display(), e)))?;
                Ok(ActionOutput::content(content))
            }
            Action::Mkdir { path } => {
                tokio::fs::create_dir_all(self.paths.resolve(path)).await.map_err(io)?;
                Ok(ActionOutput::done())
            }
            Action::RemovePath { path } => {
                remove_path(&self.paths.resolve(path)).await.map_err(io)?;
                Ok(ActionOutput::done())
            }
            Action::RenamePath { from, to } => {
                let from = self.paths.resolve(from);
                let to = self.paths.resolve(to);
                ensure_parent(&to).await.map_err(io)?;
                tokio::fs::rename(&from, &to).await.map_err(|e| {
                    ExecError::new(kind, format!("{} -> {}: {}", from.display(), to.display(), e))
                })?;
                Ok(ActionOutput::done())
            }
            Action::RunCommand { cmd, cwd } => {
                let cwd = self.paths.resolve_cwd(cwd);
                let run = self
                    .run_shell(cmd, Some(&cwd))
                    .await
                    .map_err(|e| ExecError::new(kind, e))?;
                Ok(ActionOutput::command(run))
            }
            Action::RunCommands { cmds, cwd } => {
                let cwd = self.paths.resolve_cwd(cwd);
                let mut results = Vec::with_capacity(cmds.len());
                for cmd in cmds {
                    let run = self
                        .run_shell(cmd, Some(&cwd))
                        .await
                        .map_err(|e| ExecError::new(kind, format!("`{}`: {}", cmd, e)))?;
                    results.push(CommandRun {
                        cmd: Some(cmd.clone()),
                        ..run
                    });
                }
                Ok(ActionOutput::commands(results))
            }
            Action::GpUrl { port } => {
                let helper = self.config.preview_command.replace("{port}", &port.to_string());
                let run = self
                    .run_shell(&helper, None)
                    .await
                    .map_err(|e| ExecError::new(kind, e))?;
                if run.exit_code != Some(0) {
                    return Err(ExecError::new(
                        kind,
                        format!(
                            "`{}` exited with {}: {}",
                            helper,
                            describe_exit(run.exit_code),
                            run.stderr
                        ),
                    ));
                }
                Ok(ActionOutput::url(run.stdout.trim().to_string()))
            }
        }
    }

    /// Run one shell program to completion. Only spawn/wait failures are errors;
    /// a non-zero exit is reported in the returned [`CommandRun`].
    async fn run_shell(&self, command: &str, cwd: Option<&Path>) -> Result<CommandRun, String> {
        let mut cmd = Command::new(&self.config.shell);
        cmd.args(&self.config.shell_args)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = cwd {
            cmd.current_dir(cwd);
        }

        tracing::debug!(shell = %self.config.shell, cwd = ?cwd, command, "spawning command");

        let child = cmd.spawn().map_err(|e| {
            let location = cwd.map(|c| format!(" in {}", c.display())).unwrap_or_default();
            format!("failed to spawn `{}`{}: {}", self.config.shell, location, e)
        })?;

        let output = match self.config.command_timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| format!("timed out after {:?}", limit))?,
            None => child.wait_with_output().await,
        }
        .map_err(|e| format!("failed to wait for `{}`: {}", self.config.shell, e))?;

        let run = CommandRun {
            cmd: None,
            stdout: strip_final_newline(String::from_utf8_lossy(&output.stdout).into_owned()),
            stderr: strip_final_newline(String::from_utf8_lossy(&output.stderr).into_owned()),
            exit_code: output.status.code(),
        };

        tracing::debug!(command, exit_code = ?run.exit_code, "command finished");
        Ok(run)
    }
}

async fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) => tokio::fs::create_dir_all(parent).await,
        None => Ok(()),
    }
}

async fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    ensure_parent(path).await?;
    tokio::fs::write(path, content).await
}

async fn append_file(path: &Path, content: &str) -> std::io::Result<()> {
    ensure_parent(path).await?;
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await
}

/// Remove a file, symlink or directory tree. Absent paths are fine.
async fn remove_path(path: &Path) -> std::io::Result<()> {
    let result = match tokio::fs::symlink_metadata(path).await {
        Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(path).await,
        Ok(_) => tokio::fs::remove_file(path).await,
        Err(e) => Err(e),
    };
    match result {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn strip_final_newline(mut s: String) -> String {
    if s.ends_with('\n') {
        s.pop();
        if s.ends_with('\r') {
            s.pop();
        }
    }
    s
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}
