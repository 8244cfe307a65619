//! Shell task
//!
//! Runs a local command and fails the check when it exits non-zero.
//! The working directory and environment are set on the child process
//! only; the engine's own process state is never touched.

use async_trait::async_trait;
use fleetcheck_core::domain::task::TaskConfig;
use fleetcheck_core::error::TaskError;
use serde_json::json;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::params::{ParamKind, ParamSpec};
use crate::task::{Task, TaskContext, TaskOutput, TaskType};

const DEFAULT_SHELL: &str = "/bin/bash";

const SHELL_PARAMS: [ParamSpec; 8] = [
    ParamSpec::required("command", ParamKind::String, "Command to execute"),
    ParamSpec::optional("args", ParamKind::Array, "Additional command arguments"),
    ParamSpec::optional("working_dir", ParamKind::String, "Working directory for the command"),
    ParamSpec::optional("env_vars", ParamKind::Object, "Environment variables for the command"),
    ParamSpec::optional("timeout", ParamKind::Integer, "Command timeout in seconds"),
    ParamSpec::optional("shell", ParamKind::Boolean, "Run through a shell (default true)"),
    ParamSpec::optional("shell_path", ParamKind::String, "Shell binary (default /bin/bash)"),
    ParamSpec::optional("allow_failure", ParamKind::Boolean, "Treat non-zero exit codes as success"),
];

/// Task type for `shell` checks
pub struct ShellTaskType;

impl TaskType for ShellTaskType {
    fn description(&self) -> &'static str {
        "Execute shell commands"
    }

    fn parameters(&self) -> &'static [ParamSpec] {
        &SHELL_PARAMS
    }

    fn build(&self, config: TaskConfig) -> Box<dyn Task> {
        Box::new(ShellTask::new(config))
    }
}

/// One shell command execution
pub struct ShellTask {
    config: TaskConfig,
}

impl ShellTask {
    pub fn new(config: TaskConfig) -> Self {
        Self { config }
    }

    fn command_line(&self) -> String {
        let command = self.config.get_str("command").unwrap_or_default();
        let args = self.config.get_str_list("args");
        if args.is_empty() {
            command.to_string()
        } else {
            format!("{} {}", command, args.join(" "))
        }
    }

    fn build_command(&self, ctx: &TaskContext) -> Command {
        let use_shell = self.config.get_bool("shell").unwrap_or(true);

        let mut cmd = if use_shell {
            let shell = self.config.get_str("shell_path").unwrap_or(DEFAULT_SHELL);
            let mut cmd = Command::new(shell);
            cmd.arg("-c").arg(self.command_line());
            cmd
        } else {
            let mut cmd = Command::new(self.config.get_str("command").unwrap_or_default());
            cmd.args(self.config.get_str_list("args"));
            cmd
        };

        if let Some(dir) = self.config.get_str("working_dir") {
            cmd.current_dir(dir);
        }

        // Context and target variables first so explicit env_vars can override them
        cmd.envs(&ctx.env);
        if let Some(creds) = self.config.credentials() {
            cmd.env("TARGET_SERVER", creds.server);
            cmd.env("TARGET_TOKEN", creds.token);
        }
        if let Some(target) = &self.config.target {
            cmd.env("TARGET_NAME", target);
        }
        cmd.envs(self.config.get_str_map("env_vars"));

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Task for ShellTask {
    fn config(&self) -> &TaskConfig {
        &self.config
    }

    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(command) = self.config.get_str("command") {
            if command.trim().is_empty() {
                errors.push("Parameter command must not be empty".to_string());
            }
        }

        if self.config.get_u64("timeout") == Some(0) {
            errors.push("Parameter timeout must be greater than 0".to_string());
        }

        errors
    }

    async fn pre_execute(&self, _ctx: &TaskContext) -> Result<(), TaskError> {
        if let Some(dir) = self.config.get_str("working_dir") {
            if !Path::new(dir).is_dir() {
                return Err(TaskError::Precondition(format!(
                    "Working directory does not exist: {}",
                    dir
                )));
            }
        }
        Ok(())
    }

    async fn execute(&self, ctx: &TaskContext) -> Result<TaskOutput, TaskError> {
        let timeout = self
            .config
            .get_u64("timeout")
            .map(Duration::from_secs)
            .unwrap_or(ctx.default_timeout);
        let command_line = self.command_line();

        debug!(
            "Executing shell command '{}' (timeout {:?})",
            command_line, timeout
        );

        let output = match tokio::time::timeout(timeout, self.build_command(ctx).output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TaskError::execution(format!("Command not found: {}", e)));
            }
            Ok(Err(e)) => {
                return Err(TaskError::execution(format!(
                    "Command execution failed: {}",
                    e
                )));
            }
            Err(_) => {
                return Err(TaskError::Timeout {
                    operation: format!("Command '{}'", command_line),
                    seconds: timeout.as_secs(),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let return_code = output.status.code().unwrap_or(-1);

        if !output.status.success() && !self.config.get_bool("allow_failure").unwrap_or(false) {
            let reason = if stderr.trim().is_empty() {
                stdout.trim()
            } else {
                stderr.trim()
            };
            return Err(TaskError::execution(format!(
                "Command exited with code {}: {}",
                return_code, reason
            )));
        }

        let mut result = TaskOutput::new();
        result.insert("command".to_string(), json!(command_line));
        result.insert("output".to_string(), json!(stdout.trim()));
        result.insert("stdout".to_string(), json!(stdout));
        result.insert("stderr".to_string(), json!(stderr));
        result.insert("return_code".to_string(), json!(return_code));
        if let Some(dir) = self.config.get_str("working_dir") {
            result.insert("working_dir".to_string(), json!(dir));
        }
        Ok(result)
    }

    async fn post_execute(&self, output: &TaskOutput) -> Result<(), TaskError> {
        let return_code = output.get("return_code").and_then(|v| v.as_i64()).unwrap_or(-1);
        if return_code == 0 {
            info!("Shell command '{}' completed successfully", self.config.name);
        } else {
            warn!(
                "Shell command '{}' completed with return code {}",
                self.config.name, return_code
            );
        }
        Ok(())
    }
}
