use async_trait::async_trait;
use fleetcheck_core::domain::task::TaskConfig;
use fleetcheck_core::error::TaskError;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

use crate::params::ParamSpec;

/// Output produced by a successful task execution
pub type TaskOutput = Map<String, JsonValue>;

/// Per-execution parameters handed to a task by its caller
///
/// Everything a task needs beyond its own config is passed here explicitly.
/// Tasks must not change process-wide state such as the current directory or
/// the environment; workers for different targets run concurrently.
#[derive(Debug, Clone)]
pub struct TaskContext {
    /// Target the task runs against, if any
    pub target: Option<String>,
    /// Timeout applied when the task config does not set its own
    pub default_timeout: Duration,
    /// Extra environment for child processes the task starts
    pub env: BTreeMap<String, String>,
}

impl TaskContext {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            target: None,
            default_timeout,
            env: BTreeMap::new(),
        }
    }

    pub fn for_target(target: impl Into<String>, default_timeout: Duration) -> Self {
        Self {
            target: Some(target.into()),
            default_timeout,
            env: BTreeMap::new(),
        }
    }

    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }
}

impl Default for TaskContext {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

/// A single check execution built from a `TaskConfig`
///
/// Only `execute` is mandatory. The lifecycle wrapper calls the hooks in the
/// order `validate`, `pre_execute`, `execute`, `post_execute`.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use fleetcheck_tasks::{Task, TaskConfig, TaskContext, TaskError, TaskOutput};
///
/// struct AlwaysUp {
///     config: TaskConfig,
/// }
///
/// #[async_trait]
/// impl Task for AlwaysUp {
///     fn config(&self) -> &TaskConfig {
///         &self.config
///     }
///
///     async fn execute(&self, _ctx: &TaskContext) -> Result<TaskOutput, TaskError> {
///         let mut output = TaskOutput::new();
///         output.insert("output".to_string(), "up".into());
///         Ok(output)
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync {
    /// The config this task was built from
    fn config(&self) -> &TaskConfig;

    /// Task-specific validation beyond declared parameter types
    ///
    /// Returns a list of error messages, empty when the config is usable.
    fn validate(&self) -> Vec<String> {
        Vec::new()
    }

    /// Checks preconditions before execution
    async fn pre_execute(&self, _ctx: &TaskContext) -> Result<(), TaskError> {
        debug!(
            "Task pre-execution: {} ({})",
            self.config().name,
            self.config().task_type
        );
        Ok(())
    }

    /// Runs the check
    async fn execute(&self, ctx: &TaskContext) -> Result<TaskOutput, TaskError>;

    /// Observes a successful output
    ///
    /// Errors returned here are logged by the wrapper and never change the
    /// task's status.
    async fn post_execute(&self, output: &TaskOutput) -> Result<(), TaskError> {
        debug!(
            "Task post-execution: {} (keys: {:?})",
            self.config().name,
            output.keys().collect::<Vec<_>>()
        );
        Ok(())
    }
}

/// A registered kind of task
///
/// Describes the parameters the kind accepts and builds task instances from
/// configs. One value per type tag lives in the registry.
pub trait TaskType: Send + Sync {
    /// Brief description of what tasks of this type do
    fn description(&self) -> &'static str;

    /// Declared parameters
    fn parameters(&self) -> &'static [ParamSpec] {
        &[]
    }

    /// Builds a task instance for one execution
    fn build(&self, config: TaskConfig) -> Box<dyn Task>;
}
