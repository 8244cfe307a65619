//! Task lifecycle
//!
//! Drives any registered task through validate, pre-execute, execute and
//! post-execute, and normalizes the outcome into a `TaskRecord`. Nothing a
//! task does, including panicking, escapes `run_task`: every call returns a
//! record with a status.

use chrono::{DateTime, Utc};
use fleetcheck_core::domain::task::TaskConfig;
use fleetcheck_core::error::TaskError;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::registry::TaskRegistry;
use crate::task::{Task, TaskContext, TaskOutput};

/// Final status of a task run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Completed,
    Failed,
}

/// Metadata block attached to every task record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskMetadata {
    pub task_name: String,
    pub task_type: String,
    pub duration_ms: u64,
    pub status: TaskStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the failure is of a kind a caller may retry
    #[serde(default)]
    pub retryable: bool,
}

/// Normalized outcome of one task run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Task output, present only when the task completed
    pub output: Option<TaskOutput>,
    #[serde(rename = "_metadata")]
    pub metadata: TaskMetadata,
}

impl TaskRecord {
    fn completed(config: &TaskConfig, output: TaskOutput, duration: Duration) -> Self {
        Self {
            output: Some(output),
            metadata: TaskMetadata {
                task_name: config.name.clone(),
                task_type: config.task_type.clone(),
                duration_ms: duration.as_millis() as u64,
                status: TaskStatus::Completed,
                timestamp: Utc::now(),
                error: None,
                retryable: false,
            },
        }
    }

    fn failed(config: &TaskConfig, error: &TaskError, duration: Duration) -> Self {
        Self {
            output: None,
            metadata: TaskMetadata {
                task_name: config.name.clone(),
                task_type: config.task_type.clone(),
                duration_ms: duration.as_millis() as u64,
                status: TaskStatus::Failed,
                timestamp: Utc::now(),
                error: Some(error.to_string()),
                retryable: error.is_retryable(),
            },
        }
    }

    pub fn is_completed(&self) -> bool {
        self.metadata.status == TaskStatus::Completed
    }

    /// Human-readable details for reports
    ///
    /// The error message for failed runs; for completed runs the `output`
    /// field when the task set one, otherwise the whole output as JSON.
    pub fn details(&self) -> String {
        if let Some(err) = &self.metadata.error {
            return err.clone();
        }

        match &self.output {
            Some(output) => match output.get("output") {
                Some(JsonValue::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => JsonValue::Object(output.clone()).to_string(),
            },
            None => String::new(),
        }
    }
}

/// Runs one task through its full lifecycle
///
/// 1. Validates the config against the registry (unknown type included) and
///    the task's own checks; any error short-circuits without executing.
/// 2. Runs `pre_execute`, then `execute` if the precondition held.
/// 3. Runs `post_execute` on success; its failure is logged only.
/// 4. Returns a record with status, duration and error message.
pub async fn run_task(registry: &TaskRegistry, config: TaskConfig, ctx: &TaskContext) -> TaskRecord {
    let validation_started = Instant::now();

    let errors = registry.validate_config(&config.task_type, &config);
    if !errors.is_empty() {
        return validation_failure(&config, errors, validation_started.elapsed());
    }

    let Some(task_type) = registry.lookup(&config.task_type) else {
        let errors = vec![format!("Unknown type: {}", config.task_type)];
        return validation_failure(&config, errors, validation_started.elapsed());
    };

    let prepared = std::panic::catch_unwind(AssertUnwindSafe(|| {
        let task = task_type.build(config.clone());
        let errors = task.validate();
        (task, errors)
    }));

    let task = match prepared {
        Ok((task, errors)) if errors.is_empty() => task,
        Ok((_, errors)) => {
            return validation_failure(&config, errors, validation_started.elapsed());
        }
        Err(panic) => {
            let error = TaskError::execution(panic_message(panic));
            error!("Task {} failed before execution: {}", config.name, error);
            return TaskRecord::failed(&config, &error, validation_started.elapsed());
        }
    };

    info!(
        "Task execution started: {} ({}){}",
        config.name,
        config.task_type,
        ctx.target
            .as_deref()
            .map(|t| format!(" on {}", t))
            .unwrap_or_default()
    );

    let started = Instant::now();
    let outcome = AssertUnwindSafe(drive(task.as_ref(), ctx))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(TaskError::execution(panic_message(panic))));
    let duration = started.elapsed();

    match outcome {
        Ok(output) => {
            info!(
                "Task execution completed: {} in {:?}",
                config.name, duration
            );
            TaskRecord::completed(&config, output, duration)
        }
        Err(e) => {
            error!(
                "Task execution failed: {} after {:?}: {}",
                config.name, duration, e
            );
            TaskRecord::failed(&config, &e, duration)
        }
    }
}

/// pre_execute -> execute -> post_execute
async fn drive(task: &dyn Task, ctx: &TaskContext) -> Result<TaskOutput, TaskError> {
    task.pre_execute(ctx).await?;
    let output = task.execute(ctx).await?;

    if let Err(e) = task.post_execute(&output).await {
        warn!(
            "Post-execution hook failed for task {}: {}",
            task.config().name,
            e
        );
    }

    Ok(output)
}

fn validation_failure(config: &TaskConfig, errors: Vec<String>, duration: Duration) -> TaskRecord {
    warn!(
        "Task {} ({}) failed validation: {}",
        config.name,
        config.task_type,
        errors.join("; ")
    );
    let error = TaskError::execution(format!(
        "Configuration validation failed: {}",
        errors.join("; ")
    ));
    TaskRecord::failed(config, &error, duration)
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("Task panicked: {}", message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParamKind, ParamSpec};
    use crate::task::TaskType;
    use async_trait::async_trait;
    use fleetcheck_core::domain::pipeline::CheckDefinition;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Behavior of the scripted task, chosen through the `mode` parameter
    struct ScriptedTask {
        config: TaskConfig,
        executions: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Task for ScriptedTask {
        fn config(&self) -> &TaskConfig {
            &self.config
        }

        fn validate(&self) -> Vec<String> {
            match self.config.get_str("mode") {
                Some("invalid") => vec!["mode must not be invalid".to_string()],
                Some("validate_panic") => panic!("validate exploded"),
                _ => Vec::new(),
            }
        }

        async fn pre_execute(&self, _ctx: &TaskContext) -> Result<(), TaskError> {
            match self.config.get_str("mode") {
                Some("pre_fail") => Err(TaskError::Precondition("not ready".to_string())),
                _ => Ok(()),
            }
        }

        async fn execute(&self, _ctx: &TaskContext) -> Result<TaskOutput, TaskError> {
            self.executions.fetch_add(1, Ordering::SeqCst);
            match self.config.get_str("mode") {
                Some("fail") => Err(TaskError::execution("exit code 2")),
                Some("timeout") => Err(TaskError::Timeout {
                    operation: "probe".to_string(),
                    seconds: 1,
                }),
                Some("panic") => panic!("scripted panic"),
                _ => {
                    let mut output = TaskOutput::new();
                    output.insert("output".to_string(), json!("all good"));
                    Ok(output)
                }
            }
        }

        async fn post_execute(&self, _output: &TaskOutput) -> Result<(), TaskError> {
            match self.config.get_str("post") {
                Some("fail") => Err(TaskError::execution("post hook broke")),
                _ => Ok(()),
            }
        }
    }

    struct ScriptedType {
        executions: Arc<AtomicUsize>,
    }

    const SCRIPTED_PARAMS: [ParamSpec; 2] = [
        ParamSpec::required("mode", ParamKind::String, "Scripted behavior"),
        ParamSpec::optional("post", ParamKind::String, "Post hook behavior"),
    ];

    impl TaskType for ScriptedType {
        fn description(&self) -> &'static str {
            "Scripted task for tests"
        }

        fn parameters(&self) -> &'static [ParamSpec] {
            &SCRIPTED_PARAMS
        }

        fn build(&self, config: TaskConfig) -> Box<dyn Task> {
            if config.get_str("mode") == Some("build_panic") {
                panic!("build exploded");
            }
            Box::new(ScriptedTask {
                config,
                executions: self.executions.clone(),
            })
        }
    }

    fn setup() -> (TaskRegistry, Arc<AtomicUsize>) {
        let executions = Arc::new(AtomicUsize::new(0));
        let mut registry = TaskRegistry::new();
        registry.register(
            "scripted",
            ScriptedType {
                executions: executions.clone(),
            },
        );
        (registry, executions)
    }

    fn config(task_type: &str, params: serde_json::Value) -> TaskConfig {
        let mut check = CheckDefinition::new("check-1", task_type);
        check.params = params.as_object().cloned().unwrap();
        TaskConfig::from_check(&check)
    }

    #[tokio::test]
    async fn test_completed_run() {
        let (registry, executions) = setup();
        let record = run_task(&registry, config("scripted", json!({"mode": "ok"})), &TaskContext::default()).await;

        assert!(record.is_completed());
        assert_eq!(record.metadata.task_name, "check-1");
        assert_eq!(record.metadata.task_type, "scripted");
        assert!(record.metadata.error.is_none());
        assert_eq!(record.details(), "all good");
        assert_eq!(executions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_registry_validation_short_circuits() {
        let (registry, executions) = setup();
        let record = run_task(&registry, config("scripted", json!({})), &TaskContext::default()).await;

        assert_eq!(record.metadata.status, TaskStatus::Failed);
        assert!(record.details().contains("Missing required parameter: mode"));
        assert_eq!(executions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_task_validation_short_circuits() {
        let (registry, executions) = setup();
        let record = run_task(&registry, config("scripted", json!({"mode": "invalid"})), &TaskContext::default()).await;

        assert_eq!(record.metadata.status, TaskStatus::Failed);
        assert!(record.details().contains("mode must not be invalid"));
        assert_eq!(executions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_type_fails_without_error() {
        let (registry, _) = setup();
        let record = run_task(&registry, config("X", json!({})), &TaskContext::default()).await;

        assert_eq!(record.metadata.status, TaskStatus::Failed);
        assert!(record.details().contains("Unknown type: X"));
    }

    #[tokio::test]
    async fn test_pre_execute_failure_skips_execute() {
        let (registry, executions) = setup();
        let record = run_task(&registry, config("scripted", json!({"mode": "pre_fail"})), &TaskContext::default()).await;

        assert_eq!(record.metadata.status, TaskStatus::Failed);
        assert_eq!(record.details(), "Precondition failed: not ready");
        assert_eq!(executions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_execute_failure() {
        let (registry, _) = setup();
        let record = run_task(&registry, config("scripted", json!({"mode": "fail"})), &TaskContext::default()).await;

        assert_eq!(record.metadata.status, TaskStatus::Failed);
        assert_eq!(record.metadata.error.as_deref(), Some("exit code 2"));
        assert!(!record.metadata.retryable);
        assert!(record.output.is_none());
    }

    #[tokio::test]
    async fn test_timeout_is_marked_retryable() {
        let (registry, _) = setup();
        let record = run_task(&registry, config("scripted", json!({"mode": "timeout"})), &TaskContext::default()).await;

        assert_eq!(record.metadata.status, TaskStatus::Failed);
        assert!(record.metadata.retryable);
    }

    #[tokio::test]
    async fn test_post_execute_failure_keeps_status() {
        let (registry, _) = setup();
        let record = run_task(
            &registry,
            config("scripted", json!({"mode": "ok", "post": "fail"})),
            &TaskContext::default(),
        )
        .await;

        assert!(record.is_completed());
        assert_eq!(record.details(), "all good");
    }

    #[tokio::test]
    async fn test_panicking_task_becomes_failed_record() {
        let (registry, _) = setup();
        let record = run_task(&registry, config("scripted", json!({"mode": "panic"})), &TaskContext::default()).await;

        assert_eq!(record.metadata.status, TaskStatus::Failed);
        assert!(record.details().contains("scripted panic"));
    }

    #[tokio::test]
    async fn test_panicking_validate_becomes_failed_record() {
        let (registry, executions) = setup();
        let record = run_task(
            &registry,
            config("scripted", json!({"mode": "validate_panic"})),
            &TaskContext::default(),
        )
        .await;

        assert_eq!(record.metadata.status, TaskStatus::Failed);
        assert_eq!(record.details(), "Task panicked: validate exploded");
        assert_eq!(executions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_panicking_build_becomes_failed_record() {
        let (registry, executions) = setup();
        let record = run_task(
            &registry,
            config("scripted", json!({"mode": "build_panic"})),
            &TaskContext::default(),
        )
        .await;

        assert_eq!(record.metadata.status, TaskStatus::Failed);
        assert_eq!(record.details(), "Task panicked: build exploded");
        assert_eq!(executions.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_details_falls_back_to_json() {
        let mut output = TaskOutput::new();
        output.insert("return_code".to_string(), json!(0));
        let record = TaskRecord::completed(
            &config("scripted", json!({})),
            output,
            Duration::from_millis(5),
        );

        assert_eq!(record.details(), "{\"return_code\":0}");
        assert_eq!(record.metadata.duration_ms, 5);
    }
}
