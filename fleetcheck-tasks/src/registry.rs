use fleetcheck_core::domain::task::TaskConfig;
use std::sync::Arc;
use tracing::info;

use crate::builtin::{RestCallTaskType, ShellTaskType};
use crate::params::{ParamSpec, validate_params};
use crate::task::TaskType;

/// Registry for task types
///
/// Maps a type tag (the `type` field of a check) to the task type that
/// builds and validates it. The registry is an ordinary owned value: build
/// one per engine and pass it by reference.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    entries: Vec<(String, Arc<dyn TaskType>)>,
}

/// Description of a registered task type
#[derive(Debug, Clone)]
pub struct TaskTypeInfo {
    pub type_tag: String,
    pub description: &'static str,
    pub parameters: &'static [ParamSpec],
}

impl TaskRegistry {
    /// Creates a new empty task registry
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates a registry with the built-in task types registered
    pub fn with_builtin_tasks() -> Self {
        let mut registry = Self::new();
        registry.register("shell", ShellTaskType);
        registry.register("rest_call", RestCallTaskType::new());
        registry
    }

    /// Registers a task type under a tag
    ///
    /// Registering an existing tag replaces its task type and keeps the tag's
    /// original position in `list_types`.
    pub fn register<T: TaskType + 'static>(&mut self, type_tag: impl Into<String>, task_type: T) {
        let type_tag = type_tag.into();
        let task_type: Arc<dyn TaskType> = Arc::new(task_type);

        match self.entries.iter_mut().find(|(tag, _)| *tag == type_tag) {
            Some(entry) => {
                info!("Re-registered task type: {}", type_tag);
                entry.1 = task_type;
            }
            None => {
                info!("Registered task type: {}", type_tag);
                self.entries.push((type_tag, task_type));
            }
        }
    }

    /// Gets a task type by its tag
    pub fn lookup(&self, type_tag: &str) -> Option<&dyn TaskType> {
        self.entries
            .iter()
            .find(|(tag, _)| tag == type_tag)
            .map(|(_, task_type)| task_type.as_ref())
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.lookup(type_tag).is_some()
    }

    /// Validates a config against the declared parameters of a task type
    ///
    /// Returns a single `Unknown type` error for an unregistered tag instead
    /// of failing.
    pub fn validate_config(&self, type_tag: &str, config: &TaskConfig) -> Vec<String> {
        match self.lookup(type_tag) {
            Some(task_type) => validate_params(task_type.parameters(), &config.params),
            None => vec![format!("Unknown type: {}", type_tag)],
        }
    }

    /// Returns registered tags in registration order
    pub fn list_types(&self) -> Vec<String> {
        self.entries.iter().map(|(tag, _)| tag.clone()).collect()
    }

    /// Returns a description of every registered task type
    pub fn describe(&self) -> Vec<TaskTypeInfo> {
        self.entries
            .iter()
            .map(|(tag, task_type)| TaskTypeInfo {
                type_tag: tag.clone(),
                description: task_type.description(),
                parameters: task_type.parameters(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamKind;
    use crate::task::{Task, TaskContext, TaskOutput};
    use async_trait::async_trait;
    use fleetcheck_core::domain::pipeline::CheckDefinition;
    use fleetcheck_core::error::TaskError;
    use serde_json::json;

    struct NoopTask {
        config: TaskConfig,
    }

    #[async_trait]
    impl Task for NoopTask {
        fn config(&self) -> &TaskConfig {
            &self.config
        }

        async fn execute(&self, _ctx: &TaskContext) -> Result<TaskOutput, TaskError> {
            Ok(TaskOutput::new())
        }
    }

    struct ProbeType {
        description: &'static str,
    }

    const PROBE_PARAMS: [ParamSpec; 2] = [
        ParamSpec::required("endpoint", ParamKind::String, "Endpoint to probe"),
        ParamSpec::optional("retries", ParamKind::Integer, "Retry count"),
    ];

    impl TaskType for ProbeType {
        fn description(&self) -> &'static str {
            self.description
        }

        fn parameters(&self) -> &'static [ParamSpec] {
            &PROBE_PARAMS
        }

        fn build(&self, config: TaskConfig) -> Box<dyn Task> {
            Box::new(NoopTask { config })
        }
    }

    fn config(value: serde_json::Value) -> TaskConfig {
        let mut check = CheckDefinition::new("probe", "probe");
        check.params = value.as_object().cloned().unwrap();
        TaskConfig::from_check(&check)
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = TaskRegistry::new();
        registry.register("probe", ProbeType { description: "v1" });

        assert!(registry.lookup("probe").is_some());
        assert!(registry.lookup("nonexistent").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reregistration_last_write_wins() {
        let mut registry = TaskRegistry::new();
        registry.register("probe", ProbeType { description: "v1" });
        registry.register("other", ProbeType { description: "other" });
        registry.register("probe", ProbeType { description: "v2" });

        assert_eq!(registry.list_types(), vec!["probe", "other"]);
        assert_eq!(registry.lookup("probe").unwrap().description(), "v2");
    }

    #[test]
    fn test_validate_config_unknown_type() {
        let registry = TaskRegistry::new();
        let errors = registry.validate_config("X", &config(json!({})));

        assert_eq!(errors, vec!["Unknown type: X"]);
    }

    #[test]
    fn test_validate_config_missing_and_mismatched() {
        let mut registry = TaskRegistry::new();
        registry.register("probe", ProbeType { description: "v1" });

        let errors = registry.validate_config("probe", &config(json!({"retries": "3"})));
        assert_eq!(
            errors,
            vec![
                "Missing required parameter: endpoint",
                "Parameter retries must be integer, got string"
            ]
        );

        // Same input, same list
        let again = registry.validate_config("probe", &config(json!({"retries": "3"})));
        assert_eq!(errors, again);
    }

    #[test]
    fn test_builtin_registration_order() {
        let registry = TaskRegistry::with_builtin_tasks();
        assert_eq!(registry.list_types(), vec!["shell", "rest_call"]);

        let info = registry.describe();
        assert_eq!(info[0].type_tag, "shell");
        assert!(info[0].parameters.iter().any(|p| p.name == "command" && p.required));
    }

    #[test]
    fn test_independent_registries() {
        let mut a = TaskRegistry::new();
        let b = TaskRegistry::new();
        a.register("probe", ProbeType { description: "v1" });

        assert!(a.contains("probe"));
        assert!(!b.contains("probe"));
    }
}
