//! Pipeline domain types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// Pipeline specification
///
/// A named collection of targets and checks run together. Every check is run
/// once against every target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSpec {
    #[serde(default = "default_pipeline_name")]
    pub name: String,
    #[serde(default, alias = "clusters")]
    pub targets: Vec<TargetDescriptor>,
    #[serde(default, alias = "health_checks")]
    pub checks: Vec<CheckDefinition>,
}

fn default_pipeline_name() -> String {
    "Unknown".to_string()
}

fn default_environment() -> String {
    "unknown".to_string()
}

/// An independently addressed target (e.g. a cluster)
///
/// Missing string fields deserialize as empty so that the engine can report
/// every incomplete target at once instead of failing on the first.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl TargetDescriptor {
    pub fn new(
        name: impl Into<String>,
        server: impl Into<String>,
        token: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            server: server.into(),
            token: token.into(),
            environment: environment.into(),
        }
    }
}

// Tokens never end up in logs.
impl fmt::Debug for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetDescriptor")
            .field("name", &self.name)
            .field("server", &self.server)
            .field("token", &if self.token.is_empty() { "" } else { "***" })
            .field("environment", &self.environment)
            .finish()
    }
}

/// A named check of a given type
///
/// Type-specific fields are kept in an open map and validated against the
/// parameter spec the task type declares.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_remediation_job_url: Option<String>,
    #[serde(flatten)]
    pub params: Map<String, JsonValue>,
}

impl CheckDefinition {
    pub fn new(name: impl Into<String>, task_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            task_type: task_type.into(),
            remediation_url: None,
            auto_remediation_job_url: None,
            params: Map::new(),
        }
    }

    /// Adds a type-specific parameter
    pub fn with_param(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    pub fn with_remediation_url(mut self, url: impl Into<String>) -> Self {
        self.remediation_url = Some(url.into());
        self
    }
}
