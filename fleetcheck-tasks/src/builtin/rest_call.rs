//! REST call task
//!
//! Issues one HTTP request and checks the response status.

use async_trait::async_trait;
use fleetcheck_core::domain::task::TaskConfig;
use fleetcheck_core::error::TaskError;
use reqwest::{Client, Method};
use serde_json::{Value as JsonValue, json};
use std::time::Duration;
use tracing::debug;

use crate::params::{ParamKind, ParamSpec};
use crate::task::{Task, TaskContext, TaskOutput, TaskType};

/// Response bodies longer than this are truncated in the task output
const MAX_BODY_CHARS: usize = 4096;

const ALLOWED_METHODS: [&str; 6] = ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD"];

const REST_CALL_PARAMS: [ParamSpec; 7] = [
    ParamSpec::required("url", ParamKind::String, "Request URL; {target} is replaced with the target name"),
    ParamSpec::optional("method", ParamKind::String, "HTTP method (default GET)"),
    ParamSpec::optional("headers", ParamKind::Object, "Request headers"),
    ParamSpec::optional("body", ParamKind::Object, "JSON request body"),
    ParamSpec::optional("timeout", ParamKind::Integer, "Request timeout in seconds"),
    ParamSpec::optional("expected_status", ParamKind::Integer, "Required status code (default any 2xx)"),
    ParamSpec::optional("bearer_from_target", ParamKind::Boolean, "Send the target token as a bearer token"),
];

/// Task type for `rest_call` checks
///
/// Holds one HTTP client shared by every task it builds.
#[derive(Clone, Default)]
pub struct RestCallTaskType {
    client: Client,
}

impl RestCallTaskType {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Uses a custom HTTP client (proxies, TLS settings)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl TaskType for RestCallTaskType {
    fn description(&self) -> &'static str {
        "Make HTTP requests to REST endpoints"
    }

    fn parameters(&self) -> &'static [ParamSpec] {
        &REST_CALL_PARAMS
    }

    fn build(&self, config: TaskConfig) -> Box<dyn Task> {
        Box::new(RestCallTask::new(config, self.client.clone()))
    }
}

/// One HTTP request
pub struct RestCallTask {
    config: TaskConfig,
    client: Client,
}

impl RestCallTask {
    pub fn new(config: TaskConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn url(&self) -> &str {
        self.config.get_str("url").unwrap_or_default()
    }

    fn method(&self) -> String {
        self.config
            .get_str("method")
            .unwrap_or("GET")
            .to_uppercase()
    }

    fn map_request_error(&self, e: reqwest::Error, timeout: Duration) -> TaskError {
        if e.is_timeout() {
            TaskError::Timeout {
                operation: format!("{} {}", self.method(), self.url()),
                seconds: timeout.as_secs(),
            }
        } else if e.is_connect() {
            TaskError::connection(self.url(), e.to_string())
        } else {
            TaskError::execution(format!("HTTP request failed: {}", e))
        }
    }
}

#[async_trait]
impl Task for RestCallTask {
    fn config(&self) -> &TaskConfig {
        &self.config
    }

    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let url = self.url();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            errors.push(format!("Parameter url must start with http:// or https://, got '{}'", url));
        }

        let method = self.method();
        if !ALLOWED_METHODS.contains(&method.as_str()) {
            errors.push(format!("Unsupported HTTP method: {}", method));
        }

        if self.config.get_u64("timeout") == Some(0) {
            errors.push("Parameter timeout must be greater than 0".to_string());
        }

        errors
    }

    async fn execute(&self, ctx: &TaskContext) -> Result<TaskOutput, TaskError> {
        let timeout = self
            .config
            .get_u64("timeout")
            .map(Duration::from_secs)
            .unwrap_or(ctx.default_timeout);

        let method = Method::from_bytes(self.method().as_bytes())
            .map_err(|e| TaskError::execution(format!("Invalid HTTP method: {}", e)))?;

        debug!("Sending {} {}", method, self.url());

        let mut request = self.client.request(method, self.url()).timeout(timeout);
        for (name, value) in self.config.get_str_map("headers") {
            request = request.header(name, value);
        }
        if let Some(body) = self.config.get("body") {
            request = request.json(body);
        }
        if self.config.get_bool("bearer_from_target").unwrap_or(false) {
            let creds = self.config.credentials().ok_or_else(|| {
                TaskError::Precondition("bearer_from_target set but no target credentials".to_string())
            })?;
            request = request.bearer_auth(creds.token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.map_request_error(e, timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_request_error(e, timeout))?;

        let status_ok = match self.config.get_u64("expected_status") {
            Some(expected) => u64::from(status.as_u16()) == expected,
            None => status.is_success(),
        };
        if !status_ok {
            return Err(TaskError::execution(format!(
                "Unexpected HTTP status {} from {}",
                status,
                self.url()
            )));
        }

        let mut result = TaskOutput::new();
        result.insert("url".to_string(), json!(self.url()));
        result.insert("status_code".to_string(), json!(status.as_u16()));
        result.insert("output".to_string(), json!(format!("HTTP {}", status)));
        if let Ok(parsed) = serde_json::from_str::<JsonValue>(&body) {
            result.insert("json".to_string(), parsed);
        }
        result.insert(
            "body".to_string(),
            json!(body.chars().take(MAX_BODY_CHARS).collect::<String>()),
        );
        Ok(result)
    }
}
