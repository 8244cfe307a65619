//! Task configuration types
//!
//! A `TaskConfig` only exists while a worker runs one check against one
//! target. It is built fresh for each (target, check) pair and dropped once
//! the check has produced its result.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};

use super::pipeline::{CheckDefinition, TargetDescriptor};

/// Placeholders in a check's `url` replaced with the target name
const TARGET_PLACEHOLDERS: [&str; 2] = ["{target}", "{cluster}"];

/// Configuration handed to a single task execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskConfig {
    pub name: String,
    pub task_type: String,
    pub params: Map<String, JsonValue>,
    /// Name of the target this config was built for
    pub target: Option<String>,
}

/// Target credentials merged into a task config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub server: String,
    pub token: String,
}

impl TaskConfig {
    /// Builds a config from a check definition alone, without target data
    pub fn from_check(check: &CheckDefinition) -> Self {
        Self {
            name: check.name.clone(),
            task_type: check.task_type.clone(),
            params: check.params.clone(),
            target: None,
        }
    }

    /// Builds the config for one (target, check) pair
    ///
    /// Merges the target's server and token into a `credentials` object and
    /// replaces target placeholders in the `url` parameter.
    pub fn for_target(check: &CheckDefinition, target: &TargetDescriptor) -> Self {
        let mut config = Self::from_check(check);

        config.params.insert(
            "credentials".to_string(),
            json!({
                "method": "token",
                "server": target.server,
                "token": target.token,
            }),
        );

        if let Some(JsonValue::String(url)) = config.params.get_mut("url") {
            for placeholder in TARGET_PLACEHOLDERS {
                if url.contains(placeholder) {
                    *url = url.replace(placeholder, &target.name);
                }
            }
        }

        config.target = Some(target.name.clone());
        config
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.params.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(JsonValue::as_str)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.params.get(key).and_then(JsonValue::as_u64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.params.get(key).and_then(JsonValue::as_bool)
    }

    /// Returns the string items of an array parameter, skipping non-strings
    pub fn get_str_list(&self, key: &str) -> Vec<String> {
        self.params
            .get(key)
            .and_then(JsonValue::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the string entries of an object parameter as key/value pairs
    ///
    /// Non-string scalars are rendered with their JSON text.
    pub fn get_str_map(&self, key: &str) -> Vec<(String, String)> {
        self.params
            .get(key)
            .and_then(JsonValue::as_object)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(k, v)| match v {
                        JsonValue::String(s) => (k.clone(), s.clone()),
                        other => (k.clone(), other.to_string()),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the merged target credentials, if any
    pub fn credentials(&self) -> Option<Credentials> {
        let creds = self.params.get("credentials")?.as_object()?;
        Some(Credentials {
            server: creds.get("server")?.as_str()?.to_string(),
            token: creds.get("token")?.as_str()?.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> TargetDescriptor {
        TargetDescriptor::new("c1", "https://api.c1:6443", "tok", "prod")
    }

    #[test]
    fn test_for_target_merges_credentials() {
        let check = CheckDefinition::new("pods", "shell").with_param("command", json!("true"));
        let config = TaskConfig::for_target(&check, &target());

        let creds = config.credentials().unwrap();
        assert_eq!(creds.server, "https://api.c1:6443");
        assert_eq!(creds.token, "tok");
        assert_eq!(config.target.as_deref(), Some("c1"));
        assert_eq!(config.get_str("command"), Some("true"));
    }

    #[test]
    fn test_for_target_replaces_url_placeholders() {
        let check = CheckDefinition::new("api", "rest_call")
            .with_param("url", json!("https://status/{cluster}/health?t={target}"));
        let config = TaskConfig::for_target(&check, &target());

        assert_eq!(config.get_str("url"), Some("https://status/c1/health?t=c1"));
    }

    #[test]
    fn test_for_target_leaves_check_untouched() {
        let check = CheckDefinition::new("api", "rest_call").with_param("url", json!("https://{target}"));
        let _ = TaskConfig::for_target(&check, &target());

        assert_eq!(check.params.get("url"), Some(&json!("https://{target}")));
        assert!(!check.params.contains_key("credentials"));
    }

    #[test]
    fn test_typed_accessors() {
        let check = CheckDefinition::new("x", "shell")
            .with_param("args", json!(["-a", 1, "-b"]))
            .with_param("env_vars", json!({"A": "1", "B": 2}))
            .with_param("timeout", json!(30))
            .with_param("shell", json!(false));
        let config = TaskConfig::from_check(&check);

        assert_eq!(config.get_str_list("args"), vec!["-a", "-b"]);
        let mut env = config.get_str_map("env_vars");
        env.sort();
        assert_eq!(
            env,
            vec![("A".to_string(), "1".to_string()), ("B".to_string(), "2".to_string())]
        );
        assert_eq!(config.get_u64("timeout"), Some(30));
        assert_eq!(config.get_bool("shell"), Some(false));
        assert!(config.credentials().is_none());
    }
}
