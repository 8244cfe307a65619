//! Environment placeholder resolution
//!
//! Replaces `${NAME}` in every string of a configuration value with the
//! value of environment variable `NAME`. Unset variables leave the
//! placeholder verbatim. Mapping keys are never rewritten.

use regex::{Captures, Regex};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// Source of environment values for placeholder resolution
pub trait EnvSource: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl EnvSource for SystemEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed environment snapshot
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Substitutes placeholders in a single string
pub fn resolve_str(value: &str, env: &dyn EnvSource) -> String {
    PLACEHOLDER_RE
        .replace_all(value, |caps: &Captures| {
            env.get(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Substitutes placeholders through an arbitrarily nested value
///
/// The result has the same shape as the input; only string scalars change.
pub fn resolve_value(value: &JsonValue, env: &dyn EnvSource) -> JsonValue {
    match value {
        JsonValue::String(s) => JsonValue::String(resolve_str(s, env)),
        JsonValue::Array(items) => {
            JsonValue::Array(items.iter().map(|item| resolve_value(item, env)).collect())
        }
        JsonValue::Object(entries) => JsonValue::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), resolve_value(v, env)))
                .collect(),
        ),
        other => other.clone(),
    }
}
