//! Declared task parameters
//!
//! Each task type declares the parameters it understands. Configs keep an
//! open map so type-specific extras pass through, while declared parameters
//! are checked for presence and JSON type before a task is built.

use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// Expected JSON type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    /// Any JSON number, integers included
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamKind {
    pub fn name(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
            ParamKind::Array => "array",
            ParamKind::Object => "object",
        }
    }

    /// Whether a JSON value satisfies this kind
    pub fn matches(&self, value: &JsonValue) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Integer => value.is_i64() || value.is_u64(),
            ParamKind::Number => value.is_number(),
            ParamKind::Boolean => value.is_boolean(),
            ParamKind::Array => value.is_array(),
            ParamKind::Object => value.is_object(),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Name of the JSON type of a value, as used in validation messages
pub fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(n) if n.is_i64() || n.is_u64() => "integer",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Declaration of one task parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }
}

/// Validates a parameter map against declared specs
///
/// Reports missing required parameters first, then type mismatches, both in
/// declaration order so the same config always yields the same list.
pub fn validate_params(specs: &[ParamSpec], params: &Map<String, JsonValue>) -> Vec<String> {
    let mut errors = Vec::new();

    for spec in specs.iter().filter(|s| s.required) {
        if !params.contains_key(spec.name) {
            errors.push(format!("Missing required parameter: {}", spec.name));
        }
    }

    for spec in specs {
        if let Some(value) = params.get(spec.name) {
            if !spec.kind.matches(value) {
                errors.push(format!(
                    "Parameter {} must be {}, got {}",
                    spec.name,
                    spec.kind,
                    json_type_name(value)
                ));
            }
        }
    }

    errors
}
