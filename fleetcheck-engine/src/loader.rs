//! Pipeline file loading
//!
//! Reads a pipeline document from YAML or JSON. Placeholders are left for
//! the engine to resolve.

use anyhow::{Context, Result};
use fleetcheck_core::domain::pipeline::PipelineSpec;
use serde_json::Value as JsonValue;
use std::path::Path;
use tracing::debug;

use crate::error::EngineError;

/// Supported pipeline document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineFormat {
    Yaml,
    Json,
}

impl PipelineFormat {
    /// Format implied by a file extension; YAML unless the file says `.json`
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Parses a pipeline document
pub fn parse_pipeline(source: &str, format: PipelineFormat) -> Result<PipelineSpec, EngineError> {
    let document: JsonValue = match format {
        PipelineFormat::Yaml => {
            serde_yaml::from_str(source).map_err(|e| EngineError::Spec(e.to_string()))?
        }
        PipelineFormat::Json => {
            serde_json::from_str(source).map_err(|e| EngineError::Spec(e.to_string()))?
        }
    };

    if !document.is_object() {
        return Err(EngineError::Spec(
            "pipeline document must be a mapping".to_string(),
        ));
    }

    serde_json::from_value(document).map_err(|e| EngineError::Spec(e.to_string()))
}

/// Reads and parses a pipeline file
pub async fn load_pipeline(path: &Path) -> Result<PipelineSpec> {
    let source = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read pipeline file {}", path.display()))?;

    let format = PipelineFormat::from_path(path);
    debug!("Parsing {} as {:?}", path.display(), format);

    let spec = parse_pipeline(&source, format)
        .with_context(|| format!("Failed to parse pipeline file {}", path.display()))?;
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML_PIPELINE: &str = r#"
name: nightly health
clusters:
  - name: c1
    server: https://api.c1.example:6443
    token: ${C1_TOKEN}
    environment: prod
health_checks:
  - name: api-health
    type: rest_call
    url: https://status.example/{cluster}
    expected_status: 200
    remediation_url: https://docs.example/api
  - name: nodes
    type: shell
    command: kubectl get nodes
"#;

    #[test]
    fn test_parse_yaml_with_legacy_keys() {
        let spec = parse_pipeline(YAML_PIPELINE, PipelineFormat::Yaml).unwrap();

        assert_eq!(spec.name, "nightly health");
        assert_eq!(spec.targets.len(), 1);
        assert_eq!(spec.targets[0].token, "${C1_TOKEN}");
        assert_eq!(spec.checks.len(), 2);
        assert_eq!(spec.checks[0].task_type, "rest_call");
        assert_eq!(
            spec.checks[0].remediation_url.as_deref(),
            Some("https://docs.example/api")
        );
        assert_eq!(spec.checks[0].params.get("expected_status"), Some(&serde_json::json!(200)));
        assert_eq!(spec.checks[1].params.get("command"), Some(&serde_json::json!("kubectl get nodes")));
    }

    #[test]
    fn test_parse_json() {
        let spec = parse_pipeline(
            r#"{"targets": [{"name": "a", "server": "https://a", "token": "t"}], "checks": []}"#,
            PipelineFormat::Json,
        )
        .unwrap();

        assert_eq!(spec.name, "Unknown");
        assert_eq!(spec.targets[0].environment, "unknown");
        assert!(spec.checks.is_empty());
    }

    #[test]
    fn test_parse_rejects_non_mapping() {
        let err = parse_pipeline("- a\n- b\n", PipelineFormat::Yaml).unwrap_err();
        assert!(matches!(err, EngineError::Spec(_)));
    }

    #[test]
    fn test_check_without_type_is_rejected() {
        let err = parse_pipeline("checks:\n  - name: nameless\n", PipelineFormat::Yaml).unwrap_err();
        assert!(err.to_string().starts_with("Invalid pipeline specification: "));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(PipelineFormat::from_path(Path::new("p.JSON")), PipelineFormat::Json);
        assert_eq!(PipelineFormat::from_path(Path::new("p.yml")), PipelineFormat::Yaml);
        assert_eq!(PipelineFormat::from_path(Path::new("pipeline")), PipelineFormat::Yaml);
    }

    #[tokio::test]
    async fn test_load_pipeline_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.yaml");
        std::fs::write(&path, YAML_PIPELINE).unwrap();

        let spec = load_pipeline(&path).await.unwrap();
        assert_eq!(spec.targets[0].name, "c1");

        let missing = load_pipeline(&dir.path().join("missing.yaml")).await.unwrap_err();
        assert!(missing.to_string().contains("Failed to read pipeline file"));
    }
}
