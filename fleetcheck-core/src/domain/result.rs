//! Check result domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::pipeline::{CheckDefinition, TargetDescriptor};

/// Outcome of one check on one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    Success,
    Error,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Success => write!(f, "Success"),
            CheckStatus::Error => write!(f, "Error"),
        }
    }
}

/// Normalized result of running one check against one target
///
/// Exactly one of these exists per (target, check) pair in a completed run,
/// whether the check ran, failed, or never started because its target was
/// unreachable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckResult {
    pub target: String,
    pub environment: String,
    pub check: String,
    pub check_type: String,
    pub status: CheckStatus,
    pub output_details: String,
    pub errors_in_output: bool,
    pub executed_on: DateTime<Utc>,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_remediation_job_url: Option<String>,
}

impl CheckResult {
    /// Builds a successful result for a (target, check) pair
    pub fn success(
        target: &TargetDescriptor,
        check: &CheckDefinition,
        output_details: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self::build(target, check, CheckStatus::Success, output_details.into(), duration_ms)
    }

    /// Builds an Error result for a (target, check) pair
    pub fn error(
        target: &TargetDescriptor,
        check: &CheckDefinition,
        output_details: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self::build(target, check, CheckStatus::Error, output_details.into(), duration_ms)
    }

    fn build(
        target: &TargetDescriptor,
        check: &CheckDefinition,
        status: CheckStatus,
        output_details: String,
        duration_ms: u64,
    ) -> Self {
        Self {
            target: target.name.clone(),
            environment: target.environment.clone(),
            check: check.name.clone(),
            check_type: check.task_type.clone(),
            status,
            output_details,
            errors_in_output: status == CheckStatus::Error,
            executed_on: Utc::now(),
            duration_ms,
            remediation_url: check.remediation_url.clone(),
            auto_remediation_job_url: check.auto_remediation_job_url.clone(),
        }
    }

    /// Whether this result counts as a failure for summaries and recommendations
    pub fn is_failure(&self) -> bool {
        self.status == CheckStatus::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_result_carries_target_and_links() {
        let target = TargetDescriptor::new("c1", "https://c1", "t", "prod");
        let check = CheckDefinition::new("pods", "shell").with_remediation_url("https://docs/pods");

        let result = CheckResult::error(&target, &check, "boom", 0);

        assert_eq!(result.target, "c1");
        assert_eq!(result.environment, "prod");
        assert_eq!(result.check, "pods");
        assert_eq!(result.status, CheckStatus::Error);
        assert!(result.errors_in_output);
        assert!(result.is_failure());
        assert_eq!(result.remediation_url.as_deref(), Some("https://docs/pods"));
    }

    #[test]
    fn test_status_serializes_as_name() {
        let json = serde_json::to_string(&CheckStatus::Success).unwrap();
        assert_eq!(json, "\"Success\"");
    }
}
