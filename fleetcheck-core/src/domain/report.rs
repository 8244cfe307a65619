//! Run report domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::result::CheckResult;

/// Per-environment roll-up of check results
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentSummary {
    pub targets: usize,
    pub total_checks: usize,
    pub successful_checks: usize,
    /// successful / total * 100, or 0 when there are no checks
    pub success_rate: f64,
}

impl EnvironmentSummary {
    pub fn failed_checks(&self) -> usize {
        self.total_checks - self.successful_checks
    }
}

/// Terminal artifact of a pipeline run
///
/// Assembled after every worker has been joined, then handed to whatever
/// result sink the caller supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRunResult {
    pub run_id: Uuid,
    pub run_name: String,
    pub generated_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub results: Vec<CheckResult>,
    pub environment_summary: BTreeMap<String, EnvironmentSummary>,
    pub recommendations: Vec<String>,
}

impl PipelineRunResult {
    pub fn total_checks(&self) -> usize {
        self.results.len()
    }

    pub fn failed_checks(&self) -> usize {
        self.results.iter().filter(|r| r.is_failure()).count()
    }

    /// Whether every check on every target succeeded
    pub fn is_healthy(&self) -> bool {
        self.failed_checks() == 0
    }

    /// Results for one target, in check-definition order
    pub fn results_for<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a CheckResult> + 'a {
        self.results.iter().filter(move |r| r.target == target)
    }
}
