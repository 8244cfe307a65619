//! Result aggregation
//!
//! Turns the joined check results into per-environment summaries and
//! remediation recommendations.

use chrono::Utc;
use fleetcheck_core::domain::report::{EnvironmentSummary, PipelineRunResult};
use fleetcheck_core::domain::result::CheckResult;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use uuid::Uuid;

/// Environment tag whose failures trigger the critical recommendation
pub const PRODUCTION_ENVIRONMENT: &str = "prod";

const PRODUCTION_CRITICAL: &str =
    "Critical: Production environment has issues. Prioritize immediate resolution.";

/// Groups results by environment tag
pub fn summarize(results: &[CheckResult]) -> BTreeMap<String, EnvironmentSummary> {
    let mut summaries: BTreeMap<String, EnvironmentSummary> = BTreeMap::new();
    let mut targets_seen: HashSet<(&str, &str)> = HashSet::new();

    for result in results {
        let summary = summaries.entry(result.environment.clone()).or_default();

        if targets_seen.insert((result.environment.as_str(), result.target.as_str())) {
            summary.targets += 1;
        }
        summary.total_checks += 1;
        if !result.is_failure() {
            summary.successful_checks += 1;
        }
    }

    for summary in summaries.values_mut() {
        summary.success_rate = success_rate(summary.successful_checks, summary.total_checks);
    }

    summaries
}

/// successful / total * 100, or 0 when there is nothing to rate
pub fn success_rate(successful: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        successful as f64 / total as f64 * 100.0
    }
}

/// Builds remediation recommendations from failing results
///
/// One message per target with failures, in first-seen target order:
/// more than two distinct failing checks asks for a target-wide
/// investigation, exactly one names the check. Exactly two produces no
/// message. A single production warning closes the list when any failure
/// comes from the `prod` environment.
pub fn recommend(results: &[CheckResult]) -> Vec<String> {
    let mut failing_by_target: Vec<(&str, Vec<&str>)> = Vec::new();

    for result in results.iter().filter(|r| r.is_failure()) {
        let index = match failing_by_target
            .iter()
            .position(|(target, _)| *target == result.target)
        {
            Some(index) => index,
            None => {
                failing_by_target.push((result.target.as_str(), Vec::new()));
                failing_by_target.len() - 1
            }
        };

        let checks = &mut failing_by_target[index].1;
        if !checks.contains(&result.check.as_str()) {
            checks.push(result.check.as_str());
        }
    }

    let mut recommendations = Vec::new();

    for (target, checks) in &failing_by_target {
        if checks.len() > 2 {
            recommendations.push(format!(
                "Multiple issues detected in {}. Consider target-wide investigation.",
                target
            ));
        } else if checks.len() == 1 {
            recommendations.push(format!("Address {} issue in {}.", checks[0], target));
        }
    }

    let production_failing = results
        .iter()
        .any(|r| r.is_failure() && r.environment == PRODUCTION_ENVIRONMENT);
    if production_failing {
        recommendations.push(PRODUCTION_CRITICAL.to_string());
    }

    recommendations
}

/// Assembles the terminal run artifact from the joined results
pub fn build_run_result(
    run_name: &str,
    results: Vec<CheckResult>,
    duration: Duration,
) -> PipelineRunResult {
    PipelineRunResult {
        run_id: Uuid::new_v4(),
        run_name: run_name.to_string(),
        generated_at: Utc::now(),
        duration_ms: duration.as_millis() as u64,
        environment_summary: summarize(&results),
        recommendations: recommend(&results),
        results,
    }
}
