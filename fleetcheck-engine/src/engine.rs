//! Pipeline engine
//!
//! Runs every check against every target:
//! - Resolves `${NAME}` placeholders across the pipeline spec
//! - Validates run preconditions, reporting every violation at once
//! - Spawns one worker per target; checks within a target run in order
//! - Joins workers in completion order and aggregates the results
//!
//! Apart from precondition violations, nothing that happens during a run
//! fails the run: check failures, unreachable targets and crashed workers
//! all become Error results, so a run always yields one result per
//! (target, check) pair.

use fleetcheck_core::domain::pipeline::{CheckDefinition, PipelineSpec, TargetDescriptor};
use fleetcheck_core::domain::report::PipelineRunResult;
use fleetcheck_core::domain::result::CheckResult;
use fleetcheck_core::domain::task::TaskConfig;
use fleetcheck_core::error::TargetError;
use fleetcheck_tasks::{TaskContext, TaskRecord, TaskRegistry, run_task};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::aggregate::build_run_result;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::resolver::{EnvSource, SystemEnv, resolve_value};
use crate::service::{NoopSetup, ResultSink, TargetSetup};

/// Pipeline engine
///
/// Owns the task registry and the per-target setup service; both are shared
/// read-only with every worker.
pub struct Engine {
    registry: Arc<TaskRegistry>,
    setup: Arc<dyn TargetSetup>,
    env: Arc<dyn EnvSource>,
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine that resolves placeholders from the process
    /// environment and runs checks without any target setup
    pub fn new(registry: TaskRegistry, config: EngineConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            setup: Arc::new(NoopSetup),
            env: Arc::new(SystemEnv),
            config,
        }
    }

    /// Replaces the per-target setup service
    pub fn with_target_setup(mut self, setup: impl TargetSetup + 'static) -> Self {
        self.setup = Arc::new(setup);
        self
    }

    /// Replaces the source of placeholder values
    pub fn with_env_source(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns a copy of `spec` with every placeholder resolved
    pub fn resolve(&self, spec: &PipelineSpec) -> Result<PipelineSpec, EngineError> {
        let raw = serde_json::to_value(spec).map_err(|e| EngineError::Spec(e.to_string()))?;
        let resolved = resolve_value(&raw, self.env.as_ref());
        serde_json::from_value(resolved).map_err(|e| EngineError::Spec(e.to_string()))
    }

    /// Runs the pipeline and hands the result to `sink`
    ///
    /// Returns an error only when preconditions fail, in which case no
    /// worker is started.
    pub async fn run(
        &self,
        spec: PipelineSpec,
        sink: &dyn ResultSink,
    ) -> Result<PipelineRunResult, EngineError> {
        let started = Instant::now();

        let spec = self.resolve(&spec)?;
        validate_spec(&spec)?;

        let PipelineSpec {
            name,
            targets,
            checks,
        } = spec;

        info!(
            "Starting pipeline '{}': {} targets x {} checks",
            name,
            targets.len(),
            checks.len()
        );

        let checks = Arc::new(checks);
        let mut workers = FuturesUnordered::new();

        for target in targets {
            let handle = tokio::spawn(run_target(
                self.registry.clone(),
                self.setup.clone(),
                target.clone(),
                checks.clone(),
                self.config.default_task_timeout,
            ));
            workers.push(async move { (target, handle.await) });
        }

        let mut results = Vec::with_capacity(workers.len() * checks.len());
        while let Some((target, joined)) = workers.next().await {
            match joined {
                Ok(target_results) => {
                    debug!(
                        "Worker for target {} finished with {} results",
                        target.name,
                        target_results.len()
                    );
                    results.extend(target_results);
                }
                Err(e) => {
                    let failure = TargetError::WorkerFailed(e.to_string());
                    error!("{} ({})", failure, target.name);
                    results.extend(failed_results(&target, &checks, &failure));
                }
            }
        }

        let run = build_run_result(&name, results, started.elapsed());

        info!(
            "Pipeline '{}' finished in {}ms: {}/{} checks failed",
            run.run_name,
            run.duration_ms,
            run.failed_checks(),
            run.total_checks()
        );

        if let Err(e) = sink.publish(&run).await {
            error!("Failed to publish results of '{}': {:#}", run.run_name, e);
        }

        Ok(run)
    }
}

/// Checks run preconditions
///
/// Collects every violation rather than stopping at the first: at least one
/// target and one check, every target has a name, server and token, and
/// target names are unique.
pub fn validate_spec(spec: &PipelineSpec) -> Result<(), EngineError> {
    let mut violations = Vec::new();

    if spec.targets.is_empty() {
        violations.push("No targets defined in pipeline configuration".to_string());
    }
    if spec.checks.is_empty() {
        violations.push("No checks defined in pipeline configuration".to_string());
    }

    let mut seen = HashSet::new();
    let mut duplicates = HashSet::new();

    for (index, target) in spec.targets.iter().enumerate() {
        let label = if target.name.trim().is_empty() {
            format!("#{}", index + 1)
        } else {
            target.name.clone()
        };

        let missing: Vec<&str> = [
            ("name", &target.name),
            ("server", &target.server),
            ("token", &target.token),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            violations.push(format!("Target {} missing {}", label, missing.join(", ")));
        }

        if !target.name.trim().is_empty()
            && !seen.insert(target.name.as_str())
            && duplicates.insert(target.name.as_str())
        {
            violations.push(format!("Duplicate target name: {}", target.name));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        warn!("Pipeline '{}' rejected: {}", spec.name, violations.join("; "));
        Err(EngineError::Configuration(violations))
    }
}

/// Worker body for one target
async fn run_target(
    registry: Arc<TaskRegistry>,
    setup: Arc<dyn TargetSetup>,
    target: TargetDescriptor,
    checks: Arc<Vec<CheckDefinition>>,
    default_timeout: Duration,
) -> Vec<CheckResult> {
    info!(
        "Worker started for target {} ({})",
        target.name, target.environment
    );

    if let Err(e) = setup.prepare(&target).await {
        warn!("Skipping checks on {}: {}", target.name, e);
        return failed_results(&target, &checks, &e);
    }

    let ctx = TaskContext::for_target(&target.name, default_timeout)
        .with_env("TARGET_ENVIRONMENT", &target.environment);
    let mut results = Vec::with_capacity(checks.len());

    for check in checks.iter() {
        let config = TaskConfig::for_target(check, &target);
        let record = run_task(&registry, config, &ctx).await;
        results.push(check_result(&target, check, &record));
    }

    results
}

fn check_result(target: &TargetDescriptor, check: &CheckDefinition, record: &TaskRecord) -> CheckResult {
    if record.is_completed() {
        CheckResult::success(target, check, record.details(), record.metadata.duration_ms)
    } else {
        CheckResult::error(target, check, record.details(), record.metadata.duration_ms)
    }
}

/// One Error result per check for a target whose checks never ran
fn failed_results(
    target: &TargetDescriptor,
    checks: &[CheckDefinition],
    reason: &TargetError,
) -> Vec<CheckResult> {
    checks
        .iter()
        .map(|check| CheckResult::error(target, check, reason.to_string(), 0))
        .collect()
}
