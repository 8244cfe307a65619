//! Validate command handler
//!
//! Loads a pipeline, resolves its placeholders and reports every problem the
//! engine would reject it for, plus check configs the registry would fail.

use anyhow::Result;
use colored::*;
use fleetcheck_core::domain::pipeline::PipelineSpec;
use fleetcheck_engine::{Engine, EngineConfig, load_pipeline, validate_spec};
use fleetcheck_tasks::{TaskConfig, TaskRegistry};
use std::path::Path;
use std::process::ExitCode;

/// Validate a pipeline file without running any check
pub async fn validate_pipeline(path: &Path) -> Result<ExitCode> {
    let spec = load_pipeline(path).await?;
    let engine = Engine::new(TaskRegistry::with_builtin_tasks(), EngineConfig::default());
    let spec = engine.resolve(&spec)?;

    let problems = collect_problems(&spec, engine.registry());

    if problems.is_empty() {
        println!("{}", "✓ Pipeline is valid".green().bold());
        println!("  Name:    {}", spec.name.bold());
        println!("  Targets: {}", spec.targets.len().to_string().cyan());
        println!("  Checks:  {}", spec.checks.len().to_string().cyan());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{}",
            format!("✗ Pipeline has {} problem(s):", problems.len())
                .red()
                .bold()
        );
        for problem in &problems {
            println!("  - {}", problem);
        }
        Ok(ExitCode::FAILURE)
    }
}

/// Run preconditions first, then per-check registry validation
fn collect_problems(spec: &PipelineSpec, registry: &TaskRegistry) -> Vec<String> {
    let mut problems = match validate_spec(spec) {
        Ok(()) => Vec::new(),
        Err(e) => e.violations().to_vec(),
    };

    for check in &spec.checks {
        let config = TaskConfig::from_check(check);
        for error in registry.validate_config(&check.task_type, &config) {
            problems.push(format!("Check {}: {}", check.name, error));
        }
    }

    problems
}
