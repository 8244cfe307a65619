//! Run command handler
//!
//! Loads a pipeline, runs it through the engine and prints either a colored
//! summary or the full run result as JSON.

use anyhow::{Context, Result};
use colored::*;
use fleetcheck_core::domain::report::PipelineRunResult;
use fleetcheck_core::domain::result::{CheckResult, CheckStatus};
use fleetcheck_engine::{
    Engine, HttpProbe, JsonReportSink, NullSink, ResultSink, load_pipeline,
};
use fleetcheck_tasks::TaskRegistry;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;

use crate::config::{self, Overrides};

/// Run a pipeline file
pub async fn run_pipeline(
    path: &Path,
    overrides: Overrides,
    no_report: bool,
    json: bool,
) -> Result<ExitCode> {
    let config = config::load(overrides)?;
    let spec = load_pipeline(path).await?;

    let mut engine = Engine::new(TaskRegistry::with_builtin_tasks(), config.clone());
    if config.probe_targets {
        let probe =
            HttpProbe::new(config.probe_timeout).context("Failed to create target probe")?;
        engine = engine.with_target_setup(probe);
    }

    let sink: Box<dyn ResultSink> = if no_report {
        Box::new(NullSink)
    } else {
        Box::new(JsonReportSink::new(&config.report_dir))
    };

    info!("Running pipeline from {}", path.display());
    let run = engine.run(spec, sink.as_ref()).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&run).context("Failed to serialize run result")?
        );
    } else {
        print_run(&run);
    }

    Ok(if run.is_healthy() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Print the run summary
fn print_run(run: &PipelineRunResult) {
    if run.is_healthy() {
        println!("{}", "✓ All checks passed".green().bold());
    } else {
        println!(
            "{}",
            format!(
                "✗ {} of {} checks failed",
                run.failed_checks(),
                run.total_checks()
            )
            .red()
            .bold()
        );
    }
    println!("  Run:      {}", run.run_name.bold());
    println!("  Run ID:   {}", run.run_id.to_string().cyan());
    println!(
        "  Finished: {} ({}ms)",
        run.generated_at.format("%Y-%m-%d %H:%M:%S"),
        run.duration_ms
    );

    println!("\n{}", "Results:".bold());
    for result in &run.results {
        print_result(result);
    }

    println!("\n{}", "Environments:".bold());
    for (environment, summary) in &run.environment_summary {
        let rate = format!("{:.1}%", summary.success_rate);
        let rate = if summary.failed_checks() == 0 {
            rate.green()
        } else {
            rate.red()
        };
        println!(
            "  {} {}: {} ({}/{} checks, {} targets)",
            "▸".cyan(),
            environment.bold(),
            rate,
            summary.successful_checks,
            summary.total_checks,
            summary.targets
        );
    }

    if !run.recommendations.is_empty() {
        println!("\n{}", "Recommendations:".bold());
        for recommendation in &run.recommendations {
            println!("  - {}", recommendation.yellow());
        }
    }
}

fn print_result(result: &CheckResult) {
    let marker = match result.status {
        CheckStatus::Success => "✓".green(),
        CheckStatus::Error => "✗".red(),
    };
    println!(
        "  {} {} / {} {}",
        marker,
        result.target.cyan(),
        result.check.bold(),
        format!("[{}ms]", result.duration_ms).dimmed()
    );
    if result.is_failure() {
        println!("      {}", result.output_details.dimmed());
        if let Some(url) = &result.remediation_url {
            println!("      Remediation: {}", url.cyan());
        }
    }
}
