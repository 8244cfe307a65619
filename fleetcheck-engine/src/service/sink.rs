//! Result sink service
//!
//! Receives the finished `PipelineRunResult`. The engine logs a sink failure
//! and still returns the run result to its caller.

use anyhow::{Context, Result};
use async_trait::async_trait;
use fleetcheck_core::domain::report::PipelineRunResult;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// Service trait for publishing a finished run
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn publish(&self, run: &PipelineRunResult) -> Result<()>;
}

/// Discards every run
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

#[async_trait]
impl ResultSink for NullSink {
    async fn publish(&self, _run: &PipelineRunResult) -> Result<()> {
        Ok(())
    }
}

/// Keeps published runs in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    runs: Mutex<Vec<PipelineRunResult>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every run published so far, oldest first
    pub fn runs(&self) -> Vec<PipelineRunResult> {
        match self.runs.lock() {
            Ok(runs) => runs.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl ResultSink for CollectingSink {
    async fn publish(&self, run: &PipelineRunResult) -> Result<()> {
        self.runs
            .lock()
            .map_err(|_| anyhow::anyhow!("collecting sink lock poisoned"))?
            .push(run.clone());
        Ok(())
    }
}

/// Writes each run as a pretty-printed JSON file
///
/// Files are named `<run name slug>_<YYYYmmdd_HHMMSS>.json` after the run's
/// generation time, inside the configured directory.
#[derive(Debug, Clone)]
pub struct JsonReportSink {
    dir: PathBuf,
}

impl JsonReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the report for `run` is written to
    pub fn report_path(&self, run: &PipelineRunResult) -> PathBuf {
        self.dir.join(format!(
            "{}_{}.json",
            slugify(&run.run_name),
            run.generated_at.format("%Y%m%d_%H%M%S")
        ))
    }
}

#[async_trait]
impl ResultSink for JsonReportSink {
    async fn publish(&self, run: &PipelineRunResult) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create report directory {}", self.dir.display()))?;

        let path = self.report_path(run);
        let body = serde_json::to_vec_pretty(run).context("Failed to serialize run result")?;

        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("Failed to write report {}", path.display()))?;

        info!("Report written to {}", path.display());
        Ok(())
    }
}

/// Lowercase alphanumerics, everything else collapsed to single underscores
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }

    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "pipeline".to_string()
    } else {
        slug.to_string()
    }
}
