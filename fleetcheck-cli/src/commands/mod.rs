//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod run;
mod types;
mod validate;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::Overrides;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a pipeline against all of its targets
    Run {
        /// Path to the pipeline file (YAML or JSON)
        pipeline: PathBuf,

        /// Directory for the JSON report
        #[arg(short, long)]
        report_dir: Option<PathBuf>,

        /// Default per-check timeout in seconds
        #[arg(long)]
        task_timeout: Option<u64>,

        /// Probe each target's server before running its checks
        #[arg(long)]
        probe: bool,

        /// Probe timeout in seconds
        #[arg(long)]
        probe_timeout: Option<u64>,

        /// Do not write a JSON report
        #[arg(long)]
        no_report: bool,

        /// Print the run result as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Check a pipeline file without running it
    Validate {
        /// Path to the pipeline file (YAML or JSON)
        pipeline: PathBuf,
    },
    /// List the registered check types and their parameters
    Types,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module. The exit code is
/// non-zero when a run has failing checks or a pipeline does not validate.
pub async fn handle_command(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Run {
            pipeline,
            report_dir,
            task_timeout,
            probe,
            probe_timeout,
            no_report,
            json,
        } => {
            let overrides = Overrides {
                report_dir,
                task_timeout,
                probe,
                probe_timeout,
            };
            run::run_pipeline(&pipeline, overrides, no_report, json).await
        }
        Commands::Validate { pipeline } => validate::validate_pipeline(&pipeline).await,
        Commands::Types => {
            types::list_types();
            Ok(ExitCode::SUCCESS)
        }
    }
}
