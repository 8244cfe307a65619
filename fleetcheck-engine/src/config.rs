//! Engine configuration
//!
//! Defines the tunable parameters of a pipeline run: per-check default
//! timeout, where JSON reports land, and the optional reachability probe.

use std::path::PathBuf;
use std::time::Duration;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Timeout for checks that do not set their own
    pub default_task_timeout: Duration,

    /// Directory JSON reports are written to
    pub report_dir: PathBuf,

    /// Probe each target's server before running its checks
    pub probe_targets: bool,

    /// Timeout of the reachability probe
    pub probe_timeout: Duration,
}

impl EngineConfig {
    /// Creates a new configuration with defaults
    pub fn new() -> Self {
        Self {
            default_task_timeout: Duration::from_secs(300), // 5 minutes
            report_dir: PathBuf::from("reports"),
            probe_targets: false,
            probe_timeout: Duration::from_secs(10),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - FLEETCHECK_REPORT_DIR (optional, default: reports)
    /// - FLEETCHECK_TASK_TIMEOUT (optional, seconds, default: 300)
    /// - FLEETCHECK_PROBE_TARGETS (optional, true/false, default: false)
    /// - FLEETCHECK_PROBE_TIMEOUT (optional, seconds, default: 10)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::new();

        let report_dir = lookup("FLEETCHECK_REPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.report_dir);

        let default_task_timeout = match lookup("FLEETCHECK_TASK_TIMEOUT") {
            Some(raw) => Duration::from_secs(raw.parse::<u64>().map_err(|_| {
                anyhow::anyhow!("FLEETCHECK_TASK_TIMEOUT must be a number of seconds, got '{}'", raw)
            })?),
            None => defaults.default_task_timeout,
        };

        let probe_targets = match lookup("FLEETCHECK_PROBE_TARGETS") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                anyhow::anyhow!("FLEETCHECK_PROBE_TARGETS must be true or false, got '{}'", raw)
            })?,
            None => defaults.probe_targets,
        };

        let probe_timeout = match lookup("FLEETCHECK_PROBE_TIMEOUT") {
            Some(raw) => Duration::from_secs(raw.parse::<u64>().map_err(|_| {
                anyhow::anyhow!("FLEETCHECK_PROBE_TIMEOUT must be a number of seconds, got '{}'", raw)
            })?),
            None => defaults.probe_timeout,
        };

        Ok(Self {
            default_task_timeout,
            report_dir,
            probe_targets,
            probe_timeout,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.default_task_timeout.as_secs() == 0 {
            anyhow::bail!("default_task_timeout must be greater than 0");
        }

        if self.report_dir.as_os_str().is_empty() {
            anyhow::bail!("report_dir cannot be empty");
        }

        if self.probe_targets && self.probe_timeout.as_secs() == 0 {
            anyhow::bail!("probe_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
