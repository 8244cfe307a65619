//! Configuration module
//!
//! Builds the engine configuration from `FLEETCHECK_*` environment variables
//! with command-line flags taking precedence.

use anyhow::{Context, Result};
use fleetcheck_engine::EngineConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line overrides of the engine configuration
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub report_dir: Option<PathBuf>,
    pub task_timeout: Option<u64>,
    pub probe: bool,
    pub probe_timeout: Option<u64>,
}

impl Overrides {
    /// Applies the overrides on top of `base` and validates the result
    pub fn apply(self, mut base: EngineConfig) -> Result<EngineConfig> {
        if let Some(dir) = self.report_dir {
            base.report_dir = dir;
        }
        if let Some(seconds) = self.task_timeout {
            base.default_task_timeout = Duration::from_secs(seconds);
        }
        if self.probe {
            base.probe_targets = true;
        }
        if let Some(seconds) = self.probe_timeout {
            base.probe_timeout = Duration::from_secs(seconds);
        }

        base.validate().context("Invalid engine configuration")?;
        Ok(base)
    }
}

/// Loads the engine configuration for a command
pub fn load(overrides: Overrides) -> Result<EngineConfig> {
    let base = EngineConfig::from_env().context("Failed to read FLEETCHECK_* environment")?;
    overrides.apply(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_take_precedence() {
        let config = Overrides {
            report_dir: Some(PathBuf::from("/tmp/out")),
            task_timeout: Some(12),
            probe: true,
            probe_timeout: None,
        }
        .apply(EngineConfig::default())
        .unwrap();

        assert_eq!(config.report_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.default_task_timeout, Duration::from_secs(12));
        assert!(config.probe_targets);
        assert_eq!(config.probe_timeout, EngineConfig::default().probe_timeout);
    }

    #[test]
    fn test_empty_overrides_keep_base() {
        let mut base = EngineConfig::default();
        base.probe_targets = true;

        let config = Overrides::default().apply(base).unwrap();
        assert!(config.probe_targets);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let result = Overrides {
            task_timeout: Some(0),
            ..Overrides::default()
        }
        .apply(EngineConfig::default());

        assert!(result.is_err());
    }
}
