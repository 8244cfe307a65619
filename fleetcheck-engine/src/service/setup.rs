//! Target setup service
//!
//! Runs once per target, inside that target's worker, before any of its
//! checks. A failure here turns every check of the target into an Error
//! result without running it.

use async_trait::async_trait;
use fleetcheck_core::domain::pipeline::TargetDescriptor;
use fleetcheck_core::error::TargetError;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Service trait for preparing a target before its checks run
#[async_trait]
pub trait TargetSetup: Send + Sync {
    /// Prepares the target, or explains why it cannot be used
    async fn prepare(&self, target: &TargetDescriptor) -> Result<(), TargetError>;
}

/// Setup that accepts every target as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSetup;

#[async_trait]
impl TargetSetup for NoopSetup {
    async fn prepare(&self, _target: &TargetDescriptor) -> Result<(), TargetError> {
        Ok(())
    }
}

/// Reachability probe against the target's API server
///
/// Sends one authenticated GET to the target's `server`. Transport errors
/// and 5xx responses make the target unreachable; any other status means
/// the server answered, which is all the probe asks.
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// Creates a probe with the given request timeout
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TargetSetup for HttpProbe {
    async fn prepare(&self, target: &TargetDescriptor) -> Result<(), TargetError> {
        debug!("Probing target {} at {}", target.name, target.server);

        let response = self
            .client
            .get(&target.server)
            .bearer_auth(&target.token)
            .send()
            .await
            .map_err(|e| TargetError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(TargetError::Unreachable(format!(
                "{} answered with HTTP {}",
                target.server, status
            )));
        }

        info!("Target {} reachable (HTTP {})", target.name, status);
        Ok(())
    }
}
