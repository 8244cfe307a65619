//! Engine error types

use thiserror::Error;

/// Errors that abort a pipeline run before any worker starts
///
/// Failures during the run never surface here; they become Error check
/// results instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The pipeline violates one or more preconditions
    #[error("Invalid pipeline configuration: {}", .0.join("; "))]
    Configuration(Vec<String>),

    /// The pipeline document could not be mapped onto a pipeline spec
    #[error("Invalid pipeline specification: {0}")]
    Spec(String),
}

impl EngineError {
    /// Every precondition violation reported by a configuration error
    pub fn violations(&self) -> &[String] {
        match self {
            Self::Configuration(violations) => violations,
            Self::Spec(_) => &[],
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
