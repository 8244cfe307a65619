//! Error types shared by tasks and the engine

use thiserror::Error;

/// Errors raised by a single check execution
///
/// These never escape the task lifecycle wrapper: they are turned into a
/// failed task record and, from there, into an Error check result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    /// A precondition for running the task was not met
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// The task ran and failed
    #[error("{0}")]
    Execution(String),

    /// The task could not reach the service it talks to
    #[error("Connection to {endpoint} failed: {message}")]
    Connection {
        /// Address that could not be reached
        endpoint: String,
        /// Underlying error message
        message: String,
    },

    /// The task did not finish in time
    #[error("{operation} timed out after {seconds} seconds")]
    Timeout {
        /// What was being waited on
        operation: String,
        /// Timeout that elapsed
        seconds: u64,
    },
}

impl TaskError {
    /// Create an execution error from any message
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Create a connection error
    pub fn connection(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Check if a caller may reasonably retry after this error
    ///
    /// The engine itself never retries; this classification is for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout { .. })
    }
}

/// Target-level failure that prevents any check from running on a target
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TargetError {
    /// The target could not be reached
    #[error("Target connection failed: {0}")]
    Unreachable(String),

    /// The worker for the target stopped before producing results
    #[error("Target worker failed: {0}")]
    WorkerFailed(String),
}
