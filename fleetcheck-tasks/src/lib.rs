//! Fleetcheck Tasks
//!
//! Task infrastructure for the fleetcheck engine.
//! It includes:
//! - The `Task` trait every check implementation satisfies, and the
//!   `TaskType` factory a registry stores per type tag
//! - Declared parameter specs and config validation
//! - The task registry
//! - The lifecycle wrapper that drives any task and never fails
//! - Built-in `shell` and `rest_call` task types

pub mod builtin;
pub mod lifecycle;
pub mod params;
pub mod registry;
pub mod task;

pub use lifecycle::{TaskMetadata, TaskRecord, TaskStatus, run_task};
pub use params::{ParamKind, ParamSpec, validate_params};
pub use registry::{TaskRegistry, TaskTypeInfo};
pub use task::{Task, TaskContext, TaskOutput, TaskType};

pub use fleetcheck_core::domain::task::TaskConfig;
pub use fleetcheck_core::error::TaskError;
