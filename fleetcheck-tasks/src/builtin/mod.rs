//! Built-in task types
//!
//! Every built-in type is registered explicitly by
//! `TaskRegistry::with_builtin_tasks`.

mod rest_call;
mod shell;

pub use rest_call::{RestCallTask, RestCallTaskType};
pub use shell::{ShellTask, ShellTaskType};
