//! Core domain types
//!
//! These types describe a pipeline run from both ends: what the operator asked
//! for (pipeline, targets, checks) and what came back (check results and the
//! aggregated run report). They are shared between the task layer (which
//! executes one check) and the engine (which fans checks out across targets).

pub mod pipeline;
pub mod report;
pub mod result;
pub mod task;
