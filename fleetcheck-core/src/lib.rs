//! Fleetcheck Core
//!
//! Core types and abstractions for the fleetcheck health-check system.
//!
//! This crate contains:
//! - Domain types: pipelines, targets, checks, per-check results and run reports
//! - Error types shared by task implementations and the engine

pub mod domain;
pub mod error;

pub use error::{TargetError, TaskError};
