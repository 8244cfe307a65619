//! Service layer
//!
//! Pluggable seams of a pipeline run: what happens to a target before its
//! checks run, and where the finished run result goes.
//!
//! All services are trait-based so the engine can be tested without network
//! or filesystem access.

mod setup;
mod sink;

// Re-export traits
pub use setup::TargetSetup;
pub use sink::ResultSink;

// Re-export implementations
pub use setup::{HttpProbe, NoopSetup};
pub use sink::{CollectingSink, JsonReportSink, NullSink};
