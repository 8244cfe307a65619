//! Fleetcheck Engine
//!
//! Runs every check of a pipeline against every target concurrently and
//! aggregates the results.
//!
//! Architecture:
//! - Configuration: engine settings from environment or defaults
//! - Resolver: `${NAME}` substitution across the pipeline spec
//! - Engine: precondition validation, one worker per target, join
//! - Aggregation: environment summaries and recommendations
//! - Services: target setup probes and result sinks
//!
//! Workers never share mutable state. Each returns its own list of results,
//! collected in completion order once the worker finishes.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod resolver;
pub mod service;

pub use config::EngineConfig;
pub use engine::{Engine, validate_spec};
pub use error::EngineError;
pub use loader::{PipelineFormat, load_pipeline, parse_pipeline};
pub use resolver::{EnvSource, MapEnv, SystemEnv};
pub use service::{
    CollectingSink, HttpProbe, JsonReportSink, NoopSetup, NullSink, ResultSink, TargetSetup,
};
