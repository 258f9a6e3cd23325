//! Pipeline orchestration: configuration, artifact layout, and the staged
//! run loop tying the components together.

pub mod config;
pub mod orchestrator;
pub mod paths;
pub mod types;

pub use orchestrator::run_pipeline;
pub use types::{NoOpReporter, PipelineStage, ProgressReporter, RunSummary};
