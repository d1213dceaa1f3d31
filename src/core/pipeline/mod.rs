//! Run orchestration
//!
//! - [`run`] - request validation and the per-run key material
//! - [`orchestrator`] - stage sequencing and scratch cleanup
//! - [`outcome`] - tagged stage outcomes and pipeline states
//! - [`scratch`] - scoped intermediate directories
//! - [`summary`] - run summary and reporting

pub mod orchestrator;
pub mod outcome;
pub mod run;
pub mod scratch;
pub mod summary;

pub use orchestrator::PipelineOrchestrator;
pub use outcome::{PipelineState, Stage, StageOutcome};
pub use run::{PipelineRun, RunRequest};
pub use scratch::ScratchSpace;
pub use summary::{RunSummary, StageWarning};
