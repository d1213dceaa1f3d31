//! Core business logic for Obscura.
//!
//! # Modules
//!
//! - [`index`] - Directory traversal, header reads and series aggregation
//! - [`reorganize`] - Patient/Study/Series layout of anonymized output
//! - [`pipeline`] - Stage sequencing, scratch directories and run summaries
//!
//! # Run Workflow
//!
//! 1. **Validate**: Reject conflicting options and fix the run's secret key
//! 2. **Redact** (optional): Blank burned-in text with an OCR engine
//! 3. **Anonymize**: Rewrite metadata with the batch anonymizer
//! 4. **Reorganize** (optional): Copy into a Patient/Study/Series tree
//! 5. **Hash**: Pseudonymize clinical CSVs with the same key
//! 6. **Report**: Log the run summary
//!
//! # Example
//!
//! ```rust,no_run
//! use obscura::adapters::process::SystemProcessRunner;
//! use obscura::config::load_config_or_default;
//! use obscura::core::pipeline::{PipelineOrchestrator, PipelineRun, RunRequest};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config_or_default(None)?;
//! let run = PipelineRun::from_request(RunRequest::from_config("SITE-042", &config))?;
//!
//! let orchestrator = PipelineOrchestrator::new(run, &config, Arc::new(SystemProcessRunner));
//! let summary = orchestrator.execute().await?;
//!
//! println!("Warnings: {}", summary.warnings.len());
//! # Ok(())
//! # }
//! ```

pub mod index;
pub mod pipeline;
pub mod reorganize;
