// Obscura - DICOM de-identification pipeline
// Copyright (c) 2025 Obscura Contributors
// Licensed under the MIT License

//! # Obscura - DICOM de-identification pipeline
//!
//! Obscura prepares a site's imaging delivery for research use. It chains
//! external de-identification engines over a directory of DICOM files and
//! pseudonymizes the accompanying clinical CSVs with the same run key, so
//! imaging and clinical records stay linkable without revealing identity.
//!
//! ## Overview
//!
//! A run moves through these stages:
//! - **Redact** burned-in text with an OCR engine (optional)
//! - **Anonymize** DICOM metadata with an external batch anonymizer
//! - **Reorganize** the flat anonymizer output into Patient/Study/Series folders
//! - **Hash** patient identifiers in clinical CSV files
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Series indexing, reorganization and the pipeline orchestrator
//! - [`adapters`] - External engines and the clinical CSV hasher
//! - [`domain`] - Identifiers, key material, records and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use obscura::adapters::process::SystemProcessRunner;
//! use obscura::config::load_config_or_default;
//! use obscura::core::pipeline::{PipelineOrchestrator, PipelineRun, RunRequest};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config_or_default(None)?;
//!     let run = PipelineRun::from_request(RunRequest::from_config("SITE-042", &config))?;
//!
//!     let orchestrator = PipelineOrchestrator::new(run, &config, Arc::new(SystemProcessRunner));
//!     let summary = orchestrator.execute().await?;
//!
//!     println!("Run {} finished with {} warnings", summary.run_id, summary.warnings.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Series Inspection
//!
//! ```rust,no_run
//! use obscura::core::index::{aggregate_by_description, index};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let series = index("/input")?;
//! let report = aggregate_by_description(series.records());
//! println!("{} series, {} images", report.total_series, report.total_images);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All library operations return [`domain::ObscuraError`]. Configuration
//! problems are detected before any stage touches the filesystem.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
