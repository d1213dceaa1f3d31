//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Configurable log levels
//! - Console output on stderr
//! - Optional JSON file logging with rotation
//!
//! Each pipeline run additionally owns a `pipeline_run` span carrying its run
//! id, so every stage log line can be attributed to one run.
//!
//! # Example
//!
//! ```no_run
//! use obscura::logging::init_logging;
//! use obscura::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a pipeline stage
///
/// # Example
///
/// ```no_run
/// use obscura::log_stage_start;
/// use obscura::core::pipeline::Stage;
///
/// log_stage_start!(Stage::Reorganize);
/// ```
#[macro_export]
macro_rules! log_stage_start {
    ($stage:expr) => {
        tracing::info!(stage = %$stage, "Starting stage");
    };
}

/// Log the completion of a pipeline stage
///
/// # Example
///
/// ```no_run
/// use obscura::log_stage_complete;
/// use obscura::core::pipeline::Stage;
/// use std::time::Duration;
///
/// log_stage_complete!(Stage::ClinicalHash, Duration::from_millis(250));
/// ```
#[macro_export]
macro_rules! log_stage_complete {
    ($stage:expr, $duration:expr) => {
        tracing::info!(
            stage = %$stage,
            duration_ms = $duration.as_millis() as u64,
            "Stage completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use obscura::log_error_with_context;
/// use obscura::domain::ObscuraError;
///
/// let error = ObscuraError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
