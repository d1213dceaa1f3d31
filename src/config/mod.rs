//! Configuration management for Obscura.
//!
//! Obscura reads an optional TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `OBSCURA_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation of each section
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use obscura::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("obscura.toml")?;
//!
//! println!("Input: {}", config.pipeline.input_dir.display());
//! println!("Anonymizer script: {}", config.anonymizer.script.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [pipeline]
//! input_dir = "/input"
//! output_dir = "/output"
//! threads = 4
//! hierarchical = true
//! reorganize_order = "traversal"
//! secret_key = "${OBSCURA_SECRET_KEY}"
//!
//! [anonymizer]
//! program = "java"
//! jar = "DAT.jar"
//! script = "/opt/ctp/anon.script"
//!
//! [redaction]
//! engine = "tesseract"
//!
//! [clinical]
//! id_columns = ["patient_id"]
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default, DEFAULT_CONFIG_PATH};
pub use schema::{
    AnonymizerConfig, ApplicationConfig, ClinicalConfig, LoggingConfig, ObscuraConfig,
    PipelineConfig, RedactionConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
