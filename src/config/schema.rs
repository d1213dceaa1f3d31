//! Configuration schema types
//!
//! This module defines the configuration structure for Obscura. Every section
//! is optional in the TOML file; missing sections fall back to defaults.

use crate::adapters::redaction::RedactionEngineKind;
use crate::config::SecretString;
use crate::core::reorganize::ReorganizeOrder;
use crate::domain::secret_key;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main Obscura configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObscuraConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Directories, toggles and key material of a run
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// External batch anonymizer
    #[serde(default)]
    pub anonymizer: AnonymizerConfig,

    /// External OCR redaction engine
    #[serde(default)]
    pub redaction: RedactionConfig,

    /// Clinical CSV hashing
    #[serde(default)]
    pub clinical: ClinicalConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ObscuraConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.pipeline.validate()?;
        self.anonymizer.validate()?;
        self.redaction.validate()?;
        self.clinical.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Pipeline run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding the images and clinical CSVs to de-identify
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Directory receiving the de-identified output
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Threads handed to the external engines
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Write a Patient/Study/Series hierarchy instead of the flat engine output
    #[serde(default = "default_true")]
    pub hierarchical: bool,

    /// Run the metadata anonymization stage
    #[serde(default = "default_true")]
    pub metadata_anonymize: bool,

    /// Run the clinical CSV hashing stage
    #[serde(default = "default_true")]
    pub clinical_hash: bool,

    /// File numbering order inside each series directory
    #[serde(default)]
    pub reorganize_order: ReorganizeOrder,

    /// Parent directory for intermediate directories (system temp if unset)
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    /// Fixed secret key; a fresh key is generated per run when unset
    #[serde(default, skip_serializing)]
    pub secret_key: Option<SecretString>,
}

impl PipelineConfig {
    fn validate(&self) -> Result<(), String> {
        if self.threads == 0 || self.threads > 256 {
            return Err(format!(
                "pipeline.threads must be between 1 and 256, got {}",
                self.threads
            ));
        }

        if self.input_dir.as_os_str().is_empty() {
            return Err("pipeline.input_dir cannot be empty".to_string());
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err("pipeline.output_dir cannot be empty".to_string());
        }

        if let Some(key) = &self.secret_key {
            if !secret_key::validate(key.expose_secret().as_ref()) {
                return Err("pipeline.secret_key is not a valid secret key".to_string());
            }
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            threads: default_threads(),
            hierarchical: true,
            metadata_anonymize: true,
            clinical_hash: true,
            reorganize_order: ReorganizeOrder::default(),
            scratch_dir: None,
            secret_key: None,
        }
    }
}

/// External batch anonymizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizerConfig {
    /// Java launcher
    #[serde(default = "default_anonymizer_program")]
    pub program: String,

    /// Anonymizer jar, resolved relative to the script directory
    #[serde(default = "default_anonymizer_jar")]
    pub jar: PathBuf,

    /// Declarative anonymization script
    #[serde(default = "default_anonymizer_script")]
    pub script: PathBuf,

    /// Treat a non-zero exit code as a stage failure instead of a warning
    #[serde(default)]
    pub fail_on_nonzero_exit: bool,
}

impl AnonymizerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.program.trim().is_empty() {
            return Err("anonymizer.program cannot be empty".to_string());
        }

        if self.jar.as_os_str().is_empty() {
            return Err("anonymizer.jar cannot be empty".to_string());
        }

        if self.script.file_name().is_none() {
            return Err(format!(
                "anonymizer.script must name a file, got '{}'",
                self.script.display()
            ));
        }

        Ok(())
    }
}

impl Default for AnonymizerConfig {
    fn default() -> Self {
        Self {
            program: default_anonymizer_program(),
            jar: default_anonymizer_jar(),
            script: default_anonymizer_script(),
            fail_on_nonzero_exit: false,
        }
    }
}

/// External OCR redaction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionConfig {
    /// Per-file redaction program
    #[serde(default = "default_redaction_program")]
    pub program: String,

    /// Engine to use; redaction is skipped when unset
    #[serde(default)]
    pub engine: Option<RedactionEngineKind>,
}

impl RedactionConfig {
    fn validate(&self) -> Result<(), String> {
        if self.engine.is_some() && self.program.trim().is_empty() {
            return Err("redaction.program cannot be empty when an engine is set".to_string());
        }
        Ok(())
    }
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            program: default_redaction_program(),
            engine: None,
        }
    }
}

/// Clinical CSV hashing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalConfig {
    /// CSV files whose name starts with this prefix are left alone
    #[serde(default = "default_ignore_prefix")]
    pub ignore_prefix: String,

    /// Columns holding identifiers (matched case-insensitively)
    #[serde(default = "default_id_columns")]
    pub id_columns: Vec<String>,

    /// Prefix of every generated pseudonym
    #[serde(default = "default_pseudonym_prefix")]
    pub pseudonym_prefix: String,
}

impl ClinicalConfig {
    fn validate(&self) -> Result<(), String> {
        if self.id_columns.is_empty() {
            return Err("clinical.id_columns must contain at least one column".to_string());
        }

        if self.id_columns.iter().any(|c| c.trim().is_empty()) {
            return Err("clinical.id_columns cannot contain empty names".to_string());
        }

        Ok(())
    }
}

impl Default for ClinicalConfig {
    fn default() -> Self {
        Self {
            ignore_prefix: default_ignore_prefix(),
            id_columns: default_id_columns(),
            pseudonym_prefix: default_pseudonym_prefix(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("/input")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("/output")
}

fn default_threads() -> usize {
    4
}

fn default_anonymizer_program() -> String {
    "java".to_string()
}

fn default_anonymizer_jar() -> PathBuf {
    PathBuf::from("DAT.jar")
}

fn default_anonymizer_script() -> PathBuf {
    PathBuf::from("ctp/anon.script")
}

fn default_redaction_program() -> String {
    "obscura-redact".to_string()
}

fn default_ignore_prefix() -> String {
    "_".to_string()
}

fn default_id_columns() -> Vec<String> {
    vec!["patient_id".to_string()]
}

fn default_pseudonym_prefix() -> String {
    "PID-".to_string()
}

fn default_local_path() -> String {
    "/var/log/obscura".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use crate::domain::SecretKey;

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pipeline_threads_bounds() {
        let mut config = PipelineConfig::default();
        assert!(config.validate().is_ok());

        config.threads = 0;
        assert!(config.validate().is_err());

        config.threads = 257;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pipeline_secret_key_validation() {
        let mut config = PipelineConfig {
            secret_key: Some(secret_string("not-a-key".to_string())),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("secret_key"));
        assert!(!err.contains("not-a-key"));

        let key = SecretKey::generate();
        config.secret_key = Some(secret_string(key.expose().to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_clinical_requires_columns() {
        let mut config = ClinicalConfig::default();
        assert!(config.validate().is_ok());

        config.id_columns.clear();
        assert!(config.validate().is_err());

        config.id_columns = vec![" ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_rotation() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());

        config.local_rotation = "size".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_full_toml_deserialization() {
        let toml_str = r#"
            [application]
            log_level = "debug"

            [pipeline]
            input_dir = "/data/in"
            output_dir = "/data/out"
            threads = 8
            hierarchical = false
            reorganize_order = "instance-number"

            [anonymizer]
            script = "/opt/ctp/anon.script"
            fail_on_nonzero_exit = true

            [redaction]
            engine = "paddle"

            [clinical]
            id_columns = ["patient_id", "subject"]
        "#;

        let config: ObscuraConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.pipeline.threads, 8);
        assert!(!config.pipeline.hierarchical);
        assert!(config.pipeline.metadata_anonymize);
        assert_eq!(
            config.pipeline.reorganize_order,
            ReorganizeOrder::InstanceNumber
        );
        assert!(config.anonymizer.fail_on_nonzero_exit);
        assert_eq!(config.anonymizer.program, "java");
        assert_eq!(config.redaction.engine, Some(RedactionEngineKind::Paddle));
        assert_eq!(config.clinical.id_columns.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: ObscuraConfig = toml::from_str("").unwrap();
        assert_eq!(config.pipeline.input_dir, PathBuf::from("/input"));
        assert_eq!(config.pipeline.output_dir, PathBuf::from("/output"));
        assert_eq!(config.redaction.engine, None);
        assert!(!config.logging.local_enabled);
        assert!(config.validate().is_ok());
    }
}
