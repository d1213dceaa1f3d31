//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::ObscuraConfig;
use super::secret_string;
use crate::domain::errors::ObscuraError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file looked up when none is given explicitly
pub const DEFAULT_CONFIG_PATH: &str = "obscura.toml";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ObscuraConfig
/// 4. Applies environment variable overrides (OBSCURA_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a configuration error if the file is missing or unreadable, a
/// referenced variable is unset, or parsing or validation fails.
///
/// # Examples
///
/// ```no_run
/// use obscura::config::loader::load_config;
///
/// let config = load_config("obscura.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ObscuraConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ObscuraError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ObscuraError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let config: ObscuraConfig = toml::from_str(&contents)
        .map_err(|e| ObscuraError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    finish(config)
}

/// Loads the explicitly named file, or the default file if it exists, or
/// built-in defaults otherwise
///
/// Environment overrides and validation apply in every case.
///
/// # Errors
///
/// An explicitly named file that does not exist is an error; a missing
/// default file is not.
pub fn load_config_or_default(path: Option<&Path>) -> Result<ObscuraConfig> {
    match path {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config(DEFAULT_CONFIG_PATH),
        None => {
            tracing::debug!("No configuration file found, using built-in defaults");
            finish(ObscuraConfig::default())
        }
    }
}

fn finish(mut config: ObscuraConfig) -> Result<ObscuraConfig> {
    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ObscuraError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ObscuraError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ObscuraError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using OBSCURA_* prefix
///
/// Environment variables follow the pattern: OBSCURA_<SECTION>_<KEY>
/// For example: OBSCURA_PIPELINE_THREADS, OBSCURA_ANONYMIZER_SCRIPT
fn apply_env_overrides(config: &mut ObscuraConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("OBSCURA_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Pipeline overrides
    if let Ok(val) = std::env::var("OBSCURA_PIPELINE_INPUT_DIR") {
        config.pipeline.input_dir = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("OBSCURA_PIPELINE_OUTPUT_DIR") {
        config.pipeline.output_dir = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("OBSCURA_PIPELINE_THREADS") {
        if let Ok(threads) = val.parse() {
            config.pipeline.threads = threads;
        }
    }
    if let Ok(val) = std::env::var("OBSCURA_PIPELINE_HIERARCHICAL") {
        config.pipeline.hierarchical = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("OBSCURA_PIPELINE_METADATA_ANONYMIZE") {
        config.pipeline.metadata_anonymize = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("OBSCURA_PIPELINE_CLINICAL_HASH") {
        config.pipeline.clinical_hash = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("OBSCURA_PIPELINE_REORGANIZE_ORDER") {
        config.pipeline.reorganize_order = val.parse().map_err(ObscuraError::Configuration)?;
    }
    if let Ok(val) = std::env::var("OBSCURA_PIPELINE_SCRATCH_DIR") {
        config.pipeline.scratch_dir = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("OBSCURA_PIPELINE_SECRET_KEY") {
        config.pipeline.secret_key = Some(secret_string(val));
    }

    // Anonymizer overrides
    if let Ok(val) = std::env::var("OBSCURA_ANONYMIZER_PROGRAM") {
        config.anonymizer.program = val;
    }
    if let Ok(val) = std::env::var("OBSCURA_ANONYMIZER_JAR") {
        config.anonymizer.jar = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("OBSCURA_ANONYMIZER_SCRIPT") {
        config.anonymizer.script = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("OBSCURA_ANONYMIZER_FAIL_ON_NONZERO_EXIT") {
        config.anonymizer.fail_on_nonzero_exit = val.parse().unwrap_or(false);
    }

    // Redaction overrides
    if let Ok(val) = std::env::var("OBSCURA_REDACTION_PROGRAM") {
        config.redaction.program = val;
    }
    if let Ok(val) = std::env::var("OBSCURA_REDACTION_ENGINE") {
        config.redaction.engine = Some(val.parse().map_err(ObscuraError::Configuration)?);
    }

    // Clinical overrides
    if let Ok(val) = std::env::var("OBSCURA_CLINICAL_IGNORE_PREFIX") {
        config.clinical.ignore_prefix = val;
    }
    if let Ok(val) = std::env::var("OBSCURA_CLINICAL_ID_COLUMNS") {
        config.clinical.id_columns = val
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
    }
    if let Ok(val) = std::env::var("OBSCURA_CLINICAL_PSEUDONYM_PREFIX") {
        config.clinical.pseudonym_prefix = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("OBSCURA_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("OBSCURA_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("OBSCURA_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
