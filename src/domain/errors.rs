//! Domain error types
//!
//! This module defines the error hierarchy for Obscura.
//! Errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Obscura error type
///
/// Every fatal condition of a pipeline run surfaces as one of these variants.
/// Recoverable per-file conditions (unsupported or unreadable files, engine
/// diagnostics, missing clinical data) are absorbed by the stages and never
/// reach this type.
#[derive(Debug, Error)]
pub enum ObscuraError {
    /// Mutually exclusive options, invalid secret key, bad configuration file
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid input values (empty site identifier, missing directories, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// An external engine could not be started or reported a fatal failure
    #[error("External stage '{stage}' failed: {message}")]
    ExternalStage { stage: String, message: String },

    /// DICOM header errors outside of traversal
    #[error("DICOM header error: {0}")]
    Header(#[from] HeaderError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl ObscuraError {
    /// Creates an external stage failure
    pub fn external_stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        ObscuraError::ExternalStage {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Whether the error was detected before any stage ran
    pub fn is_configuration(&self) -> bool {
        matches!(self, ObscuraError::Configuration(_))
    }
}

/// Per-file header read failures
///
/// Produced while reading the header of a single file. Traversal turns these
/// into skip counts instead of propagating them.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// The file lacks the 128-byte preamble and `DICM` magic
    #[error("not a DICOM file: {0}")]
    NotDicom(String),

    /// The file claims to be DICOM but its data set could not be parsed
    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    /// A grouping attribute is absent or empty
    #[error("missing required attribute {attribute} in {path}")]
    MissingAttribute {
        path: String,
        attribute: &'static str,
    },

    /// The file could not be opened
    #[error("failed to open {path}: {reason}")]
    Io { path: String, reason: String },
}

// Conversion from std::io::Error
impl From<std::io::Error> for ObscuraError {
    fn from(err: std::io::Error) -> Self {
        ObscuraError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ObscuraError {
    fn from(err: serde_json::Error) -> Self {
        ObscuraError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ObscuraError {
    fn from(err: toml::de::Error) -> Self {
        ObscuraError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from directory traversal errors
impl From<walkdir::Error> for ObscuraError {
    fn from(err: walkdir::Error) -> Self {
        let path = err
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        ObscuraError::Io(format!("{path}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obscura_error_display() {
        let err = ObscuraError::Configuration("Invalid secret key".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid secret key");
    }

    #[test]
    fn test_external_stage_display() {
        let err = ObscuraError::external_stage("metadata_anonymize", "java not found");
        assert_eq!(
            err.to_string(),
            "External stage 'metadata_anonymize' failed: java not found"
        );
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_header_error_conversion() {
        let header_err = HeaderError::NotDicom("/tmp/notes.txt".to_string());
        let err: ObscuraError = header_err.into();
        assert!(matches!(err, ObscuraError::Header(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: ObscuraError = io_err.into();
        assert!(matches!(err, ObscuraError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: ObscuraError = json_err.into();
        assert!(matches!(err, ObscuraError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: ObscuraError = toml_err.into();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_obscura_error_implements_std_error() {
        let err = ObscuraError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
