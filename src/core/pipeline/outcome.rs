//! Stage outcomes and pipeline states

use crate::domain::ObscuraError;
use serde::Serialize;
use std::fmt;

/// Result of running one stage
///
/// `Warning` carries diagnostics the stage absorbed (engine stderr, missing
/// clinical data, non-zero exits that are not treated as fatal). `Failure`
/// aborts the run.
#[derive(Debug)]
pub enum StageOutcome<S> {
    /// Stage finished without diagnostics
    Success { summary: S },

    /// Stage finished but reported diagnostics
    Warning { summary: S, messages: Vec<String> },

    /// Stage could not complete
    Failure { cause: ObscuraError },
}

impl<S> StageOutcome<S> {
    /// `Success` when `messages` is empty, `Warning` otherwise
    pub fn from_messages(summary: S, messages: Vec<String>) -> Self {
        if messages.is_empty() {
            StageOutcome::Success { summary }
        } else {
            StageOutcome::Warning { summary, messages }
        }
    }

    /// Whether the stage failed
    pub fn is_failure(&self) -> bool {
        matches!(self, StageOutcome::Failure { .. })
    }

    /// Warning messages, empty unless this is a `Warning`
    pub fn messages(&self) -> &[String] {
        match self {
            StageOutcome::Warning { messages, .. } => messages,
            _ => &[],
        }
    }

    /// Splits the outcome into summary and warnings, turning a failure into
    /// an error
    pub fn into_result(self) -> Result<(S, Vec<String>), ObscuraError> {
        match self {
            StageOutcome::Success { summary } => Ok((summary, Vec::new())),
            StageOutcome::Warning { summary, messages } => Ok((summary, messages)),
            StageOutcome::Failure { cause } => Err(cause),
        }
    }
}

/// Stages of a pipeline run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Redact,
    MetadataAnonymize,
    Reorganize,
    ClinicalHash,
}

impl Stage {
    /// Stable name used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Redact => "redact",
            Stage::MetadataAnonymize => "metadata_anonymize",
            Stage::Reorganize => "reorganize",
            Stage::ClinicalHash => "clinical_hash",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// States of the pipeline state machine
///
/// `Init -> [Redact] -> [MetadataAnonymize] -> [Reorganize] -> [ClinicalHash] -> Done`,
/// with `Failed` reachable from every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Init,
    Running(Stage),
    Done,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Init => f.write_str("init"),
            PipelineState::Running(stage) => write!(f, "{stage}"),
            PipelineState::Done => f.write_str("done"),
            PipelineState::Failed => f.write_str("failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_messages() {
        let ok: StageOutcome<u32> = StageOutcome::from_messages(1, vec![]);
        assert!(matches!(ok, StageOutcome::Success { summary: 1 }));

        let warn = StageOutcome::from_messages(2, vec!["engine said hi".to_string()]);
        assert_eq!(warn.messages(), ["engine said hi".to_string()]);
        assert!(!warn.is_failure());
    }

    #[test]
    fn test_into_result() {
        let failed: StageOutcome<()> = StageOutcome::Failure {
            cause: ObscuraError::external_stage("redact", "missing binary"),
        };
        assert!(failed.is_failure());
        assert!(matches!(
            failed.into_result(),
            Err(ObscuraError::ExternalStage { .. })
        ));

        let (summary, warnings) = StageOutcome::from_messages(5, vec!["w".into()])
            .into_result()
            .unwrap();
        assert_eq!(summary, 5);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PipelineState::Init.to_string(), "init");
        assert_eq!(
            PipelineState::Running(Stage::MetadataAnonymize).to_string(),
            "metadata_anonymize"
        );
        assert_eq!(PipelineState::Failed.to_string(), "failed");
    }
}
