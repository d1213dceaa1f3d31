//! Run summary and reporting

use super::outcome::{PipelineState, Stage};
use crate::adapters::anonymizer::AnonymizeSummary;
use crate::adapters::clinical::ClinicalSummary;
use crate::adapters::redaction::RedactionSummary;
use crate::core::reorganize::ReorganizeSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// A diagnostic a stage absorbed without failing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageWarning {
    pub stage: Stage,
    pub message: String,
}

/// Summary of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Random identifier correlating all log lines of the run
    pub run_id: Uuid,

    pub provider_id: String,
    pub started_at: DateTime<Utc>,

    /// States entered, in order
    pub states: Vec<PipelineState>,

    pub redaction: Option<RedactionSummary>,
    pub anonymization: Option<AnonymizeSummary>,
    pub reorganization: Option<ReorganizeSummary>,
    pub clinical: Option<ClinicalSummary>,

    /// Warnings absorbed by the stages
    pub warnings: Vec<StageWarning>,

    /// Duration of the run
    #[serde(skip)]
    pub duration: Duration,
}

impl RunSummary {
    /// Create a new summary in the `Init` state
    pub fn new(run_id: Uuid, provider_id: impl Into<String>) -> Self {
        Self {
            run_id,
            provider_id: provider_id.into(),
            started_at: Utc::now(),
            states: vec![PipelineState::Init],
            redaction: None,
            anonymization: None,
            reorganization: None,
            clinical: None,
            warnings: Vec::new(),
            duration: Duration::from_secs(0),
        }
    }

    /// Records a state transition
    pub fn enter(&mut self, state: PipelineState) {
        tracing::debug!(state = %state, "Pipeline state");
        self.states.push(state);
    }

    /// Current state
    pub fn state(&self) -> PipelineState {
        self.states
            .last()
            .copied()
            .unwrap_or(PipelineState::Init)
    }

    /// Whether `stage` was entered
    pub fn ran(&self, stage: Stage) -> bool {
        self.states.contains(&PipelineState::Running(stage))
    }

    /// Records the warnings of `stage`
    pub fn add_warnings(&mut self, stage: Stage, messages: Vec<String>) {
        self.warnings.extend(
            messages
                .into_iter()
                .map(|message| StageWarning { stage, message }),
        );
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Check if the run reached `Done`
    pub fn is_successful(&self) -> bool {
        self.state() == PipelineState::Done
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            state = %self.state(),
            redacted = self.redaction.as_ref().map(|r| r.files_redacted),
            anonymized = self.anonymization.as_ref().map(|a| a.processed_files),
            reorganized = self.reorganization.as_ref().map(|r| r.files_copied),
            clinical_files = self.clinical.as_ref().map(|c| c.files_hashed),
            warnings = self.warnings.len(),
            duration_secs = self.duration.as_secs(),
            "Pipeline run completed"
        );

        if !self.warnings.is_empty() {
            tracing::warn!(
                warning_count = self.warnings.len(),
                "Pipeline run completed with warnings"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_summary() {
        let summary = RunSummary::new(Uuid::new_v4(), "abc");
        assert_eq!(summary.state(), PipelineState::Init);
        assert!(!summary.is_successful());
        assert!(summary.warnings.is_empty());
    }

    #[test]
    fn test_transitions_and_warnings() {
        let mut summary = RunSummary::new(Uuid::new_v4(), "abc");
        summary.enter(PipelineState::Running(Stage::MetadataAnonymize));
        summary.add_warnings(
            Stage::MetadataAnonymize,
            vec!["a".to_string(), "b".to_string()],
        );
        summary.enter(PipelineState::Done);

        assert!(summary.is_successful());
        assert!(summary.ran(Stage::MetadataAnonymize));
        assert!(!summary.ran(Stage::Redact));
        assert_eq!(summary.warnings.len(), 2);
        assert_eq!(summary.warnings[1].stage, Stage::MetadataAnonymize);
    }

    #[test]
    fn test_serializes_without_duration() {
        let summary = RunSummary::new(Uuid::nil(), "abc").with_duration(Duration::from_secs(3));
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["states"][0], "init");
        assert!(json.get("duration").is_none());
    }
}
