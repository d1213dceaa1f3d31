//! Pipeline orchestrator - sequencing of the de-identification stages
//!
//! Stages run strictly one after the other:
//!
//! 1. **Redact** (optional): OCR redaction into a scratch directory
//! 2. **MetadataAnonymize** (optional): batch anonymizer, into a scratch
//!    directory when the output is reorganized, into the output directory
//!    otherwise
//! 3. **Reorganize** (hierarchical runs): Patient/Study/Series layout
//! 4. **ClinicalHash** (optional): CSV pseudonymization with the same key
//!
//! Scratch directories are removed whether the run ends in `Done` or
//! `Failed`. Output already written by finished stages is left in place.

use super::outcome::{PipelineState, Stage, StageOutcome};
use super::run::PipelineRun;
use super::scratch::ScratchSpace;
use super::summary::RunSummary;
use crate::adapters::anonymizer::{AnonymizeParams, MetadataAnonymizer};
use crate::adapters::clinical::{ClinicalHasher, CsvClinicalHasher};
use crate::adapters::process::ProcessRunner;
use crate::adapters::redaction::RedactionStage;
use crate::config::ObscuraConfig;
use crate::core::reorganize::reorganize;
use crate::domain::{ObscuraError, Result};
use crate::{log_stage_complete, log_stage_start};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, Span};
use uuid::Uuid;

/// Drives one [`PipelineRun`] from `Init` to `Done` or `Failed`
pub struct PipelineOrchestrator {
    run: PipelineRun,
    run_id: Uuid,
    span: Span,
    redaction: Option<RedactionStage>,
    anonymizer: MetadataAnonymizer,
    clinical: Arc<dyn ClinicalHasher>,
}

impl PipelineOrchestrator {
    /// Create a new orchestrator
    ///
    /// External processes are launched through `runner`; the clinical stage
    /// defaults to [`CsvClinicalHasher`].
    pub fn new(run: PipelineRun, config: &ObscuraConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "pipeline_run",
            run_id = %run_id,
            provider_id = %run.provider_id,
        );

        let redaction = run.redaction.map(|engine| {
            RedactionStage::new(
                config.redaction.program.clone(),
                engine,
                run.threads,
                runner.clone(),
            )
        });

        Self {
            anonymizer: MetadataAnonymizer::new(config.anonymizer.clone(), runner),
            clinical: Arc::new(CsvClinicalHasher::new(config.clinical.clone())),
            redaction,
            run,
            run_id,
            span,
        }
    }

    /// Replaces the clinical hashing stage
    pub fn with_clinical_hasher(mut self, hasher: Box<dyn ClinicalHasher>) -> Self {
        self.clinical = Arc::from(hasher);
        self
    }

    /// Identifier attached to every log line of this run
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The validated run
    pub fn run(&self) -> &PipelineRun {
        &self.run
    }

    /// Executes the run
    ///
    /// # Errors
    ///
    /// Returns the cause of the first failed stage. Scratch directories are
    /// removed before the error is returned.
    pub async fn execute(&self) -> Result<RunSummary> {
        let started = Instant::now();
        let mut summary = RunSummary::new(self.run_id, self.run.provider_id.as_str());
        let mut scratch = ScratchSpace::new(self.run.scratch_dir.clone());

        let result = self
            .execute_stages(&mut summary, &mut scratch)
            .instrument(self.span.clone())
            .await;

        let _entered = self.span.enter();
        let leftover = scratch.close();
        if leftover > 0 {
            tracing::warn!(leftover, "Some scratch directories could not be removed");
        }

        match result {
            Ok(()) => {
                summary.enter(PipelineState::Done);
                let summary = summary.with_duration(started.elapsed());
                summary.log_summary();
                Ok(summary)
            }
            Err(e) => {
                let failed_in = summary.state();
                summary.enter(PipelineState::Failed);
                tracing::error!(state = %failed_in, error = %e, "Pipeline run failed");
                Err(e)
            }
        }
    }

    async fn execute_stages(
        &self,
        summary: &mut RunSummary,
        scratch: &mut ScratchSpace,
    ) -> Result<()> {
        let run = &self.run;
        tracing::info!(
            input_dir = %run.input_dir.display(),
            output_dir = %run.output_dir.display(),
            redaction = ?run.redaction,
            metadata_anonymize = run.metadata_anonymize,
            hierarchical = run.hierarchical,
            clinical_hash = run.clinical_hash,
            "Starting pipeline run"
        );

        let mut images_dir = run.input_dir.clone();

        if let Some(stage) = &self.redaction {
            summary.enter(PipelineState::Running(Stage::Redact));
            log_stage_start!(Stage::Redact);
            let redacted_dir = if run.metadata_anonymize {
                scratch.allocate("redacted")?
            } else {
                run.output_dir.clone()
            };
            let stage_started = Instant::now();
            let redaction = settle(
                summary,
                Stage::Redact,
                stage.run(&images_dir, &redacted_dir).await,
            )?;
            log_stage_complete!(Stage::Redact, stage_started.elapsed());
            summary.redaction = Some(redaction);
            images_dir = redacted_dir;
        }

        if run.metadata_anonymize {
            summary.enter(PipelineState::Running(Stage::MetadataAnonymize));
            log_stage_start!(Stage::MetadataAnonymize);
            let anonymized_dir: PathBuf = if run.reorganizes() {
                scratch.allocate("anonymized")?
            } else {
                run.output_dir.clone()
            };
            let stage_started = Instant::now();
            let params = AnonymizeParams {
                input_dir: &images_dir,
                output_dir: &anonymized_dir,
                provider_id: &run.provider_id,
                secret_key: &run.secret_key,
                threads: run.threads,
            };
            let anonymization = settle(
                summary,
                Stage::MetadataAnonymize,
                self.anonymizer.run(params).await,
            )?;
            log_stage_complete!(Stage::MetadataAnonymize, stage_started.elapsed());
            summary.anonymization = Some(anonymization);

            if run.reorganizes() {
                summary.enter(PipelineState::Running(Stage::Reorganize));
                log_stage_start!(Stage::Reorganize);
                let stage_started = Instant::now();
                let (flat_dir, target_dir, order) =
                    (anonymized_dir, run.output_dir.clone(), run.reorganize_order);
                let reorganization = blocking(Stage::Reorganize, move || {
                    reorganize(flat_dir, target_dir, order)
                })
                .await??;
                log_stage_complete!(Stage::Reorganize, stage_started.elapsed());
                if reorganization.skipped.total() > 0 {
                    tracing::warn!(
                        unsupported = reorganization.skipped.unsupported,
                        unreadable = reorganization.skipped.unreadable,
                        "Files left out of the hierarchical output"
                    );
                }
                summary.reorganization = Some(reorganization);
            }
        }

        if run.clinical_hash {
            summary.enter(PipelineState::Running(Stage::ClinicalHash));
            log_stage_start!(Stage::ClinicalHash);
            let stage_started = Instant::now();
            let hasher = self.clinical.clone();
            let (input_dir, output_dir, secret_key) = (
                run.input_dir.clone(),
                run.output_dir.clone(),
                run.secret_key.clone(),
            );
            let outcome = blocking(Stage::ClinicalHash, move || {
                hasher.hash(&input_dir, &output_dir, &secret_key)
            })
            .await?;
            let clinical = settle(summary, Stage::ClinicalHash, outcome)?;
            log_stage_complete!(Stage::ClinicalHash, stage_started.elapsed());
            summary.clinical = Some(clinical);
        }

        Ok(())
    }
}

/// Runs filesystem-bound stage work off the async workers, inside the
/// current span
async fn blocking<T, F>(stage: Stage, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let span = Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(work))
        .await
        .map_err(|e| ObscuraError::Other(format!("{stage} task failed: {e}")))
}

/// Records the warnings of a stage outcome and unwraps its summary
fn settle<S>(
    summary: &mut RunSummary,
    stage: Stage,
    outcome: StageOutcome<S>,
) -> std::result::Result<S, ObscuraError> {
    let (stage_summary, messages) = outcome.into_result()?;
    if !messages.is_empty() {
        tracing::warn!(stage = %stage, count = messages.len(), "Stage finished with warnings");
        summary.add_warnings(stage, messages);
    }
    Ok(stage_summary)
}
