//! Batch metadata anonymizer
//!
//! The engine runs once per pipeline run over a whole directory. It takes a
//! declarative script plus two named runtime parameters: the provider
//! identifier derived from the site and the run's secret key.

pub mod report;

pub use report::{parse_output, AnonymizeSummary};

use crate::adapters::process::{Invocation, ProcessRunner};
use crate::config::AnonymizerConfig;
use crate::core::pipeline::outcome::{Stage, StageOutcome};
use crate::domain::{ObscuraError, ProviderId, Result, SecretKey};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Inputs of one anonymizer run
#[derive(Debug, Clone, Copy)]
pub struct AnonymizeParams<'a> {
    pub input_dir: &'a Path,
    pub output_dir: &'a Path,
    pub provider_id: &'a ProviderId,
    pub secret_key: &'a SecretKey,
    pub threads: usize,
}

/// Runs the batch anonymizer through a [`ProcessRunner`]
pub struct MetadataAnonymizer {
    config: AnonymizerConfig,
    runner: Arc<dyn ProcessRunner>,
}

impl MetadataAnonymizer {
    /// Create a new anonymizer stage
    pub fn new(config: AnonymizerConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { config, runner }
    }

    /// Builds the command line for `params`
    ///
    /// The child runs inside the script's directory, so every path handed to
    /// it is made absolute first.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a path cannot be made absolute.
    pub fn build_invocation(&self, params: &AnonymizeParams<'_>) -> Result<Invocation> {
        let script = absolute(&self.config.script)?;
        let working_dir = script
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));

        Ok(Invocation::new(&self.config.program)
            .arg("-jar")
            .arg(self.config.jar.display().to_string())
            .arg("-n")
            .arg(params.threads.to_string())
            .arg("-da")
            .arg(script.display().to_string())
            .arg("-pPROVIDERID")
            .arg(params.provider_id.as_str())
            .arg("-pSECRET_KEY")
            .arg(params.secret_key.expose())
            .arg("-in")
            .arg(absolute(params.input_dir)?.display().to_string())
            .arg("-out")
            .arg(absolute(params.output_dir)?.display().to_string())
            .current_dir(working_dir))
    }

    /// Runs the anonymizer to completion
    ///
    /// Standard error lines become warnings. A non-zero exit is a warning as
    /// well unless `fail_on_nonzero_exit` is set.
    pub async fn run(&self, params: AnonymizeParams<'_>) -> StageOutcome<AnonymizeSummary> {
        match self.try_run(params).await {
            Ok(outcome) => outcome,
            Err(cause) => StageOutcome::Failure { cause },
        }
    }

    async fn try_run(
        &self,
        params: AnonymizeParams<'_>,
    ) -> Result<StageOutcome<AnonymizeSummary>> {
        let stage = Stage::MetadataAnonymize.as_str();
        let invocation = self.build_invocation(&params)?;

        std::fs::create_dir_all(params.output_dir).map_err(|e| {
            ObscuraError::Io(format!(
                "Failed to create anonymizer output {}: {e}",
                params.output_dir.display()
            ))
        })?;

        tracing::info!(
            output_dir = %params.output_dir.display(),
            threads = params.threads,
            "Running metadata anonymizer"
        );

        let output = self.runner.run(stage, &invocation).await?;
        let summary = parse_output(&output.stdout);

        let mut messages = Vec::new();
        for line in output.stderr_lines() {
            tracing::warn!(stage, line, "Anonymizer error output");
            messages.push(line.to_string());
        }

        if !output.success() {
            let status = match output.exit_code {
                Some(code) => format!("exit code {code}"),
                None => "termination by signal".to_string(),
            };
            if self.config.fail_on_nonzero_exit {
                return Err(ObscuraError::external_stage(
                    stage,
                    format!("anonymizer finished with {status}"),
                ));
            }
            tracing::warn!(stage, status = %status, "Anonymizer finished unsuccessfully");
            messages.push(format!("anonymizer finished with {status}"));
        }

        tracing::info!(
            elapsed_secs = summary.elapsed_secs,
            files_anonymized = summary.processed_files,
            "Metadata anonymizer completed"
        );

        Ok(StageOutcome::from_messages(summary, messages))
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| {
        ObscuraError::Io(format!("Failed to resolve path {}: {e}", path.display()))
    })
}
