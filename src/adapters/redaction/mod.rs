//! OCR pixel redaction
//!
//! The redaction engine is invoked once per DICOM file. Its output for
//! `input/a/b/x.dcm` lands in `output/a/b/`, so the redacted tree mirrors the
//! input tree and can replace it for the following stages.

use crate::adapters::process::{Invocation, ProcessRunner};
use crate::core::index::{is_supported, resolves_to_file};
use crate::core::pipeline::outcome::{Stage, StageOutcome};
use crate::domain::{ObscuraError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use walkdir::WalkDir;

/// OCR engine used by the redaction program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedactionEngineKind {
    Tesseract,
    Paddle,
}

impl RedactionEngineKind {
    /// Value passed to `--engine`
    pub fn as_str(&self) -> &'static str {
        match self {
            RedactionEngineKind::Tesseract => "tesseract",
            RedactionEngineKind::Paddle => "paddle",
        }
    }
}

impl fmt::Display for RedactionEngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RedactionEngineKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tesseract" => Ok(RedactionEngineKind::Tesseract),
            "paddle" => Ok(RedactionEngineKind::Paddle),
            other => Err(format!(
                "redaction engine must be 'tesseract' or 'paddle', got '{other}'"
            )),
        }
    }
}

/// Counters of one redaction pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RedactionSummary {
    /// Files the engine processed successfully
    pub files_redacted: usize,

    /// Files the engine reported as failed (non-zero exit)
    pub files_failed: usize,

    /// Files without the DICOM magic
    pub files_skipped: usize,

    pub elapsed_secs: f64,
}

/// Per-file OCR redaction through a [`ProcessRunner`]
pub struct RedactionStage {
    program: String,
    engine: RedactionEngineKind,
    threads: usize,
    runner: Arc<dyn ProcessRunner>,
}

impl RedactionStage {
    /// Create a new redaction stage
    pub fn new(
        program: impl Into<String>,
        engine: RedactionEngineKind,
        threads: usize,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            program: program.into(),
            engine,
            threads,
            runner,
        }
    }

    /// Command line redacting `file` into `output_dir`
    pub fn build_invocation(&self, file: &Path, output_dir: &Path) -> Invocation {
        Invocation::new(&self.program)
            .arg("--engine")
            .arg(self.engine.as_str())
            .arg("--threads")
            .arg(self.threads.to_string())
            .arg("--input")
            .arg(file.display().to_string())
            .arg("--output-dir")
            .arg(output_dir.display().to_string())
    }

    /// Redacts every DICOM file under `input_dir` into the mirrored location
    /// under `output_dir`
    pub async fn run(&self, input_dir: &Path, output_dir: &Path) -> StageOutcome<RedactionSummary> {
        match self.try_run(input_dir, output_dir).await {
            Ok(outcome) => outcome,
            Err(cause) => StageOutcome::Failure { cause },
        }
    }

    async fn try_run(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<StageOutcome<RedactionSummary>> {
        let stage = Stage::Redact.as_str();
        if !input_dir.is_dir() {
            return Err(ObscuraError::Validation(format!(
                "Input directory does not exist: {}",
                input_dir.display()
            )));
        }

        tracing::info!(
            engine = %self.engine,
            output_dir = %output_dir.display(),
            "Starting OCR redaction"
        );

        let started = Instant::now();
        let mut summary = RedactionSummary::default();
        let mut messages = Vec::new();

        for entry in WalkDir::new(input_dir).sort_by_file_name() {
            let entry = entry?;
            match resolves_to_file(&entry) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    tracing::debug!(file = %entry.path().display(), error = %e, "Skipping unreadable entry");
                    summary.files_skipped += 1;
                    continue;
                }
            }
            let file = entry.path();
            if !is_supported(file) {
                summary.files_skipped += 1;
                continue;
            }

            let relative_parent = file
                .parent()
                .and_then(|p| p.strip_prefix(input_dir).ok())
                .unwrap_or_else(|| Path::new(""));
            let target_dir = output_dir.join(relative_parent);
            std::fs::create_dir_all(&target_dir).map_err(|e| {
                ObscuraError::Io(format!(
                    "Failed to create redaction output {}: {e}",
                    target_dir.display()
                ))
            })?;

            tracing::debug!(file = %file.display(), "OCR processing file");
            let output = self
                .runner
                .run(stage, &self.build_invocation(file, &target_dir))
                .await?;

            for line in output.stderr_lines() {
                tracing::warn!(stage, file = %file.display(), line, "Redaction engine error output");
                messages.push(format!("{}: {line}", file.display()));
            }

            if output.success() {
                summary.files_redacted += 1;
            } else {
                summary.files_failed += 1;
                messages.push(format!(
                    "{}: redaction engine exited with {:?}",
                    file.display(),
                    output.exit_code
                ));
            }
        }

        summary.elapsed_secs = started.elapsed().as_secs_f64();
        tracing::info!(
            redacted = summary.files_redacted,
            failed = summary.files_failed,
            skipped = summary.files_skipped,
            elapsed_secs = format!("{:.3}", summary.elapsed_secs),
            "OCR redaction completed"
        );

        Ok(StageOutcome::from_messages(summary, messages))
    }
}
