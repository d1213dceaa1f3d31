//! Run command implementation

use crate::adapters::process::SystemProcessRunner;
use crate::config::{load_config_or_default, ObscuraConfig};
use crate::core::pipeline::{PipelineOrchestrator, PipelineRun, RunRequest, RunSummary};
use crate::core::reorganize::ReorganizeOrder;
use crate::log_error_with_context;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Identifier of the contributing site
    pub site_id: String,

    /// Directory to read DICOM files and clinical CSVs from
    pub input_dir: Option<PathBuf>,

    /// Directory to write de-identified output to
    pub output_dir: Option<PathBuf>,

    /// Redact burned-in text with Tesseract OCR
    #[arg(long)]
    pub ocr: bool,

    /// Redact burned-in text with PaddleOCR
    #[arg(long)]
    pub paddle_ocr: bool,

    /// Threads for the external engines
    #[arg(long)]
    pub threads: Option<usize>,

    /// Reuse this secret key instead of generating one
    #[arg(long, value_name = "KEY", env = "OBSCURA_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Keep the flat anonymizer output instead of a Patient/Study/Series tree
    #[arg(long)]
    pub flat: bool,

    /// Skip metadata anonymization (and therefore reorganization)
    #[arg(long)]
    pub no_anonymize: bool,

    /// Skip clinical CSV hashing
    #[arg(long)]
    pub no_clinical: bool,

    /// File numbering order within each series (traversal, instance-number)
    #[arg(long, value_name = "ORDER")]
    pub order: Option<ReorganizeOrder>,

    /// Print the secret key used by this run
    #[arg(long)]
    pub show_secret: bool,
}

impl RunArgs {
    /// Merges command-line options over configuration
    pub fn to_request(&self, config: &ObscuraConfig) -> RunRequest {
        let mut request = RunRequest::from_config(self.site_id.clone(), config);

        if let Some(dir) = &self.input_dir {
            request.input_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            request.output_dir = dir.clone();
        }
        if let Some(threads) = self.threads {
            request.threads = threads;
        }
        if let Some(secret) = &self.secret {
            request.secret = Some(secret.clone());
        }
        if self.ocr || self.paddle_ocr {
            request.ocr = self.ocr;
            request.paddle_ocr = self.paddle_ocr;
        }
        if self.flat {
            request.hierarchical = false;
        }
        if self.no_anonymize {
            request.metadata_anonymize = false;
        }
        if self.no_clinical {
            request.clinical_hash = false;
        }
        if let Some(order) = self.order {
            request.reorganize_order = order;
        }

        request
    }

    /// Execute the run command
    pub async fn execute(&self, config_path: Option<&Path>) -> anyhow::Result<i32> {
        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                log_error_with_context!(e, "Failed to load configuration");
                eprintln!("{e}");
                return Ok(2);
            }
        };

        let run = match PipelineRun::from_request(self.to_request(&config)) {
            Ok(run) => run,
            Err(e) => {
                log_error_with_context!(e, "Invalid run options");
                eprintln!("Error: {e}");
                return Ok(2);
            }
        };

        if self.show_secret {
            println!("Secret key: {}", run.secret_key.expose());
        }

        let orchestrator = PipelineOrchestrator::new(run, &config, Arc::new(SystemProcessRunner));
        match orchestrator.execute().await {
            Ok(summary) => {
                print_summary(&summary);
                Ok(0)
            }
            Err(e) if e.is_configuration() => {
                eprintln!("Error: {e}");
                Ok(2)
            }
            Err(e) => {
                eprintln!("Pipeline run failed: {e}");
                Ok(5)
            }
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("Run {} completed in {:.1?}", summary.run_id, summary.duration);
    if let Some(r) = &summary.redaction {
        println!(
            "  Redacted: {} files ({} failed, {} skipped)",
            r.files_redacted, r.files_failed, r.files_skipped
        );
    }
    if let Some(a) = &summary.anonymization {
        println!(
            "  Anonymized: {} files in {:.1}s",
            a.processed_files, a.elapsed_secs
        );
    }
    if let Some(r) = &summary.reorganization {
        println!(
            "  Reorganized: {} files into {} series ({} skipped)",
            r.files_copied,
            r.series_directories,
            r.skipped.total()
        );
    }
    if let Some(c) = &summary.clinical {
        println!(
            "  Clinical CSVs: {} hashed, {} ignored, {} withheld",
            c.files_hashed, c.files_ignored, c.files_withheld
        );
    }
    if !summary.warnings.is_empty() {
        println!("  Warnings: {}", summary.warnings.len());
        for warning in &summary.warnings {
            println!("    [{}] {}", warning.stage, warning.message);
        }
    }
}
