//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Obscura configuration file.

use crate::config::{load_config_or_default, ObscuraConfig, DEFAULT_CONFIG_PATH};
use clap::Args;
use std::path::Path;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: Option<&Path>) -> anyhow::Result<i32> {
        let shown = config_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        tracing::info!(config_path = %shown, "Validating configuration");

        println!("🔍 Validating configuration file: {shown}");
        println!();

        match load_config_or_default(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!();
                print_summary(&config);
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2)
            }
        }
    }
}

fn print_summary(config: &ObscuraConfig) {
    let pipeline = &config.pipeline;
    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Input Directory: {}", pipeline.input_dir.display());
    println!("  Output Directory: {}", pipeline.output_dir.display());
    println!("  Threads: {}", pipeline.threads);
    println!("  Metadata Anonymization: {}", pipeline.metadata_anonymize);
    println!("  Hierarchical Output: {}", pipeline.hierarchical);
    println!("  Reorganize Order: {}", pipeline.reorganize_order);
    println!("  Clinical Hashing: {}", pipeline.clinical_hash);
    println!(
        "  Secret Key: {}",
        if pipeline.secret_key.is_some() {
            "configured"
        } else {
            "generated per run"
        }
    );
    println!(
        "  Anonymizer: {} -jar {} -da {}",
        config.anonymizer.program,
        config.anonymizer.jar.display(),
        config.anonymizer.script.display()
    );
    match config.redaction.engine {
        Some(engine) => println!("  Redaction: {} ({engine})", config.redaction.program),
        None => println!("  Redaction: disabled"),
    }
    println!("  Clinical ID Columns: {:?}", config.clinical.id_columns);
    println!();
}
