//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::config::DEFAULT_CONFIG_PATH;
use clap::Args;
use std::fs;
use std::path::PathBuf;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output.display(), "Initializing configuration file");

        println!("📝 Initializing Obscura configuration");
        println!();

        if self.output.exists() && !self.force {
            println!(
                "❌ Configuration file already exists: {}",
                self.output.display()
            );
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output.display());
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output.display());
                println!("  2. Generate a key with `obscura secret` and keep it safe");
                println!("  3. Export it as OBSCURA_PIPELINE_SECRET_KEY to reuse it");
                println!("  4. Validate configuration: obscura validate-config");
                println!("  5. Run: obscura run <SITE_ID>");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }
}

/// Sample configuration with every section and its defaults
pub fn sample_config() -> &'static str {
    r#"# Obscura Configuration File
# DICOM de-identification pipeline

[application]
log_level = "info"

[pipeline]
input_dir = "/input"
output_dir = "/output"
threads = 4
hierarchical = true
metadata_anonymize = true
clinical_hash = true
reorganize_order = "traversal"  # traversal | instance-number
# scratch_dir = "/scratch"
# secret_key = "${OBSCURA_SECRET}"

[anonymizer]
program = "java"
jar = "DAT.jar"
script = "ctp/anon.script"
fail_on_nonzero_exit = false

[redaction]
program = "obscura-redact"
# engine = "tesseract"  # tesseract | paddle

[clinical]
ignore_prefix = "_"
id_columns = ["patient_id"]
pseudonym_prefix = "PID-"

[logging]
local_enabled = false
local_path = "/var/log/obscura"
local_rotation = "daily"  # daily | hourly | never
"#
}
