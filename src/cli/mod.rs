//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Obscura using clap.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\n\nDefault settings",
    "\n  Input directory: /input",
    "\n  Output directory: /output",
    "\n  Threads: 4",
    "\n  Anonymizer: java -jar DAT.jar -da ctp/anon.script",
    "\n  Ignore CSV prefix: _",
    "\n  Pseudonym prefix: PID-",
);

/// Obscura - DICOM de-identification pipeline
#[derive(Parser, Debug)]
#[command(name = "obscura")]
#[command(version, long_version = LONG_VERSION, about, long_about = None)]
#[command(author = "Obscura Contributors")]
pub struct Cli {
    /// Path to configuration file (defaults to obscura.toml if present)
    #[arg(short, long, env = "OBSCURA_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "OBSCURA_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Shorthand for --log-level debug
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level requested on the command line, if any
    pub fn requested_log_level(&self) -> Option<&str> {
        match (&self.log_level, self.verbose) {
            (Some(level), _) => Some(level.as_str()),
            (None, true) => Some("debug"),
            (None, false) => None,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the de-identification pipeline
    Run(commands::run::RunArgs),

    /// Print a new secret key
    Secret(commands::secret::SecretArgs),

    /// Report the series found under a directory, grouped by description
    SeriesInfo(commands::series_info::SeriesInfoArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["obscura", "run", "SITE-1"]);
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["obscura", "--config", "custom.toml", "secret"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["obscura", "--log-level", "warn", "secret"]);
        assert_eq!(cli.requested_log_level(), Some("warn"));
    }

    #[test]
    fn test_verbose_means_debug() {
        let cli = Cli::parse_from(["obscura", "series-info", "-v"]);
        assert_eq!(cli.requested_log_level(), Some("debug"));
    }

    #[test]
    fn test_cli_parse_other_commands() {
        let cli = Cli::parse_from(["obscura", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));

        let cli = Cli::parse_from(["obscura", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));

        let cli = Cli::parse_from(["obscura", "series-info", "/data"]);
        assert!(matches!(cli.command, Commands::SeriesInfo(_)));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
