//! Subprocess boundary shared by the external engines
//!
//! Both external engines are launched through a [`ProcessRunner`], so tests
//! can substitute a fake that returns canned output without spawning anything.

use crate::domain::{ObscuraError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;

/// A fully resolved command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable name or path
    pub program: String,

    /// Arguments, in order
    pub args: Vec<String>,

    /// Working directory for the child, inherited when `None`
    pub working_dir: Option<PathBuf>,
}

impl Invocation {
    /// Creates an invocation without arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    /// Appends one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Sets the working directory
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Value following `flag` in the argument list
    pub fn arg_after(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

/// Captured output of a finished child
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,

    /// Exit code, `None` if the child was terminated by a signal
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    /// Whether the child exited with code 0
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Non-empty stderr lines
    pub fn stderr_lines(&self) -> impl Iterator<Item = &str> {
        self.stderr
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
    }
}

/// Launches external processes and waits for them to finish
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs `invocation` to completion, draining stdout and stderr
    ///
    /// # Errors
    ///
    /// Returns [`ObscuraError::ExternalStage`] if the process cannot be
    /// started. A process that starts and exits non-zero is not an error.
    async fn run(&self, stage: &str, invocation: &Invocation) -> Result<ProcessOutput>;
}

/// [`ProcessRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn run(&self, stage: &str, invocation: &Invocation) -> Result<ProcessOutput> {
        let mut command = tokio::process::Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &invocation.working_dir {
            command.current_dir(dir);
        }

        tracing::debug!(stage, program = %invocation.program, "Launching external process");

        // output() reads both pipes concurrently before waiting on the child
        let output = command.output().await.map_err(|e| {
            ObscuraError::external_stage(
                stage,
                format!("failed to start '{}': {e}", invocation.program),
            )
        })?;

        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}
