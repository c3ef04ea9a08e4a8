use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use super::process;
use super::toolchain;
use crate::config::RunnerConfig;

#[derive(Debug)]
pub struct RunOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Executes the buffer with an external TypeScript runtime, source on stdin.
pub struct Runner {
    command: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl Runner {
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            timeout: config.timeout(),
        }
    }

    pub fn run(&self, source: &str) -> Result<RunOutput> {
        let program = toolchain::find_executable(&self.command).with_context(|| {
            format!(
                "Could not find '{}'. Install it or configure runner.command.",
                self.command.display()
            )
        })?;

        info!(program = %program.display(), "running buffer");
        let output = process::run_captured(&program, &self.args, Some(source), self.timeout)
            .context("Failed to run buffer")?;

        Ok(RunOutput {
            exit_code: output.exit_code(),
            stdout: output.stdout.trim_end().to_string(),
            stderr: output.stderr.trim_end().to_string(),
        })
    }
}
