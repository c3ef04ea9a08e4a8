use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::debug;

use crate::diagnostics::{self, Diagnostic};
use crate::tools::process;

const SCRATCH_FILE: &str = "buffer.ts";

/// Type checks the buffer by writing it to a scratch file and running `tsc`
/// over it.
pub struct TscChecker {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
    scratch: TempDir,
}

impl TscChecker {
    pub fn new(program: PathBuf, args: Vec<String>, timeout: Duration) -> Result<Self> {
        let scratch = tempfile::Builder::new()
            .prefix("tsmodal-")
            .tempdir()
            .context("Failed to create scratch directory for tsc")?;
        Ok(Self {
            program,
            args,
            timeout,
            scratch,
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn scratch_file(&self) -> PathBuf {
        self.scratch.path().join(SCRATCH_FILE)
    }

    pub fn check(&self, source: &str) -> Result<Vec<Diagnostic>> {
        let file = self.scratch_file();
        fs::write(&file, source)
            .with_context(|| format!("Failed to write {}", file.display()))?;

        let mut args = self.args.clone();
        args.push(file.to_string_lossy().into_owned());

        let output = process::run_captured(&self.program, &args, None, self.timeout)
            .context("tsc failed")?;
        debug!(code = output.exit_code(), "tsc finished");

        // tsc reports on stdout; stderr only carries crashes.
        let mut report = output.stdout;
        report.push('\n');
        report.push_str(&output.stderr);
        Ok(diagnostics::parse_tsc_output(&report, SCRATCH_FILE))
    }
}
