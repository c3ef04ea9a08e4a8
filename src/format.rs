//! Source formatting through an external formatter.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::FormatterConfig;
use crate::tools::process::{self, ProcessError};
use crate::tools::toolchain;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    pub parser: String,
    pub tab_width: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            parser: "typescript".to_string(),
            tab_width: 4,
        }
    }
}

#[derive(Debug, Error)]
pub enum FormatError {
    /// The source does not parse. Recoverable: the buffer is kept as is.
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("formatter exited with status {code}: {stderr}")]
    Failed { code: i32, stderr: String },
}

pub trait Formatter {
    fn format(&self, source: &str, options: &FormatOptions) -> Result<String, FormatError>;

    fn name(&self) -> &str;
}

/// Formats with prettier, source on stdin and result on stdout.
pub struct PrettierFormatter {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl PrettierFormatter {
    pub fn new(program: PathBuf, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program,
            args,
            timeout,
        }
    }

    fn command_args(&self, options: &FormatOptions) -> Vec<String> {
        let mut args = self.args.clone();
        args.extend([
            "--parser".to_string(),
            options.parser.clone(),
            "--tab-width".to_string(),
            options.tab_width.to_string(),
        ]);
        args
    }
}

impl Formatter for PrettierFormatter {
    fn format(&self, source: &str, options: &FormatOptions) -> Result<String, FormatError> {
        let args = self.command_args(options);
        let output = process::run_captured(&self.program, &args, Some(source), self.timeout)?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(classify_failure(output.exit_code(), &output.stderr))
        }
    }

    fn name(&self) -> &str {
        "prettier"
    }
}

/// Turn a failed formatter run into an error, picking out parse failures.
pub fn classify_failure(code: i32, stderr: &str) -> FormatError {
    match stderr.lines().find(|line| line.contains("SyntaxError")) {
        Some(line) => {
            let message = line
                .split_once("SyntaxError:")
                .map(|(_, rest)| rest)
                .unwrap_or(line);
            FormatError::Syntax(message.trim().to_string())
        }
        None => FormatError::Failed {
            code,
            stderr: stderr.trim().to_string(),
        },
    }
}

/// Used when no formatter is installed: returns the source unchanged.
pub struct PassthroughFormatter;

impl Formatter for PassthroughFormatter {
    fn format(&self, source: &str, _options: &FormatOptions) -> Result<String, FormatError> {
        Ok(source.to_string())
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Pick the formatter described by config, falling back to passthrough when
/// the command cannot be found.
pub fn detect(config: &FormatterConfig) -> Box<dyn Formatter> {
    match toolchain::find_executable(&config.command) {
        Some(program) => {
            info!(formatter = %program.display(), "formatting with prettier");
            Box::new(PrettierFormatter::new(
                program,
                config.args.clone(),
                config.timeout(),
            ))
        }
        None => {
            warn!(
                formatter = %config.command.display(),
                "formatter not found, formatting disabled"
            );
            Box::new(PassthroughFormatter)
        }
    }
}
