use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::format::FormatOptions;
use crate::theme::Theme;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub editor: EditorConfig,
    pub analysis: AnalysisConfig,
    pub formatter: FormatterConfig,
    pub runner: RunnerConfig,
    pub theme_name: String,
    #[serde(skip)]
    pub theme: Theme,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet period after the last edit before diagnostics refresh.
    pub debounce_ms: u64,
    /// Lines scrolled per mouse wheel notch.
    pub scroll_step: usize,
    pub diagnostics_per_line: usize,
    /// Columns between the end of a line and its inline diagnostic.
    pub inline_diagnostic_gap: usize,
    /// Display width of a tab character.
    pub tab_width: usize,
    pub show_line_numbers: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            scroll_step: 1,
            diagnostics_per_line: 1,
            inline_diagnostic_gap: 4,
            tab_width: 4,
            show_line_numbers: true,
        }
    }
}

impl EditorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Use `tsc` for type checking. Structural checks are used otherwise.
    pub enabled: bool,
    pub tsc_path: PathBuf,
    pub tsc_args: Vec<String>,
    pub timeout_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tsc_path: PathBuf::from("tsc"),
            tsc_args: vec![
                String::from("--noEmit"),
                String::from("--pretty"),
                String::from("false"),
                String::from("--target"),
                String::from("es2022"),
            ],
            timeout_ms: 10_000,
        }
    }
}

impl AnalysisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    pub command: PathBuf,
    pub args: Vec<String>,
    pub parser: String,
    pub tab_width: usize,
    pub timeout_ms: u64,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from("prettier"),
            args: Vec::new(),
            parser: String::from("typescript"),
            tab_width: 4,
            timeout_ms: 5_000,
        }
    }
}

impl FormatterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn options(&self) -> FormatOptions {
        FormatOptions {
            parser: self.parser.clone(),
            tab_width: self.tab_width,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub command: PathBuf,
    pub args: Vec<String>,
    pub timeout_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from("deno"),
            args: vec![String::from("run"), String::from("-")],
            timeout_ms: 10_000,
        }
    }
}

impl RunnerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            editor: EditorConfig::default(),
            analysis: AnalysisConfig::default(),
            formatter: FormatterConfig::default(),
            runner: RunnerConfig::default(),
            theme_name: String::from("dark"),
            theme: Theme::dark(),
        }
    }
}

impl Config {
    /// Load from `path`, or from the per-user config file when `path` is
    /// `None`. An explicit path must exist; a missing per-user file yields
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default_path = Self::config_file_path()?;
                if !default_path.exists() {
                    info!(path = %default_path.display(), "no config file, using defaults");
                    return Ok(Config::default());
                }
                default_path
            }
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;
        info!(path = %config_path.display(), theme = %config.theme_name, "loaded config");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        if !Theme::available_themes().contains(&config.theme_name.to_lowercase().as_str()) {
            warn!(theme = %config.theme_name, "unknown theme, using dark");
        }
        config.theme = Theme::from_name(&config.theme_name);
        Ok(config)
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "tsmodal", "tsmodal")
            .context("Could not determine config directory")
    }

    fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_local_dir().join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.editor.debounce(), Duration::from_millis(300));
        assert_eq!(config.editor.diagnostics_per_line, 1);
        assert_eq!(config.formatter.options(), FormatOptions::default());
        assert_eq!(config.runner.args, ["run", "-"]);
        assert!(config.analysis.enabled);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
theme_name = "gruvbox"

[editor]
debounce_ms = 150

[formatter]
tab_width = 2
"#,
        )
        .unwrap();

        assert_eq!(config.editor.debounce_ms, 150);
        assert_eq!(config.editor.scroll_step, 1);
        assert_eq!(config.formatter.tab_width, 2);
        assert_eq!(config.formatter.parser, "typescript");
        assert_eq!(config.theme.name, "gruvbox");
        assert_eq!(config.analysis.tsc_path, PathBuf::from("tsc"));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[runner]\ncommand = \"bun\"\nargs = [\"run\", \"-\"]\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.runner.command, PathBuf::from("bun"));
        assert_eq!(config.theme.name, "dark");
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::from_toml("[editor]\ndebounce_ms = \"soon\"").is_err());
    }
}
