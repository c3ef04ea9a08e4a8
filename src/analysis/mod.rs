//! Language analysis: tokens for highlighting and diagnostics for the
//! inline annotations.
//!
//! The session only talks to [`AnalysisService`]. The shipped
//! implementation, [`TypeScriptService`], parses with tree-sitter and checks
//! either with an external `tsc` or, when that is unavailable, with the
//! syntax errors from the parse tree.

pub mod checker;
pub mod syntax;
pub mod tsc;

use anyhow::Result;
use tracing::{info, warn};
use tree_sitter::Tree;

use crate::config::AnalysisConfig;
use crate::diagnostics::Diagnostic;
use crate::tools::toolchain;
use syntax::TypeScriptParser;
use tsc::TscChecker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Keyword,
    TypeKeyword,
    Punctuation,
    Number,
    String,
    Template,
    Regex,
    Comment,
    Whitespace,
    NewLine,
    Unknown,
}

/// A classified piece of source. Concatenating the tokens of a source gives
/// back the source exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// What the session needs from a language backend.
pub trait AnalysisService {
    /// Bring the backend's program model in line with the buffer. Called on
    /// every edit, so it must be cheap.
    fn update_source(&mut self, source: &str);

    /// Tokenize `source`. Runs synchronously on every edit.
    fn tokenize(&mut self, source: &str) -> Vec<Token>;

    /// Diagnostics for the last source passed to `update_source`. Runs
    /// after the debounce window; may be slow and may fail.
    fn diagnostics(&mut self) -> Result<Vec<Diagnostic>>;
}

/// TypeScript analysis backed by tree-sitter plus `tsc` when present.
pub struct TypeScriptService {
    parser: TypeScriptParser,
    source: String,
    tree: Option<Tree>,
    tsc: Option<TscChecker>,
}

impl TypeScriptService {
    /// Build a service from config, resolving `tsc` on the way. Falls back to
    /// structural checks when `tsc` is disabled, missing or unusable.
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        let mut service = Self::structural()?;
        if !config.enabled {
            info!("type checking disabled, using structural checks");
            return Ok(service);
        }

        let Some(program) = toolchain::find_executable(&config.tsc_path) else {
            warn!(
                tsc = %config.tsc_path.display(),
                "tsc not found, using structural checks"
            );
            return Ok(service);
        };

        match TscChecker::new(program, config.tsc_args.clone(), config.timeout()) {
            Ok(checker) => {
                info!(tsc = %checker.program().display(), "type checking with tsc");
                service.tsc = Some(checker);
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "could not set up tsc, using structural checks");
            }
        }
        Ok(service)
    }

    pub fn structural() -> Result<Self> {
        Ok(Self {
            parser: TypeScriptParser::new()?,
            source: String::new(),
            tree: None,
            tsc: None,
        })
    }

    pub fn uses_tsc(&self) -> bool {
        self.tsc.is_some()
    }
}

impl AnalysisService for TypeScriptService {
    fn update_source(&mut self, source: &str) {
        self.source.clear();
        self.source.push_str(source);
        self.tree = self.parser.parse(source);
    }

    fn tokenize(&mut self, source: &str) -> Vec<Token> {
        // The session tokenizes right after `update_source`, so the tree is
        // usually current.
        if source == self.source {
            return syntax::tokens(self.tree.as_ref(), source);
        }
        let tree = self.parser.parse(source);
        syntax::tokens(tree.as_ref(), source)
    }

    fn diagnostics(&mut self) -> Result<Vec<Diagnostic>> {
        match (&self.tsc, &self.tree) {
            (Some(tsc), _) => tsc.check(&self.source),
            (None, Some(tree)) => Ok(checker::check(tree, &self.source)),
            (None, None) => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_structural_service_reports_syntax_problems() {
        let mut service = TypeScriptService::structural().unwrap();
        service.update_source("const a = 1;\nconst b = ;\n");
        let diagnostics = service.diagnostics().unwrap();
        assert!(!diagnostics.is_empty());
        assert_eq!(diagnostics[0].line, 1);
    }

    #[test]
    fn test_service_tracks_latest_source() {
        let mut service = TypeScriptService::structural().unwrap();
        service.update_source("let a = (1;");
        assert!(!service.diagnostics().unwrap().is_empty());
        service.update_source("let a = (1);");
        assert!(service.diagnostics().unwrap().is_empty());
    }

    #[test]
    fn test_missing_tsc_falls_back_to_structural() {
        let config = AnalysisConfig {
            tsc_path: PathBuf::from("/nonexistent/bin/tsc-for-tests"),
            ..AnalysisConfig::default()
        };
        let service = TypeScriptService::new(&config).unwrap();
        assert!(!service.uses_tsc());
    }

    #[test]
    fn test_tokens_rebuild_source() {
        let mut service = TypeScriptService::structural().unwrap();
        let source = "const x: number = 1;\n";
        let rebuilt: String = service
            .tokenize(source)
            .iter()
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(rebuilt, source);
    }
}
