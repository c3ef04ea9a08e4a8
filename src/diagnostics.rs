#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// A problem reported against the buffer. `line` and `column` are
/// zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub column: Option<usize>,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub code: Option<String>, // e.g., "TS2322"
}

impl Diagnostic {
    pub fn error(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column: None,
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            code: None,
        }
    }

    pub fn warning(line: usize, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            ..Self::error(line, message)
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }
}

/// Parse `tsc --pretty false` output, keeping what belongs to `file_name`.
///
/// tsc output format examples:
/// - `buffer.ts(15,3): error TS2322: Type 'string' is not assignable to type 'number'.`
/// - `/tmp/x/buffer.ts(2,1): warning TS6133: 'a' is declared but never read.`
/// - `error TS5023: Unknown compiler option 'foo'.` (no location, pinned to line 0)
///
/// Indented continuation lines of chained messages are skipped.
pub fn parse_tsc_output(output: &str, file_name: &str) -> Vec<Diagnostic> {
    output
        .lines()
        .filter_map(|line| parse_tsc_line(line, file_name).or_else(|| parse_tsc_global(line)))
        .collect()
}

fn parse_tsc_line(line: &str, file_name: &str) -> Option<Diagnostic> {
    // Pattern: path(line,col): error TSxxxx: message
    let header_end = line.find("): ")?;
    let paren_open = line[..header_end].rfind('(')?;

    let path = line[..paren_open].trim();
    if path.is_empty() || !path.ends_with(file_name) {
        return None;
    }

    let (line_str, col_str) = line[paren_open + 1..header_end].split_once(',')?;
    let line_num: usize = line_str.trim().parse().ok()?;
    let col_num: usize = col_str.trim().parse().ok()?;

    let mut diag = parse_severity_and_message(&line[header_end + 3..], line_num.saturating_sub(1))?;
    diag.column = Some(col_num.saturating_sub(1));
    Some(diag)
}

fn parse_tsc_global(line: &str) -> Option<Diagnostic> {
    if line.starts_with(char::is_whitespace) {
        return None;
    }
    parse_severity_and_message(line, 0)
}

/// Parse `error TSxxxx: message` (or `warning ...`).
fn parse_severity_and_message(text: &str, line: usize) -> Option<Diagnostic> {
    let text = text.trim();
    let (severity, rest) = if let Some(rest) = text.strip_prefix("error") {
        (DiagnosticSeverity::Error, rest)
    } else if let Some(rest) = text.strip_prefix("warning") {
        (DiagnosticSeverity::Warning, rest)
    } else {
        return None;
    };

    let (code, message) = rest.trim_start().split_once(':')?;
    let code = code.trim();
    if !code.starts_with("TS") {
        return None;
    }

    let diag = match severity {
        DiagnosticSeverity::Error => Diagnostic::error(line, message.trim()),
        DiagnosticSeverity::Warning => Diagnostic::warning(line, message.trim()),
    };
    Some(diag.with_code(code))
}

/// Diagnostics surfaced on `line`, at most `limit` of them, in report order.
pub fn diagnostics_for_line(
    diagnostics: &[Diagnostic],
    line: usize,
    limit: usize,
) -> Vec<&Diagnostic> {
    diagnostics
        .iter()
        .filter(|d| d.line == line)
        .take(limit)
        .collect()
}

/// Count errors and warnings
pub fn count_by_severity(diagnostics: &[Diagnostic]) -> (usize, usize) {
    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == DiagnosticSeverity::Error)
        .count();
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == DiagnosticSeverity::Warning)
        .count();
    (errors, warnings)
}
