use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::analysis::{AnalysisService, Token};
use crate::command::Command;
use crate::config::EditorConfig;
use crate::diagnostics::{self, Diagnostic};
use crate::editor::{CursorOps, Edit, EditOps, TextBuffer};
use crate::format::{FormatError, FormatOptions, Formatter};
use crate::scheduler::Debouncer;
use crate::tools::Runner;
use crate::ui::output::OutputState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Insert,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Insert => "INSERT",
        }
    }
}

/// Work deferred until the buffer has been quiet for a while.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    RefreshDiagnostics,
}

/// The editing session: owns the buffer, the cursor, the mode and every
/// piece of derived state, plus the capabilities it was built with.
pub struct Session {
    buffer: TextBuffer,
    cursor: usize,
    mode: Mode,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
    diagnostics_stale: bool,
    pub status_message: String,
    pub scroll_offset: usize,
    pub visible_height: usize,
    pub output: OutputState,
    pub show_output: bool,
    analysis: Box<dyn AnalysisService>,
    formatter: Box<dyn Formatter>,
    runner: Runner,
    scheduler: Debouncer<Deferred>,
    editor_config: EditorConfig,
    format_options: FormatOptions,
}

impl Session {
    pub fn new(
        source: &str,
        analysis: Box<dyn AnalysisService>,
        formatter: Box<dyn Formatter>,
        runner: Runner,
        editor_config: EditorConfig,
        format_options: FormatOptions,
    ) -> Self {
        let mut session = Self {
            buffer: TextBuffer::from(source),
            cursor: 0,
            mode: Mode::Normal,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
            diagnostics_stale: false,
            status_message: String::from("i insert | s format | r run | Ctrl-Q quit"),
            scroll_offset: 0,
            visible_height: 1,
            output: OutputState::new(),
            show_output: false,
            analysis,
            formatter,
            runner,
            scheduler: Debouncer::new(),
            editor_config,
            format_options,
        };

        info!(
            chars = session.buffer.len_chars(),
            formatter = session.formatter.name(),
            "session started"
        );
        session.sync_analysis();
        // First diagnostics come without waiting out the quiet period.
        session
            .scheduler
            .schedule(Instant::now(), Duration::ZERO, Deferred::RefreshDiagnostics);
        session
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// True while the shown diagnostics come from an older buffer because the
    /// last refresh failed.
    pub fn diagnostics_stale(&self) -> bool {
        self.diagnostics_stale
    }

    pub fn editor_config(&self) -> &EditorConfig {
        &self.editor_config
    }

    /// Zero-based `(line, column)` of the cursor.
    pub fn cursor_position(&self) -> (usize, usize) {
        (
            CursorOps::current_line(&self.buffer, self.cursor),
            CursorOps::current_column(&self.buffer, self.cursor),
        )
    }

    pub fn diagnostics_for_line(&self, line: usize) -> Vec<&Diagnostic> {
        diagnostics::diagnostics_for_line(
            &self.diagnostics,
            line,
            self.editor_config.diagnostics_per_line,
        )
    }

    /// First diagnostic on the cursor's line.
    pub fn diagnostic_at_cursor(&self) -> Option<&Diagnostic> {
        let (line, _) = self.cursor_position();
        self.diagnostics.iter().find(|d| d.line == line)
    }

    pub fn apply(&mut self, command: Command) -> Result<()> {
        self.apply_at(command, Instant::now())
    }

    /// Apply `command` as if it arrived at `now`.
    pub fn apply_at(&mut self, command: Command, now: Instant) -> Result<()> {
        debug!(?command, mode = ?self.mode, cursor = self.cursor, "apply");
        let buf = &self.buffer;
        let offset = self.cursor;

        match command {
            Command::MoveLeft => self.cursor = CursorOps::move_left(buf, offset),
            Command::MoveRight => self.cursor = CursorOps::move_right(buf, offset),
            Command::MoveUp => self.cursor = CursorOps::move_up(buf, offset),
            Command::MoveDown => self.cursor = CursorOps::move_down(buf, offset),
            Command::WordForward => self.cursor = CursorOps::jump_word_forward(buf, offset),
            Command::WordBack => self.cursor = CursorOps::jump_word_back(buf, offset),
            Command::EnterInsert => self.mode = Mode::Insert,
            Command::ExitInsert => {
                self.mode = Mode::Normal;
                self.format_buffer(now)?;
            }
            Command::InsertText(text) => {
                let edit = EditOps::insert(buf, offset, &text);
                self.apply_edit(edit, now);
            }
            Command::DeleteChar => {
                let edit = EditOps::remove_char(buf, offset);
                self.apply_edit(edit, now);
            }
            Command::Backspace => {
                let edit = EditOps::backspace(buf, offset);
                self.apply_edit(edit, now);
            }
            Command::OpenLineAbove => {
                let edit = EditOps::insert_line_before(buf, offset);
                self.apply_edit(edit, now);
                self.mode = Mode::Insert;
            }
            Command::OpenLineBelow => {
                let edit = EditOps::insert_line_after(buf, offset);
                self.apply_edit(edit, now);
                self.mode = Mode::Insert;
            }
            Command::DeleteLine => {
                let edit = EditOps::delete_line(buf, offset);
                self.apply_edit(edit, now);
            }
            Command::Format => self.format_buffer(now)?,
            Command::Run => self.run_code(),
        }

        self.ensure_cursor_visible();
        Ok(())
    }

    fn apply_edit(&mut self, edit: Edit, now: Instant) {
        let changed = edit.buffer != self.buffer;
        self.buffer = edit.buffer;
        self.cursor = self.buffer.clamp_offset(edit.offset);
        if changed {
            self.on_buffer_changed(now);
        }
    }

    /// Re-tokenize right away and push the diagnostics refresh back.
    fn on_buffer_changed(&mut self, now: Instant) {
        self.sync_analysis();
        let rearmed = self.scheduler.schedule(
            now,
            self.editor_config.debounce(),
            Deferred::RefreshDiagnostics,
        );
        if rearmed {
            debug!("diagnostics refresh re-armed");
        }
    }

    fn sync_analysis(&mut self) {
        let source = self.buffer.to_string();
        self.analysis.update_source(&source);
        self.tokens = self.analysis.tokenize(&source);
    }

    /// Run deferred work whose time has come. Returns whether anything ran.
    pub fn run_due(&mut self, now: Instant) -> bool {
        match self.scheduler.take_due(now) {
            Some(Deferred::RefreshDiagnostics) => {
                self.refresh_diagnostics();
                true
            }
            None => false,
        }
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_until_due(now)
    }

    fn refresh_diagnostics(&mut self) {
        match self.analysis.diagnostics() {
            Ok(diagnostics) => {
                debug!(count = diagnostics.len(), "diagnostics refreshed");
                self.diagnostics = diagnostics;
                self.diagnostics_stale = false;
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "diagnostics refresh failed");
                self.diagnostics_stale = true;
                self.status_message = format!("Diagnostics unavailable: {e}");
            }
        }
    }

    /// Replace the buffer with its formatted form, keeping the cursor on the
    /// same line and column where they still exist. A syntax error leaves
    /// the buffer alone; any other formatter failure is returned.
    fn format_buffer(&mut self, now: Instant) -> Result<()> {
        let source = self.buffer.to_string();
        match self.formatter.format(&source, &self.format_options) {
            Ok(formatted) => {
                if formatted == source {
                    return Ok(());
                }
                let (line, column) = self.cursor_position();
                self.buffer = TextBuffer::from(formatted.as_str());
                self.cursor = CursorOps::offset_at(&self.buffer, line, column);
                self.on_buffer_changed(now);
                self.status_message = String::from("Formatted");
                Ok(())
            }
            Err(FormatError::Syntax(message)) => {
                warn!(%message, "format skipped, source does not parse");
                self.status_message = format!("Format skipped: {message}");
                Ok(())
            }
            Err(e) => Err(e).context("Formatting failed"),
        }
    }

    fn run_code(&mut self) {
        self.output.clear();
        self.show_output = true;
        self.status_message = String::from("Running...");

        match self.runner.run(&self.buffer.to_string()) {
            Ok(run_output) => {
                if !run_output.stdout.is_empty() {
                    self.output.append_stdout(&run_output.stdout);
                }
                if !run_output.stderr.is_empty() {
                    self.output.append_stderr(&run_output.stderr);
                }
                if run_output.exit_code == 0 {
                    self.output.append_success("Program finished");
                    self.status_message = String::from("Program finished");
                } else {
                    self.output
                        .append_error(&format!("Exit code {}", run_output.exit_code));
                    self.status_message = format!("Exit code {}", run_output.exit_code);
                }
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "run failed");
                self.output.append_error(&format!("{e:#}"));
                self.status_message = String::from("Run failed");
            }
        }
    }

    /// Scroll the view by `delta` lines without moving the cursor.
    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.buffer.line_count().saturating_sub(1);
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta).min(max);
    }

    pub fn set_visible_height(&mut self, height: usize) {
        self.visible_height = height.max(1);
    }

    pub fn ensure_cursor_visible(&mut self) {
        let (line, _) = self.cursor_position();
        if line < self.scroll_offset {
            self.scroll_offset = line;
        } else if line >= self.scroll_offset + self.visible_height {
            self.scroll_offset = line + 1 - self.visible_height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::TokenKind;
    use crate::config::RunnerConfig;
    use anyhow::bail;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default)]
    struct Counters {
        updates: Cell<usize>,
        refreshes: Cell<usize>,
        formats: Cell<usize>,
        formatted: RefCell<String>,
    }

    struct FakeAnalysis {
        counters: Rc<Counters>,
        source: String,
        fail: Rc<Cell<bool>>,
    }

    impl AnalysisService for FakeAnalysis {
        fn update_source(&mut self, source: &str) {
            self.counters.updates.set(self.counters.updates.get() + 1);
            self.source = source.to_string();
        }

        fn tokenize(&mut self, source: &str) -> Vec<Token> {
            vec![Token::new(source, TokenKind::Identifier)]
        }

        fn diagnostics(&mut self) -> Result<Vec<Diagnostic>> {
            self.counters.refreshes.set(self.counters.refreshes.get() + 1);
            if self.fail.get() {
                bail!("checker crashed");
            }
            Ok(self
                .source
                .lines()
                .enumerate()
                .filter(|(_, text)| text.contains("bad"))
                .map(|(line, _)| Diagnostic::error(line, "bad line"))
                .collect())
        }
    }

    enum FormatBehavior {
        Identity,
        Replace(String),
        Syntax,
        Fatal,
    }

    struct FakeFormatter {
        counters: Rc<Counters>,
        behavior: Rc<RefCell<FormatBehavior>>,
    }

    impl Formatter for FakeFormatter {
        fn format(&self, source: &str, _options: &FormatOptions) -> Result<String, FormatError> {
            self.counters.formats.set(self.counters.formats.get() + 1);
            self.counters.formatted.replace(source.to_string());
            match &*self.behavior.borrow() {
                FormatBehavior::Identity => Ok(source.to_string()),
                FormatBehavior::Replace(text) => Ok(text.clone()),
                FormatBehavior::Syntax => Err(FormatError::Syntax("';' expected.".into())),
                FormatBehavior::Fatal => Err(FormatError::Failed {
                    code: 1,
                    stderr: "boom".into(),
                }),
            }
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    struct Harness {
        session: Session,
        counters: Rc<Counters>,
        behavior: Rc<RefCell<FormatBehavior>>,
        fail_analysis: Rc<Cell<bool>>,
    }

    fn harness(source: &str) -> Harness {
        let counters = Rc::new(Counters::default());
        let behavior = Rc::new(RefCell::new(FormatBehavior::Identity));
        let fail_analysis = Rc::new(Cell::new(false));
        let session = Session::new(
            source,
            Box::new(FakeAnalysis {
                counters: counters.clone(),
                source: String::new(),
                fail: fail_analysis.clone(),
            }),
            Box::new(FakeFormatter {
                counters: counters.clone(),
                behavior: behavior.clone(),
            }),
            Runner::new(&RunnerConfig::default()),
            EditorConfig::default(),
            FormatOptions::default(),
        );
        Harness {
            session,
            counters,
            behavior,
            fail_analysis,
        }
    }

    #[test]
    fn test_new_session_starts_in_normal_at_zero() {
        let h = harness("let a = 1;\n");
        assert_eq!(h.session.mode(), Mode::Normal);
        assert_eq!(h.session.cursor(), 0);
        assert_eq!(h.session.tokens()[0].text, "let a = 1;\n");
        assert_eq!(h.counters.updates.get(), 1);
    }

    #[test]
    fn test_insert_then_escape_formats_exactly_once() {
        let mut h = harness("abc");
        h.session.apply(Command::EnterInsert).unwrap();
        assert_eq!(h.session.mode(), Mode::Insert);

        h.session.apply(Command::InsertText("x".into())).unwrap();
        assert_eq!(h.session.buffer().to_string(), "xabc");
        assert_eq!(h.session.cursor(), 1);
        assert_eq!(h.counters.formats.get(), 0);

        h.session.apply(Command::ExitInsert).unwrap();
        assert_eq!(h.session.mode(), Mode::Normal);
        assert_eq!(h.counters.formats.get(), 1);
        assert_eq!(*h.counters.formatted.borrow(), "xabc");
    }

    #[test]
    fn test_format_keeps_cursor_line_and_column() {
        let mut h = harness("a\n  bcdef");
        h.session.apply(Command::MoveDown).unwrap();
        for _ in 0..4 {
            h.session.apply(Command::MoveRight).unwrap();
        }
        assert_eq!(h.session.cursor_position(), (1, 4));

        *h.behavior.borrow_mut() = FormatBehavior::Replace("a;\nbcdef;\n".into());
        h.session.apply(Command::Format).unwrap();
        assert_eq!(h.session.buffer().to_string(), "a;\nbcdef;\n");
        assert_eq!(h.session.cursor_position(), (1, 4));

        // Column is clamped when the line got shorter.
        *h.behavior.borrow_mut() = FormatBehavior::Replace("a;\nb;\n".into());
        h.session.apply(Command::Format).unwrap();
        assert_eq!(h.session.cursor_position(), (1, 2));
    }

    #[test]
    fn test_syntax_error_leaves_buffer_and_completes_exit() {
        let mut h = harness("let a = ;");
        *h.behavior.borrow_mut() = FormatBehavior::Syntax;
        h.session.apply(Command::EnterInsert).unwrap();
        h.session.apply(Command::ExitInsert).unwrap();

        assert_eq!(h.session.mode(), Mode::Normal);
        assert_eq!(h.session.buffer().to_string(), "let a = ;");
        assert!(h.session.status_message.contains("';' expected."));
    }

    #[test]
    fn test_fatal_format_error_propagates() {
        let mut h = harness("a");
        *h.behavior.borrow_mut() = FormatBehavior::Fatal;
        let err = h.session.apply(Command::Format).unwrap_err();
        assert!(format!("{err:#}").contains("boom"));
        assert_eq!(h.session.buffer().to_string(), "a");
    }

    #[test]
    fn test_burst_of_edits_refreshes_diagnostics_once() {
        let mut h = harness("");
        let start = Instant::now();
        // Initial refresh is due immediately.
        assert!(h.session.run_due(start));
        assert_eq!(h.counters.refreshes.get(), 1);

        h.session.apply(Command::EnterInsert).unwrap();
        let mut now = start;
        for ch in "bad".chars() {
            now += Duration::from_millis(50);
            h.session
                .apply_at(Command::InsertText(ch.to_string()), now)
                .unwrap();
            assert!(!h.session.run_due(now));
        }
        assert_eq!(h.counters.updates.get(), 4);

        assert!(!h.session.run_due(now + Duration::from_millis(299)));
        assert!(h.session.run_due(now + Duration::from_millis(300)));
        assert!(!h.session.run_due(now + Duration::from_secs(10)));
        assert_eq!(h.counters.refreshes.get(), 2);
        assert_eq!(h.session.diagnostics().len(), 1);
    }

    #[test]
    fn test_failed_refresh_keeps_old_diagnostics_and_marks_stale() {
        let mut h = harness("bad\n");
        let now = Instant::now();
        h.session.run_due(now);
        assert_eq!(h.session.diagnostics().len(), 1);

        h.fail_analysis.set(true);
        h.session.apply_at(Command::DeleteLine, now).unwrap();
        h.session.run_due(now + Duration::from_secs(1));
        assert!(h.session.diagnostics_stale());
        assert_eq!(h.session.diagnostics().len(), 1);

        h.fail_analysis.set(false);
        h.session.apply_at(Command::InsertText("ok".into()), now).unwrap();
        h.session.run_due(now + Duration::from_secs(1));
        assert!(!h.session.diagnostics_stale());
        assert!(h.session.diagnostics().is_empty());
    }

    #[test]
    fn test_noop_edit_does_not_reschedule() {
        let mut h = harness("abc");
        let now = Instant::now();
        h.session.run_due(now);
        h.session.apply_at(Command::Backspace, now).unwrap();
        assert_eq!(h.session.time_until_due(now), None);
        assert_eq!(h.counters.updates.get(), 1);
    }

    #[test]
    fn test_open_lines_enter_insert() {
        let mut h = harness("abc\ndef");
        h.session.apply(Command::OpenLineBelow).unwrap();
        assert_eq!(h.session.mode(), Mode::Insert);
        assert_eq!(h.session.buffer().to_string(), "abc\n\ndef");
        assert_eq!(h.session.cursor_position(), (1, 0));

        let mut h = harness("abc\ndef");
        h.session.apply(Command::MoveDown).unwrap();
        h.session.apply(Command::OpenLineAbove).unwrap();
        assert_eq!(h.session.mode(), Mode::Insert);
        assert_eq!(h.session.buffer().to_string(), "abc\n\ndef");
        assert_eq!(h.session.cursor_position(), (1, 0));
    }

    #[test]
    fn test_cursor_kept_in_view() {
        let mut h = harness("0\n1\n2\n3\n4\n5\n6");
        h.session.set_visible_height(3);
        for _ in 0..5 {
            h.session.apply(Command::MoveDown).unwrap();
        }
        assert_eq!(h.session.scroll_offset, 3);

        for _ in 0..5 {
            h.session.apply(Command::MoveUp).unwrap();
        }
        assert_eq!(h.session.scroll_offset, 0);
    }

    #[test]
    fn test_scroll_by_clamps() {
        let mut h = harness("0\n1\n2");
        h.session.scroll_by(-4);
        assert_eq!(h.session.scroll_offset, 0);
        h.session.scroll_by(10);
        assert_eq!(h.session.scroll_offset, 2);
    }

    #[test]
    fn test_diagnostics_per_line_limit() {
        let mut h = harness("bad\nbad");
        h.session.run_due(Instant::now());
        assert_eq!(h.session.diagnostics_for_line(0).len(), 1);
        assert_eq!(h.session.diagnostics_for_line(1).len(), 1);
        assert!(h.session.diagnostics_for_line(2).is_empty());

        assert!(h.session.diagnostic_at_cursor().is_some());
        h.session.apply(Command::MoveDown).unwrap();
        assert_eq!(h.session.diagnostic_at_cursor().map(|d| d.line), Some(1));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_fills_output_pane() {
        let mut h = harness("console.log(1)");
        h.session.runner = Runner::new(&RunnerConfig {
            command: "cat".into(),
            args: Vec::new(),
            timeout_ms: 5_000,
        });
        h.session.apply(Command::Run).unwrap();
        assert!(h.session.show_output);
        assert_eq!(h.session.status_message, "Program finished");
        assert_eq!(h.session.output.lines[0].text, "console.log(1)");
    }

    #[test]
    fn test_missing_runtime_reported_in_pane() {
        let mut h = harness("1");
        h.session.runner = Runner::new(&RunnerConfig {
            command: "no-such-runtime-for-tests".into(),
            args: Vec::new(),
            timeout_ms: 1_000,
        });
        h.session.apply(Command::Run).unwrap();
        assert_eq!(h.session.status_message, "Run failed");
        assert!(!h.session.output.is_empty());
    }
}
