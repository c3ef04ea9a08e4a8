use crate::theme::Theme;
use ratatui::{
    prelude::*,
    text::Span,
    widgets::{Block, BorderType, Borders, Paragraph},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    Stdout,
    Stderr,
    Error,
    Success,
}

#[derive(Debug, Clone)]
pub struct OutputLine {
    pub text: String,
    pub output_type: OutputType,
}

/// Lines produced by the last run, shown in a pane under the editor.
#[derive(Debug, Default)]
pub struct OutputState {
    pub lines: Vec<OutputLine>,
    pub scroll_offset: usize,
    pub visible_height: usize,
}

impl OutputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.scroll_offset = 0;
    }

    fn push_lines(&mut self, text: &str, output_type: OutputType) {
        // Keep empty lines, program output may rely on them
        self.lines.extend(text.lines().map(|line| OutputLine {
            text: line.to_string(),
            output_type,
        }));
        self.scroll_to_bottom();
    }

    pub fn append_stdout(&mut self, text: &str) {
        self.push_lines(text, OutputType::Stdout);
    }

    pub fn append_stderr(&mut self, text: &str) {
        self.push_lines(text, OutputType::Stderr);
    }

    pub fn append_error(&mut self, text: &str) {
        self.push_lines(text, OutputType::Error);
    }

    pub fn append_success(&mut self, text: &str) {
        self.push_lines(text, OutputType::Success);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.lines.len().saturating_sub(self.visible_height);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn update_visible_height(&mut self, height: usize) {
        self.visible_height = height;
        let max_scroll = self.lines.len().saturating_sub(height);
        if self.scroll_offset > max_scroll {
            self.scroll_offset = max_scroll;
        }
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &mut OutputState, theme: &Theme) {
    let block = Block::default()
        .title(Span::styled(
            " Output ",
            Style::default().fg(theme.ui.title.to_color()),
        ))
        .borders(Borders::TOP)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.ui.border.to_color()))
        .style(Style::default().bg(theme.ui.background.to_color()));

    let inner = block.inner(area);
    state.update_visible_height(inner.height as usize);

    if state.is_empty() {
        let placeholder = Paragraph::new(Span::styled(
            "  (no output)",
            Style::default().fg(theme.ui.line_numbers.to_color()),
        ))
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let text: Vec<Line> = state
        .lines
        .iter()
        .skip(state.scroll_offset)
        .take(inner.height as usize)
        .map(|line| {
            let (marker, color) = match line.output_type {
                OutputType::Stdout => ("  ", theme.ui.output_stdout.to_color()),
                OutputType::Stderr => ("! ", theme.ui.output_stderr.to_color()),
                OutputType::Error => ("✗ ", theme.ui.output_error.to_color()),
                OutputType::Success => ("✓ ", theme.ui.output_info.to_color()),
            };
            Line::from(vec![
                Span::styled(marker, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::styled(line.text.as_str(), Style::default().fg(color)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(text).block(block), area);
}
