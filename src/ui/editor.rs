use std::borrow::Cow;

use ratatui::{prelude::*, text::Span, widgets::Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::analysis::{Token, TokenKind};
use crate::app::{Mode, Session};
use crate::diagnostics::DiagnosticSeverity;
use crate::theme::{SyntaxColors, Theme};

/// Split tokens into styled lines, one per buffer line. Identifiers directly
/// followed by `(` take the function colour.
pub fn highlight_lines<'a>(
    tokens: &'a [Token],
    syntax: &SyntaxColors,
    tab_width: usize,
) -> Vec<Vec<Span<'a>>> {
    let mut lines: Vec<Vec<Span<'a>>> = vec![Vec::new()];

    for (i, token) in tokens.iter().enumerate() {
        if token.kind == TokenKind::NewLine {
            lines.push(Vec::new());
            continue;
        }

        let is_call = token.kind == TokenKind::Identifier
            && tokens.get(i + 1).is_some_and(|next| next.text == "(");
        let color = if is_call {
            &syntax.function
        } else {
            syntax.color_for(token.kind)
        };

        if let Some(line) = lines.last_mut() {
            line.push(Span::styled(
                expand_tabs(&token.text, tab_width),
                Style::default().fg(color.to_color()),
            ));
        }
    }

    lines
}

fn expand_tabs(text: &str, tab_width: usize) -> Cow<'_, str> {
    if text.contains('\t') {
        Cow::Owned(text.replace('\t', &" ".repeat(tab_width)))
    } else {
        Cow::Borrowed(text)
    }
}

/// Terminal columns taken by `text`, tabs counted as `tab_width`.
pub fn display_width(text: &str, tab_width: usize) -> usize {
    text.chars()
        .map(|c| match c {
            '\t' => tab_width,
            c => c.width().unwrap_or(0),
        })
        .sum()
}

fn gutter_width(line_count: usize) -> usize {
    line_count.to_string().len() + 1
}

pub fn render(frame: &mut Frame, area: Rect, session: &Session, theme: &Theme) {
    let config = session.editor_config();
    let buffer = session.buffer();
    let (cursor_line, cursor_column) = session.cursor_position();
    let tab_width = config.tab_width;

    let gutter = if config.show_line_numbers {
        gutter_width(buffer.line_count())
    } else {
        0
    };

    let (line_bg, cursor_bg) = match session.mode() {
        Mode::Normal => (&theme.ui.cursor_line_normal, &theme.ui.cursor_normal),
        Mode::Insert => (&theme.ui.cursor_line_insert, &theme.ui.cursor_insert),
    };

    let highlighted = highlight_lines(session.tokens(), &theme.syntax, tab_width);
    let visible = area.height as usize;

    let lines: Vec<Line> = highlighted
        .into_iter()
        .enumerate()
        .skip(session.scroll_offset)
        .take(visible)
        .map(|(line_idx, mut spans)| {
            if gutter > 0 {
                let color = if line_idx == cursor_line {
                    &theme.ui.line_numbers_current
                } else {
                    &theme.ui.line_numbers
                };
                spans.insert(
                    0,
                    Span::styled(
                        format!("{:>width$} ", line_idx + 1, width = gutter - 1),
                        Style::default().fg(color.to_color()),
                    ),
                );
            }

            let diagnostics = session.diagnostics_for_line(line_idx);
            if !diagnostics.is_empty() {
                spans.push(Span::raw(" ".repeat(config.inline_diagnostic_gap)));
                for (i, diag) in diagnostics.iter().enumerate() {
                    let color = match diag.severity {
                        DiagnosticSeverity::Error => &theme.ui.diagnostic_error,
                        DiagnosticSeverity::Warning => &theme.ui.diagnostic_warning,
                    };
                    let separator = if i == 0 { "" } else { "  " };
                    spans.push(Span::styled(
                        format!("{separator}{}", diag.message),
                        Style::default()
                            .fg(color.to_color())
                            .add_modifier(Modifier::ITALIC),
                    ));
                }
            }

            Line::from(spans)
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines).style(
            Style::default()
                .bg(theme.ui.background.to_color())
                .fg(theme.ui.foreground.to_color()),
        ),
        area,
    );

    // Cursor line and cursor cell are painted over the text
    if cursor_line < session.scroll_offset || cursor_line >= session.scroll_offset + visible {
        return;
    }
    let y = area.y + (cursor_line - session.scroll_offset) as u16;
    let row = Rect::new(area.x, y, area.width, 1);
    frame
        .buffer_mut()
        .set_style(row, Style::default().bg(line_bg.to_color()));

    let before_cursor: String = buffer.line_text(cursor_line).chars().take(cursor_column).collect();
    let x = gutter + display_width(&before_cursor, tab_width);
    let x = area.x + (x as u16).min(area.width.saturating_sub(1));
    if let Some(cell) = frame.buffer_mut().cell_mut((x, y)) {
        cell.set_bg(cursor_bg.to_color())
            .set_fg(theme.ui.cursor_fg.to_color());
    }
}
