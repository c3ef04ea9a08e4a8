use crate::app::{Mode, Session};
use crate::diagnostics::{count_by_severity, DiagnosticSeverity};
use crate::theme::Theme;
use ratatui::{prelude::*, text::Span, widgets::Paragraph};
use unicode_width::UnicodeWidthStr;

/// Cursor position as shown in the footer, counted from 1 like the gutter.
fn position_label(line: usize, column: usize) -> String {
    format!(" {}:{} ", line + 1, column + 1)
}

pub fn render(frame: &mut Frame, area: Rect, session: &Session, theme: &Theme) {
    let mode_str = format!(" {} ", session.mode().label());
    let (mode_bg, mode_fg) = match session.mode() {
        Mode::Normal => (&theme.ui.mode_normal_bg, &theme.ui.mode_normal_fg),
        Mode::Insert => (&theme.ui.mode_insert_bg, &theme.ui.mode_insert_fg),
    };
    let mode_span = Span::styled(
        mode_str,
        Style::default()
            .bg(mode_bg.to_color())
            .fg(mode_fg.to_color())
            .add_modifier(Modifier::BOLD),
    );

    let (line, column) = session.cursor_position();
    let cursor_pos = position_label(line, column);

    // Diagnostic count indicator
    let (errors, warnings) = count_by_severity(session.diagnostics());
    let mut parts = Vec::new();
    if errors > 0 {
        parts.push(format!("✗ {errors}"));
    }
    if warnings > 0 {
        parts.push(format!("⚠ {warnings}"));
    }
    let diag_span = if parts.is_empty() {
        Span::raw("")
    } else {
        let bg = if errors > 0 {
            &theme.ui.diagnostic_error
        } else {
            &theme.ui.diagnostic_warning
        };
        Span::styled(
            format!(" {} ", parts.join(" ")),
            Style::default()
                .bg(bg.to_color())
                .fg(theme.ui.background.to_color())
                .add_modifier(Modifier::BOLD),
        )
    };

    let stale_span = if session.diagnostics_stale() {
        Span::styled(
            " stale ",
            Style::default()
                .fg(theme.ui.stale.to_color())
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::raw("")
    };

    // A diagnostic on the cursor line takes over the message area
    let cursor_diagnostic = session.diagnostic_at_cursor();
    let (status_msg, msg_color) = match cursor_diagnostic {
        Some(diag) => {
            let (label, color) = match diag.severity {
                DiagnosticSeverity::Error => ("Error", &theme.ui.diagnostic_error),
                DiagnosticSeverity::Warning => ("Warning", &theme.ui.diagnostic_warning),
            };
            (format!(" {label}: {} ", diag.message), color)
        }
        None => (
            format!(" {} ", session.status_message),
            &theme.ui.status_bar_fg,
        ),
    };
    let msg_span = Span::styled(status_msg, Style::default().fg(msg_color.to_color()));

    let left_len: usize = [&mode_span, &diag_span, &stale_span, &msg_span]
        .iter()
        .map(|span| span.content.width())
        .sum();
    let right_len = cursor_pos.width();
    let padding = (area.width as usize)
        .saturating_sub(left_len + right_len)
        .max(1);

    let cursor_span = Span::styled(
        cursor_pos,
        Style::default()
            .fg(theme.ui.foreground.to_color())
            .add_modifier(Modifier::BOLD),
    );

    let line = Line::from(vec![
        mode_span,
        diag_span,
        stale_span,
        msg_span,
        Span::raw(" ".repeat(padding)),
        cursor_span,
    ]);
    let paragraph =
        Paragraph::new(line).style(Style::default().bg(theme.ui.status_bar_bg.to_color()));

    frame.render_widget(paragraph, area);
}
