use crate::app::Session;
use crate::theme::Theme;
use ratatui::prelude::*;

const OUTPUT_HEIGHT: u16 = 8;

pub fn render(frame: &mut Frame, session: &mut Session, theme: &Theme) {
    let output_height = if session.show_output { OUTPUT_HEIGHT } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(output_height),
            Constraint::Length(1),
        ])
        .split(frame.area());

    session.set_visible_height(chunks[0].height as usize);
    super::editor::render(frame, chunks[0], session, theme);

    if session.show_output {
        super::output::render(frame, chunks[1], &mut session.output, theme);
    }

    super::status_bar::render(frame, chunks[2], session, theme);
}
