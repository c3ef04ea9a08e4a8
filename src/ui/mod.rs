pub mod editor;
pub mod layout;
pub mod output;
pub mod status_bar;

use crate::app::Session;
use crate::theme::Theme;
use ratatui::Frame;

pub fn render(frame: &mut Frame, session: &mut Session, theme: &Theme) {
    layout::render(frame, session, theme);
}
