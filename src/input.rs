use crate::app::{Mode, Session};
use crate::command::Command;
use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
}

/// Wait up to `timeout` for one terminal event and apply it.
pub fn handle_event(session: &mut Session, timeout: Duration) -> Result<Action> {
    if !event::poll(timeout)? {
        return Ok(Action::None);
    }

    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(session, key),
        Event::Mouse(mouse) => {
            handle_mouse(session, mouse);
            Ok(Action::None)
        }
        _ => Ok(Action::None),
    }
}

pub fn handle_key(session: &mut Session, key: KeyEvent) -> Result<Action> {
    if is_quit(&key) {
        return Ok(Action::Quit);
    }

    let command = match session.mode() {
        Mode::Normal => normal_command(&key),
        Mode::Insert => insert_command(&key),
    };
    if let Some(command) = command {
        session.apply(command)?;
    }
    Ok(Action::None)
}

fn handle_mouse(session: &mut Session, mouse: MouseEvent) {
    let step = session.editor_config().scroll_step as isize;
    match mouse.kind {
        MouseEventKind::ScrollUp => session.scroll_by(-step),
        MouseEventKind::ScrollDown => session.scroll_by(step),
        _ => {}
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
}

/// Normal mode table. Letters are matched by key, so Caps Lock does not
/// change their meaning; Shift only matters for `o`.
pub fn normal_command(key: &KeyEvent) -> Option<Command> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }

    let command = match key.code {
        KeyCode::Right => Command::MoveRight,
        KeyCode::Left => Command::MoveLeft,
        KeyCode::Down => Command::MoveDown,
        KeyCode::Up => Command::MoveUp,
        KeyCode::Backspace => Command::Backspace,
        KeyCode::Enter => Command::InsertText(String::from("\n")),
        KeyCode::Char(' ') => Command::InsertText(String::from(" ")),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'l' => Command::MoveRight,
            'h' => Command::MoveLeft,
            'j' => Command::MoveDown,
            'k' => Command::MoveUp,
            'w' => Command::WordForward,
            'b' => Command::WordBack,
            'd' => Command::DeleteLine,
            'x' => Command::DeleteChar,
            'i' => Command::EnterInsert,
            's' => Command::Format,
            'r' => Command::Run,
            'o' if c == 'O' || key.modifiers.contains(KeyModifiers::SHIFT) => {
                Command::OpenLineAbove
            }
            'o' => Command::OpenLineBelow,
            _ => return None,
        },
        _ => return None,
    };
    Some(command)
}

pub fn insert_command(key: &KeyEvent) -> Option<Command> {
    match key.code {
        KeyCode::Esc => Some(Command::ExitInsert),
        KeyCode::Enter => Some(Command::InsertText(String::from("\n"))),
        KeyCode::Backspace => Some(Command::Backspace),
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(Command::InsertText(c.to_string()))
        }
        _ => None,
    }
}
