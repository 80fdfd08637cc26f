//! Terminal keys to curation commands.

use hmmm_core::Command;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    let cmd = match key.code {
        KeyCode::Char(c) if ctrl => match c {
            'c' => Command::Quit,
            'd' => Command::HalfPageDown,
            'u' => Command::HalfPageUp,
            'f' => Command::PageDown,
            'b' => Command::PageUp,
            'e' => Command::Export,
            't' => Command::Broadcast,
            _ => return None,
        },
        KeyCode::Char(c) => match c {
            'q' => Command::Quit,
            'j' => Command::LineDown,
            'k' => Command::LineUp,
            'g' => Command::ChordTop,
            'G' => Command::Bottom,
            's' => Command::Mark,
            'u' => Command::Unmark,
            'p' => Command::Preview,
            _ => return None,
        },
        KeyCode::Down => Command::LineDown,
        KeyCode::Up => Command::LineUp,
        KeyCode::PageDown => Command::PageDown,
        KeyCode::PageUp => Command::PageUp,
        KeyCode::Home => Command::Top,
        KeyCode::End => Command::Bottom,
        KeyCode::Tab => Command::ToggleFocus,
        _ => return None,
    };
    Some(cmd)
}

/// Keys that stop a running broadcast.
pub fn is_cancel(key: KeyEvent) -> bool {
    key.kind != KeyEventKind::Release
        && (key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)))
}
