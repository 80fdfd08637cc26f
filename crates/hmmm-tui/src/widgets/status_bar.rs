//! Status bar — bottom line with the current mode and its keybindings.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{C_MODE_NORMAL, C_MUTED, C_POSTING, C_STARS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Source,
    Starred,
    Preview,
    Posting,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Source => "PAPERS",
            Self::Starred => "STARRED",
            Self::Preview => "ABSTRACT",
            Self::Posting => "POSTING",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Source | Self::Preview => C_MODE_NORMAL,
            Self::Starred => C_STARS,
            Self::Posting => C_POSTING,
        }
    }

    fn keys(self) -> &'static str {
        match self {
            Self::Source => {
                " jk/↑↓ move  ^d/^u half page  ^f/^b page  gg/G top/bottom  Tab starred  s star  p abstract  ^e export  ^t post  q quit"
            }
            Self::Starred => {
                " jk/↑↓ move  ^d/^u half page  ^f/^b page  gg/G top/bottom  Tab papers  u unstar  ^e export  ^t post  q quit"
            }
            Self::Preview => " any key closes",
            Self::Posting => " posting thread  Esc cancel",
        }
    }
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: Mode) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default().fg(mode.color()).add_modifier(Modifier::BOLD),
        ),
        Span::styled(mode.keys(), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
