//! Windowed list of rows drawn from a [`ListCursor`].

use std::borrow::Cow;

use hmmm_core::selection::ListCursor;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use crate::theme::{
    style_default, style_secondary, style_section, style_selected, style_selected_focused,
    C_MUTED,
};

pub struct Row<'a> {
    pub text: Cow<'a, str>,
    pub section: bool,
}

/// Render the rows visible through `cursor`'s scroll window into `area`.
pub fn draw_rows(
    frame: &mut Frame,
    area: Rect,
    rows: &[Row<'_>],
    cursor: &ListCursor,
    focused: bool,
    empty_hint: &str,
) {
    if rows.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("  {}", empty_hint),
                ratatui::style::Style::default().fg(C_MUTED),
            )),
            area,
        );
        return;
    }

    let height = area.height as usize;
    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .skip(cursor.scroll_offset)
        .take(height)
        .map(|(idx, row)| {
            let base = if row.section {
                style_section()
            } else if idx == cursor.selected {
                style_default()
            } else {
                style_secondary()
            };
            let item = ListItem::new(Line::from(Span::styled(row.text.as_ref(), base)));
            match (idx == cursor.selected, focused) {
                (true, true) => item.style(style_selected_focused()),
                (true, false) => item.style(style_selected()),
                _ => item,
            }
        })
        .collect();

    frame.render_widget(List::new(items), area);
}
