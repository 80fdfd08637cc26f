//! Frame layout: papers pane above the starred pane, keys bar at the bottom.
//! An abstract preview temporarily takes over the lower pane.

use std::borrow::Cow;

use hmmm_core::{CurationState, Focus, Item};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Wrap},
    Frame,
};

use crate::theme::{style_default, style_secondary, C_BG, C_POSTING, C_SECTION};
use crate::widgets::pane_chrome::{pane_chrome, Badge};
use crate::widgets::paper_list::{draw_rows, Row};
use crate::widgets::status_bar::{draw_keys_bar, Mode};

/// Abstract fetched for one paper, shown until the next key press.
#[derive(Debug, Clone)]
pub struct Preview {
    pub item: Item,
    pub text: String,
}

#[derive(Debug, Clone, Copy)]
pub enum View<'a> {
    Browse,
    Preview(&'a Preview),
    Posting,
}

pub fn draw(frame: &mut Frame, state: &mut CurationState, view: View<'_>) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let panes = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
        .split(outer[0]);

    let posting = matches!(view, View::Posting);
    let source_focused = state.focus == Focus::Source && !posting;
    let starred_focused = state.focus == Focus::Curated || posting;

    let source_title = state.source_title();
    let starred_title = state.curated_title();
    let source_block = pane_chrome(&source_title, source_focused, None);
    let badge = posting.then_some(Badge {
        text: "POSTING",
        color: C_POSTING,
    });
    let starred_block = pane_chrome(&starred_title, starred_focused, badge);

    let source_inner = source_block.inner(panes[0]);
    let starred_inner = starred_block.inner(panes[1]);
    state
        .store
        .set_viewports(source_inner.height as usize, starred_inner.height as usize);

    frame.render_widget(source_block, panes[0]);
    frame.render_widget(starred_block, panes[1]);

    let source_rows: Vec<Row> = state
        .store
        .source()
        .iter()
        .map(|row| Row {
            text: row.title(),
            section: row.is_section(),
        })
        .collect();
    draw_rows(
        frame,
        source_inner,
        &source_rows,
        &state.store.source_cursor,
        source_focused,
        "no papers listed",
    );

    let starred_rows: Vec<Row> = state
        .store
        .curated()
        .iter()
        .map(|title| Row {
            text: Cow::Borrowed(title.as_str()),
            section: false,
        })
        .collect();
    draw_rows(
        frame,
        starred_inner,
        &starred_rows,
        &state.store.curated_cursor,
        starred_focused,
        "nothing starred yet",
    );

    let mode = match view {
        View::Browse if state.focus == Focus::Source => Mode::Source,
        View::Browse => Mode::Starred,
        View::Preview(_) => Mode::Preview,
        View::Posting => Mode::Posting,
    };
    draw_keys_bar(frame, outer[1], mode);

    if let View::Preview(preview) = view {
        draw_preview(frame, panes[1], preview);
    }
}

fn draw_preview(frame: &mut Frame, area: Rect, preview: &Preview) {
    let title = preview.item.to_string();
    let block = pane_chrome(&title, true, None);

    let lines = vec![
        Line::from(Span::styled(preview.text.as_str(), style_default())),
        Line::raw(""),
        Line::from(Span::styled(
            preview.item.source_url(),
            Style::default().fg(C_SECTION),
        )),
        Line::from(Span::styled(preview.item.share_url(), style_secondary())),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
