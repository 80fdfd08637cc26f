//! Curation state and its reducer.
//!
//! `update` is a pure `(state, command) -> (state, effect)` step: navigation
//! and curation happen inline, anything that needs I/O (export, broadcast,
//! abstract preview) comes back as an [`Effect`] for the event loop to run.

use crate::curation::{export_items, mark, unmark};
use crate::item::{Item, SourceRow};
use crate::navigation::{navigate, ChordTracker, Command};
use crate::selection::{Focus, SelectionStore};

/// Work the event loop has to carry out after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Quit,
    Export(Vec<Item>),
    Broadcast(Vec<Item>),
    Preview(Item),
}

#[derive(Debug, Clone)]
pub struct CurationState {
    pub store: SelectionStore,
    pub focus: Focus,
    pub categories: Vec<String>,
    /// Transient message shown in place of the starred-list title until the
    /// next command arrives.
    pub status: Option<String>,
    chord: ChordTracker,
}

impl CurationState {
    pub fn new(source: Vec<SourceRow>, categories: Vec<String>) -> Self {
        Self {
            store: SelectionStore::new(source),
            focus: Focus::Source,
            categories,
            status: None,
            chord: ChordTracker::default(),
        }
    }

    /// Input that produced no command still breaks a pending `g g` chord.
    pub fn interrupt_chord(&mut self) {
        self.chord.reset();
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Broadcast feedback: park the starred cursor on row `i` and title the
    /// pane with the running count.
    pub fn show_progress(&mut self, i: usize, total: usize) {
        let len = self.store.curated().len();
        self.store.curated_cursor.selected = i.min(len.saturating_sub(1));
        self.store.curated_cursor.ensure_visible();
        self.status = Some(format!("Posting item {} of {}", i + 1, total));
    }

    fn categories_label(&self) -> String {
        format!("[{}]", self.categories.join(" "))
    }

    pub fn source_title(&self) -> String {
        let len = self.store.source().len();
        let pos = self
            .store
            .source_cursor
            .selected_in(len)
            .map_or(0, |i| i + 1);
        format!("Papers from {} - [{}/{}]", self.categories_label(), pos, len)
    }

    pub fn curated_title(&self) -> String {
        if let Some(status) = &self.status {
            return status.clone();
        }
        let len = self.store.curated().len();
        let pos = self.store.selected_curated().map_or(0, |i| i + 1);
        format!(
            "Starred Papers from {} - [{}/{}]",
            self.categories_label(),
            pos,
            len
        )
    }
}

pub fn update(mut state: CurationState, cmd: Command) -> (CurationState, Option<Effect>) {
    state.status = None;
    let chord_complete = state.chord.observe(cmd);
    let focus = state.focus;

    let effect = match cmd {
        Command::Quit => Some(Effect::Quit),
        Command::ChordTop => {
            if chord_complete {
                navigate(&mut state.store, focus, Command::Top);
            }
            None
        }
        Command::ToggleFocus => {
            state.focus = focus.toggled();
            None
        }
        Command::Mark => {
            mark(&mut state.store, focus);
            None
        }
        Command::Unmark => {
            unmark(&mut state.store, focus);
            None
        }
        Command::Export => Some(Effect::Export(export_items(&state.store))),
        Command::Broadcast => {
            let items = export_items(&state.store);
            if items.is_empty() {
                state.set_status("Nothing starred to post");
                None
            } else {
                Some(Effect::Broadcast(items))
            }
        }
        Command::Preview => {
            if focus == Focus::Source {
                state
                    .store
                    .selected_source_row()
                    .and_then(|(_, row)| row.item())
                    .cloned()
                    .map(Effect::Preview)
            } else {
                None
            }
        }
        Command::LineDown
        | Command::LineUp
        | Command::HalfPageDown
        | Command::HalfPageUp
        | Command::PageDown
        | Command::PageUp
        | Command::Top
        | Command::Bottom => {
            navigate(&mut state.store, focus, cmd);
            None
        }
    };

    (state, effect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::SectionHeader;

    fn state() -> CurationState {
        let rows = vec![
            SourceRow::Section(SectionHeader {
                category: "cs.AI".to_string(),
                fresh: 3,
                duplicates: 0,
            }),
            SourceRow::Paper(Item::new("1", "One")),
            SourceRow::Paper(Item::new("2", "Two")),
            SourceRow::Paper(Item::new("3", "Three")),
        ];
        CurationState::new(rows, vec!["cs.AI".to_string()])
    }

    fn run(mut s: CurationState, cmds: &[Command]) -> CurationState {
        for &cmd in cmds {
            s = update(s, cmd).0;
        }
        s
    }

    #[test]
    fn test_titles() {
        let s = run(state(), &[Command::LineDown, Command::Mark]);
        assert_eq!(s.source_title(), "Papers from [cs.AI] - [2/4]");
        assert_eq!(s.curated_title(), "Starred Papers from [cs.AI] - [1/1]");
        let empty = state();
        assert_eq!(empty.curated_title(), "Starred Papers from [cs.AI] - [0/0]");
    }

    #[test]
    fn test_quit_effect() {
        let (_, effect) = update(state(), Command::Quit);
        assert_eq!(effect, Some(Effect::Quit));
    }

    #[test]
    fn test_chord_top_jumps_only_on_second_press() {
        let s = run(state(), &[Command::Bottom, Command::ChordTop]);
        assert_eq!(s.store.source_cursor.selected, 3);
        let s = run(s, &[Command::ChordTop]);
        assert_eq!(s.store.source_cursor.selected, 0);

        let s = run(state(), &[Command::Bottom, Command::ChordTop, Command::LineUp]);
        assert_eq!(s.store.source_cursor.selected, 2);
        let s = run(s, &[Command::ChordTop]);
        assert_eq!(s.store.source_cursor.selected, 2);

        let mut s = run(state(), &[Command::Bottom, Command::ChordTop]);
        s.interrupt_chord();
        let s = run(s, &[Command::ChordTop]);
        assert_eq!(s.store.source_cursor.selected, 3);
    }

    #[test]
    fn test_toggle_focus_routes_navigation() {
        let s = run(
            state(),
            &[
                Command::LineDown,
                Command::Mark,
                Command::LineDown,
                Command::Mark,
                Command::ToggleFocus,
                Command::Top,
            ],
        );
        assert_eq!(s.focus, Focus::Curated);
        assert_eq!(s.store.curated_cursor.selected, 0);
        assert_eq!(s.store.source_cursor.selected, 2);
        let s = run(s, &[Command::ToggleFocus]);
        assert_eq!(s.focus, Focus::Source);
    }

    #[test]
    fn test_export_resolves_marked_items() {
        let s = run(state(), &[Command::Bottom, Command::Mark]);
        let (_, effect) = update(s, Command::Export);
        assert_eq!(effect, Some(Effect::Export(vec![Item::new("3", "Three")])));
    }

    #[test]
    fn test_broadcast_with_nothing_starred() {
        let (s, effect) = update(state(), Command::Broadcast);
        assert_eq!(effect, None);
        assert_eq!(s.curated_title(), "Nothing starred to post");
        // status is transient
        let s = run(s, &[Command::LineDown]);
        assert!(s.status.is_none());
    }

    #[test]
    fn test_preview_only_on_focused_paper() {
        let (s, effect) = update(state(), Command::Preview);
        assert_eq!(effect, None);
        let (s, _) = update(s, Command::LineDown);
        let (s, effect) = update(s, Command::Preview);
        assert_eq!(effect, Some(Effect::Preview(Item::new("1", "One"))));
        let (s, _) = update(s, Command::ToggleFocus);
        let (_, effect) = update(s, Command::Preview);
        assert_eq!(effect, None);
    }

    #[test]
    fn test_show_progress() {
        let mut s = run(
            state(),
            &[Command::LineDown, Command::Mark, Command::LineDown, Command::Mark],
        );
        s.show_progress(0, 2);
        assert_eq!(s.store.curated_cursor.selected, 0);
        assert_eq!(s.curated_title(), "Posting item 1 of 2");
    }
}
