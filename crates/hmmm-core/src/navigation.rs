//! Cursor movement over whichever list has focus.

use crate::selection::{Focus, SelectionStore};

/// Display-independent input commands. The terminal keymap produces these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    LineDown,
    LineUp,
    HalfPageDown,
    HalfPageUp,
    PageDown,
    PageUp,
    Top,
    Bottom,
    /// First half of the two-key "jump to top" chord.
    ChordTop,
    ToggleFocus,
    Mark,
    Unmark,
    Export,
    Broadcast,
    Preview,
}

/// Recognises `ChordTop` pressed twice in a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChordTracker {
    pending: bool,
}

impl ChordTracker {
    /// Feed one command; true when it completes the chord. A completed chord
    /// resets the tracker, so a third press starts a new chord.
    pub fn observe(&mut self, cmd: Command) -> bool {
        if cmd != Command::ChordTop {
            self.pending = false;
            return false;
        }
        if self.pending {
            self.pending = false;
            true
        } else {
            self.pending = true;
            false
        }
    }

    /// Forget a half-entered chord; for input that maps to no command.
    pub fn reset(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Apply a movement command to the focused list. Non-movement commands are
/// ignored here. Returns true when the cursor moved or the window scrolled.
pub fn navigate(store: &mut SelectionStore, focus: Focus, cmd: Command) -> bool {
    let len = store.len(focus);
    let cursor = store.cursor_mut(focus);
    let before = (cursor.selected, cursor.scroll_offset);

    match cmd {
        Command::LineDown => cursor.select_down(1, len),
        Command::LineUp => cursor.select_up(1),
        Command::HalfPageDown => {
            let n = cursor.half_page();
            cursor.select_down(n, len);
        }
        Command::HalfPageUp => {
            let n = cursor.half_page();
            cursor.select_up(n);
        }
        Command::PageDown => {
            let n = cursor.page();
            cursor.select_down(n, len);
        }
        Command::PageUp => {
            let n = cursor.page();
            cursor.select_up(n);
        }
        Command::Top => cursor.select_first(),
        Command::Bottom => cursor.select_last(len),
        _ => return false,
    }

    cursor.ensure_visible();
    before != (cursor.selected, cursor.scroll_offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Item, SourceRow};

    fn store(n: usize) -> SelectionStore {
        let rows = (0..n)
            .map(|i| SourceRow::Paper(Item::new(i.to_string(), format!("Paper {i}"))))
            .collect();
        let mut s = SelectionStore::new(rows);
        s.set_viewports(10, 4);
        s
    }

    #[test]
    fn test_pages_clamp_to_bounds() {
        let mut s = store(25);
        navigate(&mut s, Focus::Source, Command::HalfPageDown);
        assert_eq!(s.source_cursor.selected, 5);
        navigate(&mut s, Focus::Source, Command::PageDown);
        assert_eq!(s.source_cursor.selected, 15);
        navigate(&mut s, Focus::Source, Command::PageDown);
        navigate(&mut s, Focus::Source, Command::PageDown);
        assert_eq!(s.source_cursor.selected, 24);
        navigate(&mut s, Focus::Source, Command::HalfPageUp);
        assert_eq!(s.source_cursor.selected, 19);
        navigate(&mut s, Focus::Source, Command::PageUp);
        navigate(&mut s, Focus::Source, Command::PageUp);
        navigate(&mut s, Focus::Source, Command::PageUp);
        assert_eq!(s.source_cursor.selected, 0);
    }

    #[test]
    fn test_bottom_then_top() {
        let mut s = store(7);
        navigate(&mut s, Focus::Source, Command::Bottom);
        assert_eq!(s.source_cursor.selected, 6);
        navigate(&mut s, Focus::Source, Command::Top);
        assert_eq!(s.source_cursor.selected, 0);
        assert_eq!(s.source_cursor.scroll_offset, 0);
    }

    #[test]
    fn test_only_focused_list_moves() {
        let mut s = store(5);
        assert!(!navigate(&mut s, Focus::Curated, Command::LineDown));
        assert_eq!(s.source_cursor.selected, 0);
        assert!(navigate(&mut s, Focus::Source, Command::LineDown));
        assert_eq!(s.source_cursor.selected, 1);
    }

    #[test]
    fn test_non_movement_is_ignored() {
        let mut s = store(3);
        assert!(!navigate(&mut s, Focus::Source, Command::Mark));
        assert!(!navigate(&mut s, Focus::Source, Command::ChordTop));
    }

    #[test]
    fn test_chord_needs_two_consecutive_presses() {
        let mut chord = ChordTracker::default();
        assert!(!chord.observe(Command::ChordTop));
        assert!(chord.is_pending());
        assert!(!chord.observe(Command::LineDown));
        assert!(!chord.observe(Command::ChordTop));
        assert!(chord.observe(Command::ChordTop));
        // third press opens a fresh chord rather than firing again
        assert!(!chord.observe(Command::ChordTop));
        assert!(chord.observe(Command::ChordTop));

        chord.observe(Command::ChordTop);
        chord.reset();
        assert!(!chord.observe(Command::ChordTop));
    }
}
