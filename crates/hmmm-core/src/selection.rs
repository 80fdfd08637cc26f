//! The source listing, the starred subsequence and the
//! index map tying them together.
//!
//! The store owns both sequences and both cursors. The index map always has
//! the same length and order as the starred titles; entry `i` is the source
//! position that produced starred row `i`.

use crate::item::{Item, SourceRow};

/// Which list receives navigation and single-key mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Source,
    Curated,
}

impl Focus {
    pub fn toggled(self) -> Self {
        match self {
            Self::Source => Self::Curated,
            Self::Curated => Self::Source,
        }
    }
}

/// Cursor and scroll window over a list whose rows live elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCursor {
    pub selected: usize,
    pub scroll_offset: usize,
    /// Visible rows, as last reported by the display surface.
    pub viewport: usize,
}

impl Default for ListCursor {
    fn default() -> Self {
        Self {
            selected: 0,
            scroll_offset: 0,
            viewport: 10,
        }
    }
}

impl ListCursor {
    pub fn select_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select_down(&mut self, n: usize, len: usize) {
        if len == 0 {
            return;
        }
        self.selected = (self.selected + n).min(len - 1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    pub fn half_page(&self) -> usize {
        (self.viewport / 2).max(1)
    }

    pub fn page(&self) -> usize {
        self.viewport.max(1)
    }

    /// Selected row, or `None` for an empty list.
    pub fn selected_in(&self, len: usize) -> Option<usize> {
        (self.selected < len).then_some(self.selected)
    }

    /// Pull the cursor back inside `[0, len-1]` after the list shrank.
    pub fn clamp(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
        if self.scroll_offset > self.selected {
            self.scroll_offset = self.selected;
        }
    }

    pub fn ensure_visible(&mut self) {
        let height = self.viewport;
        if height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + height {
            self.scroll_offset = self.selected.saturating_sub(height - 1);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    source: Vec<SourceRow>,
    curated: Vec<String>,
    index_map: Vec<usize>,
    pub source_cursor: ListCursor,
    pub curated_cursor: ListCursor,
}

impl SelectionStore {
    pub fn new(source: Vec<SourceRow>) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    pub fn source(&self) -> &[SourceRow] {
        &self.source
    }

    pub fn curated(&self) -> &[String] {
        &self.curated
    }

    pub fn index_map(&self) -> &[usize] {
        &self.index_map
    }

    pub fn cursor(&self, focus: Focus) -> &ListCursor {
        match focus {
            Focus::Source => &self.source_cursor,
            Focus::Curated => &self.curated_cursor,
        }
    }

    pub fn cursor_mut(&mut self, focus: Focus) -> &mut ListCursor {
        match focus {
            Focus::Source => &mut self.source_cursor,
            Focus::Curated => &mut self.curated_cursor,
        }
    }

    pub fn len(&self, focus: Focus) -> usize {
        match focus {
            Focus::Source => self.source.len(),
            Focus::Curated => self.curated.len(),
        }
    }

    pub fn selected_source_row(&self) -> Option<(usize, &SourceRow)> {
        let idx = self.source_cursor.selected_in(self.source.len())?;
        Some((idx, &self.source[idx]))
    }

    pub fn selected_curated(&self) -> Option<usize> {
        self.curated_cursor.selected_in(self.curated.len())
    }

    /// Append a starred entry. Rejects positions that are not papers.
    pub(crate) fn push_curated(&mut self, source_idx: usize) -> bool {
        let Some(item) = self.source.get(source_idx).and_then(SourceRow::item) else {
            return false;
        };
        self.curated.push(item.title.clone());
        self.index_map.push(source_idx);
        true
    }

    /// Remove starred entry `pos` from both sequences.
    pub(crate) fn remove_curated(&mut self, pos: usize) -> Option<usize> {
        if pos >= self.curated.len() {
            return None;
        }
        self.curated.remove(pos);
        let source_idx = self.index_map.remove(pos);
        self.curated_cursor.clamp(self.curated.len());
        Some(source_idx)
    }

    /// Starred papers resolved back through the index map, in starred order.
    pub fn curated_items(&self) -> Vec<Item> {
        self.index_map
            .iter()
            .filter_map(|&idx| self.source.get(idx).and_then(SourceRow::item))
            .cloned()
            .collect()
    }

    /// Report visible rows for both panes and keep cursors on screen.
    pub fn set_viewports(&mut self, source_rows: usize, curated_rows: usize) {
        self.source_cursor.viewport = source_rows;
        self.curated_cursor.viewport = curated_rows;
        self.source_cursor.ensure_visible();
        self.curated_cursor.ensure_visible();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::SectionHeader;

    fn store() -> SelectionStore {
        SelectionStore::new(vec![
            SourceRow::Section(SectionHeader {
                category: "cs.AI".to_string(),
                fresh: 2,
                duplicates: 0,
            }),
            SourceRow::Paper(Item::new("1", "One")),
            SourceRow::Paper(Item::new("2", "Two")),
        ])
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut c = ListCursor::default();
        c.select_down(50, 3);
        assert_eq!(c.selected, 2);
        c.select_up(50);
        assert_eq!(c.selected, 0);
        c.select_down(1, 0);
        assert_eq!(c.selected, 0);
        assert_eq!(c.selected_in(0), None);
    }

    #[test]
    fn test_ensure_visible_scrolls_window() {
        let mut c = ListCursor {
            viewport: 4,
            ..ListCursor::default()
        };
        c.select_down(9, 20);
        c.ensure_visible();
        assert_eq!(c.scroll_offset, 6);
        c.select_up(8);
        c.ensure_visible();
        assert_eq!(c.scroll_offset, 1);
    }

    #[test]
    fn test_push_rejects_section_rows() {
        let mut s = store();
        assert!(!s.push_curated(0));
        assert!(!s.push_curated(99));
        assert!(s.push_curated(2));
        assert_eq!(s.curated(), ["Two".to_string()]);
        assert_eq!(s.index_map(), [2]);
    }

    #[test]
    fn test_remove_clamps_cursor() {
        let mut s = store();
        s.push_curated(1);
        s.push_curated(2);
        s.curated_cursor.selected = 1;
        assert_eq!(s.remove_curated(1), Some(2));
        assert_eq!(s.curated_cursor.selected, 0);
        assert_eq!(s.remove_curated(3), None);
        assert_eq!(s.curated_items(), vec![Item::new("1", "One")]);
    }
}
