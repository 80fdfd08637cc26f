//! Mark and unmark keep the starred titles and the index
//! map in lock-step. Both are silent no-ops when their focus rule fails.

use tracing::debug;

use crate::item::Item;
use crate::selection::{Focus, SelectionStore};

/// Star the selected source row. Only valid with the source list focused and
/// a paper (not a section header) under the cursor.
pub fn mark(store: &mut SelectionStore, focus: Focus) -> bool {
    if focus != Focus::Source {
        return false;
    }
    let Some((idx, _)) = store.selected_source_row() else {
        return false;
    };
    if !store.push_curated(idx) {
        return false;
    }
    let len = store.curated().len();
    store.curated_cursor.select_last(len);
    store.curated_cursor.ensure_visible();
    debug!(source_idx = idx, starred = len, "marked");
    true
}

/// Remove the starred entry under the starred-list cursor.
pub fn unmark(store: &mut SelectionStore, focus: Focus) -> bool {
    if focus != Focus::Curated {
        return false;
    }
    let Some(pos) = store.selected_curated() else {
        return false;
    };
    let removed = store.remove_curated(pos);
    store.curated_cursor.ensure_visible();
    debug!(pos, source_idx = ?removed, starred = store.curated().len(), "unmarked");
    removed.is_some()
}

/// Papers to export or post, in starred order.
pub fn export_items(store: &SelectionStore) -> Vec<Item> {
    store.curated_items()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{SectionHeader, SourceRow};

    fn store() -> SelectionStore {
        SelectionStore::new(vec![
            SourceRow::Section(SectionHeader {
                category: "cs.CV".to_string(),
                fresh: 3,
                duplicates: 0,
            }),
            SourceRow::Paper(Item::new("a", "Alpha")),
            SourceRow::Paper(Item::new("b", "Beta")),
            SourceRow::Paper(Item::new("c", "Gamma")),
        ])
    }

    #[test]
    fn test_mark_requires_source_focus() {
        let mut s = store();
        s.source_cursor.selected = 1;
        assert!(!mark(&mut s, Focus::Curated));
        assert!(s.curated().is_empty());
        assert!(mark(&mut s, Focus::Source));
        assert_eq!(s.curated(), ["Alpha".to_string()]);
        assert_eq!(s.index_map(), [1]);
    }

    #[test]
    fn test_mark_on_section_header_is_noop() {
        let mut s = store();
        assert!(!mark(&mut s, Focus::Source));
        assert!(s.index_map().is_empty());
    }

    #[test]
    fn test_mark_scrolls_starred_list_to_tail() {
        let mut s = store();
        for row in 1..=3 {
            s.source_cursor.selected = row;
            mark(&mut s, Focus::Source);
        }
        assert_eq!(s.curated_cursor.selected, 2);
    }

    #[test]
    fn test_unmark_requires_curated_focus() {
        let mut s = store();
        s.source_cursor.selected = 2;
        mark(&mut s, Focus::Source);
        assert!(!unmark(&mut s, Focus::Source));
        assert_eq!(s.curated().len(), 1);
        assert!(unmark(&mut s, Focus::Curated));
        assert!(s.curated().is_empty());
        assert!(!unmark(&mut s, Focus::Curated));
    }

    #[test]
    fn test_same_paper_can_be_starred_twice() {
        let mut s = store();
        s.source_cursor.selected = 3;
        mark(&mut s, Focus::Source);
        mark(&mut s, Focus::Source);
        assert_eq!(s.index_map(), [3, 3]);
        assert_eq!(export_items(&s).len(), 2);
    }
}
