//! Paper records and the rows of the source listing.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One paper from a listing. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub identifier: String,
    pub title: String,
}

impl Item {
    pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
        }
    }

    /// Abstract page on arXiv.
    pub fn source_url(&self) -> String {
        format!("http://arxiv.org/abs/{}", self.identifier)
    }

    /// ScienceWISE "add bookmark" link; this is what exports and posts carry.
    pub fn bookmark_url(&self) -> String {
        format!("http://sciencewise.info/bookmarks/{}/add", self.identifier)
    }

    /// Reddit submit link for the abstract page.
    pub fn share_url(&self) -> String {
        let target = format!("https://arxiv.org/abs/{}", self.identifier);
        let escaped: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
        format!("https://reddit.com/submit?url={}", escaped)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.identifier, self.title)
    }
}

/// Marker row placed before each category's papers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    pub category: String,
    /// Papers listed under this header.
    pub fresh: usize,
    /// Papers the category returned that an earlier category already listed.
    pub duplicates: usize,
}

impl fmt::Display for SectionHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "-- {} [{}; {} are already listed above] ------------",
            self.category, self.fresh, self.duplicates
        )
    }
}

/// A row of the source list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRow {
    Section(SectionHeader),
    Paper(Item),
}

impl SourceRow {
    pub fn title(&self) -> Cow<'_, str> {
        match self {
            Self::Section(header) => Cow::Owned(header.to_string()),
            Self::Paper(item) => Cow::Borrowed(item.title.as_str()),
        }
    }

    pub fn item(&self) -> Option<&Item> {
        match self {
            Self::Paper(item) => Some(item),
            Self::Section(_) => None,
        }
    }

    pub fn is_section(&self) -> bool {
        matches!(self, Self::Section(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_links() {
        let item = Item::new("2401.01234", "Attention Is Still All You Need");
        assert_eq!(item.source_url(), "http://arxiv.org/abs/2401.01234");
        assert_eq!(
            item.bookmark_url(),
            "http://sciencewise.info/bookmarks/2401.01234/add"
        );
        assert_eq!(
            item.share_url(),
            "https://reddit.com/submit?url=https%3A%2F%2Farxiv.org%2Fabs%2F2401.01234"
        );
        assert_eq!(
            item.to_string(),
            "[2401.01234] Attention Is Still All You Need"
        );
    }

    #[test]
    fn test_section_label() {
        let header = SectionHeader {
            category: "cs.LG".to_string(),
            fresh: 12,
            duplicates: 3,
        };
        assert_eq!(
            header.to_string(),
            "-- cs.LG [12; 3 are already listed above] ------------"
        );
        let row = SourceRow::Section(header);
        assert!(row.is_section());
        assert!(row.item().is_none());
    }

    #[test]
    fn test_paper_row_borrows_title() {
        let row = SourceRow::Paper(Item::new("1", "A title"));
        assert!(matches!(row.title(), Cow::Borrowed("A title")));
        assert_eq!(row.item().map(|i| i.identifier.as_str()), Some("1"));
    }
}
