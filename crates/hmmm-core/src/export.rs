//! Export of the starred papers to a dated HTML file.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::item::Item;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("unable to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `2024-01-31-cs.AI+cs.LG.html`
pub fn export_file_name(date: NaiveDate, categories: &[String]) -> String {
    format!("{}-{}.html", date.format("%Y-%m-%d"), categories.join("+"))
}

/// Each paper's display line and bookmark link inside a textarea, ready to
/// be copied out of a browser.
pub fn render_export(items: &[Item]) -> String {
    let mut out = String::from("<html><body><textarea>\n");
    for item in items {
        out.push_str(&format!("{}\n\n{}\n\n", item, item.bookmark_url()));
    }
    out.push_str("\n</textarea></body></html>");
    out
}

/// Write (or overwrite) the export file in `dir` and return its path.
pub fn write_export(
    dir: &Path,
    date: NaiveDate,
    categories: &[String],
    items: &[Item],
) -> Result<PathBuf, ExportError> {
    let path = dir.join(export_file_name(date, categories));
    std::fs::write(&path, render_export(items)).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), papers = items.len(), "exported");
    Ok(path)
}
