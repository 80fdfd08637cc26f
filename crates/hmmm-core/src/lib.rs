//! Core of the paper curation tool: the paper model, the arXiv feed, the
//! selection store with its navigation and curation engines, export, and the
//! threaded broadcast pipeline. Nothing in here touches the terminal.

pub mod broadcast;
pub mod config;
pub mod curation;
pub mod export;
pub mod feed;
pub mod item;
pub mod navigation;
pub mod platform;
pub mod selection;
pub mod state;

pub use item::{Item, SectionHeader, SourceRow};
pub use navigation::Command;
pub use selection::Focus;
pub use state::{update, CurationState, Effect};
