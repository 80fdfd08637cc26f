pub mod pane_chrome;
pub mod paper_list;
pub mod status_bar;
