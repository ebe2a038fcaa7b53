//! Terminal user interface for the Lume bar.
//!
//! The bar renders as a collapsible bottom strip: a tab per collection, and a
//! detail pane showing the active collection's item tree. State that should
//! survive restarts (bar closed, active tab, last opened item) lives in the
//! injected [`lumebar_util::UiStateStore`].

pub mod app;
pub mod components;
pub mod runtime;
pub mod source;
pub mod theme;
pub mod tree;

pub use runtime::{RunOptions, run_app};
