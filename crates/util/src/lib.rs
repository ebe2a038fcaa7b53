//! Persistence and asset helpers shared by the Lume bar crates.

pub mod icons;
pub mod ui_state;

pub use icons::{CachedIconResolver, GlyphIconResolver, IconResolver};
pub use ui_state::{UiStateError, UiStateStore};

use std::path::PathBuf;

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs_next::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
