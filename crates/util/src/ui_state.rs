//! Persisted UI state for the Lume bar.
//!
//! This module provides a tiny JSON-backed store that records the bar's
//! surviving UI state: whether the bar is closed, which collection tab is
//! active, and the id of the most recently opened item. The file is written
//! to the standard configuration directory (`~/.config/lumebar/state.json`
//! on most platforms) and is safe to read/write from multiple threads thanks
//! to the internal `Mutex`.
//!
//! The key set is fixed and typed; there is no string-keyed access. Tests
//! and embedders that must not touch the user's state use [`UiStateStore::at_path`]
//! or [`UiStateStore::ephemeral`].

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::expand_tilde;

/// Environment variable allowing callers to override the state file path.
pub const STATE_PATH_ENV: &str = "LUMEBAR_STATE_PATH";

/// Default filename for the JSON payload.
pub const STATE_FILE_NAME: &str = "state.json";

/// Error surfaced when reading or writing persisted state fails.
#[derive(Debug, Error)]
pub enum UiStateError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("ui state I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("ui state serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persisted values. Lifecycle: read once at construction, written
/// synchronously on every toggle or selection, cleared only by [`UiStateStore::clear`].
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct UiStatePayload {
    /// Bar collapsed state; absent means open.
    #[serde(default)]
    closed: bool,
    /// Name of the active collection tab.
    #[serde(default)]
    active_collection: Option<String>,
    /// Stable id of the most recently opened item.
    #[serde(default)]
    open_item: Option<String>,
}

/// Thread-safe UI state store backed by a JSON file.
#[derive(Debug, Default)]
pub struct UiStateStore {
    path: PathBuf,
    payload: Mutex<UiStatePayload>,
    persist_to_disk: bool,
}

impl UiStateStore {
    /// Create a store rooted at the default config directory path (or the
    /// `LUMEBAR_STATE_PATH` override).
    pub fn new() -> Result<Self, UiStateError> {
        Self::at_path(default_state_path())
    }

    /// Create a store rooted at an explicit path.
    pub fn at_path(path: PathBuf) -> Result<Self, UiStateError> {
        let payload = load_payload(&path)?;
        Ok(Self {
            path,
            payload: Mutex::new(payload),
            persist_to_disk: true,
        })
    }

    /// Build an in-memory store that never touches disk.
    pub fn ephemeral() -> Self {
        Self {
            path: PathBuf::new(),
            payload: Mutex::new(UiStatePayload::default()),
            persist_to_disk: false,
        }
    }

    /// Path to the underlying JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the bar was last left closed. Defaults to open.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Persist the bar open/closed state.
    pub fn set_closed(&self, closed: bool) -> Result<(), UiStateError> {
        let mut payload = self.lock();
        payload.closed = closed;
        self.save_locked(&payload)
    }

    /// Name of the collection tab that was active, if any.
    pub fn active_collection(&self) -> Option<String> {
        self.lock().active_collection.clone()
    }

    /// Persist the active collection tab.
    pub fn set_active_collection(&self, name: &str) -> Result<(), UiStateError> {
        let mut payload = self.lock();
        payload.active_collection = Some(name.to_string());
        self.save_locked(&payload)
    }

    /// Remove the active collection tab.
    pub fn clear_active_collection(&self) -> Result<(), UiStateError> {
        let mut payload = self.lock();
        payload.active_collection = None;
        self.save_locked(&payload)
    }

    /// Stable id of the most recently opened item, if any.
    pub fn open_item(&self) -> Option<String> {
        self.lock().open_item.clone()
    }

    /// Persist the most recently opened item id. At most one id is tracked.
    pub fn set_open_item(&self, id: &str) -> Result<(), UiStateError> {
        let mut payload = self.lock();
        payload.open_item = Some(id.to_string());
        self.save_locked(&payload)
    }

    /// Remove the open item id.
    pub fn clear_open_item(&self) -> Result<(), UiStateError> {
        let mut payload = self.lock();
        payload.open_item = None;
        self.save_locked(&payload)
    }

    /// Reset all state and delete the backing file.
    pub fn clear(&self) -> Result<(), UiStateError> {
        let mut payload = self.lock();
        *payload = UiStatePayload::default();
        if self.persist_to_disk && self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, UiStatePayload> {
        self.payload.lock().expect("ui state lock poisoned")
    }

    fn save_locked(&self, payload: &UiStatePayload) -> Result<(), UiStateError> {
        if !self.persist_to_disk {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(payload)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

fn default_state_path() -> PathBuf {
    if let Ok(path) = env::var(STATE_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lumebar")
        .join(STATE_FILE_NAME)
}

fn load_payload(path: &Path) -> Result<UiStatePayload, UiStateError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(payload) => Ok(payload),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse ui state file; using defaults"
                );
                Ok(UiStatePayload::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            Ok(UiStatePayload::default())
        }
        Err(error) => Err(UiStateError::Io(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> UiStateStore {
        UiStateStore::at_path(dir.path().join(STATE_FILE_NAME)).unwrap()
    }

    #[test]
    fn state_survives_a_reload() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set_closed(true).unwrap();
        store.set_active_collection("Errors").unwrap();
        store.set_open_item("id_abc").unwrap();

        let reloaded = store_in(&dir);
        assert!(reloaded.is_closed());
        assert_eq!(reloaded.active_collection().as_deref(), Some("Errors"));
        assert_eq!(reloaded.open_item().as_deref(), Some("id_abc"));
    }

    #[test]
    fn removals_persist() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set_active_collection("Errors").unwrap();
        store.set_open_item("id_abc").unwrap();
        store.clear_active_collection().unwrap();
        store.clear_open_item().unwrap();

        let reloaded = store_in(&dir);
        assert_eq!(reloaded.active_collection(), None);
        assert_eq!(reloaded.open_item(), None);
    }

    #[test]
    fn clear_resets_state_and_deletes_the_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set_closed(true).unwrap();
        assert!(store.path().exists());

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(!store.is_closed());
    }

    #[test]
    fn unparseable_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STATE_FILE_NAME);
        std::fs::write(&path, "not json").unwrap();

        let store = UiStateStore::at_path(path).unwrap();
        assert!(!store.is_closed());
        assert_eq!(store.active_collection(), None);
    }

    #[test]
    fn ephemeral_store_never_touches_disk() {
        let store = UiStateStore::ephemeral();
        store.set_closed(true).unwrap();
        assert!(store.is_closed());
        assert_eq!(store.path(), Path::new(""));
    }
}
