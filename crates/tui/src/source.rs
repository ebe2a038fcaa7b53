//! Data source loading for the bar.
//!
//! The document is loaded one-shot from a URL or a local file; there is no
//! retry policy. Failures are reported back as messages and rendered as
//! "no data". File sources can additionally be watched so an edit triggers a
//! refetch through the controller's generation counter.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lumebar_types::BarData;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;
use url::Url;

/// Where the JSON document comes from.
#[derive(Debug, Clone)]
pub enum DataSource {
    Url(Url),
    File(PathBuf),
}

impl DataSource {
    /// Interpret a `--src` argument: `http(s)` URLs fetch, anything else is
    /// a file path.
    pub fn parse(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => DataSource::Url(url),
            _ => DataSource::File(PathBuf::from(raw)),
        }
    }

    /// One-shot load of the document.
    pub async fn load(&self) -> Result<BarData> {
        match self {
            DataSource::Url(url) => {
                let response = reqwest::get(url.clone())
                    .await
                    .with_context(|| format!("failed to fetch {url}"))?
                    .error_for_status()
                    .with_context(|| format!("failed to fetch {url}"))?;
                response
                    .json()
                    .await
                    .with_context(|| format!("invalid data document at {url}"))
            }
            DataSource::File(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("invalid data document at {}", path.display()))
            }
        }
    }

    /// Path to watch for change-triggered refetches, for file sources.
    pub fn watch_path(&self) -> Option<&Path> {
        match self {
            DataSource::File(path) => Some(path),
            DataSource::Url(_) => None,
        }
    }
}

/// Watch a file source and signal on every change. The returned watcher must
/// stay alive for the lifetime of the subscription.
pub fn spawn_watcher(path: &Path, tx: UnboundedSender<()>) -> Result<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
        match event {
            Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                let _ = tx.send(());
            }
            Ok(_) => {}
            Err(error) => warn!(error = %error, "File watcher error"),
        }
    })?;
    watcher.watch(path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_urls_parse_as_url_sources() {
        assert!(matches!(
            DataSource::parse("http://127.0.0.1:8000/data.json"),
            DataSource::Url(_)
        ));
        assert!(matches!(DataSource::parse("https://example.com/data.json"), DataSource::Url(_)));
    }

    #[test]
    fn plain_paths_parse_as_file_sources() {
        assert!(matches!(DataSource::parse("demo/data.json"), DataSource::File(_)));
        assert!(matches!(DataSource::parse("/tmp/data.json"), DataSource::File(_)));
    }

    #[tokio::test]
    async fn file_sources_load_documents() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, r#"{"collections":[{"name":"Errors","items":[]}]}"#).unwrap();

        let data = DataSource::File(path).load().await.unwrap();
        assert_eq!(data.collections.len(), 1);
        assert_eq!(data.collections[0].name, "Errors");
    }

    #[tokio::test]
    async fn malformed_documents_error_out() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(DataSource::File(path).load().await.is_err());
    }

    #[test]
    fn only_file_sources_are_watchable() {
        assert!(DataSource::parse("demo/data.json").watch_path().is_some());
        assert!(DataSource::parse("https://example.com/d.json").watch_path().is_none());
    }
}
