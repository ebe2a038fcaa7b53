//! Icon resolution for tabs, badges, and action buttons.
//!
//! Icon names follow the phosphor naming scheme used by the data format
//! (`warning`, `bug`, `arrows-in-simple`, optionally suffixed `-fill`). The
//! resolver is an injected capability: the core only sees
//! [`IconResolver::resolve`], which is asynchronous and returns `None` on
//! failure after logging a diagnostic. Memoization belongs to the caller via
//! [`CachedIconResolver`].

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::warn;

/// Resolves an icon name to terminal markup (a glyph).
#[async_trait]
pub trait IconResolver: Send + Sync {
    /// Resolve `name` to markup, or `None` when the icon is unknown or the
    /// lookup failed. Never errors out of the renderer.
    async fn resolve(&self, name: &str) -> Option<String>;
}

/// Built-in glyph table covering the icon names the demo data uses.
///
/// The `-fill` suffix selects the filled variant of a name; glyph-wise both
/// variants map to the same character.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlyphIconResolver;

const GLYPHS: &[(&str, &str)] = &[
    ("arrows-in-simple", "▾"),
    ("arrows-out-simple", "▴"),
    ("bug", "✖"),
    ("check", "✔"),
    ("check-circle", "✔"),
    ("file", "·"),
    ("files", "·"),
    ("fire", "!"),
    ("gear", "*"),
    ("info", "i"),
    ("lightbulb", "i"),
    ("link", "→"),
    ("package", "▣"),
    ("tree-view", "≡"),
    ("warning", "▲"),
    ("warning-circle", "▲"),
    ("wrench", "+"),
    ("x-circle", "✖"),
];

#[async_trait]
impl IconResolver for GlyphIconResolver {
    async fn resolve(&self, name: &str) -> Option<String> {
        let base = name.strip_suffix("-fill").unwrap_or(name);
        match GLYPHS.iter().find(|(known, _)| *known == base) {
            Some((_, glyph)) => Some((*glyph).to_string()),
            None => {
                warn!(icon = name, "Icon not found");
                None
            }
        }
    }
}

/// Memoizing wrapper around any resolver. Each name is resolved at most once;
/// misses are cached too, so a failing lookup is not retried.
#[derive(Debug, Default)]
pub struct CachedIconResolver<R> {
    inner: R,
    cache: Mutex<HashMap<String, Option<String>>>,
}

impl<R: IconResolver> CachedIconResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<R: IconResolver> IconResolver for CachedIconResolver<R> {
    async fn resolve(&self, name: &str) -> Option<String> {
        if let Some(cached) = self.cache.lock().expect("icon cache lock poisoned").get(name) {
            return cached.clone();
        }
        let resolved = self.inner.resolve(name).await;
        self.cache
            .lock()
            .expect("icon cache lock poisoned")
            .insert(name.to_string(), resolved.clone());
        resolved
    }
}
