//! URL classification for strategy dispatch.
//!
//! Classification is a pure, total function of the URL: every request maps
//! to exactly one category, with anything unmatched falling through to the
//! network-first default.

use crate::manifest::Manifest;
use url::Url;

/// File extensions served from the static shell store.
const STATIC_EXTENSIONS: &[&str] = &[".html", ".css", ".js", ".svg", ".ico", ".webp", ".jpg", ".png"];

/// Extension marking dynamic content.
const DYNAMIC_EXTENSION: &str = ".json";

/// Path substring marking same-origin API routes.
const API_PATH_MARKER: &str = "/api/";

/// The caching strategy each category dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
}

/// Asset category for an intercepted request URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// App shell file: part of the shell manifest or a static extension.
    StaticShell,
    /// Data file: part of the dynamic manifest or a `.json` path.
    DynamicContent,
    /// API endpoint: known API host or an `/api/` path.
    Api,
    /// Anything else; treated as dynamic content (network-first).
    Unmatched,
}

impl Category {
    /// Strategy this category dispatches to.
    pub fn strategy(self) -> Strategy {
        match self {
            Category::StaticShell => Strategy::CacheFirst,
            Category::DynamicContent | Category::Unmatched => Strategy::NetworkFirst,
            Category::Api => Strategy::StaleWhileRevalidate,
        }
    }
}

/// Classify a URL into exactly one [`Category`].
///
/// Rules are checked in order: shell manifest membership or static
/// extension, then dynamic manifest membership or `.json` extension, then
/// API host/path markers. Manifest paths match the URL path exactly;
/// matching them as substrings would make a `/` shell entry swallow every
/// request.
pub fn classify(manifest: &Manifest, url: &Url) -> Category {
    let path = url.path();

    if manifest.shell_assets.iter().any(|asset| asset == path)
        || STATIC_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
    {
        return Category::StaticShell;
    }

    if manifest.dynamic_assets.iter().any(|asset| asset == path) || path.ends_with(DYNAMIC_EXTENSION) {
        return Category::DynamicContent;
    }

    let host = url.host_str().unwrap_or_default();
    if manifest.api_hosts.iter().any(|h| host.contains(h.as_str())) || path.contains(API_PATH_MARKER) {
        return Category::Api;
    }

    Category::Unmatched
}
