//! Static manifest constants supplied by the surrounding application.
//!
//! The cache manager does not compute these lists; the application hands
//! them over at construction time: which paths make up the app shell to
//! pre-cache at install, which paths are dynamic content, and which hosts
//! count as API endpoints.

use serde::{Deserialize, Serialize};

/// Fixed asset lists used for install-time pre-caching and URL
/// classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// App shell paths fetched and cached eagerly at install, e.g.
    /// `/`, `/index.html`, `/styles/base.css`, `/scripts/main.js`.
    pub shell_assets: Vec<String>,

    /// Paths of dynamic content cached on first request, e.g.
    /// `/data/projects.json`.
    pub dynamic_assets: Vec<String>,

    /// Host substrings identifying API endpoints, e.g. `api.github.com`.
    /// Same-origin paths containing `/api/` are classified as API
    /// regardless of this list.
    pub api_hosts: Vec<String>,
}

impl Manifest {
    pub fn new(
        shell_assets: impl IntoIterator<Item = impl Into<String>>,
        dynamic_assets: impl IntoIterator<Item = impl Into<String>>,
        api_hosts: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            shell_assets: shell_assets.into_iter().map(Into::into).collect(),
            dynamic_assets: dynamic_assets.into_iter().map(Into::into).collect(),
            api_hosts: api_hosts.into_iter().map(Into::into).collect(),
        }
    }
}
