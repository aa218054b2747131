//! Offline cache manager for a static site.
//!
//! This crate decides, for every intercepted request, whether to answer
//! from cache, from the network, or with a synthetic offline response.
//! URLs are classified into app shell, dynamic content, and API calls,
//! each mapped to a caching strategy; two versioned stores back the
//! strategies and are pruned wholesale when a new version activates.
//!
//! The host runtime (whatever intercepts requests and delivers events)
//! drives a [`manager::CacheManager`] through its lifecycle:
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use precache_client::{FetchConfig, HttpClient, Request};
//! use precache_core::{AppConfig, Manifest, StoreDb};
//! use precache_worker::manager::CacheManager;
//!
//! let config = AppConfig::load()?;
//! let manifest = Manifest::new(["/", "/index.html"], ["/data/projects.json"], ["api.github.com"]);
//! let stores = StoreDb::open(&config.db_path).await?;
//! let network = Arc::new(HttpClient::new(FetchConfig::default())?);
//!
//! let manager = CacheManager::new(&config, manifest, stores, network)?;
//! manager.install().await?;
//! manager.activate().await?;
//!
//! let request = Request::get("http://localhost:8080/index.html".parse()?);
//! if let Some(response) = manager.handle(&request).await {
//!     println!("{} ({:?})", response.status, response.served_from);
//! }
//! # Ok(())
//! # }
//! ```

pub mod events;
pub mod lifecycle;
pub mod manager;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testing;

pub use events::{
    BACKGROUND_SYNC_TAG, ClientAction, Notification, PushEvent, SyncEvent, SyncReport,
};
pub use lifecycle::WorkerState;
pub use manager::{ActivateReport, CacheManager, InstallReport};
pub use strategy::{Response, ServedFrom};
