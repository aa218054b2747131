//! The offline cache manager.
//!
//! One `CacheManager` is constructed at startup per deployed version. It
//! owns the two versioned stores, the classification manifest, and an
//! injected network client; the host runtime calls [`CacheManager::install`]
//! and [`CacheManager::activate`] once each and [`CacheManager::handle`]
//! per intercepted request.

use std::sync::{Arc, RwLock};

use precache_client::{Network, Request, same_origin};
use precache_core::{AppConfig, CacheEntry, Error, Manifest, StoreDb, StoreNames, Strategy, classify};
use tracing::{debug, info, warn};
use url::Url;

use crate::lifecycle::WorkerState;
use crate::strategy::Response;

/// Outcome of install-time shell pre-caching.
///
/// Pre-caching is best-effort: entries that fail to fetch are reported
/// here and logged, but do not block the entries that succeeded.
#[derive(Debug, Default)]
pub struct InstallReport {
    /// Number of shell assets cached.
    pub cached: usize,
    /// Assets that could not be cached, with the failure reason.
    pub failed: Vec<(String, String)>,
}

/// Outcome of activation.
#[derive(Debug, Default)]
pub struct ActivateReport {
    /// Stores from older versions that were deleted wholesale.
    pub deleted_stores: Vec<String>,
}

/// Decides, for every intercepted request, whether to serve from cache,
/// from network, or a blend of both, and keeps the stores populated
/// accordingly.
pub struct CacheManager {
    pub(crate) stores: StoreDb,
    pub(crate) names: StoreNames,
    pub(crate) manifest: Manifest,
    pub(crate) origin: Url,
    pub(crate) form_endpoint: Option<String>,
    pub(crate) network: Arc<dyn Network>,
    state: RwLock<WorkerState>,
}

impl CacheManager {
    /// Build a manager for the configured version. The returned instance
    /// starts in the `installing` state.
    pub fn new(config: &AppConfig, manifest: Manifest, stores: StoreDb, network: Arc<dyn Network>) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.origin)))?;
        Ok(Self {
            stores,
            names: StoreNames::for_version(&config.version),
            manifest,
            origin,
            form_endpoint: config.form_endpoint.clone(),
            network,
            state: RwLock::new(WorkerState::Installing),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Names of the two stores owned by this version.
    pub fn store_names(&self) -> &StoreNames {
        &self.names
    }

    fn set_state(&self, state: WorkerState) {
        let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
        if *guard != state {
            debug!(from = %*guard, to = %state, "lifecycle transition");
            *guard = state;
        }
    }

    fn fail(&self, err: Error) -> Error {
        self.set_state(WorkerState::Redundant);
        err
    }

    /// Populate the static store with the app shell.
    ///
    /// Fetches every shell manifest URL and stores the successes;
    /// individual failures are logged and reported without aborting the
    /// rest. Re-running with the same manifest upserts the same entries.
    /// On completion the worker signals immediate takeover rather than
    /// waiting for the previous version's pages to close.
    ///
    /// # Errors
    ///
    /// Only a store that cannot be opened fails the install; the worker
    /// then becomes `redundant`.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        if self.state().is_terminal() {
            return Err(Error::InvalidState { expected: "installing".into(), actual: self.state().to_string() });
        }
        self.set_state(WorkerState::Installing);
        info!(version_stores = %self.names.static_store, "installing");

        self.stores.open_store(&self.names.static_store).await.map_err(|e| self.fail(e))?;
        self.stores.open_store(&self.names.dynamic_store).await.map_err(|e| self.fail(e))?;

        let mut report = InstallReport::default();
        for asset in &self.manifest.shell_assets {
            let url = match self.origin.join(asset) {
                Ok(url) => url,
                Err(e) => {
                    warn!(asset, error = %e, "skipping unresolvable shell asset");
                    report.failed.push((asset.clone(), e.to_string()));
                    continue;
                }
            };
            let request = Request::get(url);
            match self.network.fetch(&request).await {
                Ok(response) => {
                    let headers_json = serde_json::to_string(&response.headers).ok();
                    let entry = CacheEntry::new(
                        &self.names.static_store,
                        "GET",
                        request.url.as_str(),
                        response.status,
                        headers_json,
                        Some(response.bytes.to_vec()),
                    );
                    match self.stores.put_entry(&entry).await {
                        Ok(()) => report.cached += 1,
                        Err(e) => {
                            warn!(asset, error = %e, "failed to store shell asset");
                            report.failed.push((asset.clone(), e.to_string()));
                        }
                    }
                }
                Err(e) => {
                    warn!(asset, error = %e, "failed to pre-cache shell asset");
                    report.failed.push((asset.clone(), e.to_string()));
                }
            }
        }

        self.set_state(WorkerState::Installed);
        info!(cached = report.cached, failed = report.failed.len(), "install complete, skipping waiting phase");
        Ok(report)
    }

    /// Delete stores from older versions and claim open clients.
    ///
    /// Every store whose name is not one of the two current names is
    /// deleted wholesale (coarse version-based eviction). On completion
    /// the new interception logic applies without a manual reload.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        if self.state().is_terminal() {
            return Err(Error::InvalidState { expected: "installed".into(), actual: self.state().to_string() });
        }
        self.set_state(WorkerState::Activating);

        let existing = self.stores.list_stores().await.map_err(|e| self.fail(e))?;
        let mut report = ActivateReport::default();
        for name in existing {
            if self.names.is_current(&name) {
                continue;
            }
            match self.stores.delete_store(&name).await {
                Ok(true) => {
                    info!(store = name, "deleted old cache store");
                    report.deleted_stores.push(name);
                }
                Ok(false) => {}
                Err(e) => warn!(store = name, error = %e, "failed to delete old cache store"),
            }
        }

        // Covers activation on a fresh database where install never ran.
        self.stores.open_store(&self.names.static_store).await.map_err(|e| self.fail(e))?;
        self.stores.open_store(&self.names.dynamic_store).await.map_err(|e| self.fail(e))?;

        self.set_state(WorkerState::Activated);
        info!(deleted = report.deleted_stores.len(), "cache cleanup complete, claiming clients");
        Ok(report)
    }

    /// Dispatch one intercepted request.
    ///
    /// Returns `None` when the request is not intercepted (cross-origin,
    /// or this worker is not activated); the host runtime then lets the
    /// request pass through untouched. Otherwise classifies the URL and
    /// runs the matching strategy; a response is always produced.
    pub async fn handle(&self, request: &Request) -> Option<Response> {
        if !self.state().can_intercept_fetch() {
            debug!(state = %self.state(), "not intercepting: worker not activated");
            return None;
        }
        if !same_origin(&self.origin, &request.url) {
            return None;
        }

        let category = classify(&self.manifest, &request.url);
        debug!(url = %request.url, ?category, "dispatching");
        let response = match category.strategy() {
            Strategy::CacheFirst => self.cache_first(request).await,
            Strategy::NetworkFirst => self.network_first(request).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request).await,
        };
        Some(response)
    }
}
