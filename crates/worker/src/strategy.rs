//! The three caching strategies.
//!
//! Each strategy always produces a response: worst case is the synthetic
//! "not available offline" 503. Store failures degrade (reads become
//! misses, writes become no-ops) instead of failing the request, and a
//! non-2xx network status counts as a network failure.

use bytes::Bytes;
use precache_client::{FetchResponse, Request};
use precache_core::{CacheEntry, StoreDb};
use tracing::{debug, warn};

use crate::manager::CacheManager;

/// Body of the synthetic offline response.
const OFFLINE_BODY: &str = "content not available offline";

/// Where a response came from, for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    /// Read out of a cache store.
    Cache,
    /// Fresh from the network.
    Network,
    /// Synthetic 503 produced locally.
    Offline,
}

/// Response handed back to the host runtime for an intercepted request.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub served_from: ServedFrom,
}

impl Response {
    /// The deterministic offline fallback. Strategies end here instead of
    /// ever propagating a raw network error to the page.
    pub fn unavailable_offline() -> Self {
        Self {
            status: 503,
            headers: vec![("content-type".to_string(), "text/plain".to_string())],
            body: Bytes::from_static(OFFLINE_BODY.as_bytes()),
            served_from: ServedFrom::Offline,
        }
    }

    fn from_entry(entry: CacheEntry) -> Self {
        let headers = entry
            .headers_json
            .as_deref()
            .and_then(|json| serde_json::from_str(json).ok())
            .unwrap_or_default();
        Self {
            status: entry.status,
            headers,
            body: entry.body.map(Bytes::from).unwrap_or_default(),
            served_from: ServedFrom::Cache,
        }
    }

    fn from_network(response: FetchResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
            body: response.bytes,
            served_from: ServedFrom::Network,
        }
    }
}

/// Build a cache entry from a successful fetch.
fn entry_for(store: &str, request: &Request, response: &FetchResponse) -> CacheEntry {
    let headers_json = serde_json::to_string(&response.headers).ok();
    CacheEntry::new(
        store,
        request.method.as_str(),
        request.url.as_str(),
        response.status,
        headers_json,
        Some(response.bytes.to_vec()),
    )
}

/// Read an entry, degrading a store failure to a miss.
async fn read_entry(stores: &StoreDb, store: &str, request: &Request) -> Option<CacheEntry> {
    match stores.get_entry(store, request.method.as_str(), request.url.as_str()).await {
        Ok(entry) => entry,
        Err(e) => {
            warn!(store, url = %request.url, error = %e, "store read failed; treating as miss");
            None
        }
    }
}

/// Write an entry, degrading a store failure to a no-op.
async fn write_entry(stores: &StoreDb, store: &str, request: &Request, response: &FetchResponse) {
    let entry = entry_for(store, request, response);
    if let Err(e) = stores.put_entry(&entry).await {
        warn!(store, url = %request.url, error = %e, "store write failed; serving uncached");
    }
}

impl CacheManager {
    /// Cache-first: static shell assets. A cache hit never touches the
    /// network; a miss populates the static store from the network.
    pub(crate) async fn cache_first(&self, request: &Request) -> Response {
        let store = &self.names.static_store;
        if let Some(entry) = read_entry(&self.stores, store, request).await {
            return Response::from_entry(entry);
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                write_entry(&self.stores, store, request, &response).await;
                Response::from_network(response)
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "cache-first fetch failed with no cached copy");
                Response::unavailable_offline()
            }
        }
    }

    /// Network-first: dynamic content and the unmatched fallback. A
    /// successful fetch refreshes the dynamic store; on failure the last
    /// cached copy is served.
    pub(crate) async fn network_first(&self, request: &Request) -> Response {
        let store = &self.names.dynamic_store;
        match self.network.fetch(request).await {
            Ok(response) => {
                write_entry(&self.stores, store, request, &response).await;
                Response::from_network(response)
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "network failed, trying cache");
                match read_entry(&self.stores, store, request).await {
                    Some(entry) => Response::from_entry(entry),
                    None => Response::unavailable_offline(),
                }
            }
        }
    }

    /// Stale-while-revalidate: API responses. A cache hit is returned
    /// immediately and a detached revalidation fetch refreshes the entry
    /// for the next request; only a miss waits on the network.
    pub(crate) async fn stale_while_revalidate(&self, request: &Request) -> Response {
        let store = &self.names.dynamic_store;
        if let Some(entry) = read_entry(&self.stores, store, request).await {
            self.spawn_revalidate(request.clone());
            return Response::from_entry(entry);
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                write_entry(&self.stores, store, request, &response).await;
                Response::from_network(response)
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "revalidate fetch failed with no cached copy");
                Response::unavailable_offline()
            }
        }
    }

    /// Detached revalidation: its only effect is a future overwrite of the
    /// entry for this key. Last write wins; there is no ordering guarantee
    /// with concurrent reads of the same key.
    fn spawn_revalidate(&self, request: Request) {
        let stores = self.stores.clone();
        let store = self.names.dynamic_store.clone();
        let network = self.network.clone();
        tokio::spawn(async move {
            match network.fetch(&request).await {
                Ok(response) => write_entry(&stores, &store, &request, &response).await,
                Err(e) => debug!(url = %request.url, error = %e, "background revalidation failed"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{manager_with, FakeNetwork};
    use std::sync::Arc;
    use std::time::Duration;

    fn get(url: &str) -> Request {
        Request::get(url.parse().unwrap())
    }

    #[tokio::test]
    async fn test_cache_first_hit_skips_network() {
        let network = Arc::new(FakeNetwork::new());
        let manager = manager_with(Arc::clone(&network)).await;
        let entry = CacheEntry::new(
            &manager.names.static_store,
            "GET",
            "https://example.com/styles/base.css",
            200,
            None,
            Some(b"body{}".to_vec()),
        );
        manager.stores.put_entry(&entry).await.unwrap();

        let response = manager.cache_first(&get("https://example.com/styles/base.css")).await;

        assert_eq!(response.served_from, ServedFrom::Cache);
        assert_eq!(response.body.as_ref(), b"body{}");
        assert_eq!(network.calls(), 0);
    }

    #[tokio::test]
    async fn test_cache_first_miss_populates_store() {
        let network = Arc::new(FakeNetwork::new());
        network.set_body("https://example.com/styles/base.css", b"body{}");
        let manager = manager_with(Arc::clone(&network)).await;

        let response = manager.cache_first(&get("https://example.com/styles/base.css")).await;
        assert_eq!(response.served_from, ServedFrom::Network);
        assert_eq!(network.calls(), 1);

        let cached = manager
            .stores
            .get_entry(&manager.names.static_store, "GET", "https://example.com/styles/base.css")
            .await
            .unwrap();
        assert!(cached.is_some());

        // second request is served from cache
        let response = manager.cache_first(&get("https://example.com/styles/base.css")).await;
        assert_eq!(response.served_from, ServedFrom::Cache);
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_first_offline_miss_is_synthetic() {
        let network = Arc::new(FakeNetwork::new());
        network.set_offline(true);
        let manager = manager_with(Arc::clone(&network)).await;

        let response = manager.cache_first(&get("https://example.com/styles/base.css")).await;
        assert_eq!(response.status, 503);
        assert_eq!(response.served_from, ServedFrom::Offline);
    }

    #[tokio::test]
    async fn test_network_first_persists_then_survives_outage() {
        let network = Arc::new(FakeNetwork::new());
        network.set_body("https://example.com/data/projects.json", b"[1,2]");
        let manager = manager_with(Arc::clone(&network)).await;

        let request = get("https://example.com/data/projects.json");
        let response = manager.network_first(&request).await;
        assert_eq!(response.served_from, ServedFrom::Network);
        assert_eq!(response.body.as_ref(), b"[1,2]");

        network.set_offline(true);
        let response = manager.network_first(&request).await;
        assert_eq!(response.served_from, ServedFrom::Cache);
        assert_eq!(response.body.as_ref(), b"[1,2]");
    }

    #[tokio::test]
    async fn test_network_first_refreshes_cache() {
        let network = Arc::new(FakeNetwork::new());
        network.set_body("https://example.com/data/projects.json", b"old");
        let manager = manager_with(Arc::clone(&network)).await;

        let request = get("https://example.com/data/projects.json");
        manager.network_first(&request).await;
        network.set_body("https://example.com/data/projects.json", b"new");
        let response = manager.network_first(&request).await;
        assert_eq!(response.body.as_ref(), b"new");

        network.set_offline(true);
        let response = manager.network_first(&request).await;
        assert_eq!(response.body.as_ref(), b"new");
    }

    #[tokio::test]
    async fn test_network_first_offline_no_cache_is_synthetic() {
        let network = Arc::new(FakeNetwork::new());
        network.set_offline(true);
        let manager = manager_with(Arc::clone(&network)).await;

        let response = manager.network_first(&get("https://example.com/data/projects.json")).await;
        assert_eq!(response.status, 503);
        assert_eq!(response.served_from, ServedFrom::Offline);
    }

    #[tokio::test]
    async fn test_swr_hit_does_not_wait_for_network() {
        let network = Arc::new(FakeNetwork::new());
        network.block_fetches();
        let manager = manager_with(Arc::clone(&network)).await;
        let entry = CacheEntry::new(
            &manager.names.dynamic_store,
            "GET",
            "https://example.com/api/repos",
            200,
            None,
            Some(b"stale".to_vec()),
        );
        manager.stores.put_entry(&entry).await.unwrap();

        // The network gate is never released; a blocked revalidation must
        // not delay the cached response.
        let response = tokio::time::timeout(
            Duration::from_secs(1),
            manager.stale_while_revalidate(&get("https://example.com/api/repos")),
        )
        .await
        .expect("cached response must not wait on the network");

        assert_eq!(response.served_from, ServedFrom::Cache);
        assert_eq!(response.body.as_ref(), b"stale");
    }

    #[tokio::test]
    async fn test_swr_revalidation_updates_next_request() {
        let network = Arc::new(FakeNetwork::new());
        network.set_body("https://example.com/api/repos", b"fresh");
        let manager = manager_with(Arc::clone(&network)).await;
        let entry = CacheEntry::new(
            &manager.names.dynamic_store,
            "GET",
            "https://example.com/api/repos",
            200,
            None,
            Some(b"stale".to_vec()),
        );
        manager.stores.put_entry(&entry).await.unwrap();

        let request = get("https://example.com/api/repos");
        let response = manager.stale_while_revalidate(&request).await;
        assert_eq!(response.body.as_ref(), b"stale");

        // wait for the detached revalidation to land
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            let entry = manager
                .stores
                .get_entry(&manager.names.dynamic_store, "GET", "https://example.com/api/repos")
                .await
                .unwrap()
                .unwrap();
            if entry.body.as_deref() == Some(b"fresh".as_slice()) {
                break;
            }
            assert!(tokio::time::Instant::now() < deadline, "revalidation never landed");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let response = manager.stale_while_revalidate(&request).await;
        assert_eq!(response.body.as_ref(), b"fresh");
    }

    #[tokio::test]
    async fn test_swr_miss_waits_for_network() {
        let network = Arc::new(FakeNetwork::new());
        network.set_body("https://example.com/api/repos", b"fresh");
        let manager = manager_with(Arc::clone(&network)).await;

        let response = manager.stale_while_revalidate(&get("https://example.com/api/repos")).await;
        assert_eq!(response.served_from, ServedFrom::Network);
        assert_eq!(response.body.as_ref(), b"fresh");
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn test_swr_miss_offline_is_synthetic() {
        let network = Arc::new(FakeNetwork::new());
        network.set_offline(true);
        let manager = manager_with(Arc::clone(&network)).await;

        let response = manager.stale_while_revalidate(&get("https://example.com/api/repos")).await;
        assert_eq!(response.status, 503);
    }

    #[tokio::test]
    async fn test_http_error_counts_as_network_failure() {
        let network = Arc::new(FakeNetwork::new());
        network.fail_with_status("https://example.com/data/projects.json", 404);
        let manager = manager_with(Arc::clone(&network)).await;

        let response = manager.network_first(&get("https://example.com/data/projects.json")).await;
        assert_eq!(response.status, 503);
        assert_eq!(response.served_from, ServedFrom::Offline);
    }

    #[test]
    fn test_entry_headers_roundtrip() {
        let headers = vec![("content-type".to_string(), "application/json".to_string())];
        let entry = CacheEntry::new(
            "dynamic-v1",
            "GET",
            "https://example.com/api/x",
            200,
            serde_json::to_string(&headers).ok(),
            Some(b"{}".to_vec()),
        );
        let response = Response::from_entry(entry);
        assert_eq!(response.headers, headers);
    }

    #[test]
    fn test_entry_with_bad_headers_json_still_serves() {
        let entry = CacheEntry::new(
            "dynamic-v1",
            "GET",
            "https://example.com/api/x",
            200,
            Some("not json".to_string()),
            Some(b"{}".to_vec()),
        );
        let response = Response::from_entry(entry);
        assert!(response.headers.is_empty());
        assert_eq!(response.status, 200);
    }
}
