//! Scripted network and fixtures shared by the worker tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use precache_client::{FetchResponse, Network, Request};
use precache_core::{AppConfig, Error, Manifest, StoreDb};

use crate::manager::CacheManager;

/// In-memory [`Network`] with scripted responses per URL.
#[derive(Default)]
pub(crate) struct FakeNetwork {
    bodies: Mutex<HashMap<String, Bytes>>,
    statuses: Mutex<HashMap<String, u16>>,
    offline: AtomicBool,
    blocked: AtomicBool,
    calls: AtomicUsize,
}

impl FakeNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Script a 200 response with the given body for a URL.
    pub(crate) fn set_body(&self, url: &str, body: &[u8]) {
        self.bodies.lock().unwrap().insert(url.to_string(), Bytes::copy_from_slice(body));
    }

    /// Script a non-2xx status for a URL.
    pub(crate) fn fail_with_status(&self, url: &str, status: u16) {
        self.statuses.lock().unwrap().insert(url.to_string(), status);
    }

    /// When set, every fetch fails as if the network were unreachable.
    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make every subsequent fetch hang forever.
    pub(crate) fn block_fetches(&self) {
        self.blocked.store(true, Ordering::SeqCst);
    }

    /// Number of fetches attempted, including failed and blocked ones.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<FetchResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.blocked.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network("connection refused".to_string()));
        }
        let key = request.url.as_str();
        if let Some(status) = self.statuses.lock().unwrap().get(key) {
            return Err(Error::HttpStatus(*status));
        }
        let body = self.bodies.lock().unwrap().get(key).cloned();
        match body {
            Some(bytes) => Ok(FetchResponse {
                url: request.url.clone(),
                final_url: request.url.clone(),
                status: 200,
                content_type: Some("text/plain".to_string()),
                bytes,
                headers: vec![("content-type".to_string(), "text/plain".to_string())],
                fetch_ms: 0,
            }),
            None => Err(Error::Network(format!("no scripted response for {key}"))),
        }
    }
}

/// Config pointing at `https://example.com` with version `v1`.
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        version: "v1".to_string(),
        origin: "https://example.com".to_string(),
        ..AppConfig::default()
    }
}

/// Manifest matching the fixture site used across the tests.
pub(crate) fn test_manifest() -> Manifest {
    Manifest::new(
        ["/", "/index.html", "/styles/base.css"],
        ["/data/projects.json"],
        ["api.github.com"],
    )
}

/// Manager over an in-memory store wired to the given fake network.
pub(crate) async fn manager_with(network: Arc<FakeNetwork>) -> CacheManager {
    let stores = StoreDb::open_in_memory().await.unwrap();
    CacheManager::new(&test_config(), test_manifest(), stores, network).unwrap()
}
