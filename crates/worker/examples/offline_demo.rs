//! End-to-end walkthrough of the worker lifecycle against a live site.
//!
//! Run with the site origin and version in the environment:
//!
//! ```sh
//! PRECACHE_ORIGIN=https://example.com PRECACHE_VERSION=v1 \
//!     cargo run --example offline_demo
//! ```

use std::sync::Arc;

use anyhow::Result;
use precache_client::{FetchConfig, HttpClient, Request, canonicalize};
use precache_core::{AppConfig, Manifest, StoreDb};
use precache_worker::manager::CacheManager;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    let manifest = Manifest::new(
        ["/", "/index.html", "/styles/base.css", "/scripts/main.js"],
        ["/data/projects.json"],
        ["api.github.com"],
    );

    let stores = StoreDb::open_in_memory().await?;
    let network = Arc::new(HttpClient::new(FetchConfig {
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        timeout: config.timeout(),
        ..FetchConfig::default()
    })?);

    let manager = CacheManager::new(&config, manifest, stores, network)?;

    let install = manager.install().await?;
    println!("installed: {} cached, {} failed", install.cached, install.failed.len());
    for (asset, reason) in &install.failed {
        println!("  failed {asset}: {reason}");
    }

    let activate = manager.activate().await?;
    println!("activated: deleted {:?}", activate.deleted_stores);

    let url = format!("{}/index.html", config.origin.trim_end_matches('/'));
    let request = Request::get(canonicalize(&url)?);
    match manager.handle(&request).await {
        Some(response) => {
            println!("{url}: {} bytes, status {} ({:?})", response.body.len(), response.status, response.served_from);
        }
        None => println!("{url}: not intercepted"),
    }

    Ok(())
}
