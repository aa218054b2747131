//! SQLite-backed named response stores.
//!
//! This module provides the persistent cache stores behind the offline
//! cache manager, with async access via tokio-rusqlite. It supports:
//!
//! - Named, versioned stores (static shell vs. dynamic content)
//! - Idempotent upserts keyed by (store, method, url)
//! - Wholesale store deletion for version-based eviction
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod migrations;
pub mod stores;

pub use crate::Error;

pub use connection::StoreDb;
pub use entries::CacheEntry;
pub use stores::StoreNames;
