//! Cache entry CRUD operations.
//!
//! An entry is a stored response keyed by (store, method, url). Writes are
//! idempotent upserts: concurrent puts for the same key simply race to be
//! the last write, which is safe because each put replaces the whole entry.

use super::connection::StoreDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A stored response (or, for queued submissions, a stored request).
///
/// No TTL metadata is kept on the entry itself; freshness is decided by
/// the caching strategy that reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Name of the store this entry belongs to.
    pub store: String,
    /// HTTP method, uppercase ("GET", "POST", ...).
    pub method: String,
    /// Full request URL, canonicalized by the caller.
    pub url: String,
    /// HTTP status of the stored response. Queued submissions that have
    /// not been sent yet use status 0.
    pub status: u16,
    /// Response headers as a JSON object, if any were captured.
    pub headers_json: Option<String>,
    /// Response body (or request body for queued submissions).
    pub body: Option<Vec<u8>>,
    /// RFC 3339 timestamp of when the entry was written.
    pub stored_at: String,
}

impl CacheEntry {
    /// Build an entry stamped with the current time.
    pub fn new(store: &str, method: &str, url: &str, status: u16, headers_json: Option<String>, body: Option<Vec<u8>>) -> Self {
        Self {
            store: store.to_string(),
            method: method.to_uppercase(),
            url: url.to_string(),
            status,
            headers_json,
            body,
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl StoreDb {
    /// Insert or update a cache entry.
    ///
    /// Registers the owning store if it doesn't exist yet, then upserts:
    /// inserts if the (store, method, url) key is new, replaces all fields
    /// if it exists.
    pub async fn put_entry(&self, entry: &CacheEntry) -> Result<(), Error> {
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
                    params![&entry.store, chrono::Utc::now().to_rfc3339()],
                )?;
                conn.execute(
                    "INSERT INTO entries (store, method, url, status, headers_json, body, stored_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(store, method, url) DO UPDATE SET
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        &entry.store,
                        &entry.method,
                        &entry.url,
                        entry.status,
                        &entry.headers_json,
                        &entry.body,
                        &entry.stored_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get an entry by key.
    ///
    /// Returns None if the key doesn't exist in the store.
    pub async fn get_entry(&self, store: &str, method: &str, url: &str) -> Result<Option<CacheEntry>, Error> {
        let store = store.to_string();
        let method = method.to_uppercase();
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT store, method, url, status, headers_json, body, stored_at
                     FROM entries WHERE store = ?1 AND method = ?2 AND url = ?3",
                )?;

                let result = stmt.query_row(params![store, method, url], |row| {
                    Ok(CacheEntry {
                        store: row.get(0)?,
                        method: row.get(1)?,
                        url: row.get(2)?,
                        status: row.get::<_, i64>(3)? as u16,
                        headers_json: row.get(4)?,
                        body: row.get(5)?,
                        stored_at: row.get(6)?,
                    })
                });

                match result {
                    Ok(e) => Ok(Some(e)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Delete an entry by key. Returns true if an entry was removed.
    pub async fn delete_entry(&self, store: &str, method: &str, url: &str) -> Result<bool, Error> {
        let store = store.to_string();
        let method = method.to_uppercase();
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM entries WHERE store = ?1 AND method = ?2 AND url = ?3",
                    params![store, method, url],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// List all entries in a store, oldest first.
    pub async fn list_entries(&self, store: &str) -> Result<Vec<CacheEntry>, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<CacheEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT store, method, url, status, headers_json, body, stored_at
                     FROM entries WHERE store = ?1 ORDER BY stored_at ASC",
                )?;
                let rows = stmt.query_map(params![store], |row| {
                    Ok(CacheEntry {
                        store: row.get(0)?,
                        method: row.get(1)?,
                        url: row.get(2)?,
                        status: row.get::<_, i64>(3)? as u16,
                        headers_json: row.get(4)?,
                        body: row.get(5)?,
                        stored_at: row.get(6)?,
                    })
                })?;
                let mut entries = Vec::new();
                for row in rows {
                    entries.push(row?);
                }
                Ok(entries)
            })
            .await
            .map_err(Error::from)
    }

    /// Count entries in a store.
    pub async fn entry_count(&self, store: &str) -> Result<u64, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE store = ?1", params![store], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
