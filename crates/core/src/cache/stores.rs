//! Named store lifecycle operations.
//!
//! Stores are named key-value caches of responses. Names carry the build
//! version as a suffix, so deploying a new version creates fresh stores
//! and activation deletes every store from older versions wholesale.

use super::connection::StoreDb;
use crate::Error;
use tokio_rusqlite::params;

/// The two store names for the currently deployed version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNames {
    /// Versioned static store, holds the pre-cached app shell.
    pub static_store: String,
    /// Versioned dynamic store, grows as content and API responses arrive.
    pub dynamic_store: String,
}

impl StoreNames {
    /// Derive the store names for a version string, e.g. "v1.0.0".
    pub fn for_version(version: &str) -> Self {
        Self { static_store: format!("static-{version}"), dynamic_store: format!("dynamic-{version}") }
    }

    /// Whether a store name belongs to the current version set.
    pub fn is_current(&self, name: &str) -> bool {
        name == self.static_store || name == self.dynamic_store
    }
}

impl StoreDb {
    /// Register a named store, creating it if it doesn't exist.
    pub async fn open_store(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
                    params![name, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// List all registered store names.
    pub async fn list_stores(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM stores ORDER BY name")?;
                let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
                let mut names = Vec::new();
                for row in rows {
                    names.push(row?);
                }
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Whether a store with the given name exists.
    pub async fn has_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM stores WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and every entry in it. Returns true if it existed.
    pub async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM stores WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }
}
