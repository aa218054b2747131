//! Core types and shared functionality for precache.
//!
//! This crate provides:
//! - Named, versioned response stores with a SQLite backend
//! - URL classification for strategy dispatch
//! - Static manifest constants supplied by the application
//! - Configuration structures
//! - Unified error types

pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod manifest;

pub use cache::{CacheEntry, StoreDb, StoreNames};
pub use classify::{Category, Strategy, classify};
pub use config::AppConfig;
pub use error::Error;
pub use manifest::Manifest;
