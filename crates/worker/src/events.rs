//! Background sync, push, and notification events.
//!
//! These mirror the host-runtime events beyond fetch interception:
//! submissions queued while offline are replayed when connectivity
//! returns, push payloads become notification descriptions, and a
//! notification click asks the runtime to open the site root.

use bytes::Bytes;
use precache_client::{Method, Request};
use precache_core::{CacheEntry, Error};
use tracing::{debug, info, warn};
use url::Url;

use crate::manager::CacheManager;

/// Tag identifying the replay-queued-submissions sync event.
pub const BACKGROUND_SYNC_TAG: &str = "background-sync";

/// Icon and badge shown on push notifications.
pub const NOTIFICATION_ICON: &str = "/assets/favicon.svg";

/// Title shown on push notifications.
pub const NOTIFICATION_TITLE: &str = "Portfolio Update";

/// Vibration pattern for push notifications, in milliseconds.
pub const VIBRATE_PATTERN: [u32; 3] = [100, 50, 100];

/// Status recorded for a queued submission that has not been sent yet.
const QUEUED_STATUS: u16 = 0;

/// A background sync wake-up from the host runtime.
#[derive(Debug, Clone)]
pub struct SyncEvent {
    pub tag: String,
}

impl SyncEvent {
    pub fn background_sync() -> Self {
        Self { tag: BACKGROUND_SYNC_TAG.to_string() }
    }
}

/// A push message from the host runtime.
#[derive(Debug, Clone)]
pub struct PushEvent {
    /// Decoded text payload, if the message carried one.
    pub payload: Option<String>,
}

/// Notification description handed to the host runtime for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
}

/// Action the host runtime should take on behalf of the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Open (or focus) a window at the given site-relative URL.
    OpenWindow { url: String },
}

/// Outcome of one background sync pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Queued submissions delivered and removed from the store.
    pub replayed: usize,
    /// Submissions still queued after this pass.
    pub pending: usize,
}

impl CacheManager {
    /// Queue a non-GET submission for later replay.
    ///
    /// The request is stored in the dynamic store with status 0 so a
    /// background sync pass can recognize and replay it. Queueing the
    /// same URL and method again replaces the earlier body.
    pub async fn queue_request(&self, request: &Request) -> Result<(), Error> {
        if request.method == Method::Get {
            return Err(Error::InvalidState {
                expected: "non-GET submission".to_string(),
                actual: request.method.to_string(),
            });
        }
        let entry = CacheEntry::new(
            &self.names.dynamic_store,
            request.method.as_str(),
            request.url.as_str(),
            QUEUED_STATUS,
            None,
            request.body.as_ref().map(|b| b.to_vec()),
        );
        self.stores.put_entry(&entry).await?;
        info!(method = %request.method, url = %request.url, "queued submission for background sync");
        Ok(())
    }

    /// Replay queued submissions when connectivity returns.
    ///
    /// Only reacts to the [`BACKGROUND_SYNC_TAG`] tag. Each queued
    /// non-GET entry matching the configured form endpoint gets one
    /// delivery attempt; successes are removed from the store, failures
    /// stay queued for the next sync.
    pub async fn handle_sync(&self, event: &SyncEvent) -> Result<SyncReport, Error> {
        if event.tag != BACKGROUND_SYNC_TAG {
            debug!(tag = event.tag, "ignoring unknown sync tag");
            return Ok(SyncReport::default());
        }

        let mut report = SyncReport::default();
        for entry in self.stores.list_entries(&self.names.dynamic_store).await? {
            if entry.method == "GET" {
                continue;
            }
            if let Some(endpoint) = &self.form_endpoint
                && !entry.url.contains(endpoint.as_str())
            {
                continue;
            }

            let Some(method) = Method::parse(&entry.method) else {
                warn!(method = entry.method, url = entry.url, "skipping queued entry with unknown method");
                report.pending += 1;
                continue;
            };
            let url = match Url::parse(&entry.url) {
                Ok(url) => url,
                Err(e) => {
                    warn!(url = entry.url, error = %e, "skipping queued entry with invalid url");
                    report.pending += 1;
                    continue;
                }
            };
            let request = Request { method, url, body: entry.body.clone().map(Bytes::from) };

            match self.network.fetch(&request).await {
                Ok(_) => {
                    self.stores.delete_entry(&self.names.dynamic_store, &entry.method, &entry.url).await?;
                    info!(method = entry.method, url = entry.url, "replayed queued submission");
                    report.replayed += 1;
                }
                Err(e) => {
                    debug!(method = entry.method, url = entry.url, error = %e, "replay failed, keeping queued");
                    report.pending += 1;
                }
            }
        }

        info!(replayed = report.replayed, pending = report.pending, "background sync pass complete");
        Ok(report)
    }

    /// Turn a push message into a notification to display.
    ///
    /// Messages without a payload produce no notification.
    pub fn handle_push(&self, event: &PushEvent) -> Option<Notification> {
        let body = event.payload.as_deref().filter(|p| !p.is_empty())?;
        Some(Notification {
            title: NOTIFICATION_TITLE.to_string(),
            body: body.to_string(),
            icon: NOTIFICATION_ICON.to_string(),
            badge: NOTIFICATION_ICON.to_string(),
            vibrate: VIBRATE_PATTERN.to_vec(),
        })
    }

    /// A clicked notification closes and opens the site root.
    pub fn handle_notification_click(&self) -> ClientAction {
        ClientAction::OpenWindow { url: "/".to_string() }
    }
}
