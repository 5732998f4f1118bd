//! Cart capture: fingerprint-deduplicated materialization of source
//! collections into the back-office inbox.
//!
//! A scan reads a source cart, computes its order-sensitive fingerprint,
//! and only materializes when the signature differs from the last-seen
//! one for that owner and source. Materializing a collection of N lines
//! yields N inbox entries, each carrying point-in-time product and user
//! snapshots. Everything is local; there are no network calls.

use crate::domain::{CartFingerprint, CartLine, InboxEntry, UserSnapshot};
use crate::inbox::InboxManager;
use crate::infrastructure::events::{Event, EventBus};
use crate::infrastructure::storage::{keys, read_json, StorageBackend, StorageError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

mod directory;
mod ledger;

pub use directory::UserDirectory;
pub use ledger::{FingerprintCheck, FingerprintLedger};

/// Capture operation errors
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for capture operations
pub type CaptureResult<T> = std::result::Result<T, CaptureError>;

/// Orchestrates deduplication and materialization for all source carts
pub struct CaptureEngine {
    storage: Arc<dyn StorageBackend>,
    ledger: FingerprintLedger,
    directory: UserDirectory,
    inbox: Arc<InboxManager>,
    events: Arc<EventBus>,
}

impl CaptureEngine {
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        inbox: Arc<InboxManager>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            ledger: FingerprintLedger::new(storage.clone()),
            directory: UserDirectory::new(storage.clone()),
            storage,
            inbox,
            events,
        }
    }

    /// The signed-in owner the global cart belongs to, if any.
    async fn current_owner(&self) -> CaptureResult<Option<String>> {
        let raw = self.storage.get(keys::CURRENT_USER).await?;
        Ok(raw
            .map(|id| id.trim().trim_matches('"').to_string())
            .filter(|id| !id.is_empty()))
    }

    async fn read_cart(&self, key: &str) -> CaptureResult<Vec<CartLine>> {
        Ok(read_json(self.storage.as_ref(), key).await?)
    }

    /// Capture the global `cart` collection for the signed-in owner.
    ///
    /// Empty carts and missing owners are silently skipped; an unchanged
    /// fingerprint makes the whole call a no-op. Returns the number of
    /// entries materialized.
    pub async fn capture_current_cart(&self) -> CaptureResult<usize> {
        let lines = self.read_cart(keys::CART).await?;
        let Some(owner) = self.current_owner().await? else {
            debug!("No signed-in owner, skipping global cart");
            return Ok(0);
        };
        if lines.is_empty() {
            return Ok(0);
        }
        self.capture_collection(&owner, keys::CART, &lines).await
    }

    /// Scan the global cart plus every per-user cart key convention.
    ///
    /// Emits `ScanCompleted` with the total number of new entries.
    pub async fn scan_all(&self) -> CaptureResult<usize> {
        let mut new_entries = self.capture_current_cart().await?;

        for user in self.directory.all().await? {
            for key in keys::user_cart_candidates(&user.id) {
                let lines = self.read_cart(&key).await?;
                if lines.is_empty() {
                    continue;
                }
                new_entries += self.capture_collection(&user.id, &key, &lines).await?;
            }
        }

        if new_entries > 0 {
            info!("Scan materialized {} new entries", new_entries);
        }
        self.events.emit(Event::ScanCompleted { new_entries });
        Ok(new_entries)
    }

    /// Materialize one source collection if its fingerprint changed.
    ///
    /// The user snapshot is resolved once per collection and copied into
    /// every entry; the entries never see later registry edits.
    async fn capture_collection(
        &self,
        owner: &str,
        source: &str,
        lines: &[CartLine],
    ) -> CaptureResult<usize> {
        let fingerprint = CartFingerprint::compute(owner, lines);
        match self
            .ledger
            .check_and_update(owner, source, &fingerprint)
            .await?
        {
            FingerprintCheck::Unchanged => {
                debug!("Fingerprint unchanged for {owner}/{source}, skipping");
                return Ok(0);
            }
            FingerprintCheck::Changed => {}
        }

        let user: Option<UserSnapshot> = self
            .directory
            .find(owner)
            .await?
            .map(|record| record.snapshot());

        for line in lines {
            let entry = InboxEntry::new(
                line.product_snapshot(),
                user.clone(),
                line.quantity(),
                source,
            );
            let entry_id = entry.id.clone();
            // Persisted synchronously (and redrawn) before the next line
            self.inbox.accept(entry).await?;
            self.events.emit(Event::EntryCaptured {
                entry_id,
                owner: owner.to_string(),
                source: source.to_string(),
            });
        }
        debug!(
            "Materialized {} entries from {owner}/{source}",
            lines.len()
        );
        Ok(lines.len())
    }
}
