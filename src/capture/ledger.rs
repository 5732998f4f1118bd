//! Last-seen fingerprint ledger
//!
//! Each owner has at most one remembered signature per distinct source
//! collection, persisted as a map under the owner-scoped
//! `admin.cartSeen.<owner>` key. A matching signature means the previous
//! scan already materialized this exact collection state.

use crate::domain::CartFingerprint;
use crate::infrastructure::storage::{keys, read_json, write_json, StorageBackend, StorageResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of a fingerprint comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerprintCheck {
    /// Signature matches the last-seen one; nothing to do this cycle
    Unchanged,
    /// New or different signature; it has been stored and the source
    /// collection should be materialized
    Changed,
}

/// Durable per-owner signature memory
pub struct FingerprintLedger {
    storage: Arc<dyn StorageBackend>,
}

impl FingerprintLedger {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Compare `fingerprint` with the stored signature for the
    /// (owner, source) pair, persisting it when it differs.
    ///
    /// First sight of a pair counts as changed.
    pub async fn check_and_update(
        &self,
        owner: &str,
        source: &str,
        fingerprint: &CartFingerprint,
    ) -> StorageResult<FingerprintCheck> {
        let key = keys::cart_seen(owner);
        let mut seen: HashMap<String, String> =
            read_json(self.storage.as_ref(), &key).await?;
        if seen.get(source) == Some(&fingerprint.0) {
            return Ok(FingerprintCheck::Unchanged);
        }
        seen.insert(source.to_string(), fingerprint.0.clone());
        write_json(self.storage.as_ref(), &key, &seen).await?;
        Ok(FingerprintCheck::Changed)
    }
}
