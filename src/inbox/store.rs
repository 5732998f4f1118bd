//! Durable ordered entry collections
//!
//! A store is a whole-collection read-modify-write wrapper around one
//! storage key: `load` returns the full ordered sequence, `save`
//! overwrites the persisted representation entirely. There are no partial
//! or merge semantics, and no locking; two writers racing on the same key
//! lose one of the updates. That model is inherited from the system this
//! core captures for and is kept as-is.

use crate::domain::InboxEntry;
use crate::infrastructure::storage::{read_json, write_json, StorageBackend, StorageResult};
use std::sync::Arc;

/// One persisted, head-insert-ordered entry collection
pub struct EntryStore {
    storage: Arc<dyn StorageBackend>,
    key: String,
}

impl EntryStore {
    pub fn new(storage: Arc<dyn StorageBackend>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Storage key this store persists under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the current ordered sequence, newest first.
    ///
    /// An uninitialized or corrupted value reads as an empty sequence.
    pub async fn load(&self) -> StorageResult<Vec<InboxEntry>> {
        read_json(self.storage.as_ref(), &self.key).await
    }

    /// Overwrite the persisted collection with `entries`.
    pub async fn save(&self, entries: &[InboxEntry]) -> StorageResult<()> {
        write_json(self.storage.as_ref(), &self.key, &entries).await
    }

    /// Insert one entry at the head of the collection and persist.
    pub async fn push_front(&self, entry: InboxEntry) -> StorageResult<()> {
        let mut entries = self.load().await?;
        entries.insert(0, entry);
        self.save(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductSnapshot;
    use crate::infrastructure::storage::MemoryBackend;

    fn entry(product_id: &str) -> InboxEntry {
        InboxEntry::new(
            ProductSnapshot {
                id: product_id.to_string(),
                name: None,
                price: None,
                image: None,
            },
            None,
            1,
            "cart",
        )
    }

    fn store() -> EntryStore {
        EntryStore::new(Arc::new(MemoryBackend::new()), "admin.inbox")
    }

    #[tokio::test]
    async fn loads_empty_when_uninitialized() {
        assert!(store().load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn loads_empty_on_corrupt_value() {
        let storage = Arc::new(MemoryBackend::new());
        storage.set("admin.inbox", "{broken").await.unwrap();
        let store = EntryStore::new(storage, "admin.inbox");
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn push_front_orders_newest_first() {
        let store = store();
        let first = entry("p_1");
        let second = entry("p_2");
        store.push_front(first.clone()).await.unwrap();
        store.push_front(second.clone()).await.unwrap();

        let entries = store.load().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, second.id);
        assert_eq!(entries[1].id, first.id);
    }

    #[tokio::test]
    async fn order_survives_save_load_cycles() {
        let store = store();
        for i in 0..5 {
            store.push_front(entry(&format!("p_{i}"))).await.unwrap();
        }
        let entries = store.load().await.unwrap();
        store.save(&entries).await.unwrap();
        let reloaded = store.load().await.unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.id.clone()).collect();
        let reloaded_ids: Vec<_> = reloaded.iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, reloaded_ids);
    }
}
