//! Read-only view over the user registry

use crate::domain::UserRecord;
use crate::infrastructure::storage::{keys, read_json, StorageBackend, StorageResult};
use std::sync::Arc;

/// Lookup over the `app.users` registry. Read-only; the account pages own
/// the writes.
pub struct UserDirectory {
    storage: Arc<dyn StorageBackend>,
}

impl UserDirectory {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// All registered users, in registry order.
    pub async fn all(&self) -> StorageResult<Vec<UserRecord>> {
        read_json(self.storage.as_ref(), keys::USERS).await
    }

    /// Find one user by id.
    pub async fn find(&self, user_id: &str) -> StorageResult<Option<UserRecord>> {
        Ok(self.all().await?.into_iter().find(|u| u.id == user_id))
    }
}
