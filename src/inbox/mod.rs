//! Inbox management: the primary pending-review collection, the paired
//! confirmed/rejected archives, and the status transition API.
//!
//! Status state machine: pending -> confirmed (confirm), pending ->
//! rejected (reject), confirmed/rejected -> pending (undo), any ->
//! removed (delete). No other transitions are applied; a disallowed
//! transition or an unknown entry id is a silent no-op, because callers
//! are expected to act only on ids they obtained from the last render.

use crate::domain::{EntryId, EntryStatus, InboxEntry};
use crate::infrastructure::events::{Event, EventBus};
use crate::infrastructure::storage::{keys, StorageBackend, StorageResult};
use crate::render::{InboxView, RenderSink};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

mod store;

pub use store::EntryStore;

/// Manages the primary inbox and its terminal archives
pub struct InboxManager {
    inbox: EntryStore,
    confirmed: EntryStore,
    rejected: EntryStore,
    events: Arc<EventBus>,
    render: Arc<dyn RenderSink>,
}

impl InboxManager {
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        events: Arc<EventBus>,
        render: Arc<dyn RenderSink>,
    ) -> Self {
        Self {
            inbox: EntryStore::new(storage.clone(), keys::INBOX),
            confirmed: EntryStore::new(storage.clone(), keys::CONFIRMED),
            rejected: EntryStore::new(storage, keys::REJECTED),
            events,
            render,
        }
    }

    /// Current primary inbox, newest first.
    pub async fn entries(&self) -> StorageResult<Vec<InboxEntry>> {
        self.inbox.load().await
    }

    /// Current confirmed archive, newest first.
    pub async fn confirmed(&self) -> StorageResult<Vec<InboxEntry>> {
        self.confirmed.load().await
    }

    /// Current rejected archive, newest first.
    pub async fn rejected(&self) -> StorageResult<Vec<InboxEntry>> {
        self.rejected.load().await
    }

    /// Current view of the primary inbox with summary counts.
    pub async fn view(&self) -> StorageResult<InboxView> {
        Ok(InboxView::from_entries(self.inbox.load().await?))
    }

    /// Append a freshly materialized entry at the head of the inbox and
    /// redraw. Persists before returning.
    pub(crate) async fn accept(&self, entry: InboxEntry) -> StorageResult<()> {
        self.inbox.push_front(entry).await?;
        self.redraw().await
    }

    /// Move an entry to `status`, leaving its position untouched.
    ///
    /// Only pending entries can move; anything else, including an unknown
    /// id, is a silent no-op.
    pub async fn set_status(&self, id: &EntryId, status: EntryStatus) -> StorageResult<()> {
        let mut entries = self.inbox.load().await?;
        let Some(entry) = entries.iter_mut().find(|e| &e.id == id) else {
            debug!("set_status: no entry {id}, ignoring");
            return Ok(());
        };
        if entry.status == status {
            return Ok(());
        }
        if !(entry.status == EntryStatus::Pending && status.is_terminal()) {
            debug!(
                "set_status: {} -> {} not permitted for {id}, ignoring",
                entry.status, status
            );
            return Ok(());
        }
        entry.status = status;
        self.inbox.save(&entries).await?;
        self.events.emit(Event::EntryStatusChanged {
            entry_id: id.clone(),
            status,
        });
        self.redraw().await
    }

    /// Confirm a pending entry in place.
    pub async fn confirm(&self, id: &EntryId) -> StorageResult<()> {
        self.set_status(id, EntryStatus::Confirmed).await
    }

    /// Reject a pending entry in place.
    pub async fn reject(&self, id: &EntryId) -> StorageResult<()> {
        self.set_status(id, EntryStatus::Rejected).await
    }

    /// Permanently delete an entry from whichever collection holds it.
    /// Unknown ids are a silent no-op.
    pub async fn remove(&self, id: &EntryId) -> StorageResult<()> {
        for store in [&self.inbox, &self.rejected, &self.confirmed] {
            let entries = store.load().await?;
            if entries.iter().any(|e| &e.id == id) {
                let remaining: Vec<_> =
                    entries.into_iter().filter(|e| &e.id != id).collect();
                store.save(&remaining).await?;
                self.events.emit(Event::EntryRemoved {
                    entry_id: id.clone(),
                });
                return self.redraw().await;
            }
        }
        debug!("remove: no entry {id}, ignoring");
        Ok(())
    }

    /// Clear the primary inbox entirely.
    pub async fn clear(&self) -> StorageResult<()> {
        self.inbox.save(&[]).await?;
        self.events.emit(Event::InboxCleared);
        self.redraw().await
    }

    /// Move every terminal-status entry from the primary inbox to the head
    /// of its archive, stamping `handled_at`. Returns how many moved.
    ///
    /// Relative order is preserved on both sides: the moved batch lands at
    /// the archive head newest-first, remaining inbox entries keep their
    /// positions.
    pub async fn archive_handled(&self) -> StorageResult<usize> {
        let entries = self.inbox.load().await?;
        let (handled, remaining): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(|e| e.status.is_terminal());
        if handled.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut to_confirmed = Vec::new();
        let mut to_rejected = Vec::new();
        for mut entry in handled {
            entry.handled_at = Some(now);
            match entry.status {
                EntryStatus::Confirmed => to_confirmed.push(entry),
                EntryStatus::Rejected => to_rejected.push(entry),
                EntryStatus::Pending => unreachable!("partitioned on terminal status"),
            }
        }
        let moved = to_confirmed.len() + to_rejected.len();

        if !to_confirmed.is_empty() {
            let mut archive = self.confirmed.load().await?;
            to_confirmed.append(&mut archive);
            self.confirmed.save(&to_confirmed).await?;
        }
        if !to_rejected.is_empty() {
            let mut archive = self.rejected.load().await?;
            to_rejected.append(&mut archive);
            self.rejected.save(&to_rejected).await?;
        }
        self.inbox.save(&remaining).await?;
        self.redraw().await?;
        Ok(moved)
    }

    /// Move a handled entry back to pending at the head of the primary
    /// inbox.
    ///
    /// If the entry still sits in the primary inbox with terminal status,
    /// this is a single-store write. If it was archived, the entry crosses
    /// two separately persisted collections: the inbox is written first,
    /// then the archive, matching the page this replaces. Only each
    /// individual save is atomic; an interruption between the two writes
    /// leaves the entry duplicated in both collections. This failure
    /// window is a known, accepted gap.
    pub async fn undo(&self, id: &EntryId) -> StorageResult<()> {
        // In-place terminal entry: reset and move to head in one write.
        let mut entries = self.inbox.load().await?;
        if let Some(pos) = entries.iter().position(|e| &e.id == id) {
            if !entries[pos].status.is_terminal() {
                debug!("undo: entry {id} is not handled, ignoring");
                return Ok(());
            }
            let mut entry = entries.remove(pos);
            entry.status = EntryStatus::Pending;
            entry.handled_at = None;
            entries.insert(0, entry);
            self.inbox.save(&entries).await?;
            self.events.emit(Event::EntryStatusChanged {
                entry_id: id.clone(),
                status: EntryStatus::Pending,
            });
            return self.redraw().await;
        }

        // Archived entry: pull it back across the store pair.
        for store in [&self.rejected, &self.confirmed] {
            let mut archived = store.load().await?;
            let Some(pos) = archived.iter().position(|e| &e.id == id) else {
                continue;
            };
            let mut entry = archived.remove(pos);
            entry.status = EntryStatus::Pending;
            entry.handled_at = None;
            self.inbox.push_front(entry).await?;
            store.save(&archived).await?;
            self.events.emit(Event::EntryStatusChanged {
                entry_id: id.clone(),
                status: EntryStatus::Pending,
            });
            return self.redraw().await;
        }

        debug!("undo: no entry {id}, ignoring");
        Ok(())
    }

    /// Redraw the presentation layer from the current inbox state.
    pub async fn redraw(&self) -> StorageResult<()> {
        let view = self.view().await?;
        self.render.render(&view);
        Ok(())
    }
}
