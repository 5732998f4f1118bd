//! Event bus for decoupled communication

use crate::domain::{EntryId, EntryStatus};
use tokio::sync::broadcast;

/// Capture-core events
#[derive(Debug, Clone)]
pub enum Event {
    /// Core has started
    CoreStarted,

    /// Core is shutting down
    CoreShutdown,

    /// A storage key changed in another context.
    ///
    /// Advisory only: the capture service re-verifies via fingerprinting
    /// rather than trusting the notification's payload.
    StorageKeyChanged { key: String },

    /// A cart line was materialized into the inbox
    EntryCaptured {
        entry_id: EntryId,
        owner: String,
        source: String,
    },

    /// An inbox entry changed status
    EntryStatusChanged {
        entry_id: EntryId,
        status: EntryStatus,
    },

    /// An entry was permanently deleted
    EntryRemoved { entry_id: EntryId },

    /// The whole inbox was cleared
    InboxCleared,

    /// A scan pass finished
    ScanCompleted { new_entries: usize },
}

/// Event bus for broadcasting events
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus with specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event
    pub fn emit(&self, event: Event) {
        // Ignore send errors (no receivers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
