//! One-way render sink: core -> presentation
//!
//! After every mutation the core hands the presentation layer a fresh view
//! of the inbox. The interface is one-way; nothing flows back into the
//! core from here.

use crate::domain::{EntryStatus, InboxEntry};
use std::sync::Mutex;
use tracing::info;

/// Snapshot of the inbox handed to the presentation layer
#[derive(Debug, Clone)]
pub struct InboxView {
    /// Entries in display order, newest first
    pub entries: Vec<InboxEntry>,
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
}

impl InboxView {
    pub fn from_entries(entries: Vec<InboxEntry>) -> Self {
        let total = entries.len();
        let pending = entries
            .iter()
            .filter(|e| e.status == EntryStatus::Pending)
            .count();
        let confirmed = entries
            .iter()
            .filter(|e| e.status == EntryStatus::Confirmed)
            .count();
        Self {
            entries,
            total,
            pending,
            confirmed,
        }
    }
}

/// Presentation layer the core redraws after every mutation
pub trait RenderSink: Send + Sync {
    fn render(&self, view: &InboxView);
}

/// Default sink that logs the summary counts
#[derive(Default)]
pub struct LogRender;

impl RenderSink for LogRender {
    fn render(&self, view: &InboxView) {
        info!(
            "Inbox: {} total, {} pending, {} confirmed",
            view.total, view.pending, view.confirmed
        );
    }
}

/// Sink that records every view it is handed, for tests and headless embedders
#[derive(Default)]
pub struct RecordingRender {
    views: Mutex<Vec<InboxView>>,
}

impl RecordingRender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Views rendered so far, oldest first.
    pub fn views(&self) -> Vec<InboxView> {
        self.views.lock().map(|views| views.clone()).unwrap_or_default()
    }

    /// The most recent view, if any render happened.
    pub fn last(&self) -> Option<InboxView> {
        self.views.lock().ok().and_then(|views| views.last().cloned())
    }
}

impl RenderSink for RecordingRender {
    fn render(&self, view: &InboxView) {
        if let Ok(mut views) = self.views.lock() {
            views.push(view.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InboxEntry, ProductSnapshot};

    fn entry(status: EntryStatus) -> InboxEntry {
        let mut entry = InboxEntry::new(
            ProductSnapshot {
                id: "p_1".to_string(),
                name: None,
                price: None,
                image: None,
            },
            None,
            1,
            "cart",
        );
        entry.status = status;
        entry
    }

    #[test]
    fn view_counts_by_status() {
        let view = InboxView::from_entries(vec![
            entry(EntryStatus::Pending),
            entry(EntryStatus::Confirmed),
            entry(EntryStatus::Rejected),
            entry(EntryStatus::Pending),
        ]);
        assert_eq!(view.total, 4);
        assert_eq!(view.pending, 2);
        assert_eq!(view.confirmed, 1);
    }

    #[test]
    fn recording_render_keeps_order() {
        let sink = RecordingRender::new();
        sink.render(&InboxView::from_entries(vec![]));
        sink.render(&InboxView::from_entries(vec![entry(EntryStatus::Pending)]));
        let views = sink.views();
        assert_eq!(views.len(), 2);
        assert_eq!(views[1].total, 1);
        assert_eq!(sink.last().unwrap().total, 1);
    }
}
