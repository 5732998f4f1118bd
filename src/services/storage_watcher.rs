//! Storage directory watcher
//!
//! Stands in for the browser's cross-tab `storage` event: the file-backed
//! store keeps one file per key, so a file change in the storage
//! directory maps straight back to a key name. The watcher only reports
//! *which* key changed; consumers re-verify actual content through the
//! fingerprint path.

use super::Service;
use crate::infrastructure::events::{Event, EventBus};
use anyhow::{Context, Result};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, trace};

/// Watches the storage directory and emits `StorageKeyChanged` events
pub struct StorageWatcher {
    dir: PathBuf,
    events: Arc<EventBus>,
    running: AtomicBool,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl StorageWatcher {
    pub fn new(dir: PathBuf, events: Arc<EventBus>) -> Self {
        Self {
            dir,
            events,
            running: AtomicBool::new(false),
            watcher: Mutex::new(None),
        }
    }

    fn emit_for(events: &EventBus, event: &notify::Event) {
        if !(event.kind.is_create() || event.kind.is_modify() || event.kind.is_remove()) {
            return;
        }
        for path in &event.paths {
            let Some(key) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            trace!("Storage key changed on disk: {key}");
            events.emit(Event::StorageKeyChanged {
                key: key.to_string(),
            });
        }
    }
}

#[async_trait::async_trait]
impl Service for StorageWatcher {
    async fn start(&self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!("Watching storage directory {:?}", self.dir);

        let events = self.events.clone();
        let mut watcher = notify::recommended_watcher(
            move |result: std::result::Result<notify::Event, notify::Error>| match result {
                Ok(event) => Self::emit_for(&events, &event),
                Err(err) => debug!("Storage watch error: {err}"),
            },
        )
        .context("creating storage watcher")?;
        watcher
            .watch(&self.dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("watching {:?}", self.dir))?;

        *self.watcher.lock().await = Some(watcher);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        // Dropping the watcher stops the underlying notification thread
        self.watcher.lock().await.take();
        info!("Storage watcher stopped");
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
