//! Notification- and timer-driven capture loop
//!
//! Listens for storage-change notifications on the event bus and runs a
//! periodic full scan. Notifications are advisory: the worker always
//! re-verifies through the fingerprint path instead of trusting the
//! notification payload, so a spurious or stale notification costs one
//! no-op scan at worst.

use super::Service;
use crate::capture::CaptureEngine;
use crate::config::CaptureConfig;
use crate::infrastructure::events::{Event, EventBus};
use crate::infrastructure::storage::keys;
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Background capture service
pub struct CaptureWorker {
    engine: Arc<CaptureEngine>,
    events: Arc<EventBus>,
    config: CaptureConfig,
    running: AtomicBool,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl CaptureWorker {
    pub fn new(engine: Arc<CaptureEngine>, events: Arc<EventBus>, config: CaptureConfig) -> Self {
        Self {
            engine,
            events,
            config,
            running: AtomicBool::new(false),
            shutdown: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    /// Whether a change to `key` warrants a capture pass.
    fn is_trigger_key(key: &str) -> bool {
        // The global cart itself, or a sign-in change that re-scopes it
        key == keys::CART || key == keys::CURRENT_USER
    }

    async fn run(
        engine: Arc<CaptureEngine>,
        mut bus: broadcast::Receiver<Event>,
        mut shutdown: watch::Receiver<bool>,
        config: CaptureConfig,
    ) {
        let mut ticker = interval(Duration::from_secs(config.scan_interval_secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    debug!("Capture worker shutting down");
                    break;
                }
                // First tick fires immediately: the initial scan catches
                // activity that happened while no worker was running.
                _ = ticker.tick() => {
                    if let Err(err) = engine.scan_all().await {
                        warn!("Periodic scan failed: {err}");
                    }
                }
                event = bus.recv() => match event {
                    Ok(Event::StorageKeyChanged { key }) if Self::is_trigger_key(&key) => {
                        if !config.auto_capture {
                            debug!("Auto-capture disabled, ignoring change to {key}");
                            continue;
                        }
                        // Settle delay: give the writing context time to
                        // finish updating its companion keys.
                        sleep(Duration::from_millis(config.debounce_ms)).await;
                        if let Err(err) = engine.capture_current_cart().await {
                            warn!("Capture after {key} change failed: {err}");
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Dropped notifications are safe to lose; the next
                        // periodic scan re-verifies everything.
                        debug!("Capture worker lagged, {skipped} events skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    }
}

#[async_trait::async_trait]
impl Service for CaptureWorker {
    async fn start(&self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!(
            "Starting capture worker (auto_capture={}, scan every {}s)",
            self.config.auto_capture, self.config.scan_interval_secs
        );

        let (tx, rx) = watch::channel(false);
        let task = Self::run(
            self.engine.clone(),
            self.events.subscribe(),
            rx,
            self.config.clone(),
        );
        *self.shutdown.lock().await = Some(tx);
        *self.handle.lock().await = Some(tokio::spawn(task));
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        if let Some(tx) = self.shutdown.lock().await.take() {
            let _ = tx.send(true);
        }
        if let Some(handle) = self.handle.lock().await.take() {
            let _ = handle.await;
        }
        info!("Capture worker stopped");
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbox::InboxManager;
    use crate::infrastructure::storage::{MemoryBackend, StorageBackend};
    use crate::render::LogRender;

    struct Harness {
        worker: CaptureWorker,
        storage: Arc<dyn StorageBackend>,
        events: Arc<EventBus>,
        inbox: Arc<InboxManager>,
    }

    fn harness(auto_capture: bool) -> Harness {
        let storage: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
        let events = Arc::new(EventBus::default());
        let inbox = Arc::new(InboxManager::new(
            storage.clone(),
            events.clone(),
            Arc::new(LogRender),
        ));
        let engine = Arc::new(CaptureEngine::new(
            storage.clone(),
            inbox.clone(),
            events.clone(),
        ));
        let config = CaptureConfig {
            auto_capture,
            debounce_ms: 10,
            // Out of the way; only the immediate first tick runs in-test
            scan_interval_secs: 3600,
        };
        Harness {
            worker: CaptureWorker::new(engine, events.clone(), config),
            storage,
            events,
            inbox,
        }
    }

    async fn seed_cart(storage: &dyn StorageBackend) {
        storage
            .set(keys::CURRENT_USER, "u_1")
            .await
            .unwrap();
        storage
            .set(keys::CART, r#"[{"id":"p_1","qty":1}]"#)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn notification_triggers_capture_when_auto_capture_is_on() {
        let h = harness(true);
        h.worker.start().await.unwrap();
        assert!(h.worker.is_running());

        seed_cart(h.storage.as_ref()).await;
        h.events.emit(Event::StorageKeyChanged {
            key: keys::CART.to_string(),
        });

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while h.inbox.entries().await.unwrap().is_empty() {
            assert!(tokio::time::Instant::now() < deadline, "capture never ran");
            sleep(Duration::from_millis(20)).await;
        }
        h.worker.stop().await.unwrap();
    }

    #[tokio::test]
    async fn auto_capture_off_ignores_notifications() {
        let h = harness(false);
        h.worker.start().await.unwrap();
        // Let the immediate first tick scan the still-empty store
        sleep(Duration::from_millis(100)).await;

        seed_cart(h.storage.as_ref()).await;
        h.events.emit(Event::StorageKeyChanged {
            key: keys::CART.to_string(),
        });
        sleep(Duration::from_millis(300)).await;

        assert!(h.inbox.entries().await.unwrap().is_empty());
        h.worker.stop().await.unwrap();
    }

    #[tokio::test]
    async fn unrelated_keys_do_not_trigger_capture() {
        let h = harness(true);
        h.worker.start().await.unwrap();
        // Let the immediate first tick scan the still-empty store
        sleep(Duration::from_millis(100)).await;

        seed_cart(h.storage.as_ref()).await;
        h.events.emit(Event::StorageKeyChanged {
            key: keys::INBOX.to_string(),
        });
        sleep(Duration::from_millis(300)).await;

        assert!(h.inbox.entries().await.unwrap().is_empty());
        h.worker.stop().await.unwrap();
    }

    #[tokio::test]
    async fn start_and_stop_are_idempotent() {
        let h = harness(true);
        h.worker.start().await.unwrap();
        h.worker.start().await.unwrap();
        assert!(h.worker.is_running());
        h.worker.stop().await.unwrap();
        h.worker.stop().await.unwrap();
        assert!(!h.worker.is_running());
    }
}
