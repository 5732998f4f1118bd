//! Background services management

use crate::capture::CaptureEngine;
use crate::config::CaptureConfig;
use crate::infrastructure::events::EventBus;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub mod capture_worker;
pub mod storage_watcher;

pub use capture_worker::CaptureWorker;
pub use storage_watcher::StorageWatcher;

/// Container for all background services
pub struct Services {
    /// Notification- and timer-driven capture loop
    pub capture: Arc<CaptureWorker>,
    /// Storage directory watcher feeding change notifications to the bus
    pub watcher: Arc<StorageWatcher>,
}

impl Services {
    /// Create new services container
    pub fn new(
        engine: Arc<CaptureEngine>,
        events: Arc<EventBus>,
        config: CaptureConfig,
        storage_dir: PathBuf,
    ) -> Self {
        info!("Initializing background services");

        let capture = Arc::new(CaptureWorker::new(engine, events.clone(), config));
        let watcher = Arc::new(StorageWatcher::new(storage_dir, events));

        Self { capture, watcher }
    }

    /// Start all services
    pub async fn start_all(&self) -> Result<()> {
        info!("Starting all background services");
        self.watcher.start().await?;
        self.capture.start().await?;
        Ok(())
    }

    /// Stop all services gracefully
    pub async fn stop_all(&self) -> Result<()> {
        info!("Stopping all background services");
        self.capture.stop().await?;
        self.watcher.stop().await?;
        Ok(())
    }
}

/// Trait for background services
#[async_trait::async_trait]
pub trait Service: Send + Sync {
    /// Start the service
    async fn start(&self) -> Result<()>;

    /// Stop the service gracefully
    async fn stop(&self) -> Result<()>;

    /// Check if the service is running
    fn is_running(&self) -> bool;
}
