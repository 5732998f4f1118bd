//! Storefront capture core
//!
//! Headless core for the storefront back-office inbox: it watches the
//! shared key-value storage the storefront pages write their carts into,
//! deduplicates per-owner cart states by fingerprint, and materializes
//! changed carts into an ordered, durable inbox of pending-review
//! entries with confirm/reject/undo transitions.
//!
//! The presentation layer, the account pages, and the demo HTTP servers
//! are external collaborators; this crate only reads their collections
//! and owns the inbox.

pub mod capture;
pub mod config;
pub mod domain;
pub mod inbox;
pub mod infrastructure;
pub mod render;
pub mod services;

use crate::capture::CaptureEngine;
use crate::config::AppConfig;
use crate::inbox::InboxManager;
use crate::infrastructure::events::{Event, EventBus};
use crate::infrastructure::storage::{JsonFileBackend, StorageBackend};
use crate::render::{LogRender, RenderSink};
use crate::services::Services;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// The main context for all core operations
pub struct Core {
    /// Application configuration
    config: Arc<RwLock<AppConfig>>,

    /// Durable key-value storage shared with the storefront pages
    pub storage: Arc<dyn StorageBackend>,

    /// Event bus for state changes
    pub events: Arc<EventBus>,

    /// Inbox and status transitions
    pub inbox: Arc<InboxManager>,

    /// Capture engine (manual scans)
    pub capture: Arc<CaptureEngine>,

    /// Background services
    services: Services,
}

impl Core {
    /// Initialize a new Core instance with the default data directory
    pub async fn new() -> Result<Self> {
        let data_dir = crate::config::default_data_dir()?;
        Self::new_with_config(data_dir).await
    }

    /// Initialize a new Core instance rooted at `data_dir`, rendering
    /// through the default logging sink
    pub async fn new_with_config(data_dir: PathBuf) -> Result<Self> {
        Self::new_with_render(data_dir, Arc::new(LogRender)).await
    }

    /// Initialize a new Core instance with a custom render sink
    pub async fn new_with_render(
        data_dir: PathBuf,
        render: Arc<dyn RenderSink>,
    ) -> Result<Self> {
        let config = AppConfig::load_from(&data_dir)?;
        config.ensure_directories()?;
        info!("Initializing core at {:?}", config.data_dir);

        let storage_dir = config.storage_dir();
        let storage: Arc<dyn StorageBackend> =
            Arc::new(JsonFileBackend::new(storage_dir.clone()).await?);
        let events = Arc::new(EventBus::default());

        let inbox = Arc::new(InboxManager::new(
            storage.clone(),
            events.clone(),
            render,
        ));
        let capture = Arc::new(CaptureEngine::new(
            storage.clone(),
            inbox.clone(),
            events.clone(),
        ));
        let services = Services::new(
            capture.clone(),
            events.clone(),
            config.capture.clone(),
            storage_dir,
        );

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            storage,
            events,
            inbox,
            capture,
            services,
        })
    }

    /// Start background services (storage watcher + capture loop)
    pub async fn start(&self) -> Result<()> {
        self.services.start_all().await?;
        self.events.emit(Event::CoreStarted);
        Ok(())
    }

    /// Stop background services. No further scans run after this returns.
    pub async fn shutdown(&self) -> Result<()> {
        self.events.emit(Event::CoreShutdown);
        self.services.stop_all().await
    }

    /// Snapshot of the current configuration
    pub async fn config(&self) -> AppConfig {
        self.config.read().await.clone()
    }
}
