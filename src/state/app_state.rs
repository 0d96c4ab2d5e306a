//! Application state shared with every consumer

use chrono::Utc;
use std::sync::Arc;

use crate::config::{Config, DEFAULT_STORAGE_KEY};
use crate::events::EventBus;
use crate::persistence::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
use crate::seed;
use crate::services::PlatformService;

/// Shared application state; events are reached through
/// [`PlatformService::events`].
#[derive(Clone)]
pub struct AppState {
    pub platform: Arc<PlatformService>,
}

impl AppState {
    pub fn new(platform: Arc<PlatformService>) -> Self {
        Self { platform }
    }

    /// Build the state from configuration, backed by snapshot files
    pub fn from_config(config: &Config) -> Self {
        let snapshots: Arc<dyn SnapshotStore> =
            Arc::new(FileSnapshotStore::new(config.state_dir.clone()));
        Self::with_snapshots(
            snapshots,
            &config.storage_key,
            config.event_channel_capacity,
        )
    }

    /// Ephemeral state starting from seed data
    pub fn in_memory() -> Self {
        Self::with_snapshots(Arc::new(MemorySnapshotStore::new()), DEFAULT_STORAGE_KEY, 100)
    }

    pub fn with_snapshots(
        snapshots: Arc<dyn SnapshotStore>,
        storage_key: &str,
        event_capacity: usize,
    ) -> Self {
        let platform = Arc::new(PlatformService::open(
            snapshots,
            storage_key,
            seed::default_state(Utc::now()),
            EventBus::new(event_capacity),
        ));
        Self::new(platform)
    }
}
