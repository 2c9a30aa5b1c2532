//! Local store adapter: the per-identity task cache.
//!
//! The cache bootstraps the list when an identity is selected and keeps a
//! copy of every change. It is best effort. A missing, unreadable or corrupt
//! entry loads as an empty list, and failed writes are logged and dropped.

use std::sync::Arc;

use justdo_engine::{cache, Task};

use crate::kv::KeyValueStore;

/// Reads and writes task lists in the key-value store.
#[derive(Clone)]
pub struct LocalStoreAdapter {
    kv: Arc<dyn KeyValueStore>,
}

impl LocalStoreAdapter {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load the cached list for `storage_key`, empty on any failure.
    pub async fn load(&self, storage_key: &str) -> Vec<Task> {
        let blob = match self.kv.get(storage_key).await {
            Ok(Some(blob)) => blob,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(storage_key = %storage_key, "Failed to read task cache: {}", e);
                return Vec::new();
            }
        };

        match cache::decode(&blob) {
            Ok(tasks) => {
                tracing::debug!(storage_key = %storage_key, count = tasks.len(), "Loaded task cache");
                tasks
            }
            Err(e) => {
                tracing::warn!(storage_key = %storage_key, "Discarding corrupt task cache: {}", e);
                Vec::new()
            }
        }
    }

    /// Persist the full list under `storage_key`. Failures are swallowed.
    pub async fn save(&self, storage_key: &str, tasks: &[Task]) {
        let blob = match cache::encode(tasks) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(storage_key = %storage_key, "Failed to encode task cache: {}", e);
                return;
            }
        };

        if let Err(e) = self.kv.set(storage_key, &blob).await {
            tracing::warn!(storage_key = %storage_key, "Failed to write task cache: {}", e);
        }
    }
}

impl std::fmt::Debug for LocalStoreAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStoreAdapter").finish_non_exhaustive()
    }
}
