//! Shared in-memory task list.
//!
//! The list is written by the service's mutation handlers and by the sync
//! listener's snapshot task. Every change is persisted to the local cache
//! under the current storage key and announced on a revision channel.

use std::sync::Arc;

use justdo_engine::{Task, TaskList};
use tokio::sync::{watch, Mutex};

use crate::local_store::LocalStoreAdapter;

#[derive(Debug)]
struct Inner {
    storage_key: String,
    list: TaskList,
}

/// The authoritative in-memory list plus its cache binding.
#[derive(Debug)]
pub struct TaskState {
    inner: Mutex<Inner>,
    local: LocalStoreAdapter,
    revision: watch::Sender<u64>,
}

impl TaskState {
    /// Create an empty list bound to `storage_key`. Nothing is loaded yet.
    pub fn new(local: LocalStoreAdapter, storage_key: impl Into<String>) -> Arc<Self> {
        let (revision, _) = watch::channel(0);
        Arc::new(Self {
            inner: Mutex::new(Inner {
                storage_key: storage_key.into(),
                list: TaskList::new(),
            }),
            local,
            revision,
        })
    }

    /// Rebind to `storage_key` and replace the list with its cached copy.
    pub async fn switch(&self, storage_key: &str) {
        let cached = self.local.load(storage_key).await;
        let mut inner = self.inner.lock().await;
        inner.storage_key = storage_key.to_string();
        inner.list = TaskList::from_tasks(cached);
        tracing::debug!(storage_key = %storage_key, count = inner.list.len(), "Switched task list");
        self.bump();
    }

    /// Apply a mutation; on success persist the list and bump the revision.
    pub async fn mutate<R>(
        &self,
        f: impl FnOnce(&mut TaskList) -> justdo_engine::error::Result<R>,
    ) -> justdo_engine::error::Result<R> {
        let mut inner = self.inner.lock().await;
        let result = f(&mut inner.list)?;
        self.local.save(&inner.storage_key, inner.list.as_slice()).await;
        self.bump();
        Ok(result)
    }

    /// Like [`mutate`](Self::mutate), but only while still bound to
    /// `storage_key`. Returns `None` if the binding has moved on.
    pub async fn mutate_if_bound<R>(
        &self,
        storage_key: &str,
        f: impl FnOnce(&mut TaskList) -> R,
    ) -> Option<R> {
        let mut inner = self.inner.lock().await;
        if inner.storage_key != storage_key {
            return None;
        }
        let result = f(&mut inner.list);
        self.local.save(&inner.storage_key, inner.list.as_slice()).await;
        self.bump();
        Some(result)
    }

    /// Read the list without changing it.
    pub async fn read<R>(&self, f: impl FnOnce(&TaskList) -> R) -> R {
        let inner = self.inner.lock().await;
        f(&inner.list)
    }

    /// Copy of the current tasks.
    pub async fn tasks(&self) -> Vec<Task> {
        self.read(TaskList::to_vec).await
    }

    pub async fn storage_key(&self) -> String {
        self.inner.lock().await.storage_key.clone()
    }

    /// Revision counter, bumped on every change to the list.
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;
    use justdo_engine::{Error, TaskDraft, TaskSnapshot, LOCAL_OWNER};

    fn state() -> Arc<TaskState> {
        let local = LocalStoreAdapter::new(Arc::new(MemoryKvStore::new()));
        TaskState::new(local, "tasks:guest")
    }

    #[tokio::test]
    async fn mutate_persists_and_bumps() {
        let state = state();
        let mut rx = state.watch();

        state
            .mutate(|list| {
                list.add("1-a", &TaskDraft::new("Buy milk"), LOCAL_OWNER, 1)
                    .map(|_| ())
            })
            .await
            .unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);

        // Rebinding to the same key reloads the persisted copy
        state.switch("tasks:guest").await;
        assert_eq!(state.tasks().await[0].title, "Buy milk");
    }

    #[tokio::test]
    async fn failed_mutation_changes_nothing() {
        let state = state();
        let rx = state.watch();

        let result = state
            .mutate(|list| list.add("1-a", &TaskDraft::new(" "), LOCAL_OWNER, 1).map(|_| ()))
            .await;

        assert_eq!(result, Err(Error::EmptyTitle));
        assert!(!rx.has_changed().unwrap());
        assert!(state.tasks().await.is_empty());
    }

    #[tokio::test]
    async fn stale_binding_is_ignored() {
        let state = state();
        state.switch("tasks:alice").await;

        let applied = state
            .mutate_if_bound("tasks:guest", |list| {
                list.apply_snapshot(TaskSnapshot::from_documents("u", &[]))
            })
            .await;
        assert!(applied.is_none());
        assert_eq!(state.storage_key().await, "tasks:alice");
    }
}
