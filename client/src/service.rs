//! Task service: the entry point for everything that reads or changes tasks.
//!
//! Every mutation is applied to the in-memory list first and persisted to
//! the local cache. When the session is remote-authenticated the matching
//! document write is then spawned on the runtime and never awaited; a
//! failure is logged and dropped.

use std::sync::Arc;

use justdo_engine::{
    Error, RemoteWrite, Session, Task, TaskCounts, TaskDraft, TaskEdit, TaskFilter, TaskId,
    Timestamp, TASKS_COLLECTION,
};
use serde::Serialize;
use tokio::sync::watch;

use crate::clock::{new_task_id, Clock, SystemClock};
use crate::error::Result;
use crate::kv::KeyValueStore;
use crate::listener::{RemoteSyncListener, SyncState};
use crate::local_store::LocalStoreAdapter;
use crate::remote::DocumentStore;
use crate::state::TaskState;

/// An owned, filtered copy of the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListView {
    pub filter: TaskFilter,
    pub tasks: Vec<Task>,
    /// Counts over the whole list
    pub counts: TaskCounts,
}

/// Owns the task list for one session at a time.
pub struct TaskService {
    session: Session,
    state: Arc<TaskState>,
    remote: Option<Arc<dyn DocumentStore>>,
    listener: Option<RemoteSyncListener>,
    clock: Arc<dyn Clock>,
}

impl TaskService {
    /// A service without a remote store, bound to the signed-out session.
    ///
    /// Nothing is loaded until [`set_session`](Self::set_session) is called.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let session = Session::SignedOut;
        let state = TaskState::new(LocalStoreAdapter::new(kv), session.storage_key());
        Self {
            session,
            state,
            remote: None,
            listener: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Mirror remote-authenticated sessions to `store`.
    pub fn with_remote(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.listener = Some(RemoteSyncListener::new(store.clone(), self.state.clone()));
        self.remote = Some(store);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build a service and select `session` in one step.
    pub async fn open(
        kv: Arc<dyn KeyValueStore>,
        remote: Option<Arc<dyn DocumentStore>>,
        session: Session,
    ) -> Self {
        let mut service = Self::new(kv);
        if let Some(store) = remote {
            service = service.with_remote(store);
        }
        service.set_session(session).await;
        service
    }

    /// Switch to `session`.
    ///
    /// Rebinds the list to the session's cache entry, loads it, and opens or
    /// closes the remote subscription to match. A subscription that cannot
    /// be opened is logged; the list then stays on its cached copy.
    pub async fn set_session(&mut self, session: Session) {
        let storage_key = session.storage_key();
        tracing::info!(storage_key = %storage_key, signed_in = session.is_signed_in(), "Selecting session");

        // Close the old subscription before the list changes hands
        if session.sync_owner() != self.session.sync_owner() {
            if let Some(listener) = &self.listener {
                listener.detach().await;
            }
        }

        self.state.switch(&storage_key).await;

        match (session.sync_owner(), &self.listener) {
            (Some(owner), Some(listener)) => {
                if let Err(e) = listener.attach(owner).await {
                    tracing::warn!(owner = %owner, "Remote sync unavailable: {}", e);
                }
            }
            (Some(owner), None) => {
                tracing::warn!(owner = %owner, "No remote store configured; tasks stay on this device");
            }
            (None, _) => {}
        }

        self.session = session;
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Add a task built from `draft` at the front of the list.
    pub async fn add(&self, draft: TaskDraft) -> Result<Task> {
        let now = self.clock.now_ms();
        let id = new_task_id(now);
        let owner = self.session.task_owner().to_string();

        let task = self
            .state
            .mutate(|list| list.add(id, &draft, &owner, now).cloned())
            .await?;

        tracing::debug!(task_id = %task.id, "Task added");
        self.mirror(RemoteWrite::add(&task));
        Ok(task)
    }

    /// Flip a task's completion flag and return the new value.
    pub async fn toggle(&self, id: &str) -> Result<bool> {
        let previous = self
            .state
            .mutate(|list| list.toggle(id).ok_or_else(|| not_found(id)))
            .await?;

        tracing::debug!(task_id = %id, completed = !previous, "Task toggled");
        self.mirror(RemoteWrite::set_completed(id, !previous));
        Ok(!previous)
    }

    /// Overwrite a task's title, due date and notes.
    pub async fn edit(&self, id: &str, edit: TaskEdit) -> Result<Task> {
        let task = self
            .state
            .mutate(|list| list.edit(id, &edit)?.cloned().ok_or_else(|| not_found(id)))
            .await?;

        tracing::debug!(task_id = %id, "Task edited");
        self.mirror(RemoteWrite::edit(&task));
        Ok(task)
    }

    /// Set or clear a task's due date.
    pub async fn set_due_date(&self, id: &str, due_date: Option<Timestamp>) -> Result<Task> {
        let task = self
            .state
            .mutate(|list| {
                list.set_due_date(id, due_date)
                    .cloned()
                    .ok_or_else(|| not_found(id))
            })
            .await?;

        tracing::debug!(task_id = %id, due_date = ?due_date, "Task due date set");
        self.mirror(RemoteWrite::set_due_date(id, due_date));
        Ok(task)
    }

    /// Remove a task and return it.
    pub async fn delete(&self, id: &str) -> Result<Task> {
        let task = self
            .state
            .mutate(|list| list.remove(id).ok_or_else(|| not_found(id)))
            .await?;

        tracing::debug!(task_id = %id, "Task deleted");
        self.mirror(RemoteWrite::delete(id));
        Ok(task)
    }

    /// Current tasks, newest first.
    pub async fn tasks(&self) -> Vec<Task> {
        self.state.tasks().await
    }

    pub async fn get(&self, id: &str) -> Option<Task> {
        self.state.read(|list| list.get(id).cloned()).await
    }

    /// The tasks matching `filter`, with counts over the whole list.
    pub async fn view(&self, filter: TaskFilter) -> ListView {
        self.state
            .read(|list| {
                let view = list.view(filter);
                ListView {
                    filter,
                    tasks: view.tasks.into_iter().cloned().collect(),
                    counts: view.counts,
                }
            })
            .await
    }

    pub async fn counts(&self) -> TaskCounts {
        self.state.read(|list| list.counts()).await
    }

    /// State of the remote subscription.
    pub fn sync_state(&self) -> SyncState {
        self.listener
            .as_ref()
            .map_or(SyncState::Inactive, RemoteSyncListener::state)
    }

    /// Remote subscription state changes, if a remote store is configured.
    pub fn watch_sync(&self) -> Option<watch::Receiver<SyncState>> {
        self.listener.as_ref().map(RemoteSyncListener::watch)
    }

    /// Revision counter bumped on every change to the list.
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.state.watch()
    }

    /// Send a document write without waiting for it.
    fn mirror(&self, write: RemoteWrite) {
        let Some(owner) = self.session.sync_owner() else {
            return;
        };
        let Some(store) = self.remote.clone() else {
            return;
        };

        let owner = owner.to_string();
        tokio::spawn(async move {
            let kind = write.kind();
            let task_id = write.task_id().cloned();
            match store.apply(TASKS_COLLECTION, write).await {
                Ok(()) => {
                    tracing::trace!(owner = %owner, kind, task_id = ?task_id, "Remote write sent")
                }
                Err(e) => {
                    tracing::debug!(owner = %owner, kind, task_id = ?task_id, "Remote write failed: {}", e)
                }
            }
        });
    }
}

impl std::fmt::Debug for TaskService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskService")
            .field("session", &self.session)
            .field("remote", &self.remote.is_some())
            .field("listener", &self.listener)
            .finish_non_exhaustive()
    }
}

fn not_found(id: &str) -> Error {
    Error::TaskNotFound(TaskId::from(id))
}
