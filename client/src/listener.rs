//! Remote sync listener.
//!
//! Holds at most one live query, scoped to the signed-in remote owner, and
//! applies every result set it delivers to the shared task list. The last
//! snapshot wins: unacknowledged optimistic entries are dropped when a
//! snapshot that lacks them arrives.

use std::sync::Arc;

use justdo_engine::{tasks_key, TaskSnapshot, Uid};
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::remote::{DocumentStore, SnapshotReceiver, SubscriptionId, TaskQuery};
use crate::state::TaskState;

/// Where the listener is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SyncState {
    /// No subscription held
    Inactive,
    /// Subscription open, no snapshot applied yet
    Subscribing { owner: Uid },
    /// At least one snapshot applied
    Synced { owner: Uid, snapshots: u64 },
}

impl SyncState {
    /// Owner of the open subscription, if any.
    pub fn owner(&self) -> Option<&str> {
        match self {
            SyncState::Inactive => None,
            SyncState::Subscribing { owner } | SyncState::Synced { owner, .. } => Some(owner),
        }
    }
}

#[derive(Debug)]
struct Active {
    owner: Uid,
    subscription: SubscriptionId,
    task: JoinHandle<()>,
}

/// Keeps the task list in step with the owner's remote documents.
pub struct RemoteSyncListener {
    store: Arc<dyn DocumentStore>,
    state: Arc<TaskState>,
    active: Mutex<Option<Active>>,
    status: Arc<watch::Sender<SyncState>>,
}

impl RemoteSyncListener {
    pub fn new(store: Arc<dyn DocumentStore>, state: Arc<TaskState>) -> Self {
        let (status, _) = watch::channel(SyncState::Inactive);
        Self {
            store,
            state,
            active: Mutex::new(None),
            status: Arc::new(status),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SyncState {
        self.status.borrow().clone()
    }

    /// Lifecycle state changes.
    pub fn watch(&self) -> watch::Receiver<SyncState> {
        self.status.subscribe()
    }

    /// Open the live query for `owner`.
    ///
    /// Attaching the owner already being listened to does nothing. Any
    /// other open subscription is torn down first.
    pub async fn attach(&self, owner: &str) -> crate::error::Result<()> {
        let mut active = self.active.lock().await;
        if let Some(current) = active.as_ref() {
            if current.owner == owner && !current.task.is_finished() {
                tracing::debug!(owner = %owner, "Already listening");
                return Ok(());
            }
        }

        if let Some(previous) = active.take() {
            self.teardown(previous).await;
        }

        let subscription = match self.store.subscribe(TaskQuery::owned_by(owner)).await {
            Ok(subscription) => subscription,
            Err(e) => {
                tracing::error!(owner = %owner, "Failed to open subscription: {}", e);
                self.status.send_replace(SyncState::Inactive);
                return Err(e.into());
            }
        };

        self.status.send_replace(SyncState::Subscribing {
            owner: owner.to_string(),
        });
        tracing::info!(owner = %owner, subscription = subscription.id, "Listening for remote tasks");

        let task = tokio::spawn(run(
            owner.to_string(),
            subscription.snapshots,
            self.state.clone(),
            self.status.clone(),
        ));

        *active = Some(Active {
            owner: owner.to_string(),
            subscription: subscription.id,
            task,
        });
        Ok(())
    }

    /// Close the open subscription, if any.
    pub async fn detach(&self) {
        if let Some(previous) = self.active.lock().await.take() {
            self.teardown(previous).await;
        }
    }

    async fn teardown(&self, active: Active) {
        active.task.abort();
        self.store.unsubscribe(active.subscription).await;
        self.status.send_replace(SyncState::Inactive);
        tracing::info!(owner = %active.owner, "Stopped listening");
    }
}

impl std::fmt::Debug for RemoteSyncListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSyncListener")
            .field("status", &*self.status.borrow())
            .finish_non_exhaustive()
    }
}

impl Drop for RemoteSyncListener {
    fn drop(&mut self) {
        if let Some(active) = self.active.get_mut().take() {
            active.task.abort();
        }
    }
}

/// Apply snapshots until the store ends the stream.
async fn run(
    owner: Uid,
    mut snapshots: SnapshotReceiver,
    state: Arc<TaskState>,
    status: Arc<watch::Sender<SyncState>>,
) {
    let storage_key = tasks_key(&owner);
    let mut applied: u64 = 0;

    while let Some(documents) = snapshots.recv().await {
        let snapshot = TaskSnapshot::from_documents(owner.as_str(), &documents);
        for id in &snapshot.skipped {
            tracing::warn!(owner = %owner, task_id = %id, "Skipping remote document without a usable title");
        }

        let snapshot_len = snapshot.len();
        let bound = state
            .mutate_if_bound(&storage_key, |list| list.apply_snapshot(snapshot))
            .await;
        if bound.is_none() {
            tracing::debug!(owner = %owner, "Dropping snapshot for an inactive session");
            continue;
        }

        applied += 1;
        tracing::debug!(owner = %owner, snapshot_len, "Applied remote snapshot");
        status.send_if_modified(|current| {
            if current.owner() != Some(owner.as_str()) {
                return false;
            }
            *current = SyncState::Synced {
                owner: owner.clone(),
                snapshots: applied,
            };
            true
        });
    }

    tracing::error!(owner = %owner, "Remote subscription ended");
    status.send_if_modified(|current| {
        if current.owner() != Some(owner.as_str()) {
            return false;
        }
        *current = SyncState::Inactive;
        true
    });
}
