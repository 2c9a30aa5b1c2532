//! Remote document store interface.
//!
//! The store holds one document per task in the `tasks` collection. Clients
//! write documents directly and watch a live query scoped to their uid,
//! ordered newest first.

mod memory;

pub use memory::MemoryDocumentStore;

use async_trait::async_trait;
use justdo_engine::{Fields, RemoteDocument, RemoteWrite, TaskId, Uid, TASKS_COLLECTION};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Identifier of an open subscription.
pub type SubscriptionId = u64;

/// Receiver of full result sets for a live query.
pub type SnapshotReceiver = mpsc::UnboundedReceiver<Vec<RemoteDocument>>;

/// Remote store errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("remote store unavailable: {0}")]
    Unavailable(String),

    #[error("document not found: {0}")]
    NotFound(TaskId),

    #[error("subscription closed")]
    SubscriptionClosed,
}

/// Sort order of a live query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryOrder {
    CreatedAtDesc,
}

/// A filtered, ordered query over one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    pub collection: String,
    /// Only documents whose `uid` equals this owner
    pub owner: Uid,
    pub order: QueryOrder,
}

impl TaskQuery {
    /// The owner's tasks, newest first.
    pub fn owned_by(owner: impl Into<Uid>) -> Self {
        Self {
            collection: TASKS_COLLECTION.to_string(),
            owner: owner.into(),
            order: QueryOrder::CreatedAtDesc,
        }
    }

    /// Whether a document belongs in this query's results.
    pub fn matches(&self, collection: &str, document: &RemoteDocument) -> bool {
        self.collection == collection && document.owner() == Some(self.owner.as_str())
    }
}

/// An open live query.
///
/// The receiver yields the complete result set each time it changes,
/// starting with the current one. It ends when the store drops the
/// subscription.
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub snapshots: SnapshotReceiver,
}

/// A document database with live queries.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document and return its store-assigned id.
    async fn add_document(&self, collection: &str, fields: Fields) -> Result<TaskId, RemoteError>;

    /// Merge fields into an existing document.
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), RemoteError>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), RemoteError>;

    /// Open a live query.
    async fn subscribe(&self, query: TaskQuery) -> Result<Subscription, RemoteError>;

    /// Close a live query. Unknown ids are ignored.
    async fn unsubscribe(&self, id: SubscriptionId);

    /// Send a write description to the matching document call.
    async fn apply(&self, collection: &str, write: RemoteWrite) -> Result<(), RemoteError> {
        match write {
            RemoteWrite::Add { fields } => self.add_document(collection, fields).await.map(drop),
            RemoteWrite::Update { id, fields } => {
                self.update_document(collection, &id, fields).await
            }
            RemoteWrite::Delete { id } => self.delete_document(collection, &id).await,
        }
    }
}
