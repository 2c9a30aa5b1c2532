//! In-memory document store with live queries.
//!
//! Tracks documents per collection and the open subscriptions, and pushes a
//! fresh result set to every subscriber whose query a write touches.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use justdo_engine::{order_newest_first, Fields, RemoteDocument, TaskId};
use tokio::sync::{mpsc, Mutex};

use super::{DocumentStore, RemoteError, Subscription, SubscriptionId, TaskQuery};

type SnapshotSender = mpsc::UnboundedSender<Vec<RemoteDocument>>;

/// A single open live query.
#[derive(Debug)]
struct Subscriber {
    query: TaskQuery,
    sender: SnapshotSender,
}

/// Document store kept in memory.
///
/// Thread-safe and can be shared across tasks via `Arc`. Writes are
/// serialized, so each subscriber sees result sets in write order.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    /// Documents by collection, then by id
    collections: DashMap<String, HashMap<TaskId, Fields>>,
    /// Open subscriptions by id
    subscribers: DashMap<SubscriptionId, Subscriber>,
    next_subscription: AtomicU64,
    unavailable: AtomicBool,
    write_lock: Mutex<()>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make writes and new subscriptions fail until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Insert a document under a known id, as another device would.
    pub async fn insert_document(&self, collection: &str, id: impl Into<TaskId>, fields: Fields) {
        let _guard = self.write_lock.lock().await;
        let document = RemoteDocument::new(id, fields);
        let owner = document.owner().map(str::to_string);
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(document.id, document.fields);
        self.notify(collection, &[owner]);
    }

    /// All documents in a collection, newest first.
    pub fn documents(&self, collection: &str) -> Vec<RemoteDocument> {
        let mut documents: Vec<_> = self
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| RemoteDocument::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default();
        order_newest_first(&mut documents);
        documents
    }

    /// Number of open subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Drop every subscription, ending their snapshot streams.
    pub fn close_all_subscriptions(&self) {
        self.subscribers.clear();
        tracing::info!("Closed all subscriptions");
    }

    fn check_available(&self) -> Result<(), RemoteError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("store is offline".into()));
        }
        Ok(())
    }

    /// Current result set of a query.
    fn results(&self, query: &TaskQuery) -> Vec<RemoteDocument> {
        self.documents(&query.collection)
            .into_iter()
            .filter(|d| query.matches(&query.collection, d))
            .collect()
    }

    /// Push fresh results to subscribers watching any of `owners`.
    fn notify(&self, collection: &str, owners: &[Option<String>]) {
        let mut closed = Vec::new();
        let mut sent_count = 0;

        for entry in self.subscribers.iter() {
            let subscriber = entry.value();
            let query = &subscriber.query;
            let affected = owners
                .iter()
                .flatten()
                .any(|owner| *owner == query.owner);
            if query.collection != collection || !affected {
                continue;
            }

            if subscriber.sender.send(self.results(query)).is_ok() {
                sent_count += 1;
            } else {
                closed.push(*entry.key());
            }
        }

        for id in closed {
            self.subscribers.remove(&id);
            tracing::debug!(subscription = id, "Dropped closed subscription");
        }

        tracing::trace!(collection = %collection, recipients = sent_count, "Pushed snapshots");
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn add_document(&self, collection: &str, fields: Fields) -> Result<TaskId, RemoteError> {
        self.check_available()?;
        let _guard = self.write_lock.lock().await;

        let id = uuid::Uuid::new_v4().simple().to_string();
        let owner = fields
            .get("uid")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);

        tracing::debug!(collection = %collection, id = %id, "Document added");
        self.notify(collection, &[owner]);
        Ok(id)
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), RemoteError> {
        self.check_available()?;
        let _guard = self.write_lock.lock().await;

        let (before, after) = {
            let mut docs = self
                .collections
                .get_mut(collection)
                .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;
            let existing = docs
                .get_mut(id)
                .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;

            let mut document = RemoteDocument::new(id, std::mem::take(existing));
            let before = document.owner().map(str::to_string);
            document.merge(fields);
            let after = document.owner().map(str::to_string);
            *existing = document.fields;
            (before, after)
        };

        tracing::debug!(collection = %collection, id = %id, "Document updated");
        self.notify(collection, &[before, after]);
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), RemoteError> {
        self.check_available()?;
        let _guard = self.write_lock.lock().await;

        let removed = self
            .collections
            .get_mut(collection)
            .and_then(|mut docs| docs.remove(id));

        if let Some(fields) = removed {
            let owner = RemoteDocument::new(id, fields).owner().map(str::to_string);
            tracing::debug!(collection = %collection, id = %id, "Document deleted");
            self.notify(collection, &[owner]);
        }
        Ok(())
    }

    async fn subscribe(&self, query: TaskQuery) -> Result<Subscription, RemoteError> {
        self.check_available()?;
        let _guard = self.write_lock.lock().await;

        let id = self.next_subscription.fetch_add(1, Ordering::SeqCst) + 1;
        let (sender, snapshots) = mpsc::unbounded_channel();

        sender
            .send(self.results(&query))
            .map_err(|_| RemoteError::SubscriptionClosed)?;

        tracing::info!(subscription = id, owner = %query.owner, "Subscription opened");
        self.subscribers.insert(id, Subscriber { query, sender });

        Ok(Subscription { id, snapshots })
    }

    async fn unsubscribe(&self, id: SubscriptionId) {
        if self.subscribers.remove(&id).is_some() {
            tracing::info!(subscription = id, "Subscription closed");
        }
    }
}
