//! Remote write descriptions.
//!
//! Local mutations are applied to the in-memory list first. When the session
//! syncs remotely, each mutation also yields a [`RemoteWrite`] describing the
//! document change to mirror. The runtime sends it without waiting for the
//! outcome.

use crate::{Task, TaskId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Field map of a remote document or partial update.
pub type Fields = Map<String, Value>;

/// A document change to mirror to the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RemoteWrite {
    /// Create a document; the store assigns its id
    Add { fields: Fields },
    /// Merge fields into an existing document
    Update { id: TaskId, fields: Fields },
    /// Remove a document
    Delete { id: TaskId },
}

impl RemoteWrite {
    /// Document body for a newly created task.
    pub fn add(task: &Task) -> Self {
        RemoteWrite::Add {
            fields: fields(json!({
                "uid": task.uid,
                "title": task.title,
                "completed": task.completed,
                "dueDate": task.due_date,
                "notes": task.notes,
                "createdAt": task.created_at,
            })),
        }
    }

    /// Set the completion flag to an explicit value.
    pub fn set_completed(id: impl Into<TaskId>, completed: bool) -> Self {
        RemoteWrite::Update {
            id: id.into(),
            fields: fields(json!({ "completed": completed })),
        }
    }

    /// Mirror an edit of title, due date and notes.
    pub fn edit(task: &Task) -> Self {
        RemoteWrite::Update {
            id: task.id.clone(),
            fields: fields(json!({
                "title": task.title,
                "dueDate": task.due_date,
                "notes": task.notes,
            })),
        }
    }

    /// Set or clear the due date.
    pub fn set_due_date(id: impl Into<TaskId>, due_date: Option<Timestamp>) -> Self {
        RemoteWrite::Update {
            id: id.into(),
            fields: fields(json!({ "dueDate": due_date })),
        }
    }

    pub fn delete(id: impl Into<TaskId>) -> Self {
        RemoteWrite::Delete { id: id.into() }
    }

    /// Target document, if already known.
    pub fn task_id(&self) -> Option<&TaskId> {
        match self {
            RemoteWrite::Add { .. } => None,
            RemoteWrite::Update { id, .. } | RemoteWrite::Delete { id } => Some(id),
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteWrite::Add { .. } => "add",
            RemoteWrite::Update { .. } => "update",
            RemoteWrite::Delete { .. } => "delete",
        }
    }
}

fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}
