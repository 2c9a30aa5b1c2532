//! Remote snapshots and their mapping into tasks.
//!
//! A snapshot is the complete, ordered result set of the owner's live query.
//! Applying one replaces the in-memory list wholesale; there is no merge with
//! optimistic local state.

use crate::{
    error::Result, task::normalize_title, write::Fields, Error, Task, TaskId, Timestamp, Uid,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Reverse;

/// A document as delivered by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDocument {
    /// Store-assigned id
    pub id: TaskId,
    /// Document body
    pub fields: Fields,
}

impl RemoteDocument {
    pub fn new(id: impl Into<TaskId>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// The `uid` field, if present.
    pub fn owner(&self) -> Option<&str> {
        self.fields.get("uid").and_then(Value::as_str)
    }

    /// The `createdAt` field, 0 when missing.
    pub fn created_at(&self) -> Timestamp {
        self.fields
            .get("createdAt")
            .and_then(as_timestamp)
            .unwrap_or(0)
    }

    /// Merge fields into the document body.
    pub fn merge(&mut self, fields: Fields) {
        self.fields.extend(fields);
    }

    /// Map the document field-for-field into a task.
    ///
    /// `completed` defaults to false, `dueDate` and `notes` to absent, and
    /// `uid` to `owner`. The title is trimmed; a missing, non-string or blank
    /// title is an error.
    pub fn to_task(&self, owner: &str) -> Result<Task> {
        let title = self
            .fields
            .get("title")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidDocument {
                id: self.id.clone(),
                reason: "missing title".into(),
            })?;
        let title = normalize_title(title).map_err(|_| Error::InvalidDocument {
            id: self.id.clone(),
            reason: "blank title".into(),
        })?;

        Ok(Task {
            id: self.id.clone(),
            title,
            completed: self
                .fields
                .get("completed")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            due_date: self.fields.get("dueDate").and_then(as_timestamp),
            notes: self
                .fields
                .get("notes")
                .and_then(Value::as_str)
                .map(str::to_string),
            created_at: self.created_at(),
            uid: self.owner().unwrap_or(owner).to_string(),
        })
    }
}

fn as_timestamp(value: &Value) -> Option<Timestamp> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as Timestamp))
}

/// Sort documents the way the owner query orders them: newest first.
///
/// Ties on `createdAt` fall back to id so the order is deterministic.
pub fn order_newest_first(documents: &mut [RemoteDocument]) {
    documents.sort_by(|a, b| {
        Reverse(a.created_at())
            .cmp(&Reverse(b.created_at()))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Tasks mapped from one snapshot event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSnapshot {
    /// Owner the query was scoped to
    pub owner: Uid,
    /// Tasks in delivery order
    pub tasks: Vec<Task>,
    /// Documents that could not be mapped
    pub skipped: Vec<TaskId>,
}

impl TaskSnapshot {
    /// Map a delivered result set, preserving its order.
    pub fn from_documents(owner: impl Into<Uid>, documents: &[RemoteDocument]) -> Self {
        let owner = owner.into();
        let mut tasks = Vec::with_capacity(documents.len());
        let mut skipped = Vec::new();

        for document in documents {
            match document.to_task(&owner) {
                Ok(task) => tasks.push(task),
                Err(_) => skipped.push(document.id.clone()),
            }
        }

        Self {
            owner,
            tasks,
            skipped,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, value: Value) -> RemoteDocument {
        let Value::Object(fields) = value else {
            panic!("document body must be an object");
        };
        RemoteDocument::new(id, fields)
    }

    #[test]
    fn maps_all_fields() {
        let document = doc(
            "d-1",
            json!({
                "uid": "u-1",
                "title": "Write report",
                "completed": true,
                "dueDate": 1706745600000i64,
                "notes": "draft first",
                "createdAt": 1700000000000i64,
            }),
        );

        let task = document.to_task("u-1").unwrap();
        assert_eq!(task.id, "d-1");
        assert_eq!(task.title, "Write report");
        assert!(task.completed);
        assert_eq!(task.due_date, Some(1706745600000));
        assert_eq!(task.notes.as_deref(), Some("draft first"));
        assert_eq!(task.created_at, 1700000000000);
        assert_eq!(task.uid, "u-1");
    }

    #[test]
    fn missing_fields_take_defaults() {
        let task = doc("d-2", json!({"title": "Sparse"})).to_task("u-1").unwrap();

        assert!(!task.completed);
        assert_eq!(task.due_date, None);
        assert_eq!(task.notes, None);
        assert_eq!(task.created_at, 0);
        assert_eq!(task.uid, "u-1");
    }

    #[test]
    fn null_due_date_is_absent() {
        let task = doc("d-3", json!({"title": "x", "dueDate": null, "completed": null}))
            .to_task("u")
            .unwrap();
        assert_eq!(task.due_date, None);
        assert!(!task.completed);
    }

    #[test]
    fn float_timestamps_are_accepted() {
        let task = doc("d-4", json!({"title": "x", "createdAt": 1500.0}))
            .to_task("u")
            .unwrap();
        assert_eq!(task.created_at, 1500);
    }

    #[test]
    fn missing_title_is_invalid() {
        let result = doc("d-5", json!({"completed": false})).to_task("u");
        assert!(matches!(result, Err(Error::InvalidDocument { id, .. }) if id == "d-5"));
    }

    #[test]
    fn blank_title_is_invalid() {
        let result = doc("d-6", json!({"title": "   ", "createdAt": 1})).to_task("u");
        assert_eq!(
            result,
            Err(Error::InvalidDocument {
                id: "d-6".into(),
                reason: "blank title".into(),
            })
        );

        let task = doc("d-7", json!({"title": "  Buy milk "})).to_task("u").unwrap();
        assert_eq!(task.title, "Buy milk");
    }

    #[test]
    fn snapshot_preserves_order_and_skips_invalid() {
        let documents = vec![
            doc("b", json!({"title": "second", "createdAt": 2})),
            doc("bad", json!({"title": 7})),
            doc("a", json!({"title": "first", "createdAt": 1})),
        ];

        let snapshot = TaskSnapshot::from_documents("u", &documents);
        let ids: Vec<_> = snapshot.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(snapshot.skipped, vec!["bad".to_string()]);
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn empty_snapshot() {
        let snapshot = TaskSnapshot::from_documents("u", &[]);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn ordering_newest_first_with_id_tiebreak() {
        let mut documents = vec![
            doc("x", json!({"title": "old", "createdAt": 1})),
            doc("z", json!({"title": "tie", "createdAt": 5})),
            doc("y", json!({"title": "tie", "createdAt": 5})),
        ];
        order_newest_first(&mut documents);

        let ids: Vec<_> = documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["y", "z", "x"]);
    }

    #[test]
    fn merge_overwrites_fields() {
        let mut document = doc("d", json!({"title": "a", "completed": false}));
        document.merge(doc("d", json!({"completed": true})).fields);
        assert_eq!(document.fields["completed"], true);
        assert_eq!(document.fields["title"], "a");
    }
}
