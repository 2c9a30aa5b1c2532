//! Task records and the inputs used to create and edit them.

use crate::{error::Result, Error, TaskId, Timestamp, Uid};
use serde::{Deserialize, Serialize};

/// Owner recorded on tasks created without a remote identity.
pub const LOCAL_OWNER: &str = "local";

fn default_owner() -> Uid {
    LOCAL_OWNER.to_string()
}

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique within the owner's list
    pub id: TaskId,
    /// Trimmed, never empty
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Due date in milliseconds since epoch
    #[serde(default)]
    pub due_date: Option<Timestamp>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Creation time in milliseconds since epoch, the remote sort key
    #[serde(default)]
    pub created_at: Timestamp,
    /// Owning identity, `"local"` for local-only tasks
    #[serde(default = "default_owner")]
    pub uid: Uid,
}

impl Task {
    /// Create an incomplete task. The title is stored as given.
    pub fn new(
        id: impl Into<TaskId>,
        title: impl Into<String>,
        uid: impl Into<Uid>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
            due_date: None,
            notes: None,
            created_at,
            uid: uid.into(),
        }
    }

    /// Build a task from a draft, validating the title.
    pub fn from_draft(
        id: impl Into<TaskId>,
        draft: &TaskDraft,
        uid: impl Into<Uid>,
        created_at: Timestamp,
    ) -> Result<Self> {
        let title = normalize_title(&draft.title)?;
        Ok(Self {
            due_date: draft.due_date,
            notes: normalize_notes(draft.notes.as_deref()),
            ..Self::new(id, title, uid, created_at)
        })
    }

    pub fn with_due_date(mut self, due_date: Timestamp) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Whether the task still needs doing.
    pub fn is_active(&self) -> bool {
        !self.completed
    }

    /// Flip the completion flag, returning the previous value.
    pub fn toggle(&mut self) -> bool {
        let previous = self.completed;
        self.completed = !previous;
        previous
    }

    /// Overwrite title, due date and notes from a validated edit.
    pub fn apply_edit(&mut self, edit: &TaskEdit) -> Result<()> {
        let title = normalize_title(&edit.title)?;
        self.title = title;
        self.due_date = edit.due_date;
        self.notes = normalize_notes(edit.notes.as_deref());
        Ok(())
    }
}

/// Input for adding a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub due_date: Option<Timestamp>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn due(mut self, due_date: Timestamp) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Input for editing a task. All three fields are overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEdit {
    pub title: String,
    #[serde(default)]
    pub due_date: Option<Timestamp>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TaskEdit {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn due(mut self, due_date: Option<Timestamp>) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }
}

/// Trim a title, rejecting blank input.
pub fn normalize_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

fn normalize_notes(notes: Option<&str>) -> Option<String> {
    notes
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// Client-side id for a task created before the store assigns one.
pub fn local_task_id(now: Timestamp, suffix: &str) -> TaskId {
    format!("{now}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_title_is_trimmed() {
        let draft = TaskDraft::new("  Buy milk \n");
        let task = Task::from_draft("t-1", &draft, LOCAL_OWNER, 1000).unwrap();

        assert_eq!(task.title, "Buy milk");
        assert!(!task.completed);
        assert_eq!(task.uid, "local");
        assert_eq!(task.created_at, 1000);
    }

    #[test]
    fn blank_draft_is_rejected() {
        let draft = TaskDraft::new(" \t ");
        let result = Task::from_draft("t-1", &draft, LOCAL_OWNER, 1000);
        assert_eq!(result, Err(Error::EmptyTitle));
    }

    #[test]
    fn blank_notes_become_absent() {
        let draft = TaskDraft::new("Call mum").notes("   ");
        let task = Task::from_draft("t-1", &draft, LOCAL_OWNER, 1000).unwrap();
        assert_eq!(task.notes, None);
    }

    #[test]
    fn toggle_returns_previous() {
        let mut task = Task::new("t-1", "Walk", LOCAL_OWNER, 0);
        assert!(!task.toggle());
        assert!(task.completed);
        assert!(task.toggle());
        assert!(task.is_active());
    }

    #[test]
    fn edit_overwrites_fields() {
        let mut task = Task::new("t-1", "Walk", LOCAL_OWNER, 0)
            .with_due_date(5000)
            .with_notes("park");

        task.apply_edit(&TaskEdit::new(" Run ")).unwrap();

        assert_eq!(task.title, "Run");
        assert_eq!(task.due_date, None);
        assert_eq!(task.notes, None);
    }

    #[test]
    fn blank_edit_leaves_task_untouched() {
        let mut task = Task::new("t-1", "Walk", LOCAL_OWNER, 0).with_due_date(5000);
        let before = task.clone();

        assert_eq!(task.apply_edit(&TaskEdit::new("  ")), Err(Error::EmptyTitle));
        assert_eq!(task, before);
    }

    #[test]
    fn local_id_format() {
        assert_eq!(local_task_id(1706745600000, "k3j2h1"), "1706745600000-k3j2h1");
    }

    #[test]
    fn serialization_format() {
        let task = Task::new("t-1", "Walk", "u-1", 42).with_due_date(99);
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("dueDate"));
        assert!(json.contains("createdAt"));
    }

    #[test]
    fn legacy_blob_fields_default() {
        // Older caches stored only id, title, completed and dueDate.
        let json = r#"{"id":"1-a","title":"Old","completed":true,"dueDate":null}"#;
        let task: Task = serde_json::from_str(json).unwrap();

        assert_eq!(task.created_at, 0);
        assert_eq!(task.uid, LOCAL_OWNER);
        assert_eq!(task.notes, None);
        assert!(task.completed);
    }
}
