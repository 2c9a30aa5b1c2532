//! TaskList - the in-memory ordered task container.
//!
//! The list is the user-visible state. Local mutations apply to it
//! immediately; remote snapshots replace it wholesale.

use crate::{
    error::Result,
    filter::{project, TaskCounts, TaskFilter, TaskView},
    task::normalize_title,
    Error, Task, TaskDraft, TaskEdit, TaskId, TaskSnapshot, Timestamp,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An ordered list of tasks with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Build a list from loaded tasks. Later duplicates of an id are dropped.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut seen = HashSet::with_capacity(tasks.len());
        let tasks = tasks
            .into_iter()
            .filter(|t| seen.insert(t.id.clone()))
            .collect();
        Self { tasks }
    }

    /// Get a task by id.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn to_vec(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Create a task from a draft and put it at the front.
    ///
    /// A blank title leaves the list unchanged.
    pub fn add(
        &mut self,
        id: impl Into<TaskId>,
        draft: &TaskDraft,
        owner: &str,
        now: Timestamp,
    ) -> Result<&Task> {
        let task = Task::from_draft(id, draft, owner, now)?;
        self.prepend(task)
    }

    /// Put an already built task at the front.
    pub fn prepend(&mut self, task: Task) -> Result<&Task> {
        if self.contains(&task.id) {
            return Err(Error::DuplicateTask(task.id));
        }
        self.tasks.insert(0, task);
        Ok(&self.tasks[0])
    }

    /// Flip a task's completion flag.
    ///
    /// Returns the value before the flip, or `None` for an unknown id.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        self.get_mut(id).map(Task::toggle)
    }

    /// Overwrite a task's title, due date and notes.
    ///
    /// The title is validated before the lookup, so a blank title is an
    /// error even for an unknown id. Returns `None` for an unknown id.
    pub fn edit(&mut self, id: &str, edit: &TaskEdit) -> Result<Option<&Task>> {
        normalize_title(&edit.title)?;
        match self.get_mut(id) {
            Some(task) => {
                task.apply_edit(edit)?;
                Ok(Some(&*task))
            }
            None => Ok(None),
        }
    }

    /// Set or clear a task's due date.
    pub fn set_due_date(&mut self, id: &str, due_date: Option<Timestamp>) -> Option<&Task> {
        let task = self.get_mut(id)?;
        task.due_date = due_date;
        Some(&*task)
    }

    /// Remove a task. An unknown id leaves the list unchanged.
    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }

    /// Replace the whole list with a snapshot's tasks.
    ///
    /// Local entries missing from the snapshot are dropped, including
    /// optimistic ones the store has not acknowledged yet.
    pub fn apply_snapshot(&mut self, snapshot: TaskSnapshot) {
        *self = Self::from_tasks(snapshot.tasks);
    }

    pub fn counts(&self) -> TaskCounts {
        TaskCounts::of(&self.tasks)
    }

    /// Filtered projection of the current list.
    pub fn view(&self, filter: TaskFilter) -> TaskView<'_> {
        project(&self.tasks, filter)
    }
}

impl From<Vec<Task>> for TaskList {
    fn from(tasks: Vec<Task>) -> Self {
        Self::from_tasks(tasks)
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LOCAL_OWNER;

    fn list_with(titles: &[&str]) -> TaskList {
        let mut list = TaskList::new();
        for (i, title) in titles.iter().enumerate() {
            list.add(format!("id-{i}"), &TaskDraft::new(*title), LOCAL_OWNER, i as i64)
                .unwrap();
        }
        list
    }

    #[test]
    fn add_prepends() {
        let list = list_with(&["first", "second"]);
        let titles: Vec<_> = list.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test]
    fn add_blank_is_noop() {
        let mut list = list_with(&["keep"]);
        let result = list.add("x", &TaskDraft::new("   "), LOCAL_OWNER, 9);

        assert_eq!(result.unwrap_err(), Error::EmptyTitle);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn add_duplicate_id_is_rejected() {
        let mut list = list_with(&["keep"]);
        let result = list.add("id-0", &TaskDraft::new("again"), LOCAL_OWNER, 9);

        assert_eq!(result.unwrap_err(), Error::DuplicateTask("id-0".into()));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn toggle_twice_restores() {
        let mut list = list_with(&["walk"]);

        assert_eq!(list.toggle("id-0"), Some(false));
        assert!(list.get("id-0").unwrap().completed);
        assert_eq!(list.toggle("id-0"), Some(true));
        assert!(!list.get("id-0").unwrap().completed);
    }

    #[test]
    fn toggle_unknown_is_none() {
        let mut list = list_with(&["walk"]);
        let before = list.clone();
        assert_eq!(list.toggle("missing"), None);
        assert_eq!(list, before);
    }

    #[test]
    fn edit_overwrites_and_validates() {
        let mut list = list_with(&["walk"]);

        let edit = TaskEdit::new("run").due(Some(500)).notes(Some("5k".into()));
        let task = list.edit("id-0", &edit).unwrap().unwrap();
        assert_eq!(task.title, "run");
        assert_eq!(task.due_date, Some(500));

        assert_eq!(list.edit("id-0", &TaskEdit::new(" ")), Err(Error::EmptyTitle));
        assert_eq!(list.get("id-0").unwrap().title, "run");
        assert_eq!(list.edit("missing", &TaskEdit::new("x")), Ok(None));
    }

    #[test]
    fn set_due_date() {
        let mut list = list_with(&["walk"]);
        assert_eq!(list.set_due_date("id-0", Some(7)).unwrap().due_date, Some(7));
        assert_eq!(list.set_due_date("id-0", None).unwrap().due_date, None);
        assert!(list.set_due_date("missing", Some(1)).is_none());
    }

    #[test]
    fn remove_unknown_leaves_list() {
        let mut list = list_with(&["a", "b"]);
        let before = list.clone();

        assert!(list.remove("missing").is_none());
        assert_eq!(list, before);

        let removed = list.remove("id-1").unwrap();
        assert_eq!(removed.title, "b");
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn snapshot_replaces_everything() {
        let mut list = list_with(&["optimistic"]);
        list.apply_snapshot(TaskSnapshot::from_documents("u", &[]));
        assert!(list.is_empty());
    }

    #[test]
    fn from_tasks_drops_duplicate_ids() {
        let list = TaskList::from_tasks(vec![
            Task::new("a", "first", LOCAL_OWNER, 1),
            Task::new("a", "second", LOCAL_OWNER, 2),
        ]);
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("a").unwrap().title, "first");
    }

    #[test]
    fn serializes_as_array() {
        let list = list_with(&["a"]);
        let json = serde_json::to_string(&list).unwrap();
        assert!(json.starts_with('['));
    }
}
