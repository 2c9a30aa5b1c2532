//! Filtered views over a task list.
//!
//! Views are recomputed from the list on demand and hold no state of their
//! own.

use crate::Task;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which subset of tasks to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TaskFilter {
    pub const ALL: [TaskFilter; 3] = [TaskFilter::All, TaskFilter::Active, TaskFilter::Completed];

    /// Whether a task belongs in this subset.
    pub fn matches(self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Active => !task.completed,
            TaskFilter::Completed => task.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Active => "active",
            TaskFilter::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised filter name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task filter: {0}")]
pub struct ParseFilterError(String);

impl FromStr for TaskFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TaskFilter::All),
            "active" => Ok(TaskFilter::Active),
            "completed" => Ok(TaskFilter::Completed),
            other => Err(ParseFilterError(other.to_string())),
        }
    }
}

/// Task totals for a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskCounts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

impl TaskCounts {
    pub fn of(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.completed).count();
        Self {
            total: tasks.len(),
            active: tasks.len() - completed,
            completed,
        }
    }

    /// Header text such as "1 task remaining".
    pub fn remaining_label(&self) -> String {
        let noun = if self.active == 1 { "task" } else { "tasks" };
        format!("{} {} remaining", self.active, noun)
    }
}

/// A filtered projection of a task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView<'a> {
    pub filter: TaskFilter,
    /// Matching tasks, in list order
    pub tasks: Vec<&'a Task>,
    /// Counts over the whole list, not just the filtered subset
    pub counts: TaskCounts,
}

impl TaskView<'_> {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Project a list through a filter.
pub fn project(tasks: &[Task], filter: TaskFilter) -> TaskView<'_> {
    TaskView {
        filter,
        tasks: tasks.iter().filter(|t| filter.matches(t)).collect(),
        counts: TaskCounts::of(tasks),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Task> {
        let mut done = Task::new("1", "done", "local", 1);
        done.completed = true;
        vec![done, Task::new("2", "open", "local", 2)]
    }

    #[test]
    fn active_filter_yields_incomplete_only() {
        let tasks = sample();
        let view = project(&tasks, TaskFilter::Active);

        assert_eq!(view.tasks.len(), 1);
        assert_eq!(view.tasks[0].id, "2");
    }

    #[test]
    fn completed_and_all() {
        let tasks = sample();
        assert_eq!(project(&tasks, TaskFilter::Completed).tasks[0].id, "1");
        assert_eq!(project(&tasks, TaskFilter::All).tasks.len(), 2);
    }

    #[test]
    fn counts_cover_whole_list() {
        let tasks = sample();
        let view = project(&tasks, TaskFilter::Completed);
        assert_eq!(
            view.counts,
            TaskCounts {
                total: 2,
                active: 1,
                completed: 1
            }
        );
    }

    #[test]
    fn remaining_label_pluralises() {
        let tasks = sample();
        assert_eq!(TaskCounts::of(&tasks).remaining_label(), "1 task remaining");
        assert_eq!(TaskCounts::of(&[]).remaining_label(), "0 tasks remaining");
    }

    #[test]
    fn parse_and_display() {
        for filter in TaskFilter::ALL {
            assert_eq!(filter.to_string().parse::<TaskFilter>(), Ok(filter));
        }
        assert_eq!(" Active ".parse::<TaskFilter>(), Ok(TaskFilter::Active));
        assert!("done".parse::<TaskFilter>().is_err());
    }

    #[test]
    fn empty_list_view() {
        let view = project(&[], TaskFilter::All);
        assert!(view.is_empty());
        assert_eq!(view.counts, TaskCounts::default());
    }
}
