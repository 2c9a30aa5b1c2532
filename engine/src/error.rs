//! Error types for the JustDo engine.

use crate::TaskId;
use thiserror::Error;

/// All possible errors from the JustDo engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Validation errors
    #[error("task title must not be empty")]
    EmptyTitle,

    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("task already exists: {0}")]
    DuplicateTask(TaskId),

    // Decoding errors
    #[error("invalid task cache: {0}")]
    InvalidCache(String),

    #[error("invalid remote document '{id}': {reason}")]
    InvalidDocument { id: TaskId, reason: String },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
