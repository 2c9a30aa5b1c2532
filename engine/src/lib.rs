//! # JustDo Engine
//!
//! The task list model and the rules for reconciling it with a remote
//! document store.
//!
//! This crate holds the pure logic of a local-first to-do list. It has no
//! knowledge of storage, networking or clocks; callers pass in timestamps and
//! id suffixes, so the same inputs always produce the same list.
//!
//! ## Core Concepts
//!
//! ### Tasks
//!
//! A [`Task`] has an id, a trimmed non-empty title, a completion flag, an
//! optional due date and notes, a creation time and an owner uid. Tasks
//! created without a remote identity are owned by [`LOCAL_OWNER`].
//!
//! ### Sessions
//!
//! A [`Session`] is either signed out or signed in with an [`Identity`]. It
//! decides the cache key (`tasks:{uid}` or `tasks:guest`) and whether the
//! list is mirrored to the remote store.
//!
//! ### The list
//!
//! [`TaskList`] keeps tasks newest first. Mutations are applied immediately.
//! When the session syncs, each mutation has a matching [`RemoteWrite`] the
//! runtime sends without waiting for it.
//!
//! ### Snapshots
//!
//! A [`TaskSnapshot`] is the owner's full remote result set. Applying one
//! replaces the list wholesale; the last snapshot wins.
//!
//! ## Quick Start
//!
//! ```rust
//! use justdo_engine::{cache, Session, TaskDraft, TaskFilter, TaskList};
//!
//! let session = Session::SignedOut;
//! let mut list = TaskList::new();
//!
//! list.add("1706745600000-a1", &TaskDraft::new("Buy milk"), session.task_owner(), 1706745600000)
//!     .unwrap();
//! list.toggle("1706745600000-a1");
//!
//! let view = list.view(TaskFilter::Completed);
//! assert_eq!(view.tasks.len(), 1);
//!
//! let blob = cache::encode(list.as_slice()).unwrap();
//! assert_eq!(session.storage_key(), "tasks:guest");
//! assert_eq!(cache::decode(&blob).unwrap(), list.to_vec());
//! ```

pub mod cache;
pub mod error;
pub mod filter;
pub mod identity;
pub mod list;
pub mod snapshot;
pub mod task;
pub mod write;

// Re-export main types at crate root
pub use error::Error;
pub use filter::{project, ParseFilterError, TaskCounts, TaskFilter, TaskView};
pub use identity::{tasks_key, AuthKind, Identity, Session, GUEST_KEY, TASKS_KEY_PREFIX};
pub use list::TaskList;
pub use snapshot::{order_newest_first, RemoteDocument, TaskSnapshot};
pub use task::{local_task_id, Task, TaskDraft, TaskEdit, LOCAL_OWNER};
pub use write::{Fields, RemoteWrite};

/// Type aliases for clarity
pub type TaskId = String;
pub type Uid = String;
/// Milliseconds since the Unix epoch
pub type Timestamp = i64;

/// Collection holding task documents in the remote store.
pub const TASKS_COLLECTION: &str = "tasks";
