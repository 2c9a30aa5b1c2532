//! # JustDo Client
//!
//! The async runtime around [`justdo_engine`]: persistence, authentication
//! and live sync with a remote document store.
//!
//! A [`TaskService`] owns the task list for one [`Session`] at a time. The
//! list is cached on the device under a per-identity key and, for
//! remote-authenticated sessions, kept in step with the owner's documents
//! by a [`RemoteSyncListener`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use justdo_client::{kv::MemoryKvStore, Session, TaskDraft, TaskService};
//!
//! # async fn demo() -> justdo_client::Result<()> {
//! let service = TaskService::open(Arc::new(MemoryKvStore::new()), None, Session::SignedOut).await;
//! service.add(TaskDraft::new("Buy milk")).await?;
//! assert_eq!(service.tasks().await.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod kv;
pub mod listener;
pub mod local_store;
pub mod remote;
pub mod service;
pub mod state;

pub use auth::{AuthError, AuthProvider, LocalAuth, MemoryAuthProvider};
pub use config::Config;
pub use error::{ClientError, Result};
pub use listener::{RemoteSyncListener, SyncState};
pub use local_store::LocalStoreAdapter;
pub use remote::{DocumentStore, MemoryDocumentStore, RemoteError};
pub use service::{ListView, TaskService};

pub use justdo_engine::{Identity, Session, Task, TaskDraft, TaskEdit, TaskFilter};
