//! On-device key-value storage.
//!
//! Holds the signed-in username and the per-identity task caches. Values are
//! opaque strings.

mod file;
mod memory;

pub use file::FileKvStore;
pub use memory::MemoryKvStore;

use crate::error::Result;
use async_trait::async_trait;

/// Persistent string storage keyed by name.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key was never set or was removed.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
