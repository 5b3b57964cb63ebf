//! Storage collaborators for backup containers
//!
//! The retention core never performs I/O; everything it needs from the
//! outside world goes through the [`ObjectStore`] trait. Listing yields
//! names plus optional creation timestamps; deletion reports per-object
//! outcomes so one failure never aborts the rest of a delete set.

pub mod dir;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

// Re-exports
pub use dir::DirStore;
pub use memory::MemoryStore;

/// One blob in a container listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    /// Blob name, unique within its container
    pub name: String,
    /// Creation time as reported by the store, when available
    pub created: Option<DateTime<Utc>>,
}

/// Storage operation failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("object not found: {container}/{name}")]
    ObjectNotFound { container: String, name: String },

    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// A named-blob container service
///
/// Implementations enumerate and delete objects one at a time; the engine
/// has no batching or concurrency requirement.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Enumerate every object in a container
    async fn list_objects(&self, container: &str) -> Result<Vec<ObjectMeta>>;

    /// Delete a single object by name
    async fn delete_object(&self, container: &str, name: &str) -> Result<()>;
}
