//! # Storage Module
//!
//! Byte-oriented storage behind the [`StorageBackend`] trait.
//!
//! ## Storage Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         STORAGE SYSTEM                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  StorageBackend Trait                                           │   │
//! │  │  ────────────────────                                            │   │
//! │  │                                                                 │   │
//! │  │  • write_file(path, bytes)   - Atomic write                     │   │
//! │  │  • read_file(path)           - Read whole file                  │   │
//! │  │  • list_files(dir)           - Regular files only               │   │
//! │  │  • create_directory(path)    - Idempotent mkdir -p              │   │
//! │  │  • exists(path)              - File or directory                │   │
//! │  │  • delete_file(path)         - Idempotent delete                │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Implementations:                                                      │
//! │  ────────────────                                                       │
//! │                                                                         │
//! │  ┌───────────────────────┐  ┌───────────────────────┐                  │
//! │  │  FilesystemBackend    │  │  MemoryBackend        │                  │
//! │  │                       │  │                       │                  │
//! │  │ - tokio::fs           │  │ - HashMap behind a    │                  │
//! │  │ - temp file + rename  │  │   parking_lot RwLock  │                  │
//! │  │   for atomic writes   │  │ - for tests           │                  │
//! │  └───────────────────────┘  └───────────────────────┘                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Paths are opaque relative strings with `/` separators, produced by
//! [`layout`]. The backend is the only shared resource in the system; it
//! must provide per-path atomic writes and nothing more. No cross-path
//! transactions are assumed and the core performs no locking.

mod filesystem;
pub mod layout;
mod memory;

pub use filesystem::FilesystemBackend;
pub use memory::MemoryBackend;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;

/// Storage configuration recognized by embedding hosts
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Backend root directory; all layout paths are relative to it
    pub storage_root: PathBuf,
    /// Caller-imposed upload ceiling in bytes; carried for hosts, not
    /// enforced by the core
    pub max_upload_bytes: Option<u64>,
}

impl StorageConfig {
    /// Configuration rooted at the given directory
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
            max_upload_bytes: None,
        }
    }
}

/// Byte-oriented storage over opaque relative paths
///
/// ## Guarantees required from any implementation
///
/// - `write_file` is atomic from a reader's perspective (write-then-rename
///   or equivalent); a partial write must never be observable as a short or
///   garbage file.
/// - `list_files` returns only regular files, in unspecified order.
/// - `read_file` on a missing path fails with [`crate::Error::StorageMissing`];
///   other failures raise [`crate::Error::StorageFailure`].
/// - `delete_file` is idempotent: deleting a missing path succeeds.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Atomically write `bytes` at `path`, replacing any existing file
    async fn write_file(&self, path: &str, bytes: &[u8]) -> Result<()>;

    /// Read the whole file at `path`
    async fn read_file(&self, path: &str) -> Result<Vec<u8>>;

    /// List the names of regular files directly under `dir`
    async fn list_files(&self, dir: &str) -> Result<Vec<String>>;

    /// Create a directory (and missing parents); idempotent
    async fn create_directory(&self, path: &str) -> Result<()>;

    /// Whether a file or directory exists at `path`
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Delete the file at `path`; deleting a missing path succeeds
    async fn delete_file(&self, path: &str) -> Result<()>;
}
