//! # In-Memory Backend
//!
//! [`StorageBackend`] over a `HashMap`, used by tests and by hosts that
//! want a throwaway volume. Writes replace the whole value for a path, so
//! atomicity is trivial.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::storage::StorageBackend;

/// Storage backend over in-memory maps
#[derive(Default)]
pub struct MemoryBackend {
    files: RwLock<HashMap<String, Vec<u8>>>,
    dirs: RwLock<HashSet<String>>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files (test helper)
    pub fn file_count(&self) -> usize {
        self.files.read().len()
    }

    /// Overwrite a file without any bookkeeping (test helper for simulating
    /// on-disk tampering)
    pub fn tamper(&self, path: &str, bytes: Vec<u8>) {
        self.files.write().insert(path.to_string(), bytes);
    }
}

fn missing(path: &str) -> Error {
    Error::StorageMissing {
        path: path.to_string(),
    }
}

/// Whether `path` names a regular file directly under `dir`
fn direct_child(dir: &str, path: &str) -> Option<String> {
    let rest = path.strip_prefix(dir)?.strip_prefix('/')?;
    if rest.is_empty() || rest.contains('/') {
        return None;
    }
    Some(rest.to_string())
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn write_file(&self, path: &str, bytes: &[u8]) -> Result<()> {
        self.files.write().insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        self.files.read().get(path).cloned().ok_or_else(|| missing(path))
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>> {
        let files = self.files.read();
        let names: Vec<String> = files
            .keys()
            .filter_map(|path| direct_child(dir, path))
            .collect();

        if names.is_empty() && !self.dirs.read().contains(dir) {
            return Err(missing(dir));
        }
        Ok(names)
    }

    async fn create_directory(&self, path: &str) -> Result<()> {
        self.dirs.write().insert(path.to_string());
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        if self.files.read().contains_key(path) || self.dirs.read().contains(path) {
            return Ok(true);
        }
        // A directory also exists once something was written beneath it.
        let prefix = format!("{path}/");
        Ok(self.files.read().keys().any(|k| k.starts_with(&prefix)))
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        self.files.write().remove(path);
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
