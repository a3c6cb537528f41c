//! # Filesystem Backend
//!
//! [`StorageBackend`] over a local directory tree. Works unchanged on a
//! cloud-synced folder, which is the deployment the on-disk layout was
//! shaped for.
//!
//! Writes go through a temporary file in the destination directory followed
//! by an atomic rename, so readers never observe a partial file.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::storage::StorageBackend;

/// Storage backend rooted at a local directory
pub struct FilesystemBackend {
    root: PathBuf,
}

impl FilesystemBackend {
    /// Create a backend rooted at `root`
    ///
    /// The directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a backend-relative path
    ///
    /// Layout paths are generated from validated hex strings, so they never
    /// contain `..` or absolute components.
    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

fn missing(path: &str) -> Error {
    Error::StorageMissing {
        path: path.to_string(),
    }
}

fn failure(context: &str, err: impl std::fmt::Display) -> Error {
    Error::StorageFailure(format!("{context}: {err}"))
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn write_file(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let target = self.resolve(path);
        let dir = target.parent().unwrap_or(Path::new(".")).to_path_buf();

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| failure(path, e))?;

        // Temp file in the destination directory, then atomic rename.
        let mut temp = NamedTempFile::new_in(&dir).map_err(|e| failure(path, e))?;
        temp.write_all(bytes).map_err(|e| failure(path, e))?;
        temp.as_file_mut().sync_all().map_err(|e| failure(path, e))?;
        temp.persist(&target).map_err(|e| failure(path, e))?;

        Ok(())
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        match tokio::fs::read(self.resolve(path)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(missing(path)),
            Err(e) => Err(failure(path, e)),
        }
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(self.resolve(dir)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(missing(dir)),
            Err(e) => return Err(failure(dir, e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| failure(dir, e))? {
            let file_type = entry.file_type().await.map_err(|e| failure(dir, e))?;
            if !file_type.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    async fn create_directory(&self, path: &str) -> Result<()> {
        tokio::fs::create_dir_all(self.resolve(path))
            .await
            .map_err(|e| failure(path, e))
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        match tokio::fs::try_exists(self.resolve(path)).await {
            Ok(exists) => Ok(exists),
            Err(e) => Err(failure(path, e)),
        }
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        match tokio::fs::remove_file(self.resolve(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(failure(path, e)),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
