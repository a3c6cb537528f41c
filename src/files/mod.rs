//! # File Service
//!
//! The public façade over the volume engine: open a volume from a secret,
//! add and delete named files, read them back, inspect the raw event log.
//!
//! Every call re-derives the keys from the secret and re-materializes the
//! file map; the core holds no state between calls and no lock across any
//! await point. Caches belong to layers above.
//!
//! ## Call Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         add_file / get_file                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  add_file(secret, name, bytes)                                         │
//! │    derive keys ─► fresh per-file key ─► encrypt ─► hash ciphertext     │
//! │      ─► write blob ─► wrap key ─► sign payload ─► write event          │
//! │                                                                         │
//! │  get_file(secret, name)                                                │
//! │    derive keys ─► list + verify events ─► fold into file map           │
//! │      ─► look up name ─► read blob ─► unwrap key ─► decrypt             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::blobs;
use crate::channel::ChannelStore;
use crate::crypto::{derive_keys, Secret, VolumeKeys};
use crate::encoding::ContentHash;
use crate::error::{Error, Result};
use crate::events::engine::{build_create, build_delete};
use crate::events::{EventId, SignedEvent};
use crate::storage::{FilesystemBackend, StorageBackend, StorageConfig};
use crate::volume::{materialize, FileEntry, Materialized};

/// Metadata for one live file
#[derive(Debug, Clone, Serialize)]
pub struct FileMetadata {
    /// UTF-8 file name
    #[serde(rename = "fileName")]
    pub file_name: String,
    /// Content address of the encrypted body
    #[serde(rename = "contentAddress")]
    pub content_address: ContentHash,
    /// Id of the event that created this entry
    #[serde(rename = "eventId")]
    pub event_id: EventId,
    /// Caller-supplied MIME type; echoed from `add_file`, never persisted
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl FileMetadata {
    fn from_entry(name: &str, entry: &FileEntry) -> Self {
        Self {
            file_name: name.to_string(),
            content_address: entry.payload.hash,
            event_id: entry.event_id,
            mime_type: None,
        }
    }
}

/// A volume as seen when opening it
#[derive(Debug, Clone, Serialize)]
pub struct VolumeInfo {
    /// Hex rendering of the volume's public key
    #[serde(rename = "volumeId")]
    pub volume_id: String,
    /// Live files sorted by name
    pub files: Vec<FileMetadata>,
}

/// The NearBytes file service
///
/// Thin and stateless: owns nothing but the storage backend handle. Safe to
/// share across tasks and to call concurrently; competing writes resolve
/// deterministically in the fold.
pub struct NearBytes {
    backend: Arc<dyn StorageBackend>,
}

impl NearBytes {
    /// Create a service over an existing backend
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Create a service over a filesystem backend rooted per the config
    pub fn with_filesystem(config: &StorageConfig) -> Self {
        Self::new(Arc::new(FilesystemBackend::new(&config.storage_root)))
    }

    /// Derive keys and materialize the current state in one step
    async fn open_volume(&self, secret: &str) -> Result<(VolumeKeys, Materialized)> {
        let secret = Secret::new(secret)?;
        let keys = derive_keys(&secret)?;
        let channel = ChannelStore::new(self.backend.as_ref());
        let state = materialize(&channel, &keys.keypair.volume_id()).await?;
        Ok((keys, state))
    }

    /// Open the volume named by a secret
    ///
    /// Creates nothing: opening an unseen secret yields a valid volume id
    /// and an empty file list.
    pub async fn open(&self, secret: &str) -> Result<VolumeInfo> {
        let (keys, state) = self.open_volume(secret).await?;
        let volume_id = keys.keypair.volume_id();
        info!(
            volume = %volume_id,
            files = state.files.len(),
            rejected = state.rejected,
            "volume opened"
        );
        Ok(VolumeInfo {
            volume_id: volume_id.as_str().to_string(),
            files: state
                .files
                .iter()
                .map(|(name, entry)| FileMetadata::from_entry(name, entry))
                .collect(),
        })
    }

    /// List the live files of a volume, sorted by name
    pub async fn list_files(&self, secret: &str) -> Result<Vec<FileMetadata>> {
        let (_, state) = self.open_volume(secret).await?;
        Ok(state
            .files
            .iter()
            .map(|(name, entry)| FileMetadata::from_entry(name, entry))
            .collect())
    }

    /// Encrypt and store a file under a name
    ///
    /// Concurrent adds of the same name both succeed; materialization picks
    /// the create with the smallest event id. `mime_type` is echoed in the
    /// returned metadata for hosts but is not part of the stored payload.
    pub async fn add_file(
        &self,
        secret: &str,
        file_name: &str,
        bytes: &[u8],
        mime_type: Option<&str>,
    ) -> Result<FileMetadata> {
        let secret = Secret::new(secret)?;
        if file_name.is_empty() {
            return Err(Error::InvalidFileName);
        }
        let keys = derive_keys(&secret)?;
        let channel = ChannelStore::new(self.backend.as_ref());

        let outcome = build_create(&keys, &channel, file_name, bytes).await?;
        info!(
            volume = %keys.keypair.volume_id(),
            file = %file_name,
            event = %outcome.event_id,
            "file added"
        );
        Ok(FileMetadata {
            file_name: file_name.to_string(),
            content_address: outcome.content_address,
            event_id: outcome.event_id,
            mime_type: mime_type.map(str::to_string),
        })
    }

    /// Write a delete tombstone for a name
    ///
    /// Idempotent in effect: deleting an absent name is legal and leaves
    /// the materialized map unchanged.
    pub async fn delete_file(&self, secret: &str, file_name: &str) -> Result<()> {
        let secret = Secret::new(secret)?;
        if file_name.is_empty() {
            return Err(Error::InvalidFileName);
        }
        let keys = derive_keys(&secret)?;
        let channel = ChannelStore::new(self.backend.as_ref());

        let event_id = build_delete(&keys, &channel, file_name).await?;
        info!(
            volume = %keys.keypair.volume_id(),
            file = %file_name,
            event = %event_id,
            "file deleted"
        );
        Ok(())
    }

    /// Read and decrypt a file by name
    ///
    /// ## Errors
    ///
    /// [`Error::FileAbsent`] when the name is not in the materialized state;
    /// [`Error::BlobMissing`], [`Error::CorruptBlob`] or
    /// [`Error::CryptoFailure`] when the body cannot be recovered.
    pub async fn get_file(&self, secret: &str, file_name: &str) -> Result<Vec<u8>> {
        let (keys, state) = self.open_volume(secret).await?;
        let entry = state.files.get(file_name).ok_or_else(|| Error::FileAbsent {
            name: file_name.to_string(),
        })?;

        let channel = ChannelStore::new(self.backend.as_ref());
        blobs::open_body(&keys.master, &entry.payload, &channel).await
    }

    /// Read and decrypt a file by blob content address
    ///
    /// Picks the first match in name order when several live files share a
    /// body; yields [`Error::FileAbsent`] when none does.
    pub async fn get_file_by_hash(&self, secret: &str, hash: &str) -> Result<Vec<u8>> {
        let wanted = ContentHash::from_hex(hash)?;
        let (keys, state) = self.open_volume(secret).await?;

        let entry = state
            .files
            .values()
            .find(|entry| entry.payload.hash == wanted)
            .ok_or_else(|| Error::FileAbsent {
                name: wanted.to_hex(),
            })?;

        let channel = ChannelStore::new(self.backend.as_ref());
        blobs::open_body(&keys.master, &entry.payload, &channel).await
    }

    /// Return every parseable signed event of the volume (for debugging)
    ///
    /// Events that fail to parse are skipped; signature validity is not
    /// re-checked here, this is the raw log.
    pub async fn get_event_log(&self, secret: &str) -> Result<Vec<SignedEvent>> {
        let secret = Secret::new(secret)?;
        let keys = derive_keys(&secret)?;
        let volume = keys.keypair.volume_id();
        let channel = ChannelStore::new(self.backend.as_ref());

        let mut events = Vec::new();
        for event_id in channel.list_event_ids(&volume).await? {
            match channel.read_event(&volume, &event_id).await {
                Ok(event) => events.push(event),
                Err(Error::BadEvent { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(events)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    const SECRET: &str = "LeedsUnited";

    fn service() -> (Arc<MemoryBackend>, NearBytes) {
        let backend = Arc::new(MemoryBackend::new());
        let service = NearBytes::new(backend.clone());
        (backend, service)
    }

    #[tokio::test]
    async fn test_open_empty_volume() {
        let (_, service) = service();

        let info = service.open(SECRET).await.unwrap();
        assert!(info.files.is_empty());
        assert_eq!(info.volume_id.len(), crate::crypto::VOLUME_ID_HEX_LEN);

        // Same secret, same volume id.
        let again = service.open(SECRET).await.unwrap();
        assert_eq!(info.volume_id, again.volume_id);
    }

    #[tokio::test]
    async fn test_short_secret_rejected() {
        let (_, service) = service();

        assert!(matches!(
            service.open("1234567").await,
            Err(Error::InvalidSecret)
        ));
        assert!(service.open("12345678").await.is_ok());
    }

    #[tokio::test]
    async fn test_add_get_round_trip() {
        let (_, service) = service();

        service
            .add_file(SECRET, "hello.txt", b"hello world", None)
            .await
            .unwrap();
        assert_eq!(
            service.get_file(SECRET, "hello.txt").await.unwrap(),
            b"hello world"
        );
    }

    #[tokio::test]
    async fn test_empty_file_round_trips() {
        let (_, service) = service();

        service.add_file(SECRET, "empty", b"", None).await.unwrap();
        assert_eq!(service.get_file(SECRET, "empty").await.unwrap(), b"");
    }

    #[tokio::test]
    async fn test_large_binary_round_trips() {
        let (_, service) = service();

        // 1 MiB covering all 256 byte values.
        let data: Vec<u8> = (0..1024 * 1024).map(|i| (i % 256) as u8).collect();
        service.add_file(SECRET, "big.bin", &data, None).await.unwrap();
        assert_eq!(service.get_file(SECRET, "big.bin").await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_non_ascii_names_round_trip() {
        let (_, service) = service();

        service
            .add_file(SECRET, "фото-日本語.bin", b"bytes", None)
            .await
            .unwrap();
        assert_eq!(
            service.get_file(SECRET, "фото-日本語.bin").await.unwrap(),
            b"bytes"
        );
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let (_, service) = service();

        service.add_file(SECRET, "b.txt", b"yo", None).await.unwrap();
        service.add_file(SECRET, "a.txt", b"hi", None).await.unwrap();

        let names: Vec<String> = service
            .list_files(SECRET)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.file_name)
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn test_duplicate_add_dedups_blob() {
        let (backend, service) = service();

        service.add_file(SECRET, "a.txt", b"same", None).await.unwrap();
        let before = backend.file_count();
        service.add_file(SECRET, "a.txt", b"same", None).await.unwrap();

        // Two events, but fresh per-file keys mean two distinct blobs; the
        // log grows by one event and one blob.
        assert_eq!(backend.file_count(), before + 2);
        let log = service.get_event_log(SECRET).await.unwrap();
        assert_eq!(log.len(), 2);

        // Still a single materialized file.
        assert_eq!(service.list_files(SECRET).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_then_recreate_stays_deleted() {
        let (_, service) = service();

        service.add_file(SECRET, "a.txt", b"hi", None).await.unwrap();
        service.delete_file(SECRET, "a.txt").await.unwrap();
        service.add_file(SECRET, "a.txt", b"hi2", None).await.unwrap();

        assert!(matches!(
            service.get_file(SECRET, "a.txt").await,
            Err(Error::FileAbsent { .. })
        ));
        assert!(service.list_files(SECRET).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_absent_name_is_legal() {
        let (_, service) = service();

        service.add_file(SECRET, "keep.txt", b"hi", None).await.unwrap();
        service.delete_file(SECRET, "ghost.txt").await.unwrap();

        let names: Vec<String> = service
            .list_files(SECRET)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.file_name)
            .collect();
        assert_eq!(names, vec!["keep.txt"]);
    }

    #[tokio::test]
    async fn test_get_absent_file() {
        let (_, service) = service();

        assert!(matches!(
            service.get_file(SECRET, "nope.txt").await,
            Err(Error::FileAbsent { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_file_by_hash() {
        let (_, service) = service();

        let meta = service
            .add_file(SECRET, "a.txt", b"payload", None)
            .await
            .unwrap();

        let bytes = service
            .get_file_by_hash(SECRET, &meta.content_address.to_hex())
            .await
            .unwrap();
        assert_eq!(bytes, b"payload");

        let absent = crate::crypto::hash(b"not stored").to_hex();
        assert!(matches!(
            service.get_file_by_hash(SECRET, &absent).await,
            Err(Error::FileAbsent { .. })
        ));
        assert!(matches!(
            service.get_file_by_hash(SECRET, "zz").await,
            Err(Error::InvalidHash(_))
        ));
    }

    #[tokio::test]
    async fn test_mime_type_echoed_not_persisted() {
        let (_, service) = service();

        let meta = service
            .add_file(SECRET, "p.jpg", b"jpeg", Some("image/jpeg"))
            .await
            .unwrap();
        assert_eq!(meta.mime_type.as_deref(), Some("image/jpeg"));

        let listed = &service.list_files(SECRET).await.unwrap()[0];
        assert_eq!(listed.mime_type, None);
    }

    #[tokio::test]
    async fn test_two_services_share_one_backend() {
        let (backend, service_a) = service();
        let service_b = NearBytes::new(backend);

        service_a.add_file(SECRET, "a.txt", b"a", None).await.unwrap();
        service_b.add_file(SECRET, "b.txt", b"b", None).await.unwrap();

        let names: Vec<String> = service_a
            .list_files(SECRET)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.file_name)
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn test_tampered_blob_surfaces_corruption() {
        let (backend, service) = service();

        let meta = service
            .add_file(SECRET, "a.txt", b"payload", None)
            .await
            .unwrap();

        let path = crate::storage::layout::blob_path(&meta.content_address);
        let mut bytes = backend.read_file(&path).await.unwrap();
        bytes[0] ^= 0x01;
        backend.tamper(&path, bytes);

        // The rehash check fires before any decryption is attempted.
        assert!(matches!(
            service.get_file(SECRET, "a.txt").await,
            Err(Error::CorruptBlob { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_blob_surfaces_blob_missing() {
        let (backend, service) = service();

        let meta = service
            .add_file(SECRET, "a.txt", b"payload", None)
            .await
            .unwrap();
        backend
            .delete_file(&crate::storage::layout::blob_path(&meta.content_address))
            .await
            .unwrap();

        assert!(matches!(
            service.get_file(SECRET, "a.txt").await,
            Err(Error::BlobMissing { .. })
        ));
        // A dangling event can still be overridden by a later delete.
        service.delete_file(SECRET, "a.txt").await.unwrap();
        assert!(service.list_files(SECRET).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filesystem_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let service =
            NearBytes::with_filesystem(&StorageConfig::new(dir.path()));

        service
            .add_file(SECRET, "disk.txt", b"on disk", None)
            .await
            .unwrap();
        assert_eq!(
            service.get_file(SECRET, "disk.txt").await.unwrap(),
            b"on disk"
        );

        // A second service over the same root sees the same volume.
        let other = NearBytes::with_filesystem(&StorageConfig::new(dir.path()));
        let names: Vec<String> = other
            .list_files(SECRET)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.file_name)
            .collect();
        assert_eq!(names, vec!["disk.txt"]);
    }

    #[tokio::test]
    async fn test_event_log_exposes_raw_events() {
        let (_, service) = service();

        service.add_file(SECRET, "a.txt", b"a", None).await.unwrap();
        service.delete_file(SECRET, "a.txt").await.unwrap();

        let log = service.get_event_log(SECRET).await.unwrap();
        assert_eq!(log.len(), 2);
    }
}
