//! # Channel Store
//!
//! Persistence for events and blobs, wrapping a [`StorageBackend`] with the
//! path layout. Everything here is content-addressed: event files are named
//! by the hash of their bytes, blob files by the hash of theirs, so writes
//! are idempotent and a byte-level mismatch at an existing address is a
//! conflict rather than an overwrite.

use tracing::{debug, warn};

use crate::crypto::VolumeId;
use crate::encoding::{ContentHash, HASH_HEX_LEN};
use crate::error::{Error, Result};
use crate::events::{EventId, SignedEvent};
use crate::storage::{layout, StorageBackend};

/// Event and blob persistence for one backend
///
/// Stateless; holds only a borrow of the backend for the duration of a
/// call, the way every core service takes its dependencies.
pub struct ChannelStore<'a> {
    backend: &'a dyn StorageBackend,
}

impl<'a> ChannelStore<'a> {
    /// Create a store over the given backend
    pub fn new(backend: &'a dyn StorageBackend) -> Self {
        Self { backend }
    }

    /// Serialize and persist a signed event under its volume directory
    ///
    /// The volume directory is created lazily on the first event write.
    ///
    /// ## Returns
    ///
    /// The event id (hash of the serialized envelope), which is also the
    /// file stem on disk.
    ///
    /// ## Errors
    ///
    /// [`Error::StorageConflict`] when a different byte string is already
    /// stored at the event's address. Re-writing identical bytes is a no-op.
    pub async fn write_event(&self, volume: &VolumeId, event: &SignedEvent) -> Result<EventId> {
        let bytes = event.canonical_bytes()?;
        let event_id = crate::crypto::hash(&bytes);
        let path = layout::event_path(volume, &event_id);

        if self.backend.exists(&path).await? {
            let existing = self.backend.read_file(&path).await?;
            if existing == bytes {
                debug!(event = %event_id, "event already stored, skipping write");
                return Ok(event_id);
            }
            return Err(Error::StorageConflict { path });
        }

        self.backend
            .create_directory(&layout::events_dir(volume))
            .await?;
        self.backend.write_file(&path, &bytes).await?;
        Ok(event_id)
    }

    /// List the event ids stored for a volume
    ///
    /// A volume with no events yet (directory absent) yields an empty list.
    /// Directory entries that are not `<64-hex>.json` are skipped with a
    /// warning; they cannot be events of this volume.
    pub async fn list_event_ids(&self, volume: &VolumeId) -> Result<Vec<EventId>> {
        let dir = layout::events_dir(volume);
        let names = match self.backend.list_files(&dir).await {
            Ok(names) => names,
            Err(Error::StorageMissing { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let Some(stem) = name.strip_suffix(layout::EVENT_EXT) else {
                warn!(volume = %volume, entry = %name, "ignoring non-event file in volume directory");
                continue;
            };
            if stem.len() != HASH_HEX_LEN {
                warn!(volume = %volume, entry = %name, "ignoring entry with malformed event id");
                continue;
            }
            match ContentHash::from_hex(stem) {
                Ok(id) => ids.push(id),
                Err(_) => {
                    warn!(volume = %volume, entry = %name, "ignoring entry with malformed event id");
                }
            }
        }
        Ok(ids)
    }

    /// Read and parse a stored event
    ///
    /// ## Errors
    ///
    /// [`Error::BadEvent`] when the stored bytes do not parse as a signed
    /// event envelope.
    pub async fn read_event(&self, volume: &VolumeId, event_id: &EventId) -> Result<SignedEvent> {
        let path = layout::event_path(volume, event_id);
        let bytes = self.backend.read_file(&path).await?;
        serde_json::from_slice(&bytes).map_err(|_| Error::BadEvent {
            id: event_id.to_hex(),
        })
    }

    /// Persist a blob at its content address
    ///
    /// Writing bytes that are already present is a no-op, which is what
    /// makes duplicate file contents de-duplicate on disk.
    pub async fn write_blob(&self, bytes: &[u8]) -> Result<ContentHash> {
        let hash = crate::crypto::hash(bytes);
        let path = layout::blob_path(&hash);

        if self.backend.exists(&path).await? {
            debug!(blob = %hash, "blob already stored, skipping write");
            return Ok(hash);
        }

        self.backend.write_file(&path, bytes).await?;
        Ok(hash)
    }

    /// Read a blob and check it still hashes to its address
    ///
    /// ## Errors
    ///
    /// - [`Error::BlobMissing`] when no blob exists at the address
    /// - [`Error::CorruptBlob`] when the stored bytes rehash differently
    pub async fn read_blob(&self, hash: &ContentHash) -> Result<Vec<u8>> {
        let path = layout::blob_path(hash);
        let bytes = match self.backend.read_file(&path).await {
            Ok(bytes) => bytes,
            Err(Error::StorageMissing { .. }) => {
                return Err(Error::BlobMissing {
                    hash: hash.to_hex(),
                })
            }
            Err(e) => return Err(e),
        };

        if crate::crypto::hash(&bytes) != *hash {
            return Err(Error::CorruptBlob {
                hash: hash.to_hex(),
            });
        }
        Ok(bytes)
    }
}

// ============================================================================
// TESTS
// ============================================================================
