//! # NearBytes Core
//!
//! A single-writer, content-addressed, end-to-end encrypted store. A
//! logical *volume* is derived deterministically from a user-supplied
//! secret: the secret yields a P-256 signing keypair (whose public key
//! names the volume) and a master key (which wraps per-file keys). The
//! volume's contents are an append-only log of signed events plus a
//! content-addressed blob store of encrypted file bodies; the visible file
//! list is a pure function of the event log.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       NEARBYTES CORE MODULES                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  files::NearBytes  (public façade)                               │  │
//! │  │  open / list_files / add_file / delete_file / get_file / log     │  │
//! │  └────────────────────────────────┬─────────────────────────────────┘  │
//! │                                   │                                     │
//! │        ┌──────────────────────────┼──────────────────────────┐         │
//! │        ▼                          ▼                          ▼         │
//! │  ┌───────────┐            ┌──────────────┐            ┌───────────┐    │
//! │  │  volume   │            │ events +     │            │  blobs    │    │
//! │  │           │            │ events::     │            │           │    │
//! │  │ - fold    │            │ engine       │            │ - seal    │    │
//! │  │ - verify  │            │ - build/sign │            │ - open    │    │
//! │  └─────┬─────┘            └──────┬───────┘            └─────┬─────┘    │
//! │        │                         │                          │          │
//! │        └─────────────┬───────────┴──────────────┬───────────┘          │
//! │                      ▼                          ▼                      │
//! │               ┌─────────────┐            ┌─────────────┐               │
//! │               │  channel    │            │   crypto    │               │
//! │               │             │            │             │               │
//! │               │ - events    │            │ - P-256     │               │
//! │               │ - blobs     │            │ - AES-GCM   │               │
//! │               └──────┬──────┘            │ - PBKDF2    │               │
//! │                      ▼                   └─────────────┘               │
//! │               ┌─────────────┐                                          │
//! │               │  storage    │  filesystem / in-memory backends         │
//! │               └─────────────┘                                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`encoding`] - Canonical hex/base64 forms and the hash newtype
//! - [`crypto`] - Cryptographic primitives (KDF, keys, AEAD, signatures)
//! - [`storage`] - Byte-oriented backends and the on-disk path layout
//! - [`events`] - Signed event model, canonical serialization, engine
//! - [`channel`] - Event and blob persistence over a backend
//! - [`blobs`] - File body encryption and content addressing
//! - [`volume`] - Materialization of the event log into a file map
//! - [`files`] - The public file service façade
//!
//! ## Security Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SECURITY LAYERS                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Layer 1: Identity (ECDSA P-256)                                       │
//! │  ────────────────────────────────                                       │
//! │  Every event is signed by the volume keypair derived from the          │
//! │  secret. A volume directory only materializes events that verify      │
//! │  under its own public key.                                             │
//! │                                                                         │
//! │  Layer 2: Confidentiality (AES-256-GCM)                                │
//! │  ───────────────────────────────────────                                │
//! │  Each file body is encrypted under a fresh per-file key; the key      │
//! │  travels wrapped under the master key inside the signed event.        │
//! │                                                                         │
//! │  Layer 3: Integrity (content addressing)                               │
//! │  ────────────────────────────────────────                               │
//! │  Blobs are stored at the SHA-256 of their bytes and rehashed on       │
//! │  read; events are stored at the SHA-256 of their envelope and         │
//! │  rehashed during materialization.                                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use nearbytes_core::{NearBytes, StorageConfig};
//!
//! let service = NearBytes::with_filesystem(&StorageConfig::new("/data/nearbytes"));
//! service.add_file("LeedsUnited", "notes.txt", b"hello", None).await?;
//! let bytes = service.get_file("LeedsUnited", "notes.txt").await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod blobs;
pub mod channel;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod events;
pub mod files;
pub mod storage;
pub mod volume;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use crypto::{Secret, VolumeId};
pub use encoding::ContentHash;
pub use error::{Error, Result};
pub use events::{EventId, EventPayload, EventType, SignedEvent};
pub use files::{FileMetadata, NearBytes, VolumeInfo};
pub use storage::{FilesystemBackend, MemoryBackend, StorageBackend, StorageConfig};

/// Returns the version of NearBytes Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
