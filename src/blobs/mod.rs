//! # Blob Engine
//!
//! Encryption and decryption of file bodies, plus their content addressing.
//!
//! ## Write Side
//!
//! ```text
//! plaintext ──► AES-256-GCM under a fresh per-file key ──► blob
//!                                                           │
//!                          SHA-256(blob) = content address ◄┘
//!
//! per-file key ──► AES-256-GCM under the master key ──► wrapped key
//!                                                        (travels in the
//!                                                         CREATE_FILE event)
//! ```
//!
//! The per-file key is generated, used once, wrapped, and dropped; it never
//! touches storage in the clear. The master key only ever wraps per-file
//! keys.
//!
//! ## Read Side
//!
//! Unwrap the per-file key, fetch the blob by content address, re-check the
//! address against the fetched bytes, decrypt. Every failure on this path
//! surfaces as [`Error::CryptoFailure`], [`Error::CorruptBlob`] or
//! [`Error::BlobMissing`] with no finer distinction.

use zeroize::Zeroizing;

use crate::channel::ChannelStore;
use crate::crypto::{decrypt_symmetric, encrypt_symmetric, MasterKey, SymmetricKey};
use crate::encoding::ContentHash;
use crate::error::{Error, Result};
use crate::events::EventPayload;

/// The encrypted form of one file body, ready to persist
pub struct SealedBody {
    /// AEAD output `IV ‖ ct ‖ tag`
    pub blob: Vec<u8>,
    /// SHA-256 of `blob`, its storage address
    pub content_address: ContentHash,
    /// Per-file key wrapped under the master key
    pub wrapped_key: Vec<u8>,
}

/// Encrypt a file body under a fresh per-file key
///
/// The returned [`SealedBody`] carries everything the create path needs:
/// the blob to store, its content address, and the wrapped key to embed in
/// the event payload.
pub fn seal_body(master: &MasterKey, plaintext: &[u8]) -> Result<SealedBody> {
    let per_file_key = SymmetricKey::generate();

    let blob = encrypt_symmetric(&per_file_key, plaintext)?;
    let content_address = crate::crypto::hash(&blob);

    let master_key = SymmetricKey::from_bytes(*master.as_bytes());
    let wrapped_key = encrypt_symmetric(&master_key, per_file_key.as_bytes())?;

    Ok(SealedBody {
        blob,
        content_address,
        wrapped_key,
    })
}

/// Decrypt the file body referenced by a CREATE_FILE payload
///
/// ## Process
///
/// 1. Unwrap the per-file key from the payload under the master key.
/// 2. Read the blob at the payload's content address.
/// 3. Re-check that the fetched bytes hash to the address. The channel
///    store already does this on read; the check here also covers backends
///    that bypass it.
/// 4. Decrypt the blob under the per-file key.
pub async fn open_body(
    master: &MasterKey,
    payload: &EventPayload,
    channel: &ChannelStore<'_>,
) -> Result<Vec<u8>> {
    let master_key = SymmetricKey::from_bytes(*master.as_bytes());
    let per_file_bytes = Zeroizing::new(decrypt_symmetric(&master_key, &payload.encrypted_key)?);
    let per_file_key = SymmetricKey::from_slice(&per_file_bytes)?;

    let blob = channel.read_blob(&payload.hash).await?;
    if crate::crypto::hash(&blob) != payload.hash {
        return Err(Error::CorruptBlob {
            hash: payload.hash.to_hex(),
        });
    }

    decrypt_symmetric(&per_file_key, &blob)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    fn master() -> MasterKey {
        MasterKey::from_bytes([42u8; 32])
    }

    fn payload_for(sealed: &SealedBody) -> EventPayload {
        EventPayload::create(
            "a.txt".to_string(),
            sealed.content_address,
            sealed.wrapped_key.clone(),
        )
    }

    #[tokio::test]
    async fn test_seal_open_round_trip() {
        let backend = MemoryBackend::new();
        let channel = ChannelStore::new(&backend);

        let sealed = seal_body(&master(), b"file body").unwrap();
        channel.write_blob(&sealed.blob).await.unwrap();

        let plaintext = open_body(&master(), &payload_for(&sealed), &channel)
            .await
            .unwrap();
        assert_eq!(plaintext, b"file body");
    }

    #[tokio::test]
    async fn test_fresh_key_per_seal() {
        let sealed1 = seal_body(&master(), b"same body").unwrap();
        let sealed2 = seal_body(&master(), b"same body").unwrap();

        // Fresh per-file keys give identical plaintexts distinct blobs,
        // content addresses, and wrapped keys.
        assert_ne!(sealed1.blob, sealed2.blob);
        assert_ne!(sealed1.content_address, sealed2.content_address);
        assert_ne!(sealed1.wrapped_key, sealed2.wrapped_key);
    }

    #[tokio::test]
    async fn test_wrong_master_key_is_opaque_failure() {
        let backend = MemoryBackend::new();
        let channel = ChannelStore::new(&backend);

        let sealed = seal_body(&master(), b"file body").unwrap();
        channel.write_blob(&sealed.blob).await.unwrap();

        let other = MasterKey::from_bytes([99u8; 32]);
        assert!(matches!(
            open_body(&other, &payload_for(&sealed), &channel).await,
            Err(Error::CryptoFailure)
        ));
    }

    #[tokio::test]
    async fn test_missing_blob() {
        let backend = MemoryBackend::new();
        let channel = ChannelStore::new(&backend);

        let sealed = seal_body(&master(), b"file body").unwrap();
        // Blob deliberately not written.

        assert!(matches!(
            open_body(&master(), &payload_for(&sealed), &channel).await,
            Err(Error::BlobMissing { .. })
        ));
    }

    #[tokio::test]
    async fn test_tampered_blob_rejected() {
        let backend = MemoryBackend::new();
        let channel = ChannelStore::new(&backend);

        let sealed = seal_body(&master(), b"file body").unwrap();
        channel.write_blob(&sealed.blob).await.unwrap();

        let mut tampered = sealed.blob.clone();
        tampered[0] ^= 0x01;
        backend.tamper(
            &crate::storage::layout::blob_path(&sealed.content_address),
            tampered,
        );

        assert!(matches!(
            open_body(&master(), &payload_for(&sealed), &channel).await,
            Err(Error::CorruptBlob { .. })
        ));
    }

    #[tokio::test]
    async fn test_garbage_wrapped_key_is_opaque_failure() {
        let backend = MemoryBackend::new();
        let channel = ChannelStore::new(&backend);

        let sealed = seal_body(&master(), b"file body").unwrap();
        channel.write_blob(&sealed.blob).await.unwrap();

        let mut payload = payload_for(&sealed);
        payload.encrypted_key = vec![0u8; 5];

        assert!(matches!(
            open_body(&master(), &payload, &channel).await,
            Err(Error::CryptoFailure)
        ));
    }
}
