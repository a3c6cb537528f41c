//! # Event Engine
//!
//! Builds, signs, and verifies events.
//!
//! ## Write Ordering
//!
//! `build_create` persists the blob before the event that references it, so
//! a concurrent reader that observes the event is guaranteed to find the
//! blob. A crash between the two writes leaves a dangling blob, which is
//! unreachable garbage and tolerated; the reverse order could leave a
//! reachable event with no body.

use p256::ecdsa::VerifyingKey;
use tracing::{debug, instrument};

use crate::blobs;
use crate::channel::ChannelStore;
use crate::crypto::{sign, verify, VolumeKeys};
use crate::encoding::ContentHash;
use crate::error::{Error, Result};
use crate::events::{EventId, EventPayload, EventType, SignedEvent};

/// Outcome of a create: the event id and the blob it references
pub struct CreateOutcome {
    /// Identifier of the newly written event
    pub event_id: EventId,
    /// Content address of the encrypted body
    pub content_address: ContentHash,
}

/// Build, sign, and persist a CREATE_FILE event
///
/// ## Process
///
/// 1. Generate a fresh per-file key and encrypt the plaintext under it.
/// 2. Hash the ciphertext to obtain the content address.
/// 3. Wrap the per-file key under the master key.
/// 4. Assemble and sign the payload.
/// 5. Write the blob, then the event.
#[instrument(skip_all, fields(file = %file_name))]
pub async fn build_create(
    keys: &VolumeKeys,
    channel: &ChannelStore<'_>,
    file_name: &str,
    plaintext: &[u8],
) -> Result<CreateOutcome> {
    if file_name.is_empty() {
        return Err(Error::InvalidFileName);
    }

    let sealed = blobs::seal_body(&keys.master, plaintext)?;
    let payload = EventPayload::create(
        file_name.to_string(),
        sealed.content_address,
        sealed.wrapped_key,
    );
    let signature = sign(&keys.keypair, &payload.signing_bytes()?);
    let event = SignedEvent { payload, signature };

    // Blob first: an event must never be observable before its body.
    let content_address = channel.write_blob(&sealed.blob).await?;
    let event_id = channel.write_event(&keys.keypair.volume_id(), &event).await?;

    debug!(event = %event_id, blob = %content_address, "create event written");
    Ok(CreateOutcome {
        event_id,
        content_address,
    })
}

/// Build, sign, and persist a DELETE_FILE tombstone
///
/// Carries the all-zeros hash and an empty wrapped key; no blob is written.
/// Deleting a name that was never created is legal and still writes the
/// tombstone.
#[instrument(skip_all, fields(file = %file_name))]
pub async fn build_delete(
    keys: &VolumeKeys,
    channel: &ChannelStore<'_>,
    file_name: &str,
) -> Result<EventId> {
    if file_name.is_empty() {
        return Err(Error::InvalidFileName);
    }

    let payload = EventPayload::delete(file_name.to_string());
    let signature = sign(&keys.keypair, &payload.signing_bytes()?);
    let event = SignedEvent { payload, signature };

    let event_id = channel.write_event(&keys.keypair.volume_id(), &event).await?;
    debug!(event = %event_id, "delete event written");
    Ok(event_id)
}

/// Verify a stored event against its id and the volume's public key
///
/// Checks, in order:
/// 1. The payload is well-formed for its type: creates carry a non-zero
///    hash and a non-empty wrapped key, deletes the zero hash and an empty
///    one, and the file name is non-empty.
/// 2. The canonical envelope bytes hash back to `expected_id` (the file
///    stem the event was read from).
/// 3. The signature verifies over the canonical payload bytes.
///
/// Returns `false` on any failure; never errors or panics on hostile input.
pub fn verify_event(
    event: &SignedEvent,
    expected_id: &EventId,
    public_key: &VerifyingKey,
) -> bool {
    if event.payload.file_name.is_empty() {
        return false;
    }
    let shape_ok = match event.payload.event_type {
        EventType::CreateFile => {
            !event.payload.hash.is_zero() && !event.payload.encrypted_key.is_empty()
        }
        EventType::DeleteFile => {
            event.payload.hash.is_zero() && event.payload.encrypted_key.is_empty()
        }
    };
    if !shape_ok {
        return false;
    }

    let Ok(envelope) = event.canonical_bytes() else {
        return false;
    };
    if crate::crypto::hash(&envelope) != *expected_id {
        return false;
    }

    let Ok(signing_input) = event.payload.signing_bytes() else {
        return false;
    };
    verify(public_key, &signing_input, &event.signature)
}

// ============================================================================
// TESTS
// ============================================================================
