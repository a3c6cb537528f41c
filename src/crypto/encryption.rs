//! # Symmetric Encryption
//!
//! AES-256-GCM for file bodies and key wrapping.
//!
//! ## Blob Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       AEAD OUTPUT LAYOUT                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   ┌──────────────┬──────────────────────────────┬──────────────────┐   │
//! │   │  IV (12 B)   │  ciphertext (len(plaintext)) │  GCM tag (16 B)  │   │
//! │   └──────────────┴──────────────────────────────┴──────────────────┘   │
//! │                                                                         │
//! │   The same layout is used for file-body blobs (under a per-file key)   │
//! │   and for wrapped per-file keys (under the master key). No additional  │
//! │   authenticated data is used: payload integrity rests on the outer     │
//! │   event signature.                                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce as AesNonce,
};
use zeroize::ZeroizeOnDrop;

use crate::crypto::{random_bytes, SYMMETRIC_KEY_SIZE};
use crate::error::{Error, Result};

/// Size of the AES-GCM IV in bytes (96 bits)
pub const IV_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// An AES-256-GCM key
///
/// Zeroized when dropped. Used for master keys, per-file keys, and nothing
/// else; a key encrypts either file bodies or wrapped keys, never both.
#[derive(ZeroizeOnDrop)]
pub struct SymmetricKey([u8; SYMMETRIC_KEY_SIZE]);

impl SymmetricKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; SYMMETRIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Generate a fresh random key
    pub fn generate() -> Self {
        let mut bytes = [0u8; SYMMETRIC_KEY_SIZE];
        random_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from a slice (must be exactly 32 bytes)
    ///
    /// ## Errors
    ///
    /// Returns the opaque [`Error::CryptoFailure`] on a length mismatch so
    /// that unwrap failures are indistinguishable from tag failures.
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; SYMMETRIC_KEY_SIZE] =
            slice.try_into().map_err(|_| Error::CryptoFailure)?;
        Ok(Self(bytes))
    }

    /// Get the raw key bytes
    pub(crate) fn as_bytes(&self) -> &[u8; SYMMETRIC_KEY_SIZE] {
        &self.0
    }
}

/// Encrypt with AES-256-GCM under a fresh random IV
///
/// ## Returns
///
/// `IV ‖ ciphertext ‖ tag` as a single byte vector. The output is
/// `IV_SIZE + len(plaintext) + TAG_SIZE` bytes long.
pub fn encrypt_symmetric(key: &SymmetricKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut iv = [0u8; IV_SIZE];
    random_bytes(&mut iv);

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| Error::CryptoFailure)?;
    let ciphertext = cipher
        .encrypt(AesNonce::from_slice(&iv), plaintext)
        .map_err(|_| Error::CryptoFailure)?;

    let mut out = Vec::with_capacity(IV_SIZE + ciphertext.len());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt an `IV ‖ ciphertext ‖ tag` byte string
///
/// ## Errors
///
/// Returns the opaque [`Error::CryptoFailure`] if the input is too short,
/// the tag does not authenticate, or the key is wrong. Callers must not be
/// able to tell these apart.
pub fn decrypt_symmetric(key: &SymmetricKey, bytes: &[u8]) -> Result<Vec<u8>> {
    if bytes.len() < IV_SIZE + TAG_SIZE {
        return Err(Error::CryptoFailure);
    }

    let (iv, ciphertext) = bytes.split_at(IV_SIZE);
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| Error::CryptoFailure)?;
    cipher
        .decrypt(AesNonce::from_slice(iv), ciphertext)
        .map_err(|_| Error::CryptoFailure)
}

// ============================================================================
// TESTS
// ============================================================================
