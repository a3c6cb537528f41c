//! # Cryptography Module
//!
//! This module provides all cryptographic primitives used by NearBytes Core.
//! The algorithms are fixed at the wire level: two clients sharing only the
//! secret must interoperate bit-for-bit.
//!
//! ## Security Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRYPTOGRAPHIC ARCHITECTURE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    KEY HIERARCHY                                │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  Secret (user-chosen UTF-8 string, >= 8 chars)                 │   │
//! │  │                          │                                      │   │
//! │  │                          ▼                                      │   │
//! │  │  ┌─────────────────────────────────────────────────────────┐   │   │
//! │  │  │  PBKDF2-HMAC-SHA256                                      │   │   │
//! │  │  │  salt = "nearbytes-salt-v1", 100 000 iterations, 64 B   │   │   │
//! │  │  └─────────────────────────────────────────────────────────┘   │   │
//! │  │                          │                                      │   │
//! │  │            ┌─────────────┴─────────────┐                       │   │
//! │  │            ▼                           ▼                       │   │
//! │  │  ┌─────────────────┐         ┌─────────────────┐              │   │
//! │  │  │  Signing Key    │         │   Master Key    │              │   │
//! │  │  │  (ECDSA P-256)  │         │  (AES-256 wrap) │              │   │
//! │  │  │                 │         │                 │              │   │
//! │  │  │ • Volume id     │         │ • Wraps the     │              │   │
//! │  │  │ • Event sigs    │         │   per-file keys │              │   │
//! │  │  └─────────────────┘         └─────────────────┘              │   │
//! │  │                                        │                       │   │
//! │  │                                        ▼                       │   │
//! │  │                              ┌─────────────────┐              │   │
//! │  │                              │  Per-File Key   │              │   │
//! │  │                              │  (fresh random) │              │   │
//! │  │                              │                 │              │   │
//! │  │                              │ • Encrypts one  │              │   │
//! │  │                              │   file body     │              │   │
//! │  │                              └─────────────────┘              │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Algorithm Choices (wire-level contract)
//!
//! | Algorithm | Purpose | Parameters |
//! |-----------|---------|------------|
//! | SHA-256 | Content addressing, event ids | 32-byte digest |
//! | AES-256-GCM | File bodies, key wrap | 12-byte IV, 16-byte tag, no AAD |
//! | ECDSA P-256 | Event signatures | SHA-256 digest, raw 64-byte `r‖s` |
//! | PBKDF2-HMAC-SHA256 | Secret -> keys | fixed salt, 100 000 iterations |
//!
//! ## Security Considerations
//!
//! 1. **Key Zeroization**: All secret key material is zeroized when dropped
//! 2. **Secure Random**: `rand::rngs::OsRng` for IVs and per-file keys
//! 3. **No Key Reuse**: Every file body is encrypted under a fresh key
//! 4. **No AAD**: Payload integrity rests on the outer event signature;
//!    every blob is reachable only through exactly one signed event

mod encryption;
mod kdf;
mod keys;
mod signing;

pub use encryption::{decrypt_symmetric, encrypt_symmetric, SymmetricKey, IV_SIZE, TAG_SIZE};
pub use kdf::{derive_keys, Secret, VolumeKeys, KDF_ITERATIONS, KDF_SALT};
pub use keys::{MasterKey, SigningKeyPair, VolumeId, VOLUME_ID_HEX_LEN};
pub use signing::{sign, verify, Signature, SIGNATURE_SIZE};

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::encoding::ContentHash;

/// Size of symmetric keys in bytes (256 bits)
pub const SYMMETRIC_KEY_SIZE: usize = 32;

/// Compute the SHA-256 digest of a byte slice
pub fn hash(bytes: &[u8]) -> ContentHash {
    let digest = Sha256::digest(bytes);
    ContentHash::from_bytes(digest.into())
}

/// Fill a buffer with cryptographically secure random bytes
pub fn random_bytes(buf: &mut [u8]) {
    rand::rngs::OsRng.fill_bytes(buf);
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_known_vector() {
        // SHA-256 of the empty string.
        assert_eq!(
            hash(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        // SHA-256 of "abc".
        assert_eq!(
            hash(b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_never_zero_sentinel() {
        assert!(!hash(b"").is_zero());
        assert!(!hash(b"anything").is_zero());
    }

    #[test]
    fn test_random_bytes_fills() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        random_bytes(&mut a);
        random_bytes(&mut b);
        assert_ne!(a, b);
    }
}
