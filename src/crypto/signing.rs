//! # Digital Signatures
//!
//! ECDSA P-256 with SHA-256 for event authentication.
//!
//! Every event in a volume is signed by the volume's keypair; the public key
//! *is* the volume identity. Signatures travel in the event envelope as the
//! raw 64-byte `r‖s` form (base64 on the wire), not DER.

use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature as EcdsaSignature, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::crypto::SigningKeyPair;
use crate::error::{Error, Result};

/// Size of a raw `r‖s` ECDSA P-256 signature in bytes
pub const SIGNATURE_SIZE: usize = 64;

/// A raw `r‖s` ECDSA P-256 signature
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "signature_bytes")] pub [u8; SIGNATURE_SIZE]);

impl Signature {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; SIGNATURE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice (must be exactly 64 bytes)
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; SIGNATURE_SIZE] =
            slice.try_into().map_err(|_| Error::CryptoFailure)?;
        Ok(Self(bytes))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Sign a message with ECDSA P-256 over its SHA-256 digest
///
/// ## Returns
///
/// A raw 64-byte `r‖s` signature. Signing is deterministic (RFC 6979), so
/// the same payload bytes always yield the same signature under one key.
pub fn sign(keypair: &SigningKeyPair, message: &[u8]) -> Signature {
    let sig: EcdsaSignature = keypair.signing_key().sign(message);
    let mut bytes = [0u8; SIGNATURE_SIZE];
    bytes.copy_from_slice(&sig.to_bytes());
    Signature(bytes)
}

/// Verify an ECDSA P-256 signature
///
/// ## Returns
///
/// `true` when the signature authenticates `message` under `public_key`.
/// Never fails: malformed signatures and forgeries both yield `false`, so
/// verification exposes a single bit to callers.
pub fn verify(public_key: &VerifyingKey, message: &[u8], signature: &Signature) -> bool {
    let Ok(sig) = EcdsaSignature::from_slice(&signature.0) else {
        return false;
    };
    public_key.verify(message, &sig).is_ok()
}

/// Serde helper carrying signature bytes as standard base64
mod signature_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 64], serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<[u8; 64], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = STANDARD.decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("Invalid signature length"))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SigningKeyPair;

    #[test]
    fn test_sign_verify() {
        let keypair = SigningKeyPair::generate();
        let message = b"Hello, World!";

        let signature = sign(&keypair, message);
        assert!(verify(&keypair.verifying_key(), message, &signature));
    }

    #[test]
    fn test_verify_wrong_message_fails() {
        let keypair = SigningKeyPair::generate();

        let signature = sign(&keypair, b"Hello, World!");
        assert!(!verify(&keypair.verifying_key(), b"Wrong message!", &signature));
    }

    #[test]
    fn test_verify_wrong_key_fails() {
        let keypair1 = SigningKeyPair::generate();
        let keypair2 = SigningKeyPair::generate();

        let signature = sign(&keypair1, b"Hello, World!");
        assert!(!verify(&keypair2.verifying_key(), b"Hello, World!", &signature));
    }

    #[test]
    fn test_verify_garbage_signature_returns_false() {
        let keypair = SigningKeyPair::generate();

        // All-zero r and s are invalid scalars; verify must not panic.
        let garbage = Signature::from_bytes([0u8; SIGNATURE_SIZE]);
        assert!(!verify(&keypair.verifying_key(), b"msg", &garbage));

        let garbage = Signature::from_bytes([0xffu8; SIGNATURE_SIZE]);
        assert!(!verify(&keypair.verifying_key(), b"msg", &garbage));
    }

    #[test]
    fn test_deterministic_signatures() {
        let keypair = SigningKeyPair::generate();
        let message = b"Hello, World!";

        let sig1 = sign(&keypair, message);
        let sig2 = sign(&keypair, message);

        // RFC 6979 nonces make ECDSA deterministic per (key, message).
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_signature_serde_base64() {
        let keypair = SigningKeyPair::generate();
        let signature = sign(&keypair, b"test");

        let json = serde_json::to_string(&signature).unwrap();
        // 64 bytes -> 88 base64 characters, quoted.
        assert_eq!(json.len(), 90);

        let restored: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(signature, restored);
    }

    #[test]
    fn test_signature_from_slice_wrong_length() {
        assert!(Signature::from_slice(&[0u8; 63]).is_err());
        assert!(Signature::from_slice(&[0u8; 65]).is_err());
        assert!(Signature::from_slice(&[0u8; 64]).is_ok());
    }
}
