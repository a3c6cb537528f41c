//! # Key Management
//!
//! Key types for a volume.
//!
//! ## Key Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          KEY TYPES                                      │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SigningKeyPair (ECDSA P-256)                                   │   │
//! │  │  ────────────────────────────                                    │   │
//! │  │                                                                  │   │
//! │  │  Purpose:                                                       │   │
//! │  │  • Signing events (creates and deletes)                         │   │
//! │  │  • The public key names the volume                              │   │
//! │  │                                                                  │   │
//! │  │  Format:                                                        │   │
//! │  │  • Private scalar: 32 bytes (kept secret, zeroized on drop)    │   │
//! │  │  • Public key: 65-byte uncompressed SEC1 point                 │   │
//! │  │                                                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  MasterKey (AES-256)                                            │   │
//! │  │  ───────────────────                                             │   │
//! │  │                                                                  │   │
//! │  │  Wraps per-file keys inside CREATE_FILE events. Derived from    │   │
//! │  │  the secret alongside the signing key, never persisted.         │   │
//! │  │                                                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  VolumeId                                                       │   │
//! │  │  ────────                                                        │   │
//! │  │                                                                  │   │
//! │  │  Lowercase hex of the 65-byte public point. Names the volume    │   │
//! │  │  directory under channels/ and can be shared freely.            │   │
//! │  │                                                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use p256::ecdsa::{SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::FieldBytes;
use zeroize::ZeroizeOnDrop;

use crate::crypto::SYMMETRIC_KEY_SIZE;
use crate::error::{Error, Result};

/// Length of a volume id in hex characters (65-byte uncompressed point)
pub const VOLUME_ID_HEX_LEN: usize = 130;

/// ECDSA P-256 signing keypair for a volume
#[derive(ZeroizeOnDrop)]
pub struct SigningKeyPair {
    /// Private signing key (secret)
    #[zeroize(skip)] // p256::ecdsa::SigningKey handles its own zeroization
    secret: SigningKey,
}

impl SigningKeyPair {
    /// Generate a new random signing keypair
    ///
    /// Volumes derive their keypair from the secret instead; random
    /// generation exists for tests and ephemeral identities.
    pub fn generate() -> Self {
        let secret = SigningKey::random(&mut rand::rngs::OsRng);
        Self { secret }
    }

    /// Create from a 32-byte private scalar
    ///
    /// ## Errors
    ///
    /// Returns the opaque [`Error::CryptoFailure`] if the scalar is zero or
    /// not a canonical field element.
    pub fn from_scalar_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let secret = SigningKey::from_bytes(FieldBytes::from_slice(bytes))
            .map_err(|_| Error::CryptoFailure)?;
        Ok(Self { secret })
    }

    /// Get the verifying key for signature verification
    pub fn verifying_key(&self) -> VerifyingKey {
        self.secret.verifying_key().to_owned()
    }

    /// Get the volume id named by this keypair's public key
    pub fn volume_id(&self) -> VolumeId {
        VolumeId::from_verifying_key(&self.verifying_key())
    }

    /// Get reference to the signing key
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.secret
    }
}

/// Master symmetric key wrapping per-file keys
///
/// Zeroized when dropped; exists only for the duration of a call.
#[derive(ZeroizeOnDrop)]
pub struct MasterKey([u8; SYMMETRIC_KEY_SIZE]);

impl MasterKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; SYMMETRIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw key bytes
    pub(crate) fn as_bytes(&self) -> &[u8; SYMMETRIC_KEY_SIZE] {
        &self.0
    }
}

/// The public identity of a volume
///
/// Rendered as the lowercase hex of the uncompressed (65-byte) SEC1 public
/// point; this string names the volume's event directory.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct VolumeId(String);

impl VolumeId {
    /// Derive from a verifying key
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self(hex::encode(key.to_encoded_point(false).as_bytes()))
    }

    /// Recover the verifying key for event verification
    pub fn verifying_key(&self) -> Result<VerifyingKey> {
        let bytes = hex::decode(&self.0).map_err(|_| Error::CryptoFailure)?;
        VerifyingKey::from_sec1_bytes(&bytes).map_err(|_| Error::CryptoFailure)
    }

    /// The hex rendering (also the directory name)
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VolumeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Debug for VolumeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VolumeId({})", self.0)
    }
}

// ============================================================================
// TESTS
// ============================================================================
