//! # Key Derivation
//!
//! Deterministic derivation of a volume's keys from the user secret.
//!
//! ## Derivation Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    SECRET -> VOLUME KEYS                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Secret (UTF-8, >= 8 chars, never persisted)                           │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  PBKDF2-HMAC-SHA256(                                            │   │
//! │  │    password   = secret bytes,                                   │   │
//! │  │    salt       = "nearbytes-salt-v1",                            │   │
//! │  │    iterations = 100 000,                                        │   │
//! │  │    output     = 64 bytes                                        │   │
//! │  │  )                                                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                          │                                              │
//! │            ┌─────────────┴─────────────┐                               │
//! │            ▼                           ▼                               │
//! │   bytes[0..32]                  bytes[32..64]                          │
//! │   P-256 private scalar seed     Master key (AES-256)                   │
//! │   (reduced mod curve order n)                                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two holders of the same secret derive the same keypair and master key;
//! there is no enrollment step. The fixed salt is part of the wire-level
//! contract, so changing it forks every existing volume.

use p256::elliptic_curve::bigint::U256;
use p256::elliptic_curve::ops::Reduce;
use p256::elliptic_curve::PrimeField;
use p256::{FieldBytes, Scalar};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::{MasterKey, SigningKeyPair};
use crate::error::{Error, Result};

/// Fixed PBKDF2 salt (wire-level constant)
pub const KDF_SALT: &[u8] = b"nearbytes-salt-v1";

/// PBKDF2 iteration count (wire-level constant)
pub const KDF_ITERATIONS: u32 = 100_000;

/// Minimum secret length in characters
const MIN_SECRET_CHARS: usize = 8;

/// A validated user secret
///
/// The sole input to a volume. Validated at construction and zeroized on
/// drop; the core never writes it anywhere.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    /// Validate and wrap a secret
    ///
    /// ## Errors
    ///
    /// Returns [`Error::InvalidSecret`] when the secret is shorter than
    /// 8 characters. The bound is on characters, not bytes, so multi-byte
    /// UTF-8 secrets are measured the way users count them.
    pub fn new(secret: &str) -> Result<Self> {
        if secret.chars().count() < MIN_SECRET_CHARS {
            return Err(Error::InvalidSecret);
        }
        Ok(Self(secret.to_string()))
    }

    /// The UTF-8 bytes fed to the KDF
    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// The full key material of a volume for the duration of one call
pub struct VolumeKeys {
    /// ECDSA P-256 signing keypair; its public key names the volume
    pub keypair: SigningKeyPair,
    /// Master key wrapping per-file keys
    pub master: MasterKey,
}

/// Derive a volume's keys from its secret
///
/// Deterministic: the same secret always yields the same keypair and master
/// key, across runs and implementations.
///
/// ## Process
///
/// 1. PBKDF2-HMAC-SHA256 stretches the secret into 64 bytes of keying
///    material under the fixed salt.
/// 2. The first 32 bytes seed the P-256 private scalar, reduced modulo the
///    curve order when the seed falls outside it.
/// 3. The last 32 bytes become the master key.
///
/// ## Errors
///
/// Returns the opaque [`Error::CryptoFailure`] if the reduced scalar is
/// zero (probability ~2^-256) or key construction fails.
pub fn derive_keys(secret: &Secret) -> Result<VolumeKeys> {
    let mut okm = Zeroizing::new([0u8; 64]);
    pbkdf2::pbkdf2_hmac::<Sha256>(secret.as_bytes(), KDF_SALT, KDF_ITERATIONS, &mut *okm);

    // Reduce the 32-byte seed into a canonical scalar.
    let seed = FieldBytes::clone_from_slice(&okm[..32]);
    let scalar = <Scalar as Reduce<U256>>::reduce_bytes(&seed);

    let mut scalar_bytes = [0u8; 32];
    scalar_bytes.copy_from_slice(&scalar.to_repr());
    let keypair = SigningKeyPair::from_scalar_bytes(&scalar_bytes);
    scalar_bytes.zeroize();
    let keypair = keypair?;

    let mut master = [0u8; 32];
    master.copy_from_slice(&okm[32..]);
    let master_key = MasterKey::from_bytes(master);
    master.zeroize();

    Ok(VolumeKeys {
        keypair,
        master: master_key,
    })
}

// ============================================================================
// TESTS
// ============================================================================
