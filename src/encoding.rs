//! # Canonical Encodings
//!
//! Byte-level canonical forms shared by every component:
//!
//! | Value | Canonical form |
//! |-------|----------------|
//! | Hashes, public keys | lowercase hex |
//! | Byte fields inside JSON payloads | standard base64, padding required |
//! | File names | raw UTF-8 (JSON string escaping on the wire) |
//!
//! Two clients sharing only the secret must produce identical bytes for
//! identical inputs, so these forms are part of the external contract and
//! are validated strictly: uppercase hex and URL-safe base64 are rejected.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Length of a hash rendered as hex (32 bytes, 64 characters)
pub const HASH_HEX_LEN: usize = 64;

/// A 32-byte SHA-256 value in its canonical lowercase-hex rendering
///
/// Used both as a blob content address and as an event identifier. The
/// all-zeros value is reserved as the sentinel carried by `DELETE_FILE`
/// payloads and never collides with a real digest.
///
/// Ordering is byte-wise, which on the hex rendering equals lexicographic
/// comparison. Materialization relies on this for its tie-break rule.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// The all-zeros sentinel carried by delete events
    pub const ZERO: ContentHash = ContentHash([0u8; 32]);

    /// Create from raw digest bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse from canonical hex
    ///
    /// ## Errors
    ///
    /// Returns [`Error::InvalidHash`] unless the input matches
    /// `^[0-9a-f]{64}$`. Uppercase digits are rejected: the canonical
    /// rendering is lowercase and event files are addressed by it.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        if hex_str.len() != HASH_HEX_LEN
            || !hex_str.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(Error::InvalidHash(hex_str.to_string()));
        }

        let bytes = hex::decode(hex_str).map_err(|_| Error::InvalidHash(hex_str.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::InvalidHash(hex_str.to_string()))?;
        Ok(Self(bytes))
    }

    /// Render as canonical lowercase hex
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether this is the delete sentinel
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}

impl Serialize for ContentHash {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ContentHash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// BASE64 HELPERS
// ============================================================================

/// Encode bytes as standard base64 (padded)
pub fn b64_encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64 (padded)
pub fn b64_decode(s: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(s)
}

/// Serde helper for byte fields carried as base64 strings in JSON payloads
pub mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let h = ContentHash::from_bytes([0xab; 32]);
        let hex = h.to_hex();
        assert_eq!(hex.len(), HASH_HEX_LEN);
        assert_eq!(ContentHash::from_hex(&hex).unwrap(), h);
    }

    #[test]
    fn test_uppercase_hex_rejected() {
        let upper = "AB".repeat(32);
        assert!(matches!(
            ContentHash::from_hex(&upper),
            Err(crate::error::Error::InvalidHash(_))
        ));
    }

    #[test]
    fn test_short_and_junk_hex_rejected() {
        assert!(ContentHash::from_hex("abcd").is_err());
        assert!(ContentHash::from_hex(&"g".repeat(64)).is_err());
        assert!(ContentHash::from_hex(&"0,".repeat(32)).is_err());
    }

    #[test]
    fn test_zero_sentinel() {
        assert!(ContentHash::ZERO.is_zero());
        assert_eq!(ContentHash::ZERO.to_hex(), "0".repeat(64));
        assert!(!ContentHash::from_bytes([1u8; 32]).is_zero());
    }

    #[test]
    fn test_ordering_matches_hex_ordering() {
        let a = ContentHash::from_bytes([0x01; 32]);
        let b = ContentHash::from_bytes([0x02; 32]);
        assert!(a < b);
        assert!(a.to_hex() < b.to_hex());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let h = ContentHash::from_bytes([0x7f; 32]);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{}\"", h.to_hex()));

        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn test_serde_rejects_bad_hex() {
        let json = format!("\"{}\"", "Z".repeat(64));
        assert!(serde_json::from_str::<ContentHash>(&json).is_err());
    }

    #[test]
    fn test_base64_standard_with_padding() {
        assert_eq!(b64_encode(b"hi"), "aGk=");
        assert_eq!(b64_decode("aGk=").unwrap(), b"hi");
        assert_eq!(b64_encode(b""), "");
        // URL-safe alphabet is not accepted.
        assert!(b64_decode("a-_=").is_err());
    }
}
