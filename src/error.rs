//! # Error Handling
//!
//! This module provides the error types for NearBytes Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Input Errors                                                      │
//! │  │   ├── InvalidSecret        - Secret shorter than 8 characters       │
//! │  │   ├── InvalidHash          - Not a 64-char lowercase hex string     │
//! │  │   └── InvalidFileName      - Empty file name                        │
//! │  │                                                                      │
//! │  ├── Crypto Errors                                                     │
//! │  │   └── CryptoFailure        - Opaque: AEAD tag mismatch, key         │
//! │  │                              derivation failure, or forged          │
//! │  │                              signature (deliberately undetailed)    │
//! │  │                                                                      │
//! │  ├── Event Errors                                                      │
//! │  │   └── BadEvent             - Malformed JSON/base64/hex or failed    │
//! │  │                              signature on a stored event            │
//! │  │                                                                      │
//! │  ├── Blob Errors                                                       │
//! │  │   ├── CorruptBlob          - Blob bytes do not rehash to address    │
//! │  │   └── BlobMissing          - Event references an absent blob        │
//! │  │                                                                      │
//! │  ├── File Errors                                                       │
//! │  │   └── FileAbsent           - Name not in materialized state         │
//! │  │                                                                      │
//! │  └── Storage Errors                                                    │
//! │      ├── StorageMissing       - Path does not exist                    │
//! │      ├── StorageFailure       - Backend I/O failure                    │
//! │      └── StorageConflict      - Different bytes at a content address   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Side-Channel Policy
//!
//! Decryption and verification failures all collapse into the single opaque
//! [`Error::CryptoFailure`]. Callers cannot distinguish "wrong key", "bad
//! tag", and "bad signature", so the error surface cannot be used as a
//! decryption oracle by untrusted clients.

use thiserror::Error;

/// Result type alias for NearBytes Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for NearBytes Core
///
/// Errors are categorized by domain so that hosts embedding the core can
/// map them onto stable numeric codes.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Input Errors (100-199)
    // ========================================================================

    /// Secret shorter than the 8-character minimum
    #[error("Secret must be at least 8 characters long.")]
    InvalidSecret,

    /// Hex string not matching `^[0-9a-f]{64}$`
    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    /// Empty file name in a create or delete request
    #[error("File name must not be empty.")]
    InvalidFileName,

    // ========================================================================
    // Crypto Errors (200-299)
    // ========================================================================

    /// Opaque cryptographic failure
    ///
    /// Covers AEAD authentication errors, key derivation failures, and
    /// signature forgeries without distinguishing them.
    #[error("Cryptographic operation failed.")]
    CryptoFailure,

    // ========================================================================
    // Event Errors (300-399)
    // ========================================================================

    /// Stored event could not be parsed or verified
    #[error("Bad event {id}")]
    BadEvent {
        /// Event identifier (file stem) of the offending event
        id: String,
    },

    // ========================================================================
    // Blob Errors (400-499)
    // ========================================================================

    /// Blob bytes do not rehash to their content address
    #[error("Corrupt blob {hash}")]
    CorruptBlob {
        /// Content address the blob was read from
        hash: String,
    },

    /// Event references a blob that is not present in storage
    #[error("Blob {hash} is missing")]
    BlobMissing {
        /// Content address the event referenced
        hash: String,
    },

    // ========================================================================
    // File Errors (500-599)
    // ========================================================================

    /// Requested file is not in the materialized state
    #[error("File not found: {name}")]
    FileAbsent {
        /// Requested file name (or content address for hash lookups)
        name: String,
    },

    // ========================================================================
    // Storage Errors (600-699)
    // ========================================================================

    /// Path does not exist in the backend
    #[error("Storage path missing: {path}")]
    StorageMissing {
        /// Backend-relative path
        path: String,
    },

    /// Backend I/O failure
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    /// Different bytes already stored at a content-addressed path
    #[error("Storage conflict at {path}")]
    StorageConflict {
        /// Backend-relative path of the conflicting write
        path: String,
    },

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the numeric error code for embedding hosts
    ///
    /// Error codes are organized by category:
    /// - 100-199: Input validation
    /// - 200-299: Crypto
    /// - 300-399: Events
    /// - 400-499: Blobs
    /// - 500-599: Files
    /// - 600-699: Storage
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            // Input (100-199)
            Error::InvalidSecret => 100,
            Error::InvalidHash(_) => 101,
            Error::InvalidFileName => 102,

            // Crypto (200-299)
            Error::CryptoFailure => 200,

            // Events (300-399)
            Error::BadEvent { .. } => 300,

            // Blobs (400-499)
            Error::CorruptBlob { .. } => 400,
            Error::BlobMissing { .. } => 401,

            // Files (500-599)
            Error::FileAbsent { .. } => 500,

            // Storage (600-699)
            Error::StorageMissing { .. } => 600,
            Error::StorageFailure(_) => 601,
            Error::StorageConflict { .. } => 602,

            // Internal (900-999)
            Error::Internal(_) => 900,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors can potentially be resolved by retrying or by a
    /// corrective write (e.g. re-uploading a missing blob).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::StorageFailure(_) | Error::BlobMissing { .. } | Error::StorageConflict { .. }
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::StorageFailure(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================
