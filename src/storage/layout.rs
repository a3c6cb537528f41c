//! # Path Layout
//!
//! Mapping from volume ids and hashes to backend paths. The layout is part
//! of the external on-disk contract:
//!
//! ```text
//! blocks/<64-hex>.bin                 # raw AEAD output IV‖ct‖tag
//! channels/<pubkey-hex>/<64-hex>.json # signed event
//! ```

use crate::crypto::VolumeId;
use crate::encoding::ContentHash;

/// Directory holding content-addressed blobs
pub const BLOCKS_DIR: &str = "blocks";

/// Directory holding per-volume event directories
pub const CHANNELS_DIR: &str = "channels";

/// Extension of event files
pub const EVENT_EXT: &str = ".json";

/// Extension of blob files
pub const BLOB_EXT: &str = ".bin";

/// Event directory for a volume: `channels/<V>`
pub fn events_dir(volume: &VolumeId) -> String {
    format!("{CHANNELS_DIR}/{volume}")
}

/// Event file path: `channels/<V>/<eventId>.json`
pub fn event_path(volume: &VolumeId, event_id: &ContentHash) -> String {
    format!("{CHANNELS_DIR}/{volume}/{event_id}{EVENT_EXT}")
}

/// Blob file path: `blocks/<H>.bin`
pub fn blob_path(hash: &ContentHash) -> String {
    format!("{BLOCKS_DIR}/{hash}{BLOB_EXT}")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SigningKeyPair;

    #[test]
    fn test_layout_shapes() {
        let volume = SigningKeyPair::generate().volume_id();
        let hash = crate::crypto::hash(b"content");

        assert_eq!(events_dir(&volume), format!("channels/{volume}"));
        assert_eq!(
            event_path(&volume, &hash),
            format!("channels/{}/{}.json", volume, hash.to_hex())
        );
        assert_eq!(blob_path(&hash), format!("blocks/{}.bin", hash.to_hex()));
    }
}
