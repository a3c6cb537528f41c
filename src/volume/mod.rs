//! # Volume Engine
//!
//! Materialization: folding the set of valid signed events into the current
//! file map.
//!
//! ## Fold Semantics
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        MATERIALIZATION                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  1. Enumerate event ids under channels/<V>/                            │
//! │  2. Read + verify each event; failures are logged and skipped,         │
//! │     never fatal for the volume                                         │
//! │  3. Fold the surviving set E, per file name f:                         │
//! │                                                                         │
//! │     • any DELETE_FILE for f in E  ──►  f is absent (tombstone wins     │
//! │       over every create, regardless of discovery order)                │
//! │     • otherwise the CREATE_FILE with the lexicographically smallest    │
//! │       event id wins (hex comparison = byte comparison)                 │
//! │                                                                         │
//! │  Events carry no timestamps and no chain links, so the fold must be    │
//! │  a function of the *set* alone; both rules above are content-derived   │
//! │  and reproduce bit-identically on every client.                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::channel::ChannelStore;
use crate::crypto::VolumeId;
use crate::error::{Error, Result};
use crate::events::engine::verify_event;
use crate::events::{EventId, EventPayload, EventType};

/// One live file in the materialized state
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Id of the winning CREATE_FILE event
    pub event_id: EventId,
    /// The winning event's payload (content address and wrapped key)
    pub payload: EventPayload,
}

/// The materialized state of a volume
#[derive(Debug, Default)]
pub struct Materialized {
    /// Live files keyed by name; iteration order is code-point order
    pub files: BTreeMap<String, FileEntry>,
    /// Number of events rejected during verification
    pub rejected: usize,
}

/// Fold a volume's event log into its file map
///
/// Deterministic as a function of the set of valid events: replaying the
/// same log on any client yields a byte-identical map. Individual bad
/// events (unparseable, wrong id, bad signature) are dropped with a
/// warning; backend failures other than a missing path propagate.
pub async fn materialize(
    channel: &ChannelStore<'_>,
    volume: &VolumeId,
) -> Result<Materialized> {
    let public_key = volume.verifying_key()?;
    let event_ids = channel.list_event_ids(volume).await?;

    let mut tombstones: BTreeSet<String> = BTreeSet::new();
    let mut winners: BTreeMap<String, FileEntry> = BTreeMap::new();
    let mut rejected = 0usize;

    for event_id in event_ids {
        let event = match channel.read_event(volume, &event_id).await {
            Ok(event) => event,
            Err(Error::BadEvent { .. }) | Err(Error::StorageMissing { .. }) => {
                warn!(volume = %volume, event = %event_id, "dropping unreadable event");
                rejected += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        if !verify_event(&event, &event_id, &public_key) {
            warn!(volume = %volume, event = %event_id, "dropping event that failed verification");
            rejected += 1;
            continue;
        }

        match event.payload.event_type {
            EventType::DeleteFile => {
                tombstones.insert(event.payload.file_name.clone());
            }
            EventType::CreateFile => {
                let name = event.payload.file_name.clone();
                let entry = FileEntry {
                    event_id,
                    payload: event.payload,
                };
                // Smallest event id wins; ContentHash orders byte-wise,
                // which equals hex-lexicographic order.
                let replace = match winners.get(&name) {
                    Some(current) => entry.event_id < current.event_id,
                    None => true,
                };
                if replace {
                    winners.insert(name, entry);
                }
            }
        }
    }

    for name in &tombstones {
        if winners.remove(name).is_some() {
            debug!(volume = %volume, file = %name, "tombstone removed file from state");
        }
    }

    Ok(Materialized {
        files: winners,
        rejected,
    })
}

// ============================================================================
// TESTS
// ============================================================================
