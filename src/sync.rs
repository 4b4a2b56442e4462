//! Version-diff synchronization.
//!
//! Instead of refetching a group's whole calendar, the client sends the
//! server a manifest of `(event_id, known_version)` pairs and receives only
//! the events that changed plus the ids that disappeared. The merge here is
//! pure so it can be tested without any transport.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::models::Event;

/// One manifest line: the event and the version the client holds for it.
/// The server calls the version field `cache_number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub event_id: i64,
    pub cache_number: u64,
}

/// What changed since the manifest's versions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delta {
    pub updated: Vec<Event>,
    pub deleted: Vec<i64>,
}

/// Emit `(event_id, known_version)` for every cached event. An empty slice
/// yields an empty manifest, which is still worth sending: the server may
/// hold events the client has never seen.
pub fn build_manifest(events: &[Event]) -> Vec<ManifestEntry> {
    events
        .iter()
        .map(|ev| ManifestEntry {
            event_id: ev.id,
            cache_number: ev.version,
        })
        .collect()
}

/// Merge a delta response into the cached working set.
///
/// Deleted ids are dropped (ids the client never had are ignored). An
/// updated record replaces the local copy wholesale, but only when its
/// version is strictly newer: a delta response that arrives out of order
/// must not regress a fresher local event. Updated ids with no local
/// counterpart are inserted.
pub fn merge_delta(events: Vec<Event>, delta: Delta) -> Vec<Event> {
    let deleted: HashSet<i64> = delta.deleted.into_iter().collect();
    let mut merged: Vec<Event> = events
        .into_iter()
        .filter(|ev| !deleted.contains(&ev.id))
        .collect();

    for incoming in delta.updated {
        match merged.iter_mut().find(|ev| ev.id == incoming.id) {
            Some(existing) => {
                if incoming.version > existing.version {
                    *existing = incoming;
                } else {
                    debug!(
                        event_id = existing.id,
                        local = existing.version,
                        remote = incoming.version,
                        "Ignoring delta entry not newer than local copy"
                    );
                }
            }
            None => merged.push(incoming),
        }
    }

    merged
}
