use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::Event;
use crate::storage::Storage;

/// Consider a group's cache entry stale after 1 hour.
/// Balances freshness with reducing unnecessary full fetches for calendars
/// that change slowly.
pub const DEFAULT_TTL_MS: i64 = 3_600_000;

/// Storage key prefix for per-group entries.
const CACHE_KEY_PREFIX: &str = "calendar_events_";

/// One group's cached snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub events: Vec<Event>,
    pub timestamp: DateTime<Utc>,
    pub ttl_ms: i64,
}

impl CacheEntry {
    pub fn new(events: Vec<Event>, ttl_ms: i64) -> Self {
        Self {
            events,
            timestamp: Utc::now(),
            ttl_ms,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.timestamp + Duration::milliseconds(self.ttl_ms)
    }
}

/// Per-group, TTL-bounded cache of calendar events on durable storage.
///
/// Clone is cheap; instances share the underlying storage handle. All
/// storage-level failures (unparsable blobs, I/O trouble) are absorbed as
/// cache misses and never surfaced to callers.
#[derive(Clone)]
pub struct CacheStore {
    storage: Arc<dyn Storage>,
}

impl CacheStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    fn key(group_id: i64) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, group_id)
    }

    /// Look up a group's entry. Fails closed: a malformed or expired blob is
    /// removed as a side effect and reported as absent.
    pub fn get(&self, group_id: i64) -> Option<CacheEntry> {
        let key = Self::key(group_id);
        let raw = self.storage.get_item(&key)?;

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(group_id, error = %e, "Discarding unreadable cache entry");
                self.storage.remove_item(&key);
                return None;
            }
        };

        if entry.is_expired() {
            debug!(group_id, "Cache entry expired, evicting");
            self.storage.remove_item(&key);
            return None;
        }

        Some(entry)
    }

    /// Overwrite a group's entry with a fresh timestamp.
    pub fn set(&self, group_id: i64, events: Vec<Event>, ttl_ms: i64) {
        let entry = CacheEntry::new(events, ttl_ms);
        match serde_json::to_string(&entry) {
            Ok(raw) => self.storage.set_item(&Self::key(group_id), &raw),
            Err(e) => warn!(group_id, error = %e, "Failed to serialize cache entry"),
        }
    }

    /// Remove every group's entry. Used on logout.
    pub fn clear_all(&self) {
        for key in self.storage.keys() {
            if key.starts_with(CACHE_KEY_PREFIX) {
                self.storage.remove_item(&key);
            }
        }
    }

    /// Remove one group's entry.
    pub fn clear_group(&self, group_id: i64) {
        self.storage.remove_item(&Self::key(group_id));
    }

    /// Drop one event from a group's entry without touching its timestamp or
    /// TTL. No-op when the entry or the event is absent.
    pub fn remove_event(&self, group_id: i64, event_id: i64) {
        let key = Self::key(group_id);
        let Some(raw) = self.storage.get_item(&key) else {
            return;
        };
        let mut entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(group_id, error = %e, "Skipping event removal from unreadable cache entry");
                return;
            }
        };

        let before = entry.events.len();
        entry.events.retain(|ev| ev.id != event_id);
        if entry.events.len() == before {
            return;
        }

        match serde_json::to_string(&entry) {
            Ok(raw) => self.storage.set_item(&key, &raw),
            Err(e) => warn!(group_id, error = %e, "Failed to serialize cache entry"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventDraft, EventStatus};
    use crate::storage::MemoryStorage;

    fn event(id: i64, version: u64) -> Event {
        Event {
            id,
            title: format!("event {}", id),
            description: None,
            start: "2025-03-01T10:00:00".into(),
            end: "2025-03-01T11:00:00".into(),
            participants: vec![],
            status: EventStatus::Approved,
            version,
        }
    }

    fn store() -> (Arc<MemoryStorage>, CacheStore) {
        let storage = Arc::new(MemoryStorage::new());
        let cache = CacheStore::new(storage.clone());
        (storage, cache)
    }

    #[test]
    fn set_then_get_roundtrips() {
        let (_, cache) = store();
        cache.set(1, vec![event(10, 0), event(11, 2)], DEFAULT_TTL_MS);

        let entry = cache.get(1).expect("fresh entry");
        assert_eq!(entry.events.len(), 2);
        assert_eq!(entry.ttl_ms, DEFAULT_TTL_MS);
        assert_eq!(entry.events[1].version, 2);
        assert!(cache.get(2).is_none());
    }

    #[test]
    fn expired_entry_is_absent_and_evicted() {
        let (storage, cache) = store();

        // Write an entry whose timestamp puts it past its TTL.
        let mut entry = CacheEntry::new(vec![event(1, 0)], 5_000);
        entry.timestamp = Utc::now() - Duration::milliseconds(5_001);
        storage.set_item("calendar_events_7", &serde_json::to_string(&entry).unwrap());

        assert!(cache.get(7).is_none());
        // The read cleared the storage slot.
        assert!(storage.get_item("calendar_events_7").is_none());
    }

    #[test]
    fn corrupt_entry_is_a_miss_and_removed() {
        let (storage, cache) = store();
        storage.set_item("calendar_events_3", "{not json");

        assert!(cache.get(3).is_none());
        assert!(storage.get_item("calendar_events_3").is_none());
    }

    #[test]
    fn remove_event_preserves_timestamp_and_ttl() {
        let (storage, cache) = store();
        cache.set(1, vec![event(10, 0), event(11, 0)], DEFAULT_TTL_MS);
        let before: CacheEntry =
            serde_json::from_str(&storage.get_item("calendar_events_1").unwrap()).unwrap();

        cache.remove_event(1, 10);

        let after: CacheEntry =
            serde_json::from_str(&storage.get_item("calendar_events_1").unwrap()).unwrap();
        assert_eq!(after.timestamp, before.timestamp);
        assert_eq!(after.ttl_ms, before.ttl_ms);
        assert_eq!(after.events.len(), 1);
        assert_eq!(after.events[0].id, 11);
    }

    #[test]
    fn remove_event_is_noop_for_missing_entry_or_event() {
        let (storage, cache) = store();
        cache.remove_event(1, 10); // no entry

        cache.set(1, vec![event(10, 0)], DEFAULT_TTL_MS);
        let before = storage.get_item("calendar_events_1").unwrap();
        cache.remove_event(1, 99); // unknown event
        assert_eq!(storage.get_item("calendar_events_1").unwrap(), before);
    }

    #[test]
    fn clear_all_only_touches_cache_keys() {
        let (storage, cache) = store();
        cache.set(1, vec![event(1, 0)], DEFAULT_TTL_MS);
        cache.set(2, vec![event(2, 0)], DEFAULT_TTL_MS);
        storage.set_item("groupcal_state", "{}");

        cache.clear_all();

        assert!(cache.get(1).is_none());
        assert!(cache.get(2).is_none());
        assert_eq!(storage.get_item("groupcal_state").as_deref(), Some("{}"));
    }

    #[test]
    fn clear_group_removes_exactly_one_group() {
        let (_, cache) = store();
        cache.set(1, vec![event(1, 0)], DEFAULT_TTL_MS);
        cache.set(12, vec![event(2, 0)], DEFAULT_TTL_MS);

        cache.clear_group(1);

        assert!(cache.get(1).is_none());
        // Group 12 shares the "calendar_events_1" prefix but must survive.
        assert!(cache.get(12).is_some());
    }

    #[test]
    fn draft_seeded_entries_roundtrip() {
        let (_, cache) = store();
        let ev = EventDraft {
            title: "Offsite".into(),
            start: "2025-06-01T09:00:00".into(),
            end: "2025-06-01T17:00:00".into(),
            description: Some("annual".into()),
            participants: vec!["ana@example.com".into()],
        }
        .into_event(5);
        cache.set(4, vec![ev.clone()], DEFAULT_TTL_MS);

        assert_eq!(cache.get(4).unwrap().events, vec![ev]);
    }
}
