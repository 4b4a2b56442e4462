//! Event repository: the single path through which the calendar reads and
//! mutates events.
//!
//! Every mutation is write-through: the server commits first, and only on
//! success are the persistent cache and the state store updated. A failed
//! call leaves all previously-committed local state untouched. Concurrent
//! operations on the same group are read-modify-write over the cache entry
//! and are not serialized here; callers needing strict ordering must await
//! one operation before issuing the next.

use std::sync::Arc;

use tracing::debug;

use crate::api::ApiClient;
use crate::cache::{CacheStore, DEFAULT_TTL_MS};
use crate::error::ApiError;
use crate::models::{Event, EventDraft, EventPatch};
use crate::state::StateStore;
use crate::sync::{build_manifest, merge_delta};

/// Result of a read: the events plus whether they were served from the local
/// cache (directly or via incremental sync) instead of a full fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedEvents {
    pub events: Vec<Event>,
    pub from_cache: bool,
}

#[derive(Clone)]
pub struct EventRepository {
    api: ApiClient,
    cache: CacheStore,
    store: Arc<StateStore>,
    default_ttl_ms: i64,
}

impl EventRepository {
    pub fn new(api: ApiClient, cache: CacheStore, store: Arc<StateStore>) -> Self {
        Self {
            api,
            cache,
            store,
            default_ttl_ms: DEFAULT_TTL_MS,
        }
    }

    pub fn with_ttl(mut self, ttl_ms: i64) -> Self {
        self.default_ttl_ms = ttl_ms;
        self
    }

    /// Fetch a group's events. A fresh cache entry is returned as-is with no
    /// network traffic; a miss triggers a full fetch that is written through
    /// to the cache. Drives the store's load status either way.
    pub async fn fetch_events(&self, group_id: i64) -> Result<FetchedEvents, ApiError> {
        self.store.set_loading();
        let result = match self.cache.get(group_id) {
            Some(entry) => {
                debug!(group_id, "Serving events from cache");
                Ok(FetchedEvents {
                    events: entry.events,
                    from_cache: true,
                })
            }
            None => self.full_fetch(group_id).await,
        };
        self.finish_fetch(group_id, result)
    }

    /// The calendar's pull-based data source. With a cached baseline this
    /// runs an incremental sync (version manifest to the delta endpoint,
    /// merge, persist); without one it falls back to a full fetch, since the
    /// diff protocol needs a baseline to diff against.
    pub async fn load_group_events(&self, group_id: i64) -> Result<Vec<Event>, ApiError> {
        self.store.set_loading();
        let result = match self.cache.get(group_id) {
            Some(entry) => self.sync_group(group_id, entry.events, entry.ttl_ms).await,
            None => self.full_fetch(group_id).await,
        };
        self.finish_fetch(group_id, result).map(|f| f.events)
    }

    async fn full_fetch(&self, group_id: i64) -> Result<FetchedEvents, ApiError> {
        let events = self.api.fetch_events(group_id).await?;
        self.cache.set(group_id, events.clone(), self.default_ttl_ms);
        Ok(FetchedEvents {
            events,
            from_cache: false,
        })
    }

    async fn sync_group(
        &self,
        group_id: i64,
        baseline: Vec<Event>,
        ttl_ms: i64,
    ) -> Result<FetchedEvents, ApiError> {
        let manifest = build_manifest(&baseline);
        let delta = self.api.fetch_updates(group_id, &manifest).await?;
        debug!(
            group_id,
            updated = delta.updated.len(),
            deleted = delta.deleted.len(),
            "Merging delta response"
        );
        let merged = merge_delta(baseline, delta);
        // Fresh timestamp, but the entry keeps the TTL it was created with.
        self.cache.set(group_id, merged.clone(), ttl_ms);
        Ok(FetchedEvents {
            events: merged,
            from_cache: true,
        })
    }

    fn finish_fetch(
        &self,
        group_id: i64,
        result: Result<FetchedEvents, ApiError>,
    ) -> Result<FetchedEvents, ApiError> {
        match result {
            Ok(fetched) => {
                self.store.fetch_succeeded(group_id, fetched.events.clone());
                Ok(fetched)
            }
            Err(e) => {
                self.store.fetch_failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Create an event. On success the server-confirmed event (server id,
    /// version 0) is appended to the group's cache entry and to state; a
    /// group with no entry gets a fresh one seeded with the event.
    pub async fn add_event(&self, group_id: i64, draft: EventDraft) -> Result<Event, ApiError> {
        draft.validate()?;
        let event_id = self.api.create_event(group_id, &draft).await?;
        let event = draft.into_event(event_id);

        let (mut events, ttl_ms) = match self.cache.get(group_id) {
            Some(entry) => (entry.events, entry.ttl_ms),
            None => (Vec::new(), self.default_ttl_ms),
        };
        events.push(event.clone());
        self.cache.set(group_id, events, ttl_ms);

        self.store.add_event(group_id, event.clone());
        Ok(event)
    }

    /// Update an event. The patch must carry the caller's last-known
    /// version; a stale one comes back as `ApiError::Conflict` and nothing
    /// is touched locally.
    pub async fn update_event(
        &self,
        group_id: i64,
        event_id: i64,
        patch: EventPatch,
    ) -> Result<(), ApiError> {
        self.api.update_event(group_id, event_id, &patch).await?;

        if let Some(entry) = self.cache.get(group_id) {
            let mut events = entry.events;
            if let Some(event) = events.iter_mut().find(|ev| ev.id == event_id) {
                patch.apply_to(event);
            }
            self.cache.set(group_id, events, entry.ttl_ms);
        }

        self.store.update_event(group_id, event_id, &patch);
        Ok(())
    }

    /// Delete an event on the server, then drop it from cache and state. A
    /// failed deletion leaves both untouched.
    pub async fn remove_event(&self, group_id: i64, event_id: i64) -> Result<(), ApiError> {
        self.api.delete_event(event_id).await?;
        self.cache.remove_event(group_id, event_id);
        self.store.remove_event(group_id, event_id);
        Ok(())
    }

    /// Logout path: clears every group's persistent entry and resets the
    /// state store to `{no events, Idle, no error}`.
    pub fn clear_all_cache(&self) {
        self.cache.clear_all();
        self.store.clear_all();
    }

    /// Drop one group from both the persistent cache and the state store.
    pub fn clear_group_cache(&self, group_id: i64) {
        self.cache.clear_group(group_id);
        self.store.clear_group(group_id);
    }
}
