//! Composition root: wires storage, cache, transport, repository, state, and
//! persistence together behind the surface the UI layer consumes.

use std::sync::Arc;

use anyhow::Result;

use crate::api::{ApiClient, HttpTransport, Transport};
use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::ApiError;
use crate::models::{Event, EventDraft, EventPatch};
use crate::repository::{EventRepository, FetchedEvents};
use crate::state::{EventsState, LoadStatus, StatePersistence, StateStore};
use crate::storage::{FileStorage, Storage};

/// The client facade handed to the presentation layer.
///
/// Construction rehydrates the state store from durable storage and attaches
/// the persistence subscriber, so every state change from then on is
/// mirrored back automatically.
pub struct CalendarClient {
    repository: EventRepository,
    store: Arc<StateStore>,
}

impl CalendarClient {
    /// Production wiring: file-backed storage and an HTTP transport, both
    /// derived from the configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(config.data_dir()?)?);
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config.server_url)?);
        Ok(Self::with_parts(transport, storage, config))
    }

    /// Fully injected wiring, for tests and non-default substrates (an
    /// embedded key-value store, a scripted transport, ...).
    pub fn with_parts(
        transport: Arc<dyn Transport>,
        storage: Arc<dyn Storage>,
        config: &Config,
    ) -> Self {
        let cache = CacheStore::new(Arc::clone(&storage));
        let persistence = StatePersistence::new(storage);
        let store = Arc::new(StateStore::new(persistence.load()));
        persistence.attach(&store);

        let repository = EventRepository::new(ApiClient::new(transport), cache, store.clone())
            .with_ttl(config.cache_ttl_ms);

        Self { repository, store }
    }

    // ===== Operations =====

    pub async fn fetch_events(&self, group_id: i64) -> Result<FetchedEvents, ApiError> {
        self.repository.fetch_events(group_id).await
    }

    /// Pull-based data source for the calendar view: serves from cache with
    /// an incremental sync when a baseline exists, full-fetches otherwise.
    pub async fn load_group_events(&self, group_id: i64) -> Result<Vec<Event>, ApiError> {
        self.repository.load_group_events(group_id).await
    }

    pub async fn add_event(&self, group_id: i64, draft: EventDraft) -> Result<Event, ApiError> {
        self.repository.add_event(group_id, draft).await
    }

    pub async fn update_event(
        &self,
        group_id: i64,
        event_id: i64,
        patch: EventPatch,
    ) -> Result<(), ApiError> {
        self.repository.update_event(group_id, event_id, patch).await
    }

    pub async fn remove_event(&self, group_id: i64, event_id: i64) -> Result<(), ApiError> {
        self.repository.remove_event(group_id, event_id).await
    }

    pub fn clear_all_cache(&self) {
        self.repository.clear_all_cache();
    }

    pub fn clear_group_cache(&self, group_id: i64) {
        self.repository.clear_group_cache(group_id);
    }

    // ===== Selectors =====

    pub fn events_for_group(&self, group_id: i64) -> Vec<Event> {
        self.store.events_for_group(group_id)
    }

    pub fn load_status(&self) -> LoadStatus {
        self.store.load_status()
    }

    pub fn error(&self) -> Option<String> {
        self.store.error()
    }

    pub fn state(&self) -> EventsState {
        self.store.snapshot()
    }
}
