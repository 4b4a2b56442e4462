use std::sync::Arc;

use tracing::{debug, warn};

use crate::storage::Storage;

use super::store::{EventsState, StateStore};

/// Fixed storage key for the persisted state projection.
pub const STATE_KEY: &str = "groupcal_state";

/// Mirrors the state store to durable storage.
///
/// `load` rehydrates the state on startup, falling back to the empty, idle
/// state when nothing was persisted or the blob is unreadable; `attach`
/// subscribes to the store so every change is written back.
pub struct StatePersistence {
    storage: Arc<dyn Storage>,
}

impl StatePersistence {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn load(&self) -> EventsState {
        let Some(raw) = self.storage.get_item(STATE_KEY) else {
            debug!("No persisted state, starting empty");
            return EventsState::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "Discarding unreadable persisted state");
            EventsState::default()
        })
    }

    pub fn attach(&self, store: &StateStore) {
        let storage = Arc::clone(&self.storage);
        store.subscribe(move |state| match serde_json::to_string(state) {
            Ok(raw) => storage.set_item(STATE_KEY, &raw),
            Err(e) => warn!(error = %e, "Failed to serialize state for persistence"),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Event, EventStatus};
    use crate::state::store::LoadStatus;
    use crate::storage::MemoryStorage;

    fn event(id: i64) -> Event {
        Event {
            id,
            title: format!("event {}", id),
            description: Some("notes".into()),
            start: "2025-03-01T10:00:00".into(),
            end: "2025-03-01T11:00:00".into(),
            participants: vec!["ana@example.com".into()],
            status: EventStatus::Pending,
            version: 2,
        }
    }

    #[test]
    fn persisted_state_rehydrates_structurally_equal() {
        let storage = Arc::new(MemoryStorage::new());
        let persistence = StatePersistence::new(storage.clone());

        let store = StateStore::default();
        persistence.attach(&store);
        store.fetch_succeeded(1, vec![event(10), event(11)]);
        store.fetch_succeeded(2, vec![event(20)]);
        let expected = store.snapshot();

        let rehydrated = StatePersistence::new(storage).load();
        assert_eq!(rehydrated, expected);
        assert_eq!(rehydrated.status, LoadStatus::Succeeded);
    }

    #[test]
    fn corrupt_blob_rehydrates_to_default() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(STATE_KEY, "][ not json");

        let state = StatePersistence::new(storage).load();
        assert_eq!(state, EventsState::default());
    }

    #[test]
    fn missing_blob_rehydrates_to_default() {
        let storage = Arc::new(MemoryStorage::new());
        let state = StatePersistence::new(storage).load();
        assert_eq!(state, EventsState::default());
        assert_eq!(state.status, LoadStatus::Idle);
    }

    #[test]
    fn every_change_is_written_through() {
        let storage = Arc::new(MemoryStorage::new());
        let persistence = StatePersistence::new(storage.clone());
        let store = StateStore::default();
        persistence.attach(&store);

        store.set_loading();
        let persisted: EventsState =
            serde_json::from_str(&storage.get_item(STATE_KEY).unwrap()).unwrap();
        assert_eq!(persisted.status, LoadStatus::Loading);

        store.clear_all();
        let persisted: EventsState =
            serde_json::from_str(&storage.get_item(STATE_KEY).unwrap()).unwrap();
        assert_eq!(persisted, EventsState::default());
    }
}
