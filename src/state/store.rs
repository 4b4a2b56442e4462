use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::models::{Event, EventPatch};

/// Lifecycle of the most recent fetch. Mutation actions (add, update,
/// remove) never touch this; only fetches do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// The serializable projection: events per group plus load status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventsState {
    #[serde(default)]
    pub events_by_group: HashMap<i64, Vec<Event>>,
    #[serde(default)]
    pub status: LoadStatus,
    #[serde(default)]
    pub error: Option<String>,
}

type Subscriber = Box<dyn Fn(&EventsState) + Send + Sync>;

/// Observable state container.
///
/// Mutations run under a write lock; subscribers are invoked after the lock
/// is released, with a cloned snapshot, so no reader ever observes a
/// partially-updated collection.
pub struct StateStore {
    state: RwLock<EventsState>,
    subscribers: RwLock<Vec<Subscriber>>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(EventsState::default())
    }
}

impl StateStore {
    pub fn new(initial: EventsState) -> Self {
        Self {
            state: RwLock::new(initial),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Register a change observer. It is called with a snapshot after every
    /// mutation, in registration order.
    pub fn subscribe(&self, subscriber: impl Fn(&EventsState) + Send + Sync + 'static) {
        self.subscribers
            .write()
            .expect("subscriber lock poisoned")
            .push(Box::new(subscriber));
    }

    fn mutate(&self, apply: impl FnOnce(&mut EventsState)) {
        let snapshot = {
            let mut state = self.state.write().expect("state lock poisoned");
            apply(&mut state);
            state.clone()
        };
        for subscriber in self
            .subscribers
            .read()
            .expect("subscriber lock poisoned")
            .iter()
        {
            subscriber(&snapshot);
        }
    }

    // ===== Fetch lifecycle =====

    pub fn set_loading(&self) {
        self.mutate(|state| {
            state.status = LoadStatus::Loading;
        });
    }

    pub fn fetch_succeeded(&self, group_id: i64, events: Vec<Event>) {
        self.mutate(|state| {
            state.status = LoadStatus::Succeeded;
            state.error = None;
            state.events_by_group.insert(group_id, events);
        });
    }

    pub fn fetch_failed(&self, message: String) {
        self.mutate(|state| {
            state.status = LoadStatus::Failed;
            state.error = Some(message);
        });
    }

    // ===== Mutation actions =====

    pub fn add_event(&self, group_id: i64, event: Event) {
        self.mutate(|state| {
            state.events_by_group.entry(group_id).or_default().push(event);
        });
    }

    pub fn update_event(&self, group_id: i64, event_id: i64, patch: &EventPatch) {
        self.mutate(|state| {
            if let Some(events) = state.events_by_group.get_mut(&group_id) {
                if let Some(event) = events.iter_mut().find(|ev| ev.id == event_id) {
                    patch.apply_to(event);
                }
            }
        });
    }

    pub fn remove_event(&self, group_id: i64, event_id: i64) {
        self.mutate(|state| {
            if let Some(events) = state.events_by_group.get_mut(&group_id) {
                events.retain(|ev| ev.id != event_id);
            }
        });
    }

    // ===== Cache clearing =====

    /// Reset to `{no events, Idle, no error}`. The repository pairs this
    /// with clearing the persistent cache.
    pub fn clear_all(&self) {
        self.mutate(|state| {
            *state = EventsState::default();
        });
    }

    pub fn clear_group(&self, group_id: i64) {
        self.mutate(|state| {
            state.events_by_group.remove(&group_id);
        });
    }

    // ===== Selectors =====

    pub fn events_for_group(&self, group_id: i64) -> Vec<Event> {
        self.state
            .read()
            .expect("state lock poisoned")
            .events_by_group
            .get(&group_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn load_status(&self) -> LoadStatus {
        self.state.read().expect("state lock poisoned").status
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().expect("state lock poisoned").error.clone()
    }

    pub fn snapshot(&self) -> EventsState {
        self.state.read().expect("state lock poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::models::EventStatus;

    fn event(id: i64) -> Event {
        Event {
            id,
            title: format!("event {}", id),
            description: None,
            start: "2025-03-01T10:00:00".into(),
            end: "2025-03-01T11:00:00".into(),
            participants: vec![],
            status: EventStatus::Approved,
            version: 0,
        }
    }

    #[test]
    fn fetch_lifecycle_drives_status() {
        let store = StateStore::default();
        assert_eq!(store.load_status(), LoadStatus::Idle);

        store.set_loading();
        assert_eq!(store.load_status(), LoadStatus::Loading);

        store.fetch_succeeded(1, vec![event(10)]);
        assert_eq!(store.load_status(), LoadStatus::Succeeded);
        assert_eq!(store.events_for_group(1).len(), 1);

        store.set_loading();
        store.fetch_failed("boom".into());
        assert_eq!(store.load_status(), LoadStatus::Failed);
        assert_eq!(store.error().as_deref(), Some("boom"));
    }

    #[test]
    fn mutation_actions_leave_status_alone() {
        let store = StateStore::default();
        store.fetch_succeeded(1, vec![event(10)]);

        store.add_event(1, event(11));
        store.update_event(
            1,
            10,
            &EventPatch {
                title: Some("renamed".into()),
                version: 0,
                ..Default::default()
            },
        );
        store.remove_event(1, 11);

        assert_eq!(store.load_status(), LoadStatus::Succeeded);
        let events = store.events_for_group(1);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "renamed");
    }

    #[test]
    fn subscribers_see_every_snapshot() {
        let store = StateStore::default();
        let seen: Arc<Mutex<Vec<LoadStatus>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |state| sink.lock().unwrap().push(state.status));

        store.set_loading();
        store.fetch_succeeded(1, vec![]);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![LoadStatus::Loading, LoadStatus::Succeeded]
        );
    }

    #[test]
    fn clear_all_resets_everything() {
        let store = StateStore::default();
        store.fetch_succeeded(1, vec![event(10)]);
        store.fetch_failed("stale error".into());

        store.clear_all();

        assert_eq!(store.snapshot(), EventsState::default());
    }

    #[test]
    fn clear_group_drops_only_that_projection() {
        let store = StateStore::default();
        store.fetch_succeeded(1, vec![event(10)]);
        store.fetch_succeeded(2, vec![event(20)]);

        store.clear_group(1);

        assert!(store.events_for_group(1).is_empty());
        assert_eq!(store.events_for_group(2).len(), 1);
    }

    #[test]
    fn update_unknown_event_is_noop() {
        let store = StateStore::default();
        store.fetch_succeeded(1, vec![event(10)]);
        store.update_event(
            1,
            99,
            &EventPatch {
                title: Some("x".into()),
                version: 0,
                ..Default::default()
            },
        );
        assert_eq!(store.events_for_group(1)[0].title, "event 10");
    }
}
