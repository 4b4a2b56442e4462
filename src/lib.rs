//! groupcal-core - client-side cache and sync engine for shared group
//! calendars.
//!
//! The crate keeps a per-group, TTL-bounded persistent cache of calendar
//! events and reconciles it against the server with per-event version
//! numbers, so repeat reads cost nothing and refreshes transfer only what
//! changed. All mutations are write-through: the server commits first, then
//! the cache and the observable state store are updated, and a persistence
//! bridge mirrors the state to durable storage across restarts.
//!
//! UI concerns (forms, modals, routing) and auth live outside this crate;
//! they consume [`CalendarClient`] and its selectors.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod state;
pub mod storage;
pub mod sync;

pub use client::CalendarClient;
pub use config::Config;
pub use error::ApiError;
pub use models::{Event, EventDraft, EventPatch, EventStatus};
pub use repository::{EventRepository, FetchedEvents};
pub use state::{EventsState, LoadStatus, StateStore};
pub use storage::Storage;
