//! Observable application state.
//!
//! `StateStore` holds the in-memory projection of events per group plus the
//! fetch load status; every mutation notifies subscribers with a consistent
//! snapshot. `StatePersistence` is one such subscriber, mirroring the state
//! to durable storage and rehydrating it on startup.

pub mod persist;
pub mod store;

pub use persist::{StatePersistence, STATE_KEY};
pub use store::{EventsState, LoadStatus, StateStore};
