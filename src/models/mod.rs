//! Domain types for calendar events.
//!
//! `Event` is the internal shape used by the cache, the state store, and the
//! repository. The server's wire shape (`event_id`, `event_name`,
//! `start_time`, ...) is confined to `ServerEvent` and converted at the API
//! boundary.

pub mod event;

pub use event::{Event, EventDraft, EventPatch, EventStatus, EventsResponse, ServerEvent};
