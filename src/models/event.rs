use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Whether an event is confirmed for the current viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Approved,
    Pending,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Approved => write!(f, "approved"),
            EventStatus::Pending => write!(f, "pending"),
        }
    }
}

/// One calendar entry, as cached and rendered by the client.
///
/// `start`/`end` are ISO 8601 timestamps kept as raw strings; the core never
/// does date arithmetic on them, the calendar view does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub status: EventStatus,
    /// Optimistic-concurrency token, incremented by the server on every
    /// accepted update. Also drives the delta-sync manifest.
    #[serde(default)]
    pub version: u64,
}

/// Event as the server serializes it.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerEvent {
    pub event_id: i64,
    pub event_name: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub version: u64,
}

impl ServerEvent {
    pub fn into_event(self) -> Event {
        Event {
            id: self.event_id,
            title: self.event_name,
            start: self.start_time,
            end: self.end_time,
            description: self.description,
            participants: self.participants,
            status: self.status,
            version: self.version,
        }
    }
}

/// Full-fetch response body: `GET /groups/{id}/events`.
#[derive(Debug, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub events: Vec<ServerEvent>,
}

/// Input for creating a new event. The server assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventDraft {
    pub title: String,
    pub start: String,
    pub end: String,
    pub description: Option<String>,
    pub participants: Vec<String>,
}

impl EventDraft {
    /// Title, start, and end must be non-empty before anything is sent.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::Validation("event title is required".into()));
        }
        if self.start.trim().is_empty() || self.end.trim().is_empty() {
            return Err(ApiError::Validation(
                "event start and end times are required".into(),
            ));
        }
        Ok(())
    }

    /// Build the server-confirmed event from this draft once the server has
    /// assigned an id. New events start at version 0.
    pub fn into_event(self, id: i64) -> Event {
        Event {
            id,
            title: self.title,
            start: self.start,
            end: self.end,
            description: self.description,
            participants: self.participants,
            status: EventStatus::Approved,
            version: 0,
        }
    }
}

/// Partial update for an existing event.
///
/// `version` is mandatory: the server uses it to detect conflicting updates.
/// `None` fields are left untouched when the patch is applied locally and
/// omitted from the wire payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<String>>,
    pub version: u64,
}

impl EventPatch {
    /// Merge the patched fields over an existing event.
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(ref title) = self.title {
            event.title = title.clone();
        }
        if let Some(ref description) = self.description {
            event.description = Some(description.clone());
        }
        if let Some(ref start) = self.start {
            event.start = start.clone();
        }
        if let Some(ref end) = self.end {
            event.end = end.clone();
        }
        if let Some(ref participants) = self.participants {
            event.participants = participants.clone();
        }
    }
}
