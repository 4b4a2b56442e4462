//! Typed calls against the group-calendar endpoints.
//!
//! All methods translate the server's wire shapes into domain types and its
//! failure modes into `ApiError`. Some endpoints report failure with a 200
//! and an `{error: ...}` body; both paths land in the same mapping.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::models::{Event, EventDraft, EventPatch, EventsResponse, ServerEvent};
use crate::sync::{Delta, ManifestEntry};

use super::{Method, Transport, TransportResponse};

/// Error message the server uses for stale-version rejections.
const CONFLICT_MESSAGE: &str = "Conflicting Update";

/// Clone is cheap; instances share the transport handle.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

#[derive(Serialize)]
struct CreatePayload<'a> {
    #[serde(flatten)]
    draft: &'a EventDraft,
    group_id: i64,
}

#[derive(Serialize)]
struct UpdatePayload<'a> {
    #[serde(flatten)]
    patch: &'a EventPatch,
    group_id: i64,
}

#[derive(serde::Deserialize)]
struct DeltaResponse {
    #[serde(default)]
    updated_events: Vec<ServerEvent>,
    #[serde(default)]
    deleted_events: Vec<i64>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    fn error_from(response: &TransportResponse) -> ApiError {
        let message = response
            .body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("server returned status {}", response.status));
        if response.status == 409 || message == CONFLICT_MESSAGE {
            ApiError::Conflict(message)
        } else {
            ApiError::Server(message)
        }
    }

    fn check(response: TransportResponse) -> Result<TransportResponse, ApiError> {
        if !response.ok() || response.body.get("error").is_some() {
            return Err(Self::error_from(&response));
        }
        Ok(response)
    }

    fn parse<T: serde::de::DeserializeOwned>(body: Value, what: &str) -> Result<T, ApiError> {
        serde_json::from_value(body)
            .map_err(|e| ApiError::Server(format!("unexpected {} payload: {}", what, e)))
    }

    /// Full fetch: `GET /groups/{id}/events`.
    pub async fn fetch_events(&self, group_id: i64) -> Result<Vec<Event>, ApiError> {
        let response = self
            .transport
            .request(Method::Get, &format!("/groups/{}/events", group_id), None)
            .await?;
        let response = Self::check(response)?;
        let parsed: EventsResponse = Self::parse(response.body, "events")?;
        Ok(parsed
            .events
            .into_iter()
            .map(ServerEvent::into_event)
            .collect())
    }

    /// Delta fetch: `POST /groups/{id}/updates` with a version manifest.
    /// An empty manifest is still sent; the server may hold events the
    /// client has never seen.
    pub async fn fetch_updates(
        &self,
        group_id: i64,
        manifest: &[ManifestEntry],
    ) -> Result<Delta, ApiError> {
        let response = self
            .transport
            .request(
                Method::Post,
                &format!("/groups/{}/updates", group_id),
                Some(json!({ "events": manifest })),
            )
            .await?;
        let response = Self::check(response)?;
        let parsed: DeltaResponse = Self::parse(response.body, "updates")?;
        Ok(Delta {
            updated: parsed
                .updated_events
                .into_iter()
                .map(ServerEvent::into_event)
                .collect(),
            deleted: parsed.deleted_events,
        })
    }

    /// Create: `POST /groups/add_event`. Returns the server-assigned id.
    pub async fn create_event(&self, group_id: i64, draft: &EventDraft) -> Result<i64, ApiError> {
        let payload = serde_json::to_value(CreatePayload { draft, group_id })
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        let response = self
            .transport
            .request(Method::Post, "/groups/add_event", Some(payload))
            .await?;
        let response = Self::check(response)?;
        response
            .body
            .get("event_id")
            .and_then(Value::as_i64)
            .ok_or_else(|| ApiError::Server("create response carried no event_id".into()))
    }

    /// Update: `PUT /groups/update_event/{id}`. The patch carries the
    /// caller's last-known version; the server rejects stale ones with 409.
    pub async fn update_event(
        &self,
        group_id: i64,
        event_id: i64,
        patch: &EventPatch,
    ) -> Result<(), ApiError> {
        let payload = serde_json::to_value(UpdatePayload { patch, group_id })
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        let response = self
            .transport
            .request(
                Method::Put,
                &format!("/groups/update_event/{}", event_id),
                Some(payload),
            )
            .await?;
        Self::check(response)?;
        Ok(())
    }

    /// Delete: `DELETE /groups/remove_event/{id}`.
    pub async fn delete_event(&self, event_id: i64) -> Result<(), ApiError> {
        let response = self
            .transport
            .request(
                Method::Delete,
                &format!("/groups/remove_event/{}", event_id),
                None,
            )
            .await?;
        Self::check(response)?;
        Ok(())
    }
}
