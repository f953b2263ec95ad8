//! Club event routes.
//!
//! - GET /events - The caller's events, soonest first
//! - POST /events - Create an event, optionally inside a series
//! - GET /events/{id} - One event (public)
//! - DELETE /events/{id} - Delete an event with its notices and documents

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use clubpage_core::{EventId, SeriesId};
use clubpage_store::{EventRow, NewEvent};

use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, ValidJson};
use crate::state::AppState;

/// An event as returned by the API.
#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_id: Option<Uuid>,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub created: DateTime<Utc>,
}

impl From<EventRow> for EventResponse {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            series_id: row.series_id,
            title: row.title,
            starts_at: row.starts_at,
            location: row.location,
            created: row.created,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListEventsResponse {
    pub events: Vec<EventResponse>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub series_id: Option<Uuid>,
}

async fn list_events(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ListEventsResponse>> {
    let rows = state.store().list_events(user.user_id()).await?;
    Ok(Json(ListEventsResponse {
        events: rows.into_iter().map(EventResponse::from).collect(),
    }))
}

async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    ValidJson(request): ValidJson<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<EventResponse>)> {
    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".into()));
    }

    let event = NewEvent {
        id: Uuid::new_v4(),
        owner_id: user.user_id(),
        series_id: request.series_id.map(SeriesId),
        title: request.title,
        starts_at: request.starts_at,
        location: request.location,
    };
    let row = state.store().insert_event(&user.principal, &event).await?;

    tracing::info!(event_id = %row.id, owner = %user.user_id(), "Event created");
    Ok((StatusCode::CREATED, Json(row.into())))
}

async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EventResponse>> {
    let row = state.store().get_event(EventId(id)).await?;
    Ok(Json(row.into()))
}

async fn delete_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .store()
        .delete_event(&user.principal, EventId(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Build event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/{id}", get(get_event).delete(delete_event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_event_body() {
        let body: CreateEventRequest = serde_json::from_str(
            r#"{"title":"Club championship","starts_at":"2026-05-02T09:30:00Z"}"#,
        )
        .unwrap();
        assert!(body.series_id.is_none());
        assert!(body.location.is_none());
    }
}
