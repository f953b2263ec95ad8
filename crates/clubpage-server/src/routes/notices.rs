//! Event notice board routes.
//!
//! - GET /events/{id}/notices - Notices in sequence order (public)
//! - POST /events/{id}/notices - Append a notice (event owner)
//! - PUT /notices/{id} - Move one notice to a new sequence index
//! - DELETE /notices/{id} - Remove a notice, closing the gap

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use clubpage_core::{EntityKind, EventId, ReorderRequest, Scope};
use clubpage_store::{NewNotice, NoticeRow};

use crate::error::{ApiError, ApiResult};
use crate::events::ChangeCause;
use crate::extract::{AuthUser, ValidJson};
use crate::routes::reorder::{self, ReorderResponse};
use crate::state::AppState;

/// A notice as returned by the API.
#[derive(Debug, Serialize)]
pub struct NoticeResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    pub title: String,
    pub body: String,
    pub sequence: i32,
    pub created: DateTime<Utc>,
}

impl From<NoticeRow> for NoticeResponse {
    fn from(row: NoticeRow) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            title: row.title,
            body: row.body,
            sequence: row.sequence,
            created: row.created,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListNoticesResponse {
    pub notices: Vec<NoticeResponse>,
}

#[derive(Debug, Deserialize)]
pub struct CreateNoticeRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Request body for PUT /notices/{id}.
#[derive(Debug, Deserialize)]
pub struct MoveNoticeRequest {
    pub sequence: u32,
}

async fn list_notices(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> ApiResult<Json<ListNoticesResponse>> {
    let event_id = EventId(event_id);
    state.store().get_event(event_id).await?;
    let rows = state.store().list_notices(event_id).await?;
    Ok(Json(ListNoticesResponse {
        notices: rows.into_iter().map(NoticeResponse::from).collect(),
    }))
}

async fn create_notice(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
    ValidJson(request): ValidJson<CreateNoticeRequest>,
) -> ApiResult<(StatusCode, Json<NoticeResponse>)> {
    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".into()));
    }

    let event_id = EventId(event_id);
    let row = state
        .store()
        .insert_notice(
            &user.principal,
            event_id,
            &NewNotice::new(request.title, request.body),
        )
        .await?;

    state
        .broadcaster()
        .publish_change(
            EntityKind::Notice,
            Scope::Event(event_id),
            ChangeCause::Added,
            Some(row.id),
            Vec::new(),
        )
        .await;

    Ok((StatusCode::CREATED, Json(row.into())))
}

/// PUT /notices/{id}
///
/// Body `{sequence}`: the notice's new index within its event. Indexes past
/// the end move the notice to the end.
///
/// - 200: `{success, updates}`
/// - 400: caller does not manage the event
/// - 404: notice not found
async fn move_notice(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(request): ValidJson<MoveNoticeRequest>,
) -> ApiResult<Json<ReorderResponse>> {
    let notice = state.store().get_notice(id).await?;
    let scope = notice.ordered_item().scope;

    let response = reorder::apply(
        &state,
        &user,
        scope,
        ReorderRequest::Notice {
            id,
            sequence: request.sequence,
        },
    )
    .await?;
    Ok(Json(response))
}

async fn delete_notice(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let row = state.store().delete_notice(&user.principal, id).await?;

    state
        .broadcaster()
        .publish_change(
            EntityKind::Notice,
            row.ordered_item().scope,
            ChangeCause::Removed,
            Some(row.id),
            Vec::new(),
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// Build notice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events/{id}/notices", get(list_notices).post(create_notice))
        .route("/notices/{id}", put(move_notice).delete(delete_notice))
}
