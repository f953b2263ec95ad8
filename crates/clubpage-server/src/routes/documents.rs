//! Event and series document routes.
//!
//! - GET/POST /events/{id}/documents
//! - GET/POST /series/{id}/documents
//! - PUT /documents/{id} - Move one document to a new order index
//! - DELETE /documents/{id}

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use clubpage_core::{EntityKind, EventId, ReorderRequest, Scope, SeriesId};
use clubpage_store::{DocumentRow, NewDocument, StoreError};

use crate::error::{ApiError, ApiResult};
use crate::events::ChangeCause;
use crate::extract::{AuthUser, ValidJson};
use crate::routes::reorder::{self, ReorderResponse};
use crate::state::AppState;

/// A document as returned by the API.
#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_id: Option<Uuid>,
    pub title: String,
    pub file_url: String,
    pub order: i32,
    pub created: DateTime<Utc>,
}

impl From<DocumentRow> for DocumentResponse {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            series_id: row.series_id,
            title: row.title,
            file_url: row.file_url,
            order: row.order,
            created: row.created,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListDocumentsResponse {
    pub documents: Vec<DocumentResponse>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub file_url: String,
}

/// Request body for PUT /documents/{id}.
#[derive(Debug, Deserialize)]
pub struct MoveDocumentRequest {
    pub order: u32,
}

fn scope_of(row: &DocumentRow) -> ApiResult<Scope> {
    row.scope().ok_or_else(|| {
        ApiError::Internal(format!("document {} has no event or series", row.id))
    })
}

async fn list_in(state: &AppState, scope: Scope) -> ApiResult<Json<ListDocumentsResponse>> {
    match scope {
        Scope::Event(id) => {
            state.store().get_event(id).await?;
        }
        Scope::Series(id) => {
            state.store().get_series(id).await?;
        }
        Scope::User(_) => {}
    }

    let rows = state.store().list_documents(scope).await?;
    Ok(Json(ListDocumentsResponse {
        documents: rows.into_iter().map(DocumentResponse::from).collect(),
    }))
}

async fn create_in(
    state: &AppState,
    user: &AuthUser,
    scope: Scope,
    request: CreateDocumentRequest,
) -> ApiResult<(StatusCode, Json<DocumentResponse>)> {
    if request.title.trim().is_empty() || request.file_url.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "title and file_url must not be empty".into(),
        ));
    }

    let row = state
        .store()
        .insert_document(
            &user.principal,
            scope,
            &NewDocument::new(request.title, request.file_url),
        )
        .await?;

    state
        .broadcaster()
        .publish_change(
            EntityKind::Document,
            scope,
            ChangeCause::Added,
            Some(row.id),
            Vec::new(),
        )
        .await;

    Ok((StatusCode::CREATED, Json(row.into())))
}

async fn list_event_documents(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ListDocumentsResponse>> {
    list_in(&state, Scope::Event(EventId(id))).await
}

async fn list_series_documents(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ListDocumentsResponse>> {
    list_in(&state, Scope::Series(SeriesId(id))).await
}

async fn create_event_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(request): ValidJson<CreateDocumentRequest>,
) -> ApiResult<(StatusCode, Json<DocumentResponse>)> {
    create_in(&state, &user, Scope::Event(EventId(id)), request).await
}

async fn create_series_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(request): ValidJson<CreateDocumentRequest>,
) -> ApiResult<(StatusCode, Json<DocumentResponse>)> {
    create_in(&state, &user, Scope::Series(SeriesId(id)), request).await
}

/// PUT /documents/{id}
///
/// Body `{order}`: the document's new index within its event or series.
///
/// - 200: `{success, updates}`
/// - 400: caller does not manage the scope
/// - 404: document not found
async fn move_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(request): ValidJson<MoveDocumentRequest>,
) -> ApiResult<Json<ReorderResponse>> {
    let document = state.store().get_document(id).await?;
    let scope = scope_of(&document)?;

    let response = reorder::apply(
        &state,
        &user,
        scope,
        ReorderRequest::Document {
            id,
            order: request.order,
        },
    )
    .await?;
    Ok(Json(response))
}

async fn delete_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let row = match state.store().delete_document(&user.principal, id).await {
        Ok(row) => row,
        Err(StoreError::InvalidInput(message)) => return Err(ApiError::Internal(message)),
        Err(other) => return Err(other.into()),
    };
    let scope = scope_of(&row)?;

    state
        .broadcaster()
        .publish_change(
            EntityKind::Document,
            scope,
            ChangeCause::Removed,
            Some(row.id),
            Vec::new(),
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// Build document routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/events/{id}/documents",
            get(list_event_documents).post(create_event_document),
        )
        .route(
            "/series/{id}/documents",
            get(list_series_documents).post(create_series_document),
        )
        .route("/documents/{id}", put(move_document).delete(delete_document))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_of_row() {
        let series = Uuid::new_v4();
        let row = DocumentRow {
            id: Uuid::new_v4(),
            event_id: None,
            series_id: Some(series),
            title: "Notice of race".into(),
            file_url: "https://files.example/nor.pdf".into(),
            order: 0,
            created: Utc::now(),
        };
        assert_eq!(scope_of(&row).unwrap(), Scope::Series(SeriesId(series)));

        let response = DocumentResponse::from(row);
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("event_id"));
        assert!(json.contains(r#""order":0"#));
    }
}
