//! Profile link routes.
//!
//! - GET /links - The caller's links in order
//! - POST /links - Append a link (standard or social)
//! - PATCH /links/{id} - Edit title or URL
//! - DELETE /links/{id} - Remove a link, closing the gap
//! - PUT /links/order - Reorder the whole list

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, put},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use clubpage_core::{EntityKind, LinkKind, LinkOrder, ReorderRequest, Scope};
use clubpage_store::{LinkPatch, LinkRow, NewLink};

use crate::error::{ApiError, ApiResult};
use crate::events::ChangeCause;
use crate::extract::{AuthUser, ValidJson};
use crate::routes::reorder::{self, ReorderResponse};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// A link as returned by the API.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub kind: LinkKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    pub order: i32,
    pub created: DateTime<Utc>,
}

impl From<LinkRow> for LinkResponse {
    fn from(row: LinkRow) -> Self {
        Self {
            kind: row.kind(),
            id: row.id,
            title: row.title,
            url: row.url,
            platform: row.platform,
            order: row.order,
            created: row.created,
        }
    }
}

/// Response for GET /links.
#[derive(Debug, Serialize)]
pub struct ListLinksResponse {
    pub links: Vec<LinkResponse>,
}

/// Request body for POST /links.
#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    /// Required for standard links; defaults to the platform for social ones.
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
    #[serde(default)]
    pub kind: LinkKind,
    /// Social platform name, required when `kind` is "social".
    #[serde(default)]
    pub platform: Option<String>,
}

impl CreateLinkRequest {
    fn into_new_link(self) -> ApiResult<NewLink> {
        if self.url.trim().is_empty() {
            return Err(ApiError::BadRequest("url must not be empty".into()));
        }

        match self.kind {
            LinkKind::Social => {
                let platform = self
                    .platform
                    .filter(|p| !p.trim().is_empty())
                    .ok_or_else(|| {
                        ApiError::BadRequest("social links need a platform".into())
                    })?;
                let mut link = NewLink::social(platform, self.url);
                if let Some(title) = self.title {
                    link.title = title;
                }
                Ok(link)
            }
            LinkKind::Standard => {
                let title = self
                    .title
                    .filter(|t| !t.trim().is_empty())
                    .ok_or_else(|| ApiError::BadRequest("title must not be empty".into()))?;
                Ok(NewLink::new(title, self.url))
            }
        }
    }
}

/// Request body for PATCH /links/{id}.
#[derive(Debug, Deserialize)]
pub struct UpdateLinkRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Request body for PUT /links/order.
#[derive(Debug, Deserialize)]
pub struct LinksOrderRequest {
    pub links: Vec<LinkOrder>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /links
async fn list_links(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ListLinksResponse>> {
    let rows = state.store().list_links(user.user_id()).await?;
    Ok(Json(ListLinksResponse {
        links: rows.into_iter().map(LinkResponse::from).collect(),
    }))
}

/// POST /links
async fn create_link(
    State(state): State<AppState>,
    user: AuthUser,
    ValidJson(request): ValidJson<CreateLinkRequest>,
) -> ApiResult<(StatusCode, Json<LinkResponse>)> {
    let link = request.into_new_link()?;
    let row = state.store().insert_link(&user.principal, &link).await?;

    state
        .broadcaster()
        .publish_change(
            EntityKind::Link,
            Scope::User(user.user_id()),
            ChangeCause::Added,
            Some(row.id),
            Vec::new(),
        )
        .await;

    Ok((StatusCode::CREATED, Json(row.into())))
}

/// PATCH /links/{id}
async fn update_link(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(request): ValidJson<UpdateLinkRequest>,
) -> ApiResult<Json<LinkResponse>> {
    let patch = LinkPatch {
        title: request.title,
        url: request.url,
    };
    let row = state
        .store()
        .update_link(&user.principal, id, &patch)
        .await?;
    Ok(Json(row.into()))
}

/// DELETE /links/{id}
async fn delete_link(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let row = state.store().delete_link(&user.principal, id).await?;

    state
        .broadcaster()
        .publish_change(
            EntityKind::Link,
            row.ordered_item().scope,
            ChangeCause::Removed,
            Some(row.id),
            Vec::new(),
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /links/order
///
/// Body `{links: [{id, order}]}` covering every link of the caller.
///
/// - 200: `{success, updates}`
/// - 400: not a permutation of the caller's links, gaps, duplicates
/// - 401: no valid identity
async fn reorder_links(
    State(state): State<AppState>,
    user: AuthUser,
    ValidJson(request): ValidJson<LinksOrderRequest>,
) -> ApiResult<Json<ReorderResponse>> {
    let scope = Scope::User(user.user_id());
    let response = reorder::apply(
        &state,
        &user,
        scope,
        ReorderRequest::Links {
            links: request.links,
        },
    )
    .await?;
    Ok(Json(response))
}

/// Build link routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links).post(create_link))
        .route("/links/order", put(reorder_links))
        .route("/links/{id}", patch(update_link).delete(delete_link))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_link_needs_title() {
        let request = CreateLinkRequest {
            title: Some("  ".into()),
            url: "https://club.example".into(),
            kind: LinkKind::Standard,
            platform: None,
        };
        assert!(request.into_new_link().is_err());
    }

    #[test]
    fn test_social_link_takes_platform_as_title() {
        let request = CreateLinkRequest {
            title: None,
            url: "https://instagram.com/club".into(),
            kind: LinkKind::Social,
            platform: Some("instagram".into()),
        };
        let link = request.into_new_link().unwrap();
        assert_eq!(link.title, "instagram");
        assert_eq!(link.kind, LinkKind::Social);
    }

    #[test]
    fn test_social_link_needs_platform() {
        let request: CreateLinkRequest =
            serde_json::from_str(r#"{"url":"https://x.example","kind":"social"}"#).unwrap();
        assert!(request.into_new_link().is_err());
    }

    #[test]
    fn test_order_body_shape() {
        let id = Uuid::new_v4();
        let body: LinksOrderRequest =
            serde_json::from_str(&format!(r#"{{"links":[{{"id":"{}","order":0}}]}}"#, id))
                .unwrap();
        assert_eq!(body.links, vec![LinkOrder { id, order: 0 }]);
    }
}
