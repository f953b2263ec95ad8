//! Event series routes.
//!
//! - GET /series - The caller's series
//! - POST /series - Create a series

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use clubpage_store::{NewSeries, SeriesRow};

use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, ValidJson};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub created: DateTime<Utc>,
}

impl From<SeriesRow> for SeriesResponse {
    fn from(row: SeriesRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            created: row.created,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListSeriesResponse {
    pub series: Vec<SeriesResponse>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSeriesRequest {
    pub name: String,
}

async fn list_series(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ListSeriesResponse>> {
    let rows = state.store().list_series(user.user_id()).await?;
    Ok(Json(ListSeriesResponse {
        series: rows.into_iter().map(SeriesResponse::from).collect(),
    }))
}

async fn create_series(
    State(state): State<AppState>,
    user: AuthUser,
    ValidJson(request): ValidJson<CreateSeriesRequest>,
) -> ApiResult<(StatusCode, Json<SeriesResponse>)> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".into()));
    }

    let row = state
        .store()
        .insert_series(&NewSeries::new(user.user_id(), name.to_string()))
        .await?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// Build series routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/series", get(list_series).post(create_series))
}
