//! Caller profile.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use uuid::Uuid;

use clubpage_core::Role;

use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::state::AppState;

/// Response for GET /me.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub handle: String,
    pub display_name: String,
    pub role: Role,
}

/// GET /me - The signed-in user as stored.
async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<MeResponse>> {
    let row = state.store().get_user(user.user_id()).await?;
    Ok(Json(MeResponse {
        role: row.role(),
        id: row.id,
        handle: row.handle,
        display_name: row.display_name,
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}
