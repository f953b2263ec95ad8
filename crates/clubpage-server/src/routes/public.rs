//! Public profile page.
//!
//! GET /u/{handle} renders a user's links in order. Social links are shown
//! as one block at the position of the first of them, the same way the
//! editor treats them as one movable slot.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;
use uuid::Uuid;

use clubpage_core::{Slot, collapse};
use clubpage_store::LinkRow;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PublicLink {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

impl From<LinkRow> for PublicLink {
    fn from(row: LinkRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            url: row.url,
            platform: row.platform,
        }
    }
}

/// One rendered block of a profile page.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageBlock {
    Link(PublicLink),
    Social { links: Vec<PublicLink> },
}

#[derive(Debug, Serialize)]
pub struct PublicPageResponse {
    pub handle: String,
    pub display_name: String,
    pub blocks: Vec<PageBlock>,
}

/// Group ordered link rows into page blocks.
fn blocks(rows: Vec<LinkRow>) -> Vec<PageBlock> {
    let order: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let social: Vec<Uuid> = rows
        .iter()
        .filter(|row| row.is_social())
        .map(|row| row.id)
        .collect();
    let mut by_id: HashMap<Uuid, LinkRow> = rows.into_iter().map(|row| (row.id, row)).collect();

    collapse(&order, &social)
        .into_iter()
        .filter_map(|slot| match slot {
            Slot::Single(id) => by_id.remove(&id).map(|row| PageBlock::Link(row.into())),
            Slot::Group(members) => Some(PageBlock::Social {
                links: members
                    .iter()
                    .filter_map(|id| by_id.remove(id))
                    .map(PublicLink::from)
                    .collect(),
            }),
        })
        .collect()
}

async fn public_page(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> ApiResult<Json<PublicPageResponse>> {
    let user = state
        .store()
        .get_user_by_handle(&handle)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No page for '{}'", handle)))?;

    let rows = state.store().list_links(user.user_id()).await?;
    Ok(Json(PublicPageResponse {
        handle: user.handle,
        display_name: user.display_name,
        blocks: blocks(rows),
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/u/{handle}", get(public_page))
}
