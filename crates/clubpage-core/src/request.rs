//! Reorder payloads.
//!
//! The three endpoints take differently shaped bodies: the link list is sent
//! whole, notices and documents send the new index of the one moved item.
//! `ReorderRequest` is the single tagged union covering all of them, and every
//! variant resolves through the same engine call.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::ReorderError;
use crate::reorder::{Move, ReorderOutcome, Reordered, reorder};
use crate::types::{EntityKind, PositionUpdate};

/// One element of the `PUT /links/order` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkOrder {
    pub id: Uuid,
    pub order: u32,
}

impl From<PositionUpdate> for LinkOrder {
    fn from(update: PositionUpdate) -> Self {
        Self {
            id: update.id,
            order: update.position,
        }
    }
}

/// A reorder instruction as it travels between client and server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReorderRequest {
    /// Full link list with new orders.
    Links { links: Vec<LinkOrder> },
    /// New sequence index of one notice within its event.
    Notice { id: Uuid, sequence: u32 },
    /// New order index of one document within its event or series.
    Document { id: Uuid, order: u32 },
}

impl ReorderRequest {
    /// Entity kind addressed by this request.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Links { .. } => EntityKind::Link,
            Self::Notice { .. } => EntityKind::Notice,
            Self::Document { .. } => EntityKind::Document,
        }
    }

    /// Resolve against the current order of the scope.
    ///
    /// A link list must be a permutation of `current` with dense orders. Notice
    /// and document requests are drag-and-drop repositions.
    pub fn resolve(&self, current: &[Uuid]) -> Result<ReorderOutcome<Uuid>, ReorderError> {
        match self {
            Self::Links { links } => resolve_full_list(links, current),
            Self::Notice { id, sequence } => reorder(current, &Move::to(*id, *sequence as usize)),
            Self::Document { id, order } => reorder(current, &Move::to(*id, *order as usize)),
        }
    }

    /// Build the payload a client sends after moving `moved` locally.
    ///
    /// `moved` may be `None` only for links, where the whole list is sent
    /// (for example when the social group was moved).
    pub fn for_move(
        kind: EntityKind,
        reordered: &Reordered<Uuid>,
        moved: Option<&Uuid>,
    ) -> Result<Self, ReorderError> {
        if kind == EntityKind::Link {
            return Ok(Self::Links {
                links: reordered
                    .full_updates()
                    .into_iter()
                    .map(LinkOrder::from)
                    .collect(),
            });
        }

        let id = moved.ok_or_else(|| {
            ReorderError::ValidationFailed(format!("{} move needs the moved item", kind))
        })?;
        let index = reordered
            .position_of(id)
            .ok_or_else(|| ReorderError::not_found(id))? as u32;

        Ok(match kind {
            EntityKind::Notice => Self::Notice {
                id: *id,
                sequence: index,
            },
            _ => Self::Document {
                id: *id,
                order: index,
            },
        })
    }

    /// The item addressed in the endpoint path, for per-item endpoints.
    #[must_use]
    pub fn item_id(&self) -> Option<Uuid> {
        match self {
            Self::Links { .. } => None,
            Self::Notice { id, .. } | Self::Document { id, .. } => Some(*id),
        }
    }

    /// The JSON body sent on the wire for this request's endpoint.
    #[must_use]
    pub fn body(&self) -> serde_json::Value {
        match self {
            Self::Links { links } => json!({ "links": links }),
            Self::Notice { sequence, .. } => json!({ "sequence": sequence }),
            Self::Document { order, .. } => json!({ "order": order }),
        }
    }
}

fn resolve_full_list(
    links: &[LinkOrder],
    current: &[Uuid],
) -> Result<ReorderOutcome<Uuid>, ReorderError> {
    if links.len() != current.len() {
        return Err(ReorderError::ValidationFailed(format!(
            "expected {} links, got {}",
            current.len(),
            links.len()
        )));
    }

    let mut seen = HashSet::with_capacity(links.len());
    for link in links {
        if !seen.insert(link.id) {
            return Err(ReorderError::ValidationFailed(format!(
                "duplicate link {}",
                link.id
            )));
        }
        if !current.contains(&link.id) {
            return Err(ReorderError::ItemNotFound(link.id.to_string()));
        }
    }

    let mut sorted = links.to_vec();
    sorted.sort_by_key(|link| link.order);
    if sorted
        .iter()
        .enumerate()
        .any(|(index, link)| link.order != index as u32)
    {
        return Err(ReorderError::ValidationFailed(
            "link orders must be 0..N-1 without gaps".to_string(),
        ));
    }

    let after: Vec<Uuid> = sorted.into_iter().map(|link| link.id).collect();
    if after == current {
        return Ok(ReorderOutcome::Unchanged);
    }
    Ok(ReorderOutcome::Moved(Reordered::between(current, after)))
}
