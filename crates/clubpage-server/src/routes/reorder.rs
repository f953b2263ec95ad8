//! Shared reorder flow for the three reorder endpoints.
//!
//! The request is resolved through the engine against the scope's current
//! order, and the complete resulting order is handed to the order gateway.
//! Sending absolute positions for every item keeps the commit idempotent:
//! a retried request writes nothing and still answers 200.

use serde::Serialize;
use uuid::Uuid;

use clubpage_core::{PositionUpdate, ReorderError, ReorderOutcome, ReorderRequest, Scope};

use crate::error::ApiResult;
use crate::events::ChangeCause;
use crate::extract::AuthUser;
use crate::state::AppState;

/// Response for every reorder endpoint.
#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub success: bool,
    /// Positions the commit changed. Empty when the request was a no-op.
    pub updates: Vec<PositionUpdate>,
}

fn as_is(current: &[Uuid]) -> Vec<PositionUpdate> {
    current
        .iter()
        .enumerate()
        .map(|(index, id)| PositionUpdate::new(*id, index as u32))
        .collect()
}

/// Positions to commit for `request` given the scope's `current` order.
pub(crate) fn plan(
    request: &ReorderRequest,
    current: &[Uuid],
) -> Result<Vec<PositionUpdate>, ReorderError> {
    match request.resolve(current) {
        Ok(ReorderOutcome::Moved(reordered)) => Ok(reordered.full_updates()),
        Ok(ReorderOutcome::Boundary | ReorderOutcome::Unchanged)
        | Err(ReorderError::EmptySequence) => Ok(as_is(current)),
        Err(err) => Err(err),
    }
}

/// Resolve, commit and announce one reorder request.
pub(crate) async fn apply(
    state: &AppState,
    user: &AuthUser,
    scope: Scope,
    request: ReorderRequest,
) -> ApiResult<ReorderResponse> {
    let kind = request.kind();
    let store = state.store();

    let current = store.current_order(kind, scope).await?;
    let updates = plan(&request, &current).inspect_err(|err| {
        tracing::debug!(scope = %scope, kind = %kind, error = %err, "Reorder request invalid");
    })?;

    let receipt = store
        .commit_order(kind, scope, &user.principal, &updates)
        .await?;

    if !receipt.written.is_empty() {
        state
            .broadcaster()
            .publish_change(
                kind,
                scope,
                ChangeCause::Reordered,
                request.item_id(),
                receipt.written.clone(),
            )
            .await;
    }

    Ok(ReorderResponse {
        success: true,
        updates: receipt.written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clubpage_core::LinkOrder;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_plan_notice_reposition_is_full_order() {
        let current = ids(4);
        let request = ReorderRequest::Notice {
            id: current[2],
            sequence: 0,
        };
        let updates = plan(&request, &current).unwrap();
        assert_eq!(
            updates,
            vec![
                PositionUpdate::new(current[2], 0),
                PositionUpdate::new(current[0], 1),
                PositionUpdate::new(current[1], 2),
                PositionUpdate::new(current[3], 3),
            ]
        );
    }

    #[test]
    fn test_plan_single_item_is_noop() {
        let current = ids(1);
        let request = ReorderRequest::Document {
            id: current[0],
            order: 0,
        };
        assert_eq!(
            plan(&request, &current).unwrap(),
            vec![PositionUpdate::new(current[0], 0)]
        );
    }

    #[test]
    fn test_plan_rejects_gapped_link_list() {
        let current = ids(2);
        let request = ReorderRequest::Links {
            links: vec![
                LinkOrder {
                    id: current[0],
                    order: 0,
                },
                LinkOrder {
                    id: current[1],
                    order: 2,
                },
            ],
        };
        assert!(matches!(
            plan(&request, &current),
            Err(ReorderError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_plan_rejects_foreign_link() {
        let current = ids(1);
        let request = ReorderRequest::Links {
            links: vec![LinkOrder {
                id: Uuid::new_v4(),
                order: 0,
            }],
        };
        assert!(matches!(
            plan(&request, &current),
            Err(ReorderError::ItemNotFound(_))
        ));
    }
}
