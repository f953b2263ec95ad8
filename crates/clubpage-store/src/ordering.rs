//! The order gateway: transactional position writes for every orderable
//! table.
//!
//! All three orderable tables share one shape (an id, an integer position
//! column and a scope foreign key), so the SQL is generated from a small
//! per-kind [`Layout`] rather than written three times.
//!
//! # Atomicity
//!
//! `commit_order` runs in a single transaction:
//! 1. lock the scope row (`FOR UPDATE`) and check ownership
//! 2. read the current positions of the scope
//! 3. validate the payload against them (membership, duplicates, density)
//! 4. write the positions that actually change
//!
//! Any rejection returns before the first write and the transaction is
//! dropped, so nothing is applied. Writes are absolute positions, which makes
//! replaying the same payload a no-op.
//!
//! Concurrent commits on the same scope are serialised by the row lock; the
//! later one wins.

use std::collections::{HashMap, HashSet};

use sqlx::PgConnection;
use uuid::Uuid;

use clubpage_core::{EntityKind, PositionField, PositionUpdate, Principal, Scope, UserId, is_dense};

use crate::error::{RejectReason, StoreError, StoreResult};
use crate::store::Store;

// ============================================================================
// Table layouts
// ============================================================================

/// Where the rows of one entity kind live for one scope kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Layout {
    table: &'static str,
    position: &'static str,
    scope_column: &'static str,
    scope_table: &'static str,
    owner_column: &'static str,
}

impl Layout {
    pub(crate) fn resolve(kind: EntityKind, scope: &Scope) -> Result<Self, RejectReason> {
        if !kind.accepts(scope) {
            return Err(RejectReason::ScopeMismatch(format!(
                "{} items cannot be ordered within a {} scope",
                kind,
                scope.kind_name()
            )));
        }

        let position = match kind.position_field() {
            PositionField::Order => r#""order""#,
            PositionField::Sequence => r#""sequence""#,
        };
        let table = match kind {
            EntityKind::Link => "links",
            EntityKind::Notice => "notices",
            EntityKind::Document => "documents",
        };
        let (scope_column, scope_table, owner_column) = match scope {
            Scope::User(_) => ("user_id", "users", "id"),
            Scope::Event(_) => ("event_id", "events", "owner_id"),
            Scope::Series(_) => ("series_id", "series", "owner_id"),
        };

        Ok(Self {
            table,
            position,
            scope_column,
            scope_table,
            owner_column,
        })
    }

    fn lock_scope_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE id = $1 FOR UPDATE",
            self.owner_column, self.scope_table
        )
    }

    fn positions_sql(&self) -> String {
        format!(
            "SELECT id, {pos} FROM {table} WHERE {scope} = $1 ORDER BY {pos}, id",
            pos = self.position,
            table = self.table,
            scope = self.scope_column
        )
    }

    fn count_sql(&self) -> String {
        format!(
            "SELECT COUNT(*)::int FROM {} WHERE {} = $1",
            self.table, self.scope_column
        )
    }

    fn update_sql(&self) -> String {
        format!(
            "UPDATE {} SET {} = $1 WHERE id = $2 AND {} = $3",
            self.table, self.position, self.scope_column
        )
    }

    fn close_gap_sql(&self) -> String {
        format!(
            "UPDATE {table} SET {pos} = {pos} - 1 WHERE {scope} = $1 AND {pos} > $2",
            table = self.table,
            pos = self.position,
            scope = self.scope_column
        )
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Check `updates` against the scope's current positions and return the
/// writes that actually change something.
pub(crate) fn plan_commit(
    current: &[(Uuid, i32)],
    updates: &[PositionUpdate],
) -> Result<Vec<PositionUpdate>, RejectReason> {
    let mut merged: HashMap<Uuid, u32> = current
        .iter()
        .map(|(id, position)| (*id, u32::try_from(*position).unwrap_or(u32::MAX)))
        .collect();
    let mut seen = HashSet::with_capacity(updates.len());
    let mut writes = Vec::new();

    for update in updates {
        if !seen.insert(update.id) {
            return Err(RejectReason::Duplicate(update.id));
        }
        let slot = merged
            .get_mut(&update.id)
            .ok_or(RejectReason::ForeignItem(update.id))?;
        if *slot != update.position {
            writes.push(*update);
            *slot = update.position;
        }
    }

    let positions: Vec<u32> = merged.into_values().collect();
    if !is_dense(&positions) {
        return Err(RejectReason::NotDense);
    }

    Ok(writes)
}

// ============================================================================
// Gateway
// ============================================================================

/// Result of a successful `commit_order`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub kind: EntityKind,
    pub scope: Scope,
    /// Positions that changed in the database. Empty on a replay.
    pub written: Vec<PositionUpdate>,
}

impl Store {
    /// Apply a batch of position updates to one scope, all or nothing.
    ///
    /// Rejections are reported as `StoreError::OrderRejected`.
    pub async fn commit_order(
        &self,
        kind: EntityKind,
        scope: Scope,
        principal: &Principal,
        updates: &[PositionUpdate],
    ) -> StoreResult<CommitReceipt> {
        let layout = Layout::resolve(kind, &scope)?;
        let mut tx = self.pool().begin().await?;

        let owner = lock_scope(&mut tx, &layout, &scope).await?;
        if !principal.can_manage(owner) {
            tracing::warn!(
                scope = %scope,
                user_id = %principal.user_id,
                "Order commit rejected: not owner"
            );
            return Err(RejectReason::NotOwner.into());
        }

        let current = scope_positions(&mut tx, &layout, &scope).await?;
        let writes = plan_commit(&current, updates).inspect_err(|reason| {
            tracing::warn!(scope = %scope, kind = %kind, reason = %reason, "Order commit rejected");
        })?;

        let sql = layout.update_sql();
        for write in &writes {
            sqlx::query(&sql)
                .bind(write.position as i32)
                .bind(write.id)
                .bind(scope.as_uuid())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            scope = %scope,
            kind = %kind,
            requested = updates.len(),
            written = writes.len(),
            "Order committed"
        );

        Ok(CommitReceipt {
            kind,
            scope,
            written: writes,
        })
    }

    /// Current order of a scope, by stored position.
    pub async fn current_order(&self, kind: EntityKind, scope: Scope) -> StoreResult<Vec<Uuid>> {
        let layout = Layout::resolve(kind, &scope)?;
        let mut conn = self.pool().acquire().await?;
        let rows = scope_positions(&mut conn, &layout, &scope).await?;
        Ok(rows.into_iter().map(|(id, _)| id).collect())
    }
}

/// Lock the scope row and return its owner.
async fn lock_scope(
    conn: &mut PgConnection,
    layout: &Layout,
    scope: &Scope,
) -> StoreResult<UserId> {
    let owner: Option<(Uuid,)> = sqlx::query_as(&layout.lock_scope_sql())
        .bind(scope.as_uuid())
        .fetch_optional(&mut *conn)
        .await?;

    owner
        .map(|(id,)| UserId(id))
        .ok_or_else(|| StoreError::not_found(scope.kind_name(), *scope.as_uuid()))
}

async fn scope_positions(
    conn: &mut PgConnection,
    layout: &Layout,
    scope: &Scope,
) -> StoreResult<Vec<(Uuid, i32)>> {
    Ok(sqlx::query_as(&layout.positions_sql())
        .bind(scope.as_uuid())
        .fetch_all(&mut *conn)
        .await?)
}

/// Lock the scope of `kind` items and return its owner.
///
/// Must run inside the transaction that modifies the scope.
pub(crate) async fn lock_owner(
    conn: &mut PgConnection,
    kind: EntityKind,
    scope: &Scope,
) -> StoreResult<UserId> {
    let layout = Layout::resolve(kind, scope)?;
    lock_scope(conn, &layout, scope).await
}

/// Lock the scope and return the position a new item is appended at.
///
/// Must run inside the transaction that inserts the item.
pub(crate) async fn append_position(
    conn: &mut PgConnection,
    kind: EntityKind,
    scope: &Scope,
) -> StoreResult<(UserId, i32)> {
    let layout = Layout::resolve(kind, scope)?;
    let owner = lock_scope(conn, &layout, scope).await?;

    let count: (i32,) = sqlx::query_as(&layout.count_sql())
        .bind(scope.as_uuid())
        .fetch_one(&mut *conn)
        .await?;

    Ok((owner, count.0))
}

/// Shift every item after `removed` down by one.
///
/// Must run inside the transaction that deleted the item.
pub(crate) async fn close_gap(
    conn: &mut PgConnection,
    kind: EntityKind,
    scope: &Scope,
    removed: i32,
) -> StoreResult<u64> {
    let layout = Layout::resolve(kind, scope)?;
    let result = sqlx::query(&layout.close_gap_sql())
        .bind(scope.as_uuid())
        .bind(removed)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clubpage_core::{EventId, SeriesId};

    fn current(n: usize) -> Vec<(Uuid, i32)> {
        (0..n).map(|i| (Uuid::new_v4(), i as i32)).collect()
    }

    #[test]
    fn test_plan_writes_only_changes() {
        let rows = current(4);
        // C to the front: full list payload.
        let updates = vec![
            PositionUpdate::new(rows[2].0, 0),
            PositionUpdate::new(rows[0].0, 1),
            PositionUpdate::new(rows[1].0, 2),
            PositionUpdate::new(rows[3].0, 3),
        ];
        let writes = plan_commit(&rows, &updates).unwrap();
        assert_eq!(writes.len(), 3);
        assert!(!writes.iter().any(|w| w.id == rows[3].0));
    }

    #[test]
    fn test_plan_replay_is_empty() {
        let rows = current(3);
        let updates: Vec<_> = rows
            .iter()
            .map(|(id, p)| PositionUpdate::new(*id, *p as u32))
            .collect();
        assert!(plan_commit(&rows, &updates).unwrap().is_empty());
    }

    #[test]
    fn test_plan_rejects_foreign_item() {
        let rows = current(2);
        let stranger = Uuid::new_v4();
        let updates = vec![PositionUpdate::new(stranger, 0)];
        assert_eq!(
            plan_commit(&rows, &updates),
            Err(RejectReason::ForeignItem(stranger))
        );
    }

    #[test]
    fn test_plan_rejects_duplicates() {
        let rows = current(2);
        let updates = vec![
            PositionUpdate::new(rows[0].0, 1),
            PositionUpdate::new(rows[0].0, 0),
        ];
        assert_eq!(
            plan_commit(&rows, &updates),
            Err(RejectReason::Duplicate(rows[0].0))
        );
    }

    #[test]
    fn test_plan_rejects_partial_swap() {
        let rows = current(3);
        // Moving A to 2 without moving C leaves two items at position 2.
        let updates = vec![PositionUpdate::new(rows[0].0, 2)];
        assert_eq!(plan_commit(&rows, &updates), Err(RejectReason::NotDense));
    }

    #[test]
    fn test_layout_per_kind() {
        let event = Scope::Event(EventId::new());
        let notices = Layout::resolve(EntityKind::Notice, &event).unwrap();
        assert_eq!(
            notices.update_sql(),
            r#"UPDATE notices SET "sequence" = $1 WHERE id = $2 AND event_id = $3"#
        );

        let series = Scope::Series(SeriesId::new());
        let documents = Layout::resolve(EntityKind::Document, &series).unwrap();
        assert_eq!(
            documents.lock_scope_sql(),
            "SELECT owner_id FROM series WHERE id = $1 FOR UPDATE"
        );
        assert!(documents.positions_sql().contains(r#"ORDER BY "order", id"#));

        let user = Scope::User(UserId::new());
        let links = Layout::resolve(EntityKind::Link, &user).unwrap();
        assert_eq!(
            links.close_gap_sql(),
            r#"UPDATE links SET "order" = "order" - 1 WHERE user_id = $1 AND "order" > $2"#
        );
        assert_eq!(
            links.lock_scope_sql(),
            "SELECT id FROM users WHERE id = $1 FOR UPDATE"
        );
    }

    #[test]
    fn test_layout_rejects_mismatched_scope() {
        let user = Scope::User(UserId::new());
        assert!(matches!(
            Layout::resolve(EntityKind::Notice, &user),
            Err(RejectReason::ScopeMismatch(_))
        ));
    }
}
