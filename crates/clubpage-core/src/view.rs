//! Client-side collection state and the optimistic reorder driver.
//!
//! [`OrderedCollection`] keeps two snapshots of one scope: the last order the
//! gateway confirmed and the working order currently shown. A gesture updates
//! the working order immediately; a rejection restores it from the confirmed
//! snapshot.
//!
//! [`CollectionView`] drives one gesture end to end: engine, optimistic
//! update, gateway call, then confirm or revert with a single error
//! notification.

use std::collections::BTreeMap;
use std::future::Future;

use uuid::Uuid;

use crate::error::{CommitError, ReorderError};
use crate::reorder::{Move, ReorderOutcome, SlotKey, collapse, expand, reorder_slots};
use crate::request::ReorderRequest;
use crate::types::{EntityKind, PositionUpdate};

// ============================================================================
// Collaborators
// ============================================================================

/// Acknowledgement from a gateway that a commit was applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Confirmed {
    /// Position writes reported by the gateway.
    pub updates: Vec<PositionUpdate>,
}

/// Persists reorder requests.
///
/// Implementations must be all-or-nothing per request and safe to retry with
/// an identical payload.
pub trait OrderGateway {
    fn commit(
        &self,
        request: &ReorderRequest,
    ) -> impl Future<Output = Result<Confirmed, CommitError>> + Send;
}

/// Non-blocking user notifications.
pub trait Notifier {
    fn error(&self, message: &str);
}

// ============================================================================
// Two-slot state holder
// ============================================================================

/// A reorder that has been applied locally but not yet confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommit {
    /// Identifies this commit in `confirm`/`reject`.
    pub ticket: u64,
    /// Payload for the gateway.
    pub request: ReorderRequest,
    /// Minimal diff of the move.
    pub changes: Vec<PositionUpdate>,
}

/// Result of applying a move locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Working order changed; the commit must be sent to the gateway.
    Pending(PendingCommit),
    /// The item is already first/last. Nothing to send.
    Boundary,
    /// The move lands where the item already is. Nothing to send.
    Unchanged,
}

/// Confirmed and working snapshots of one scope's order.
#[derive(Debug, Clone)]
pub struct OrderedCollection {
    kind: EntityKind,
    confirmed: Vec<Uuid>,
    working: Vec<Uuid>,
    /// Members of the social group, moved as a single slot.
    group: Vec<Uuid>,
    /// Working snapshots of in-flight commits, by ticket.
    in_flight: BTreeMap<u64, Vec<Uuid>>,
    next_ticket: u64,
}

impl OrderedCollection {
    /// Start from an order fetched from the server.
    pub fn new(kind: EntityKind, items: Vec<Uuid>) -> Self {
        Self {
            kind,
            confirmed: items.clone(),
            working: items,
            group: Vec::new(),
            in_flight: BTreeMap::new(),
            next_ticket: 1,
        }
    }

    /// Treat `members` as one atomic slot. The layout is normalised so the
    /// members are contiguous, starting where the first one appears.
    pub fn with_group(mut self, members: Vec<Uuid>) -> Self {
        let members: Vec<Uuid> = members
            .into_iter()
            .filter(|id| self.working.contains(id))
            .collect();
        self.working = expand(&collapse(&self.working, &members));
        self.confirmed = self.working.clone();
        self.group = members;
        self
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Last order acknowledged by the gateway.
    pub fn confirmed(&self) -> &[Uuid] {
        &self.confirmed
    }

    /// Order currently shown, including unconfirmed moves.
    pub fn working(&self) -> &[Uuid] {
        &self.working
    }

    /// Number of commits awaiting a gateway answer.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Replace both snapshots with a freshly fetched order.
    pub fn reset(&mut self, items: Vec<Uuid>) {
        self.confirmed = expand(&collapse(&items, &self.group));
        self.working = self.confirmed.clone();
        self.in_flight.clear();
    }

    /// Apply `mv` to the working order.
    ///
    /// Engine errors leave both snapshots untouched.
    pub fn apply(&mut self, mv: Move<SlotKey<Uuid>>) -> Result<Applied, ReorderError> {
        let slots = collapse(&self.working, &self.group);
        let reordered = match reorder_slots(&slots, &mv)? {
            ReorderOutcome::Boundary => return Ok(Applied::Boundary),
            ReorderOutcome::Unchanged => return Ok(Applied::Unchanged),
            ReorderOutcome::Moved(reordered) => reordered,
        };

        let moved = match mv.item() {
            SlotKey::Item(id) => Some(id),
            SlotKey::Group => None,
        };
        let request = ReorderRequest::for_move(self.kind, &reordered, moved)?;
        let changes = reordered.changes().to_vec();

        self.working = reordered.into_sequence();
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight.insert(ticket, self.working.clone());

        Ok(Applied::Pending(PendingCommit {
            ticket,
            request,
            changes,
        }))
    }

    /// Mark `ticket` as persisted. Older in-flight commits are superseded.
    ///
    /// Returns false for unknown or already superseded tickets.
    pub fn confirm(&mut self, ticket: u64) -> bool {
        let Some(snapshot) = self.in_flight.remove(&ticket) else {
            return false;
        };

        self.confirmed = snapshot;
        self.in_flight.retain(|pending, _| *pending > ticket);
        if self.in_flight.is_empty() {
            self.working = self.confirmed.clone();
        }
        true
    }

    /// Mark `ticket` as rejected and restore the working order from the
    /// confirmed snapshot.
    ///
    /// Returns false for unknown or already superseded tickets.
    pub fn reject(&mut self, ticket: u64) -> bool {
        if self.in_flight.remove(&ticket).is_none() {
            return false;
        }
        self.working = self.confirmed.clone();
        true
    }
}

// ============================================================================
// Gesture driver
// ============================================================================

/// What happened to one gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    /// The gateway confirmed the new order.
    Committed { sequence: Vec<Uuid> },
    /// The item is already at the edge. No gateway call was made.
    Boundary,
    /// Nothing moved. No gateway call was made.
    Unchanged,
    /// The gateway rejected the commit; the view shows the confirmed order.
    Reverted { error: CommitError },
    /// The engine ignored the move (unknown item, too few items).
    Ignored(ReorderError),
}

/// Drives gestures against one collection.
pub struct CollectionView<G, N> {
    collection: OrderedCollection,
    gateway: G,
    notifier: N,
}

impl<G: OrderGateway, N: Notifier> CollectionView<G, N> {
    pub fn new(collection: OrderedCollection, gateway: G, notifier: N) -> Self {
        Self {
            collection,
            gateway,
            notifier,
        }
    }

    pub fn collection(&self) -> &OrderedCollection {
        &self.collection
    }

    pub fn collection_mut(&mut self) -> &mut OrderedCollection {
        &mut self.collection
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Apply `mv` optimistically, commit it, and confirm or revert.
    pub async fn perform(&mut self, mv: Move<SlotKey<Uuid>>) -> GestureOutcome {
        let commit = match self.collection.apply(mv) {
            Ok(Applied::Pending(commit)) => commit,
            Ok(Applied::Boundary) => return GestureOutcome::Boundary,
            Ok(Applied::Unchanged) => return GestureOutcome::Unchanged,
            Err(e) => {
                tracing::debug!(error = %e, "Move ignored");
                return GestureOutcome::Ignored(e);
            }
        };

        tracing::debug!(
            ticket = commit.ticket,
            kind = %self.collection.kind(),
            changes = commit.changes.len(),
            "Committing reorder"
        );

        match self.gateway.commit(&commit.request).await {
            Ok(_) => {
                self.collection.confirm(commit.ticket);
                GestureOutcome::Committed {
                    sequence: self.collection.working().to_vec(),
                }
            }
            Err(error) => {
                self.collection.reject(commit.ticket);
                tracing::warn!(ticket = commit.ticket, error = %error, "Reorder rejected, reverted");

                let message = if error.is_retryable() {
                    format!("Could not save the new order, please try again ({})", error)
                } else {
                    format!("Could not save the new order: {}", error)
                };
                self.notifier.error(&message);

                GestureOutcome::Reverted { error }
            }
        }
    }
}
