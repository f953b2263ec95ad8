//! clubpage-core: domain types and the ordered collection protocol
//!
//! This crate provides:
//! - Identifier, scope and principal types shared by every crate
//! - The reorder engine (step and drag-and-drop moves, atomic social group)
//! - `ReorderRequest`, the tagged union of the per-entity reorder payloads
//! - `OrderedCollection` and `CollectionView`, the optimistic client state
//!   holder and its gesture driver
//!
//! Nothing in here performs I/O; persistence lives in `clubpage-store` and
//! transport in `clubpage-server` and the CLI.

pub mod error;
pub mod reorder;
pub mod request;
pub mod types;
pub mod view;

// Re-export commonly used types at crate root for convenience
pub use error::{CommitError, ReorderError};
pub use reorder::{
    Direction, Move, ReorderOutcome, Reordered, Slot, SlotKey, collapse, expand, is_dense,
    normalize, reorder, reorder_slots,
};
pub use request::{LinkOrder, ReorderRequest};
pub use types::{
    EntityKind, EventId, LinkKind, OrderedItem, PositionField, PositionUpdate, Principal, Role,
    Scope, ScopeParseError, SeriesId, UserId,
};
pub use view::{
    Applied, CollectionView, Confirmed, GestureOutcome, Notifier, OrderGateway, OrderedCollection,
    PendingCommit,
};
