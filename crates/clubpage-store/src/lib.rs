//! clubpage-store: Storage layer for clubpage
//!
//! This crate provides:
//! - PostgreSQL storage for users, links, series, events, notices and documents
//! - The order gateway: atomic, idempotent position commits per scope
//! - Migration management
//! - Type-safe database operations via sqlx
//!
//! # Usage
//!
//! ```rust,ignore
//! use clubpage_store::{Store, StoreConfig};
//!
//! let config = StoreConfig::from_env()?;
//! let store = Store::connect(config).await?;
//!
//! let receipt = store
//!     .commit_order(EntityKind::Link, scope, &principal, &updates)
//!     .await?;
//! ```

pub mod error;
pub mod models;
pub mod ordering;
pub mod schema;
pub mod store;

pub use error::{RejectReason, StoreError, StoreResult};
pub use models::*;
pub use ordering::CommitReceipt;
pub use store::{Store, StoreConfig};

// Re-export clubpage-core for downstream crates
pub use clubpage_core;
