//! clubpage-server: HTTP API server for clubpage
//!
//! This crate provides:
//! - REST endpoints for profile links, events, series, notices and documents
//! - The three reorder endpoints backed by the transactional order gateway
//! - Server-Sent Events (SSE) so open views learn about concurrent reorders
//! - Bearer token verification for the hosted auth provider
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//! - JSON error responses
//!
//! # Usage
//!
//! ```rust,ignore
//! use clubpage_server::{AppState, ServerConfig, routes};
//!
//! let config = ServerConfig::from_env()?;
//! let store = Store::connect(StoreConfig::from_env()?).await?;
//! let app = routes::build_router(AppState::new(store, config));
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-exports for convenience
pub use config::{ConfigError, LogFormat, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use events::EventBroadcaster;
pub use state::AppState;

// Re-export dependent crates
pub use clubpage_core;
pub use clubpage_store;
