//! Server-Sent Events feed of order changes per scope.
//!
//! Endpoints:
//! - GET /links/changes (the caller's own list)
//! - GET /events/{id}/changes (notices and event documents)
//! - GET /series/{id}/changes (series documents)
//!
//! # Example
//!
//! ```text
//! event: order_changed
//! data: {"type":"order_changed","kind":"notice","scope":{"kind":"event","id":"..."},"cause":"reordered","updates":[...]}
//!
//! event: heartbeat
//! data: {"type":"heartbeat","timestamp":"2026-01-01T00:00:00Z"}
//! ```
//!
//! A client that falls behind receives `catchup` and should refetch the list.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::{Event, Sse},
    routing::get,
};
use chrono::Utc;
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::broadcast::{Receiver, error::RecvError};
use tokio::time::{self, Instant};
use uuid::Uuid;

use clubpage_core::{EventId, Scope, SeriesId};

use crate::error::ApiResult;
use crate::events::{CatchupEvent, HEARTBEAT_INTERVAL_SECS, HeartbeatEvent, ScopeEvent};
use crate::extract::AuthUser;
use crate::state::AppState;

fn to_sse(event: &ScopeEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(data) => Some(Event::default().event(event.name()).data(data)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize event");
            None
        }
    }
}

/// Merge a scope subscription with heartbeats stamped when they are sent.
fn scope_events(
    receiver: Receiver<ScopeEvent>,
    scope: Scope,
    heartbeat: Duration,
) -> impl Stream<Item = ScopeEvent> {
    let ticker = time::interval_at(Instant::now() + heartbeat, heartbeat);

    stream::unfold((receiver, ticker), move |(mut rx, mut ticker)| async move {
        let event = tokio::select! {
            received = rx.recv() => match received {
                Ok(event) => event,
                Err(RecvError::Lagged(count)) => {
                    tracing::warn!(scope = %scope, events_missed = count, "SSE client lagged");
                    ScopeEvent::Catchup(CatchupEvent {
                        events_missed: count,
                        timestamp: Utc::now(),
                    })
                }
                Err(RecvError::Closed) => {
                    tracing::debug!(scope = %scope, "Event channel closed, ending SSE stream");
                    return None;
                }
            },
            _ = ticker.tick() => ScopeEvent::Heartbeat(HeartbeatEvent {
                timestamp: Utc::now(),
            }),
        };
        Some((event, (rx, ticker)))
    })
}

/// Wrap a subscription in an SSE response.
fn sse_response(
    receiver: Receiver<ScopeEvent>,
    scope: Scope,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::info!(scope = %scope, "Client subscribed to order changes");

    let heartbeat = Duration::from_secs(HEARTBEAT_INTERVAL_SECS);
    Sse::new(
        scope_events(receiver, scope, heartbeat)
            .filter_map(|event| futures::future::ready(to_sse(&event).map(Ok))),
    )
}

/// GET /links/changes
async fn link_changes(
    State(state): State<AppState>,
    user: AuthUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let scope = Scope::User(user.user_id());
    sse_response(state.broadcaster().subscribe(scope).await, scope)
}

/// GET /events/{id}/changes
async fn event_changes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let id = EventId(id);
    state.store().get_event(id).await?;
    let scope = Scope::Event(id);
    Ok(sse_response(state.broadcaster().subscribe(scope).await, scope))
}

/// GET /series/{id}/changes
async fn series_changes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let id = SeriesId(id);
    state.store().get_series(id).await?;
    let scope = Scope::Series(id);
    Ok(sse_response(state.broadcaster().subscribe(scope).await, scope))
}

/// Build SSE routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/links/changes", get(link_changes))
        .route("/events/{id}/changes", get(event_changes))
        .route("/series/{id}/changes", get(series_changes))
}
