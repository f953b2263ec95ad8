//! Change broadcasting for open collection views.
//!
//! When a scope's order changes (reorder, append or delete) an
//! `order_changed` event is published on that scope's channel. Another tab
//! showing the same list subscribes over SSE and refetches when one arrives.
//!
//! # Architecture
//!
//! - Uses `tokio::sync::broadcast` for multi-subscriber pub/sub
//! - One channel per scope (created lazily on first subscription)
//! - Channels whose receivers are all gone are dropped on the next
//!   subscribe or publish
//!
//! # Event Types
//!
//! - `order_changed`: positions in the scope changed
//! - `heartbeat`: Sent periodically to keep connections alive
//! - `catchup`: Sent when a subscriber falls behind

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use clubpage_core::{EntityKind, PositionUpdate, Scope};

/// Default channel capacity for broadcast channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Heartbeat interval in seconds.
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30;

// ============================================================================
// Event Types
// ============================================================================

/// An event that can be broadcast to subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScopeEvent {
    /// Positions in the scope changed.
    OrderChanged(OrderChangedEvent),
    /// Periodic heartbeat to keep connection alive.
    Heartbeat(HeartbeatEvent),
    /// Client fell behind and should refetch the list.
    Catchup(CatchupEvent),
}

impl ScopeEvent {
    /// SSE `event:` name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OrderChanged(_) => "order_changed",
            Self::Heartbeat(_) => "heartbeat",
            Self::Catchup(_) => "catchup",
        }
    }
}

/// What caused an order change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCause {
    Reordered,
    Added,
    Removed,
}

/// Event data for an order change.
#[derive(Debug, Clone, Serialize)]
pub struct OrderChangedEvent {
    pub kind: EntityKind,
    pub scope: Scope,
    pub cause: ChangeCause,
    /// The added or removed item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<Uuid>,
    /// Positions written by a reorder.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub updates: Vec<PositionUpdate>,
    pub timestamp: DateTime<Utc>,
}

/// Heartbeat event data.
#[derive(Debug, Clone, Serialize)]
pub struct HeartbeatEvent {
    /// Current timestamp.
    pub timestamp: DateTime<Utc>,
}

/// Catchup event sent when subscriber falls behind.
#[derive(Debug, Clone, Serialize)]
pub struct CatchupEvent {
    /// Number of events missed.
    pub events_missed: u64,
    /// Timestamp of the catchup event.
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Event Broadcaster
// ============================================================================

/// Manages one broadcast channel per scope.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    channels: Arc<RwLock<HashMap<Scope, broadcast::Sender<ScopeEvent>>>>,
    capacity: usize,
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBroadcaster {
    /// Create a new event broadcaster with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new event broadcaster with custom capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Subscribe to events for a scope, creating its channel if needed.
    pub async fn subscribe(&self, scope: Scope) -> broadcast::Receiver<ScopeEvent> {
        {
            let channels = self.channels.read().await;
            if let Some(sender) = channels.get(&scope) {
                return sender.subscribe();
            }
        }

        let mut channels = self.channels.write().await;
        // Another task may have created it meanwhile.
        if let Some(sender) = channels.get(&scope) {
            return sender.subscribe();
        }

        let pruned = prune_closed(&mut channels);
        let (sender, receiver) = broadcast::channel(self.capacity);
        channels.insert(scope, sender);
        if pruned > 0 {
            tracing::debug!(pruned, "Dropped unused event channels");
        }

        tracing::debug!(scope = %scope, capacity = self.capacity, "Created event channel");

        receiver
    }

    /// Publish an event to all subscribers of a scope.
    ///
    /// Returns the number of receivers reached, or None if nobody is
    /// subscribed to the scope.
    pub async fn publish(&self, scope: Scope, event: ScopeEvent) -> Option<usize> {
        let mut channels = self.channels.write().await;
        prune_closed(&mut channels);

        let sender = channels.get(&scope)?;
        match sender.send(event) {
            Ok(count) => {
                tracing::trace!(scope = %scope, receivers = count, "Published event");
                Some(count)
            }
            Err(_) => {
                // Last receiver went away between the prune and the send.
                channels.remove(&scope);
                None
            }
        }
    }

    /// Publish an `order_changed` event.
    pub async fn publish_change(
        &self,
        kind: EntityKind,
        scope: Scope,
        cause: ChangeCause,
        item_id: Option<Uuid>,
        updates: Vec<PositionUpdate>,
    ) -> Option<usize> {
        let event = ScopeEvent::OrderChanged(OrderChangedEvent {
            kind,
            scope,
            cause,
            item_id,
            updates,
            timestamp: Utc::now(),
        });
        self.publish(scope, event).await
    }

    /// Get the number of active channels.
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }

    /// Get the number of subscribers for a scope.
    pub async fn subscriber_count(&self, scope: Scope) -> usize {
        self.channels
            .read()
            .await
            .get(&scope)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }
}

/// Drop channels nobody listens to any more. Returns how many went.
fn prune_closed(channels: &mut HashMap<Scope, broadcast::Sender<ScopeEvent>>) -> usize {
    let before = channels.len();
    channels.retain(|_, sender| sender.receiver_count() > 0);
    before - channels.len()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clubpage_core::{EventId, UserId};

    #[tokio::test]
    async fn test_subscribers_share_a_channel() {
        let broadcaster = EventBroadcaster::new();
        let scope = Scope::User(UserId::new());

        let _r1 = broadcaster.subscribe(scope).await;
        let _r2 = broadcaster.subscribe(scope).await;

        assert_eq!(broadcaster.channel_count().await, 1);
        assert_eq!(broadcaster.subscriber_count(scope).await, 2);
    }

    #[tokio::test]
    async fn test_publish_reaches_scope_only() {
        let broadcaster = EventBroadcaster::new();
        let event_scope = Scope::Event(EventId::new());
        let other = Scope::Event(EventId::new());

        let mut receiver = broadcaster.subscribe(event_scope).await;
        let _other = broadcaster.subscribe(other).await;

        let moved = Uuid::new_v4();
        let count = broadcaster
            .publish_change(
                EntityKind::Notice,
                event_scope,
                ChangeCause::Reordered,
                None,
                vec![PositionUpdate::new(moved, 0)],
            )
            .await;
        assert_eq!(count, Some(1));

        match receiver.recv().await.unwrap() {
            ScopeEvent::OrderChanged(e) => {
                assert_eq!(e.kind, EntityKind::Notice);
                assert_eq!(e.updates, vec![PositionUpdate::new(moved, 0)]);
            }
            other => panic!("expected order_changed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_publish_without_channel() {
        let broadcaster = EventBroadcaster::new();
        let count = broadcaster
            .publish_change(
                EntityKind::Link,
                Scope::User(UserId::new()),
                ChangeCause::Added,
                Some(Uuid::new_v4()),
                Vec::new(),
            )
            .await;
        assert_eq!(count, None);
    }

    #[tokio::test]
    async fn test_abandoned_channels_dropped_on_publish() {
        let broadcaster = EventBroadcaster::new();
        for _ in 0..1000 {
            let receiver = broadcaster.subscribe(Scope::Event(EventId::new())).await;
            drop(receiver);
        }

        broadcaster
            .publish_change(
                EntityKind::Link,
                Scope::User(UserId::new()),
                ChangeCause::Added,
                None,
                Vec::new(),
            )
            .await;
        assert_eq!(broadcaster.channel_count().await, 0);
    }

    #[tokio::test]
    async fn test_abandoned_channels_dropped_on_subscribe() {
        let broadcaster = EventBroadcaster::new();
        let gone = Scope::Event(EventId::new());
        drop(broadcaster.subscribe(gone).await);

        let live = Scope::User(UserId::new());
        let _receiver = broadcaster.subscribe(live).await;

        assert_eq!(broadcaster.channel_count().await, 1);
        assert_eq!(broadcaster.subscriber_count(gone).await, 0);
        assert_eq!(broadcaster.subscriber_count(live).await, 1);
    }

    #[tokio::test]
    async fn test_publish_after_last_receiver_dropped() {
        let broadcaster = EventBroadcaster::new();
        let scope = Scope::User(UserId::new());
        drop(broadcaster.subscribe(scope).await);

        let count = broadcaster
            .publish_change(EntityKind::Link, scope, ChangeCause::Removed, None, Vec::new())
            .await;
        assert_eq!(count, None);
        assert_eq!(broadcaster.channel_count().await, 0);
    }

    #[test]
    fn test_event_serialization() {
        let event = ScopeEvent::OrderChanged(OrderChangedEvent {
            kind: EntityKind::Document,
            scope: Scope::Event(EventId::from_uuid(Uuid::nil())),
            cause: ChangeCause::Removed,
            item_id: Some(Uuid::nil()),
            updates: Vec::new(),
            timestamp: Utc::now(),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"order_changed""#));
        assert!(json.contains(r#""cause":"removed""#));
        assert!(json.contains(r#""kind":"event""#));
        assert!(!json.contains("updates"));
        assert_eq!(event.name(), "order_changed");
    }
}
