//! Database models for the storage layer.
//!
//! These types map directly to database rows and are used for sqlx queries.
//! Positions are stored as `INTEGER` and exposed as `i32`; conversion to the
//! unsigned positions of clubpage-core happens in `ordered_item`.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use clubpage_core::{EventId, LinkKind, OrderedItem, Role, Scope, SeriesId, UserId};

fn position(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Database row for the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub handle: String,
    pub display_name: String,
    pub role: String,
    pub created: DateTime<Utc>,
}

impl UserRow {
    pub fn user_id(&self) -> UserId {
        UserId(self.id)
    }

    /// Parsed role; unknown values degrade to `Role::User`.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or_default()
    }
}

/// Database row for the `links` table.
#[derive(Debug, Clone, FromRow)]
pub struct LinkRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub url: String,
    pub kind: String,
    pub platform: Option<String>,
    pub order: i32,
    pub created: DateTime<Utc>,
}

impl LinkRow {
    pub fn kind(&self) -> LinkKind {
        self.kind.parse().unwrap_or_default()
    }

    pub fn is_social(&self) -> bool {
        self.kind() == LinkKind::Social
    }

    pub fn ordered_item(&self) -> OrderedItem {
        OrderedItem {
            id: self.id,
            position: position(self.order),
            scope: Scope::User(UserId(self.user_id)),
        }
    }
}

/// Database row for the `series` table.
#[derive(Debug, Clone, FromRow)]
pub struct SeriesRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub created: DateTime<Utc>,
}

/// Database row for the `events` table.
#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub series_id: Option<Uuid>,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub location: Option<String>,
    pub created: DateTime<Utc>,
}

/// Database row for the `notices` table.
#[derive(Debug, Clone, FromRow)]
pub struct NoticeRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub title: String,
    pub body: String,
    pub sequence: i32,
    pub created: DateTime<Utc>,
}

impl NoticeRow {
    pub fn ordered_item(&self) -> OrderedItem {
        OrderedItem {
            id: self.id,
            position: position(self.sequence),
            scope: Scope::Event(EventId(self.event_id)),
        }
    }
}

/// Database row for the `documents` table.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub event_id: Option<Uuid>,
    pub series_id: Option<Uuid>,
    pub title: String,
    pub file_url: String,
    pub order: i32,
    pub created: DateTime<Utc>,
}

impl DocumentRow {
    /// The event or series the document belongs to.
    ///
    /// The schema guarantees exactly one of the two columns is set.
    pub fn scope(&self) -> Option<Scope> {
        match (self.event_id, self.series_id) {
            (Some(event), None) => Some(Scope::Event(EventId(event))),
            (None, Some(series)) => Some(Scope::Series(SeriesId(series))),
            _ => None,
        }
    }

    pub fn ordered_item(&self) -> Option<OrderedItem> {
        Some(OrderedItem {
            id: self.id,
            position: position(self.order),
            scope: self.scope()?,
        })
    }
}

/// Input for creating or refreshing a user from auth claims.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub handle: String,
    pub display_name: String,
    /// Role to record. `None` inserts `user` and leaves an existing row's
    /// role alone.
    pub role: Option<Role>,
}

impl NewUser {
    /// Build a user, deriving a handle from the id when none is supplied.
    pub fn new(id: UserId, handle: Option<String>) -> Self {
        let handle = handle
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| format!("user-{}", &id.to_string()[..8]));
        Self {
            id,
            display_name: handle.clone(),
            handle,
            role: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Handle used when the requested one is taken. Unique per id.
    pub fn fallback_handle(&self) -> String {
        format!("user-{}", self.id.0.simple())
    }
}

/// Input for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub kind: LinkKind,
    pub platform: Option<String>,
}

impl NewLink {
    pub fn new(title: String, url: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            url,
            kind: LinkKind::Standard,
            platform: None,
        }
    }

    /// A member of the social group for `platform`.
    pub fn social(platform: String, url: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: platform.clone(),
            url,
            kind: LinkKind::Social,
            platform: Some(platform),
        }
    }
}

/// Partial update of a link. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub title: Option<String>,
    pub url: Option<String>,
}

/// Input for creating a new series.
#[derive(Debug, Clone)]
pub struct NewSeries {
    pub id: Uuid,
    pub owner_id: UserId,
    pub name: String,
}

impl NewSeries {
    pub fn new(owner_id: UserId, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
        }
    }
}

/// Input for creating a new event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub id: Uuid,
    pub owner_id: UserId,
    pub series_id: Option<SeriesId>,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub location: Option<String>,
}

/// Input for creating a new notice.
#[derive(Debug, Clone)]
pub struct NewNotice {
    pub id: Uuid,
    pub title: String,
    pub body: String,
}

impl NewNotice {
    pub fn new(title: String, body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            body,
        }
    }
}

/// Input for creating a new document.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub id: Uuid,
    pub title: String,
    pub file_url: String,
}

impl NewDocument {
    pub fn new(title: String, file_url: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            file_url,
        }
    }
}
