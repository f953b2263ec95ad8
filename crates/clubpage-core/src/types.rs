//! Core data types shared by the store, the server and the client.
//!
//! Every orderable record (link, notice, document) is reduced to the same
//! shape: an identifier, a zero-based position and the scope the position is
//! relative to. The scope is a user for links, an event for notices and event
//! documents, and a series for series documents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random identifier using UUID v4.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// Identifier of a registered user (the subject of the hosted auth token).
    UserId
);

uuid_id!(
    /// Identifier of a club event (regatta, race day, social).
    EventId
);

uuid_id!(
    /// Identifier of a series grouping several events.
    SeriesId
);

// ============================================================================
// Scope
// ============================================================================

/// The grouping within which item positions are unique and contiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Scope {
    /// A user's profile link list.
    User(UserId),
    /// The notices or documents attached to one event.
    Event(EventId),
    /// The documents attached to one series.
    Series(SeriesId),
}

impl Scope {
    /// Returns the UUID of the owning record.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        match self {
            Self::User(id) => id.as_uuid(),
            Self::Event(id) => id.as_uuid(),
            Self::Series(id) => id.as_uuid(),
        }
    }

    /// Short name of the scope kind, used in logs and SSE payloads.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Event(_) => "event",
            Self::Series(_) => "series",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind_name(), self.as_uuid())
    }
}

/// Error returned when parsing a `kind:uuid` scope string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeParseError {
    #[error("scope must look like <kind>:<uuid>")]
    MissingSeparator,
    #[error("unknown scope kind: {0}")]
    UnknownKind(String),
    #[error("invalid scope id: {0}")]
    InvalidId(#[from] uuid::Error),
}

impl FromStr for Scope {
    type Err = ScopeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s.split_once(':').ok_or(ScopeParseError::MissingSeparator)?;
        let id = Uuid::parse_str(id)?;
        match kind {
            "user" => Ok(Self::User(UserId(id))),
            "event" => Ok(Self::Event(EventId(id))),
            "series" => Ok(Self::Series(SeriesId(id))),
            other => Err(ScopeParseError::UnknownKind(other.to_string())),
        }
    }
}

// ============================================================================
// Entity kinds
// ============================================================================

/// Kinds of orderable records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Link,
    Notice,
    Document,
}

/// Name of the integer column holding the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionField {
    /// `order` (links, documents).
    Order,
    /// `sequence` (notices).
    Sequence,
}

impl PositionField {
    /// Column name as it appears in SQL and JSON payloads.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Sequence => "sequence",
        }
    }
}

impl EntityKind {
    /// The position column used by this kind.
    #[must_use]
    pub const fn position_field(&self) -> PositionField {
        match self {
            Self::Notice => PositionField::Sequence,
            Self::Link | Self::Document => PositionField::Order,
        }
    }

    /// Whether items of this kind may be ordered within `scope`.
    #[must_use]
    pub const fn accepts(&self, scope: &Scope) -> bool {
        matches!(
            (self, scope),
            (Self::Link, Scope::User(_))
                | (Self::Notice, Scope::Event(_))
                | (Self::Document, Scope::Event(_))
                | (Self::Document, Scope::Series(_))
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Link => "link",
            Self::Notice => "notice",
            Self::Document => "document",
        };
        f.write_str(name)
    }
}

/// Whether a profile link is a regular link or part of the social group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    #[default]
    Standard,
    Social,
}

impl LinkKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Social => "social",
        }
    }
}

impl FromStr for LinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "social" => Ok(Self::Social),
            other => Err(format!("unknown link kind: {}", other)),
        }
    }
}

// ============================================================================
// Principals
// ============================================================================

/// Role carried in the hosted auth token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True if the principal owns a record owned by `owner` or is an admin.
    #[must_use]
    pub fn can_manage(&self, owner: UserId) -> bool {
        self.user_id == owner || self.is_admin()
    }
}

// ============================================================================
// Ordered items
// ============================================================================

/// Any record with an identity and a position inside a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedItem {
    pub id: Uuid,
    pub position: u32,
    pub scope: Scope,
}

/// One `(id, newPosition)` pair of a reorder diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionUpdate<Id = Uuid> {
    pub id: Id,
    pub position: u32,
}

impl<Id> PositionUpdate<Id> {
    pub const fn new(id: Id, position: u32) -> Self {
        Self { id, position }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_display_and_parse() {
        let scope = Scope::Event(EventId::new());
        let parsed: Scope = scope.to_string().parse().unwrap();
        assert_eq!(parsed, scope);
    }

    #[test]
    fn test_scope_parse_errors() {
        assert_eq!(
            "nocolon".parse::<Scope>(),
            Err(ScopeParseError::MissingSeparator)
        );
        let unknown = format!("team:{}", Uuid::nil()).parse::<Scope>();
        assert_eq!(unknown, Err(ScopeParseError::UnknownKind("team".into())));
        assert!("user:not-a-uuid".parse::<Scope>().is_err());
    }

    #[test]
    fn test_scope_serialize_tagged() {
        let scope = Scope::Series(SeriesId::from_uuid(Uuid::nil()));
        let json = serde_json::to_value(scope).unwrap();
        assert_eq!(json["kind"], "series");
        assert_eq!(json["id"], Uuid::nil().to_string());
    }

    #[test]
    fn test_entity_kind_scopes() {
        let user = Scope::User(UserId::new());
        let event = Scope::Event(EventId::new());
        let series = Scope::Series(SeriesId::new());

        assert!(EntityKind::Link.accepts(&user));
        assert!(!EntityKind::Link.accepts(&event));
        assert!(EntityKind::Notice.accepts(&event));
        assert!(!EntityKind::Notice.accepts(&series));
        assert!(EntityKind::Document.accepts(&event));
        assert!(EntityKind::Document.accepts(&series));
        assert!(!EntityKind::Document.accepts(&user));
    }

    #[test]
    fn test_position_field_names() {
        assert_eq!(EntityKind::Link.position_field().as_str(), "order");
        assert_eq!(EntityKind::Notice.position_field().as_str(), "sequence");
        assert_eq!(EntityKind::Document.position_field().as_str(), "order");
    }

    #[test]
    fn test_principal_can_manage() {
        let owner = UserId::new();
        let other = UserId::new();

        let user = Principal::new(owner, Role::User);
        assert!(user.can_manage(owner));
        assert!(!user.can_manage(other));

        let admin = Principal::new(other, Role::Admin);
        assert!(admin.can_manage(owner));
    }

    #[test]
    fn test_role_and_link_kind_parse() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
        assert_eq!("social".parse::<LinkKind>().unwrap(), LinkKind::Social);
        assert_eq!(LinkKind::default().as_str(), "standard");
    }
}
