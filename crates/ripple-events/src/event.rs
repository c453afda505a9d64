//! Row-level change events.
//!
//! A `ChangeEvent` is the unit the change-feed delivers: one row of one
//! table was inserted, updated, or deleted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of row change an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for ChangeOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeOp::Insert => write!(f, "INSERT"),
            ChangeOp::Update => write!(f, "UPDATE"),
            ChangeOp::Delete => write!(f, "DELETE"),
        }
    }
}

/// Tables the change-feed can report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Notifications,
    Posts,
    Likes,
    Comments,
    Follows,
}

impl Table {
    /// Get the table name as it appears in the backing store.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Notifications => "notifications",
            Table::Posts => "posts",
            Table::Likes => "likes",
            Table::Comments => "comments",
            Table::Follows => "follows",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Table {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notifications" => Ok(Table::Notifications),
            "posts" => Ok(Table::Posts),
            "likes" => Ok(Table::Likes),
            "comments" => Ok(Table::Comments),
            "follows" => Ok(Table::Follows),
            _ => Err("Unknown table"),
        }
    }
}

/// A single row change pushed by the backing change-feed.
///
/// Inserts and updates carry the after-image in `new_row`; deletes carry
/// the before-image in `old_row`. Row images are raw JSON so that routing
/// never fails on rows it does not understand; typed extraction happens at
/// the consumer via [`ChangeEvent::row`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Operation that produced this event.
    pub op: ChangeOp,
    /// Table the row belongs to.
    pub table: Table,
    /// After-image (present for INSERT and UPDATE).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_row: Option<Value>,
    /// Before-image (present for DELETE).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_row: Option<Value>,
}

impl ChangeEvent {
    /// Create an INSERT event.
    #[must_use]
    pub fn insert(table: Table, row: Value) -> Self {
        Self {
            op: ChangeOp::Insert,
            table,
            new_row: Some(row),
            old_row: None,
        }
    }

    /// Create an UPDATE event.
    #[must_use]
    pub fn update(table: Table, row: Value) -> Self {
        Self {
            op: ChangeOp::Update,
            table,
            new_row: Some(row),
            old_row: None,
        }
    }

    /// Create a DELETE event.
    #[must_use]
    pub fn delete(table: Table, old_row: Value) -> Self {
        Self {
            op: ChangeOp::Delete,
            table,
            new_row: None,
            old_row: Some(old_row),
        }
    }

    /// Get the row image relevant to this operation.
    ///
    /// INSERT and UPDATE yield the after-image, DELETE the before-image.
    /// Returns `None` for a malformed event missing its image.
    #[must_use]
    pub fn image(&self) -> Option<&Value> {
        match self.op {
            ChangeOp::Insert | ChangeOp::Update => self.new_row.as_ref(),
            ChangeOp::Delete => self.old_row.as_ref(),
        }
    }

    /// Deserialize the relevant row image into a typed row.
    ///
    /// Returns `None` if the image is missing or does not match `T`;
    /// malformed rows are not an error at this layer.
    #[must_use]
    pub fn row<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        self.image()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}
