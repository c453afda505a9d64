//! Subscription filters.
//!
//! A channel subscription tells the feed which (operation, table) pairs it
//! wants, optionally narrowed to rows where one column equals a value (the
//! per-recipient notification channel uses `recipient_id = <user>`).

use crate::event::{ChangeEvent, ChangeOp, Table};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Equality match on a single row column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFilter {
    pub column: String,
    pub value: String,
}

impl RowFilter {
    /// Create a `column = value` filter.
    #[must_use]
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Check whether a row image satisfies this filter.
    ///
    /// A missing column never matches.
    #[must_use]
    pub fn matches(&self, row: &Value) -> bool {
        match row.get(&self.column) {
            Some(Value::String(s)) => s == &self.value,
            Some(other) => other.to_string() == self.value,
            None => false,
        }
    }
}

/// One (operation, table) pair a subscription listens for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    pub op: ChangeOp,
    pub table: Table,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_filter: Option<RowFilter>,
}

impl EventFilter {
    /// Create a filter for an operation on a table.
    #[must_use]
    pub fn new(op: ChangeOp, table: Table) -> Self {
        Self {
            op,
            table,
            row_filter: None,
        }
    }

    /// Narrow the filter to rows where `column = value`.
    #[must_use]
    pub fn with_row_filter(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.row_filter = Some(RowFilter::eq(column, value));
        self
    }

    /// Check whether an event passes this filter.
    ///
    /// The row filter is applied to the image relevant to the event's
    /// operation; an event without a usable image never matches.
    #[must_use]
    pub fn matches(&self, event: &ChangeEvent) -> bool {
        if event.op != self.op || event.table != self.table {
            return false;
        }
        match &self.row_filter {
            Some(filter) => event.image().is_some_and(|row| filter.matches(row)),
            None => event.image().is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_op_and_table_must_match() {
        let filter = EventFilter::new(ChangeOp::Insert, Table::Posts);

        assert!(filter.matches(&ChangeEvent::insert(Table::Posts, json!({"id": "p1"}))));
        assert!(!filter.matches(&ChangeEvent::update(Table::Posts, json!({"id": "p1"}))));
        assert!(!filter.matches(&ChangeEvent::insert(Table::Likes, json!({"id": "l1"}))));
    }

    #[test]
    fn test_row_filter_scoping() {
        let filter = EventFilter::new(ChangeOp::Insert, Table::Notifications)
            .with_row_filter("recipient_id", "u1");

        let mine = ChangeEvent::insert(Table::Notifications, json!({"recipient_id": "u1"}));
        let theirs = ChangeEvent::insert(Table::Notifications, json!({"recipient_id": "u2"}));
        let anonymous = ChangeEvent::insert(Table::Notifications, json!({"id": "n1"}));

        assert!(filter.matches(&mine));
        assert!(!filter.matches(&theirs));
        assert!(!filter.matches(&anonymous));
    }

    #[test]
    fn test_row_filter_non_string_column() {
        let filter = RowFilter::eq("post_id", "42");
        assert!(filter.matches(&json!({"post_id": 42})));
        assert!(!filter.matches(&json!({"post_id": 43})));
    }

    #[test]
    fn test_event_without_image_never_matches() {
        let filter = EventFilter::new(ChangeOp::Delete, Table::Likes);
        let malformed = ChangeEvent {
            op: ChangeOp::Delete,
            table: Table::Likes,
            new_row: Some(json!({"id": "l1"})),
            old_row: None,
        };
        assert!(!filter.matches(&malformed));
    }
}
