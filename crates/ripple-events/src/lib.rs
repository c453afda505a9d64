//! # ripple-events
//!
//! Change-feed event model for the Ripple realtime sync engine.
//!
//! This crate defines the row-level change events emitted by the backing
//! store, the typed row payloads they carry, subscription filters, and the
//! binary codec used when events travel over a wire transport.
//!
//! ## Event shape
//!
//! Every event carries an operation (`INSERT`, `UPDATE`, `DELETE`), the
//! table it touched, and the relevant row images: the after-image for
//! inserts and updates, the before-image for deletes.
//!
//! ## Example
//!
//! ```rust
//! use ripple_events::{codec, ChangeEvent, Table};
//! use serde_json::json;
//!
//! let event = ChangeEvent::insert(Table::Posts, json!({"id": "p1"}));
//!
//! // Encode and decode
//! let encoded = codec::encode(&event).unwrap();
//! let decoded = codec::decode(&encoded).unwrap();
//! assert_eq!(event, decoded);
//! ```

pub mod codec;
pub mod event;
pub mod filter;
pub mod rows;

pub use codec::{decode, encode, CodecError};
pub use event::{ChangeEvent, ChangeOp, Table};
pub use filter::{EventFilter, RowFilter};
pub use rows::{
    CommentRow, FollowRow, LikeRow, NotificationKind, NotificationRow, PostRow, UserSummary,
};
