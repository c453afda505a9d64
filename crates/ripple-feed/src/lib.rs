//! # ripple-feed
//!
//! Change-feed transport abstraction for the Ripple sync engine.
//!
//! The engine never talks to a concrete backend directly; it opens named
//! channels against a [`ChangeFeed`] and receives ordered streams of
//! [`ripple_events::ChangeEvent`]s. Implementations here:
//!
//! - [`MemoryFeed`] - in-process feed for tests and local simulation
//! - [`ReconnectingFeed`] - wraps any feed with exponential-backoff
//!   re-subscription after transport loss

pub mod memory;
pub mod reconnect;
pub mod traits;

pub use memory::MemoryFeed;
pub use reconnect::{Backoff, BackoffConfig, ReconnectingFeed};
pub use traits::{ChangeFeed, FeedError, FeedSubscription};
