//! # ripple-core
//!
//! Channel registry and change-event routing for the Ripple sync engine.
//!
//! This crate provides the fundamental building blocks:
//!
//! - **Channel** - A named, single-instance subscription to a category of
//!   change events, with its handler bindings
//! - **ChannelRegistry** - Tracks live channels, one per name, with
//!   idempotent subscribe/unsubscribe
//! - **EventRouter** - Dispatches inbound change events to the bindings
//!   registered on a channel
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Change feed │────▶│ EventRouter │────▶│  Channel    │
//! └─────────────┘     └─────────────┘     │  bindings   │
//!                            │            └─────────────┘
//!                            ▼
//!                     ┌─────────────┐
//!                     │  Registry   │
//!                     └─────────────┘
//! ```

pub mod channel;
pub mod registry;
pub mod router;

pub use channel::{Binding, Channel, ChannelName};
pub use registry::{ChannelRegistry, RegistryError};
pub use router::EventRouter;
