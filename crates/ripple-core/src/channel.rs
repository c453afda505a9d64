//! Channel abstraction for Ripple.
//!
//! A channel is a named subscription to a category of change events,
//! carrying the handler bindings events are dispatched to.

use ripple_events::EventFilter;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Maximum channel name length.
pub const MAX_CHANNEL_NAME_LENGTH: usize = 256;

/// A channel identifier.
pub type ChannelName = String;

/// Validate a channel name.
///
/// # Errors
///
/// Returns an error message if the channel name is invalid.
pub fn validate_channel_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("Channel name cannot be empty");
    }
    if name.len() > MAX_CHANNEL_NAME_LENGTH {
        return Err("Channel name too long");
    }
    if !name.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
        return Err("Channel name contains invalid characters");
    }
    Ok(())
}

/// Handler invoked with the row image of a matching event.
pub type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

/// A (filter, handler) pair registered on a channel.
#[derive(Clone)]
pub struct Binding {
    filter: EventFilter,
    handler: EventHandler,
}

impl Binding {
    /// Bind a handler to events passing the given filter.
    pub fn new(filter: EventFilter, handler: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        Self {
            filter,
            handler: Arc::new(handler),
        }
    }

    /// The filter this binding listens with.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Invoke the handler with a row image.
    pub fn invoke(&self, image: &Value) {
        (self.handler)(image);
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

/// A live channel: name, bindings, and a closed flag.
///
/// Closing is how teardown wins over in-flight events: the router drops
/// anything arriving on a closed channel.
#[derive(Debug)]
pub struct Channel {
    name: ChannelName,
    bindings: Vec<Binding>,
    closed: AtomicBool,
}

impl Channel {
    /// Create a new channel with its bindings.
    #[must_use]
    pub fn new(name: impl Into<ChannelName>, bindings: Vec<Binding>) -> Self {
        Self {
            name: name.into(),
            bindings,
            closed: AtomicBool::new(false),
        }
    }

    /// Get the channel name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bindings registered on this channel.
    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// The filters this channel listens with, for feed-side registration.
    #[must_use]
    pub fn filters(&self) -> Vec<EventFilter> {
        self.bindings.iter().map(|b| b.filter().clone()).collect()
    }

    /// Check whether the channel has been torn down.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Mark the channel as torn down. Events arriving afterwards are
    /// discarded by the router.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!(channel = %self.name, "Channel closed");
        }
    }
}
