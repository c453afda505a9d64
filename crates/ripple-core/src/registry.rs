//! Channel registry for Ripple.
//!
//! The registry tracks live channels by name and guarantees at most one
//! subscription per name. It is an explicit object constructed once per
//! session and passed by reference to consumers, so isolated instances can
//! coexist (one per test, one per app).

use crate::channel::{validate_channel_name, Binding, Channel, ChannelName};
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Registry errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Invalid channel name.
    #[error("Invalid channel name: {0}")]
    InvalidChannel(&'static str),
}

/// Tracks active subscriptions by logical channel name.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: DashMap<ChannelName, Arc<Channel>>,
}

impl ChannelRegistry {
    /// Create a new, empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a channel, creating it if absent.
    ///
    /// If a channel with this name is already live, its existing handle is
    /// returned and `setup` is not invoked; exactly one subscription per
    /// name is alive at a time.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel name is invalid.
    pub fn subscribe<F>(&self, name: &str, setup: F) -> Result<Arc<Channel>, RegistryError>
    where
        F: FnOnce() -> Vec<Binding>,
    {
        validate_channel_name(name).map_err(RegistryError::InvalidChannel)?;

        match self.channels.entry(name.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => Ok(entry.get().clone()),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                debug!(channel = %name, "Creating new channel");
                let channel = Arc::new(Channel::new(name, setup()));
                entry.insert(channel.clone());
                Ok(channel)
            }
        }
    }

    /// Get the live handle for a channel, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Channel>> {
        self.channels.get(name).map(|c| c.clone())
    }

    /// Tear down a channel and remove it from the registry.
    ///
    /// Returns `true` if the channel existed. Unknown names are a no-op.
    pub fn unsubscribe(&self, name: &str) -> bool {
        if let Some((_, channel)) = self.channels.remove(name) {
            channel.close();
            debug!(channel = %name, "Unsubscribed");
            true
        } else {
            false
        }
    }

    /// Tear down every channel and clear the registry.
    ///
    /// Safe to call when no channels are active.
    pub fn unsubscribe_all(&self) {
        let names: Vec<ChannelName> = self.channels.iter().map(|c| c.key().clone()).collect();
        for name in names {
            self.unsubscribe(&name);
        }
        debug!("Unsubscribed from all channels");
    }

    /// Check if a channel is live.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Number of live channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Get all live channel names.
    #[must_use]
    pub fn channel_names(&self) -> Vec<ChannelName> {
        self.channels.iter().map(|c| c.key().clone()).collect()
    }
}
