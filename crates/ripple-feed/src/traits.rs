//! Feed abstraction traits for Ripple.
//!
//! These traits define the interface every change-feed backend must
//! provide, keeping the engine transport-agnostic.

use async_trait::async_trait;
use ripple_events::{ChangeEvent, CodecError, EventFilter};
use thiserror::Error;
use tokio::sync::mpsc;

/// Default per-subscription buffer capacity.
pub const DEFAULT_SUBSCRIPTION_CAPACITY: usize = 256;

/// Feed errors.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Opening a subscription failed. The caller may retry.
    #[error("Failed to open channel {channel}: {reason}")]
    OpenFailed { channel: String, reason: String },

    /// The feed connection was lost.
    #[error("Feed connection lost")]
    ConnectionLost,

    /// Wire-level decoding error.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl FeedError {
    /// Convenience constructor for open failures.
    #[must_use]
    pub fn open_failed(channel: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::OpenFailed {
            channel: channel.into(),
            reason: reason.into(),
        }
    }
}

/// An open subscription: the channel name plus its ordered event stream.
///
/// The stream ends (`recv` returns `None`) when the subscription is closed
/// or the transport drops it.
#[derive(Debug)]
pub struct FeedSubscription {
    /// Channel this subscription belongs to.
    pub channel: String,
    /// Ordered stream of change events.
    pub events: mpsc::Receiver<ChangeEvent>,
}

impl futures_util::Stream for FeedSubscription {
    type Item = ChangeEvent;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.events.poll_recv(cx)
    }
}

/// A source of row-level change events.
///
/// Implementations deliver events per channel in emission order; no
/// ordering holds across channels.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Open a subscription for a channel with the given event filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription cannot be established; the
    /// caller may retry.
    async fn open(
        &self,
        channel: &str,
        filters: &[EventFilter],
    ) -> Result<FeedSubscription, FeedError>;

    /// Close a channel's subscription. Unknown channels are a no-op.
    async fn close(&self, channel: &str);

    /// Get the feed name (e.g., "memory", "reconnecting").
    fn name(&self) -> &'static str;

    /// Check if the feed is healthy.
    fn is_healthy(&self) -> bool {
        true
    }
}
