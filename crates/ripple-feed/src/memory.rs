//! In-process change feed.
//!
//! `MemoryFeed` applies subscription filters on the publishing side, the
//! way a real backend filters server-side. Tests and local simulation
//! publish events directly; subscribers receive only what their filters
//! pass. Failure injection hooks let tests exercise retry paths.

use crate::traits::{ChangeFeed, FeedError, FeedSubscription, DEFAULT_SUBSCRIPTION_CAPACITY};
use async_trait::async_trait;
use dashmap::DashMap;
use ripple_events::{ChangeEvent, EventFilter};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

struct MemorySubscription {
    filters: Vec<EventFilter>,
    sender: mpsc::Sender<ChangeEvent>,
}

/// An in-memory change feed.
pub struct MemoryFeed {
    subscriptions: DashMap<String, MemorySubscription>,
    /// Number of upcoming `open` calls to fail, for retry testing.
    open_failures: AtomicUsize,
    capacity: usize,
}

impl Default for MemoryFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFeed {
    /// Create a new memory feed with the default buffer capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SUBSCRIPTION_CAPACITY)
    }

    /// Create a new memory feed with a specific per-subscription capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            subscriptions: DashMap::new(),
            open_failures: AtomicUsize::new(0),
            capacity,
        }
    }

    /// Publish an event to every subscription whose filters pass it.
    ///
    /// Returns the number of subscriptions that received the event. A full
    /// subscription buffer drops the event for that subscriber, mirroring a
    /// lagged transport.
    pub fn publish(&self, event: &ChangeEvent) -> usize {
        let mut delivered = 0;
        for entry in self.subscriptions.iter() {
            if !entry.filters.iter().any(|f| f.matches(event)) {
                continue;
            }
            match entry.sender.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(channel = %entry.key(), "Subscription buffer full; dropping event");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }
        trace!(table = %event.table, op = %event.op, recipients = delivered, "Published event");
        delivered
    }

    /// Make the next `n` calls to `open` fail, for retry testing.
    pub fn fail_next_opens(&self, n: usize) {
        self.open_failures.store(n, Ordering::SeqCst);
    }

    /// Drop a channel's subscription without the subscriber asking,
    /// simulating transport loss. The subscriber's stream ends.
    pub fn drop_subscription(&self, channel: &str) -> bool {
        self.subscriptions.remove(channel).is_some()
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

#[async_trait]
impl ChangeFeed for MemoryFeed {
    async fn open(
        &self,
        channel: &str,
        filters: &[EventFilter],
    ) -> Result<FeedSubscription, FeedError> {
        if self
            .open_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(FeedError::open_failed(channel, "injected failure"));
        }

        let (sender, events) = mpsc::channel(self.capacity);
        self.subscriptions.insert(
            channel.to_string(),
            MemorySubscription {
                filters: filters.to_vec(),
                sender,
            },
        );

        debug!(channel = %channel, filters = filters.len(), "Opened memory subscription");
        Ok(FeedSubscription {
            channel: channel.to_string(),
            events,
        })
    }

    async fn close(&self, channel: &str) {
        if self.subscriptions.remove(channel).is_some() {
            debug!(channel = %channel, "Closed memory subscription");
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
