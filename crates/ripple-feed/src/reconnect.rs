//! Reconnection with exponential backoff.
//!
//! The backing change-feed gives no delivery guarantee across a dropped
//! connection, so `ReconnectingFeed` supervises every open subscription:
//! when an upstream stream ends without the subscriber closing it, the
//! channel is re-opened with exponentially growing, capped, jittered
//! delays, and the subscriber's stream stays alive across the gap.

use crate::traits::{ChangeFeed, FeedError, FeedSubscription, DEFAULT_SUBSCRIPTION_CAPACITY};
use async_trait::async_trait;
use dashmap::DashSet;
use rand::Rng;
use ripple_events::EventFilter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

/// Backoff policy configuration.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Delay before the first retry.
    pub initial: Duration,
    /// Upper bound on any delay.
    pub max: Duration,
    /// Growth factor between attempts.
    pub multiplier: f64,
    /// Apply full jitter (uniform over [0, delay]).
    pub jitter: bool,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(250),
            max: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

/// Exponential backoff state for one subscription.
#[derive(Debug)]
pub struct Backoff {
    config: BackoffConfig,
    attempt: u32,
}

impl Backoff {
    /// Create backoff state from a policy.
    #[must_use]
    pub fn new(config: BackoffConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Number of delays handed out since the last reset.
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Compute the next delay and advance the attempt counter.
    pub fn next_delay(&mut self) -> Duration {
        let exp = self.config.initial.as_millis() as f64
            * self.config.multiplier.powi(self.attempt as i32);
        let capped = exp.min(self.config.max.as_millis() as f64).max(0.0) as u64;
        self.attempt = self.attempt.saturating_add(1);

        let millis = if self.config.jitter && capped > 0 {
            rand::thread_rng().gen_range(0..=capped)
        } else {
            capped
        };
        Duration::from_millis(millis)
    }

    /// Reset after a successful reconnect.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

/// Wraps a [`ChangeFeed`] with automatic re-subscription.
///
/// Channels closed through [`ChangeFeed::close`] are never re-opened;
/// only unexpected stream loss triggers the retry loop.
pub struct ReconnectingFeed<F> {
    inner: Arc<F>,
    config: BackoffConfig,
    /// Channels that should be kept alive across reconnects.
    active: Arc<DashSet<String>>,
    capacity: usize,
}

impl<F: ChangeFeed + 'static> ReconnectingFeed<F> {
    /// Wrap a feed with the default backoff policy.
    #[must_use]
    pub fn new(inner: F) -> Self {
        Self::with_config(inner, BackoffConfig::default())
    }

    /// Wrap a feed with a custom backoff policy.
    #[must_use]
    pub fn with_config(inner: F, config: BackoffConfig) -> Self {
        Self {
            inner: Arc::new(inner),
            config,
            active: Arc::new(DashSet::new()),
            capacity: DEFAULT_SUBSCRIPTION_CAPACITY,
        }
    }

    /// Set the per-subscription buffer capacity.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// The wrapped feed.
    #[must_use]
    pub fn inner(&self) -> &Arc<F> {
        &self.inner
    }
}

#[async_trait]
impl<F: ChangeFeed + 'static> ChangeFeed for ReconnectingFeed<F> {
    async fn open(
        &self,
        channel: &str,
        filters: &[EventFilter],
    ) -> Result<FeedSubscription, FeedError> {
        // The first open is not retried; its failure is the caller's to
        // handle.
        let mut upstream = self.inner.open(channel, filters).await?;
        self.active.insert(channel.to_string());

        let (tx, events) = mpsc::channel(self.capacity);
        let inner = self.inner.clone();
        let active = self.active.clone();
        let config = self.config.clone();
        let channel_name = channel.to_string();
        let filters = filters.to_vec();

        tokio::spawn(async move {
            let mut backoff = Backoff::new(config);
            'supervise: loop {
                while let Some(event) = upstream.events.recv().await {
                    if tx.send(event).await.is_err() {
                        break 'supervise;
                    }
                }

                // Upstream ended. Retry only if the channel is still wanted.
                loop {
                    if !active.contains(&channel_name) || tx.is_closed() {
                        break 'supervise;
                    }

                    let delay = backoff.next_delay();
                    warn!(
                        channel = %channel_name,
                        attempt = backoff.attempt(),
                        delay_ms = delay.as_millis() as u64,
                        "Feed subscription lost; reconnecting"
                    );
                    tokio::time::sleep(delay).await;

                    if !active.contains(&channel_name) {
                        break 'supervise;
                    }

                    match inner.open(&channel_name, &filters).await {
                        Ok(sub) => {
                            debug!(channel = %channel_name, "Reconnected");
                            backoff.reset();
                            upstream = sub;
                            continue 'supervise;
                        }
                        Err(e) => {
                            warn!(channel = %channel_name, error = %e, "Reconnect failed");
                        }
                    }
                }
            }
            trace!(channel = %channel_name, "Reconnect supervisor stopped");
        });

        Ok(FeedSubscription {
            channel: channel.to_string(),
            events,
        })
    }

    async fn close(&self, channel: &str) {
        self.active.remove(channel);
        self.inner.close(channel).await;
    }

    fn name(&self) -> &'static str {
        "reconnecting"
    }

    fn is_healthy(&self) -> bool {
        self.inner.is_healthy()
    }
}
