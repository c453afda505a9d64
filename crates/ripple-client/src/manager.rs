//! Session-scoped realtime manager.
//!
//! One `RealtimeManager` per application session owns the channel registry,
//! the router, and the feed handle. Each `subscribe_to_*` call opens the
//! channel at most once (re-subscribing returns the existing handle) and
//! spawns a pump task forwarding feed events in order into the router.

use crate::metrics;
use futures_util::StreamExt;
use ripple_core::{Binding, Channel, ChannelRegistry, EventRouter, RegistryError};
use ripple_events::{
    ChangeOp, CommentRow, EventFilter, LikeRow, NotificationRow, PostRow, Table,
};
use ripple_feed::{ChangeFeed, FeedError};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, trace};

/// Public posts channel.
pub const POSTS_CHANNEL: &str = "posts:public";
/// Public likes channel.
pub const LIKES_CHANNEL: &str = "likes:public";
/// Public comments channel.
pub const COMMENTS_CHANNEL: &str = "comments:public";

/// The per-recipient notification channel name.
#[must_use]
pub fn notifications_channel(user_id: &str) -> String {
    format!("notifications:{user_id}")
}

/// Subscription errors.
#[derive(Debug, Error)]
pub enum SubscribeError {
    /// The registry rejected the channel.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The feed could not open the subscription.
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
}

/// Coordinates channels, routing, and the feed for one session.
pub struct RealtimeManager {
    registry: Arc<ChannelRegistry>,
    router: EventRouter,
    feed: Arc<dyn ChangeFeed>,
    user_id: Mutex<Option<String>>,
}

impl RealtimeManager {
    /// Create a manager over a feed.
    #[must_use]
    pub fn new(feed: Arc<dyn ChangeFeed>) -> Self {
        let registry = Arc::new(ChannelRegistry::new());
        let router = EventRouter::new(registry.clone());
        Self {
            registry,
            router,
            feed,
            user_id: Mutex::new(None),
        }
    }

    /// The session's channel registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    /// The current session user, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<String> {
        self.user_id.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Record the session user, re-keying the notification channel.
    ///
    /// Changing the id (including to no-session) tears down the previous
    /// recipient's channel; the caller re-subscribes for the new id since a
    /// fresh callback is needed.
    pub async fn set_user_id(&self, user_id: Option<String>) {
        let previous = {
            let mut guard = self.user_id.lock().unwrap_or_else(|e| e.into_inner());
            if *guard == user_id {
                return;
            }
            std::mem::replace(&mut *guard, user_id)
        };

        if let Some(previous) = previous {
            debug!(user = %previous, "Session user changed; dropping notification channel");
            self.unsubscribe(&notifications_channel(&previous)).await;
        }
    }

    /// Subscribe to the recipient-scoped notification channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed cannot open the subscription.
    pub async fn subscribe_to_notifications(
        &self,
        user_id: &str,
        on_notification: impl Fn(NotificationRow) + Send + Sync + 'static,
    ) -> Result<Arc<Channel>, SubscribeError> {
        let name = notifications_channel(user_id);
        let filter = EventFilter::new(ChangeOp::Insert, Table::Notifications)
            .with_row_filter("recipient_id", user_id);

        let binding = Binding::new(filter, move |image| {
            if let Some(row) = decode_row::<NotificationRow>(image) {
                on_notification(row);
            }
        });

        self.attach(&name, vec![binding]).await
    }

    /// Subscribe to public post inserts and updates.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed cannot open the subscription.
    pub async fn subscribe_to_post_updates(
        &self,
        on_post: impl Fn(PostRow) + Send + Sync + 'static,
    ) -> Result<Arc<Channel>, SubscribeError> {
        let on_post = Arc::new(on_post);

        let on_insert = on_post.clone();
        let insert = Binding::new(
            EventFilter::new(ChangeOp::Insert, Table::Posts),
            move |image| {
                if let Some(row) = decode_row::<PostRow>(image) {
                    on_insert(row);
                }
            },
        );

        let update = Binding::new(
            EventFilter::new(ChangeOp::Update, Table::Posts),
            move |image| {
                if let Some(row) = decode_row::<PostRow>(image) {
                    on_post(row);
                }
            },
        );

        self.attach(POSTS_CHANNEL, vec![insert, update]).await
    }

    /// Subscribe to public like inserts and deletes. The callback receives
    /// the operation so consumers can adjust aggregates either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed cannot open the subscription.
    pub async fn subscribe_to_likes(
        &self,
        on_like: impl Fn(LikeRow, ChangeOp) + Send + Sync + 'static,
    ) -> Result<Arc<Channel>, SubscribeError> {
        let on_like = Arc::new(on_like);

        let on_insert = on_like.clone();
        let insert = Binding::new(
            EventFilter::new(ChangeOp::Insert, Table::Likes),
            move |image| {
                if let Some(row) = decode_row::<LikeRow>(image) {
                    on_insert(row, ChangeOp::Insert);
                }
            },
        );

        let delete = Binding::new(
            EventFilter::new(ChangeOp::Delete, Table::Likes),
            move |image| {
                if let Some(row) = decode_row::<LikeRow>(image) {
                    on_like(row, ChangeOp::Delete);
                }
            },
        );

        self.attach(LIKES_CHANNEL, vec![insert, delete]).await
    }

    /// Subscribe to public comment inserts.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed cannot open the subscription.
    pub async fn subscribe_to_comments(
        &self,
        on_comment: impl Fn(CommentRow) + Send + Sync + 'static,
    ) -> Result<Arc<Channel>, SubscribeError> {
        let binding = Binding::new(
            EventFilter::new(ChangeOp::Insert, Table::Comments),
            move |image| {
                if let Some(row) = decode_row::<CommentRow>(image) {
                    on_comment(row);
                }
            },
        );

        self.attach(COMMENTS_CHANNEL, vec![binding]).await
    }

    /// Tear down one channel. Unknown names are a no-op.
    pub async fn unsubscribe(&self, name: &str) {
        if self.registry.unsubscribe(name) {
            self.feed.close(name).await;
            metrics::set_active_channels(self.registry.len());
        }
    }

    /// Tear down every channel. Safe when none are active.
    pub async fn unsubscribe_all(&self) {
        for name in self.registry.channel_names() {
            self.feed.close(&name).await;
        }
        self.registry.unsubscribe_all();
        metrics::set_active_channels(0);
    }

    /// Open the channel if absent and start its event pump; return the
    /// existing handle otherwise.
    async fn attach(
        &self,
        name: &str,
        bindings: Vec<Binding>,
    ) -> Result<Arc<Channel>, SubscribeError> {
        // Reserve the registry entry before awaiting the feed open, so a
        // racing subscriber gets this handle back instead of opening a
        // second upstream subscription for the same name.
        let mut created = false;
        let handle = self.registry.subscribe(name, || {
            created = true;
            bindings
        })?;

        if !created {
            trace!(channel = %name, "Reusing existing subscription");
            return Ok(handle);
        }

        let filters = handle.filters();
        let mut subscription = match self.feed.open(name, &filters).await {
            Ok(subscription) => subscription,
            Err(e) => {
                self.registry.unsubscribe(name);
                return Err(e.into());
            }
        };

        if handle.is_closed() {
            // Torn down while the open was in flight; drop the now
            // unwanted feed subscription instead of pumping it.
            self.feed.close(name).await;
            return Ok(handle);
        }

        metrics::record_subscription();
        metrics::set_active_channels(self.registry.len());

        let router = self.router.clone();
        let channel = name.to_string();
        tokio::spawn(async move {
            while let Some(event) = subscription.next().await {
                metrics::record_event();
                router.dispatch(&channel, &event);
            }
            trace!(channel = %channel, "Event pump stopped");
        });

        debug!(channel = %name, "Subscribed");
        Ok(handle)
    }
}

fn decode_row<T: serde::de::DeserializeOwned>(image: &Value) -> Option<T> {
    match serde_json::from_value(image.clone()) {
        Ok(row) => Some(row),
        Err(e) => {
            trace!(error = %e, "Dropping row that does not match the expected shape");
            None
        }
    }
}
