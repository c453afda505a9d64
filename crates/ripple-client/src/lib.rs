//! # ripple-client
//!
//! Consumer-facing engine for the Ripple realtime sync stack.
//!
//! This crate ties the lower layers together for an application session:
//!
//! - **RealtimeManager** - one object per session that opens the
//!   per-recipient notification channel and the public posts/likes/comments
//!   channels, pumping feed events through the router
//! - **NotificationInbox** - notification projection with an unread counter
//!   and transient toast surfacing
//! - **PostsTimeline / LikeTotals / CommentThreads** - client-side
//!   projections kept eventually consistent with the backing store
//! - **Backfill** - buffers live events that race an initial snapshot fetch
//!
//! Consumers hold the manager and the projections; they never touch the
//! underlying feed transport directly.

pub mod backfill;
pub mod comments;
pub mod config;
pub mod likes;
pub mod manager;
pub mod metrics;
pub mod notifications;
pub mod posts;
pub mod toast;

pub use backfill::Backfill;
pub use comments::CommentThreads;
pub use config::Config;
pub use likes::{LikeAggregate, LikeTotals};
pub use manager::{
    notifications_channel, RealtimeManager, SubscribeError, COMMENTS_CHANNEL, LIKES_CHANNEL,
    POSTS_CHANNEL,
};
pub use notifications::NotificationInbox;
pub use posts::PostsTimeline;
pub use toast::{ChannelToastSink, NullToastSink, Toast, ToastSink};
