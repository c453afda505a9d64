//! Per-post like aggregates.
//!
//! Derived from the public likes event stream: INSERT bumps a post's
//! count, DELETE drops it, clamped at zero (a DELETE can arrive before the
//! INSERT it undoes when the subscription starts mid-stream).
//!
//! The `liked_by_viewer` flag is explicitly viewer-scoped: only events
//! whose `user_id` matches the configured viewer toggle it. Events from
//! other users adjust the count alone.

use ripple_events::{ChangeOp, LikeRow};
use std::collections::HashMap;
use tracing::trace;

/// Like state for one post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LikeAggregate {
    /// Number of likes observed (inserts minus deletes, floored at 0).
    pub count: u64,
    /// Whether the configured viewer currently likes the post.
    pub liked_by_viewer: bool,
}

/// Mapping from post id to its like aggregate.
#[derive(Debug, Default)]
pub struct LikeTotals {
    totals: HashMap<String, LikeAggregate>,
    viewer: Option<String>,
}

impl LikeTotals {
    /// Create totals scoped to a viewer. With `None` the viewer flag never
    /// sets (an anonymous session likes nothing).
    #[must_use]
    pub fn new(viewer: Option<String>) -> Self {
        Self {
            totals: HashMap::new(),
            viewer,
        }
    }

    /// Apply a like event.
    pub fn apply(&mut self, like: &LikeRow, op: ChangeOp) {
        let is_viewer = self.viewer.as_deref() == Some(like.user_id.as_str());
        let aggregate = self.totals.entry(like.post_id.clone()).or_default();

        match op {
            ChangeOp::Insert => {
                aggregate.count += 1;
                if is_viewer {
                    aggregate.liked_by_viewer = true;
                }
            }
            ChangeOp::Delete => {
                aggregate.count = aggregate.count.saturating_sub(1);
                if is_viewer {
                    aggregate.liked_by_viewer = false;
                }
            }
            // Like rows are write-once; an UPDATE is noise.
            ChangeOp::Update => {
                trace!(post = %like.post_id, "Ignoring UPDATE on likes");
            }
        }
    }

    /// Like count for a post (0 if never seen).
    #[must_use]
    pub fn count(&self, post_id: &str) -> u64 {
        self.totals.get(post_id).map_or(0, |a| a.count)
    }

    /// Whether the viewer likes a post.
    #[must_use]
    pub fn liked_by_viewer(&self, post_id: &str) -> bool {
        self.totals.get(post_id).is_some_and(|a| a.liked_by_viewer)
    }

    /// The full aggregate for a post, if any events were seen.
    #[must_use]
    pub fn aggregate(&self, post_id: &str) -> Option<&LikeAggregate> {
        self.totals.get(post_id)
    }
}
