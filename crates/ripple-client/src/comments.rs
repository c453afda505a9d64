//! Per-post comment threads.
//!
//! Comments are grouped by post id; within a group the newest comment
//! comes first. Only inserts flow through the feed.

use crate::backfill::Backfill;
use ripple_events::CommentRow;
use std::collections::HashMap;

/// Mapping from post id to its comments, newest first.
#[derive(Debug, Default)]
pub struct CommentThreads {
    threads: HashMap<String, Vec<CommentRow>>,
    backfill: Backfill<CommentRow>,
}

impl CommentThreads {
    /// Create empty threads in live mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an inbound comment INSERT: prepend to the post's thread,
    /// creating the thread on its first comment.
    pub fn apply(&mut self, comment: CommentRow) {
        let Some(comment) = self.backfill.intercept(comment) else {
            return;
        };
        self.ingest(comment);
    }

    fn ingest(&mut self, comment: CommentRow) {
        let thread = self.threads.entry(comment.post_id.clone()).or_default();
        if thread.iter().any(|c| c.id == comment.id) {
            return;
        }
        thread.insert(0, comment);
    }

    /// Start buffering live events while a historical fetch runs.
    pub fn begin_snapshot(&mut self) {
        self.backfill.begin();
    }

    /// Seed from snapshot threads (newest first per post) and replay
    /// buffered events, deduplicating by comment id.
    pub fn complete_snapshot(&mut self, snapshot: HashMap<String, Vec<CommentRow>>) {
        self.threads = snapshot;
        for comment in self.backfill.complete() {
            self.ingest(comment);
        }
    }

    /// The comments for a post, newest first. Empty if none seen.
    #[must_use]
    pub fn thread(&self, post_id: &str) -> &[CommentRow] {
        self.threads.get(post_id).map_or(&[], Vec::as_slice)
    }

    /// Number of posts with at least one comment.
    #[must_use]
    pub fn len(&self) -> usize {
        self.threads.len()
    }

    /// Check if no threads are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}
