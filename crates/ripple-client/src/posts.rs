//! Posts projection.
//!
//! A client-side list of posts, newest first. Inserts prepend; updates for
//! a known id replace the entry in place, keeping its position; updates for
//! an unknown id are treated as inserts rather than dropped. Deletions do
//! not flow through the event feed (they are handled request/response), so
//! there is deliberately no delete path here.

use crate::backfill::Backfill;
use ripple_events::PostRow;

/// Ordered post list kept in sync with inbound post events.
#[derive(Debug, Default)]
pub struct PostsTimeline {
    posts: Vec<PostRow>,
    backfill: Backfill<PostRow>,
}

impl PostsTimeline {
    /// Create an empty timeline in live mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an inbound post INSERT or UPDATE.
    pub fn apply(&mut self, post: PostRow) {
        let Some(post) = self.backfill.intercept(post) else {
            return;
        };
        self.merge(post);
    }

    fn merge(&mut self, post: PostRow) {
        match self.posts.iter().position(|p| p.id == post.id) {
            Some(index) => self.posts[index] = post,
            None => self.posts.insert(0, post),
        }
    }

    /// Start buffering live events while a historical fetch runs.
    pub fn begin_snapshot(&mut self) {
        self.backfill.begin();
    }

    /// Seed from a snapshot (newest first) and replay buffered events;
    /// rows present in both are replaced in place rather than duplicated.
    pub fn complete_snapshot(&mut self, snapshot: Vec<PostRow>) {
        self.posts = snapshot;
        for post in self.backfill.complete() {
            self.merge(post);
        }
    }

    /// Posts, newest first.
    #[must_use]
    pub fn posts(&self) -> &[PostRow] {
        &self.posts
    }

    /// Look up a post by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PostRow> {
        self.posts.iter().find(|p| p.id == id)
    }

    /// Number of posts held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Check if the timeline is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, content: &str) -> PostRow {
        PostRow {
            id: id.to_string(),
            author_id: "u1".to_string(),
            content: content.to_string(),
            image_url: None,
            like_count: 0,
            comment_count: 0,
            created_at: 0,
            author: None,
        }
    }

    #[test]
    fn test_insert_prepends() {
        let mut timeline = PostsTimeline::new();
        timeline.apply(post("p1", "first"));
        timeline.apply(post("p2", "second"));

        let ids: Vec<&str> = timeline.posts().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut timeline = PostsTimeline::new();
        timeline.apply(post("p1", "first"));
        timeline.apply(post("p2", "second"));
        timeline.apply(post("p3", "third"));

        // Update the middle entry: content changes, position does not.
        timeline.apply(post("p2", "edited"));

        let ids: Vec<&str> = timeline.posts().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p2", "p1"]);
        assert_eq!(timeline.get("p2").unwrap().content, "edited");
        assert_eq!(timeline.len(), 3);
    }

    #[test]
    fn test_update_for_unknown_id_is_added() {
        let mut timeline = PostsTimeline::new();
        timeline.apply(post("p1", "first"));

        // An UPDATE event for an id we never saw must not be dropped.
        timeline.apply(post("p9", "unseen"));

        let ids: Vec<&str> = timeline.posts().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p9", "p1"]);
    }

    #[test]
    fn test_snapshot_replay_dedups_by_id() {
        let mut timeline = PostsTimeline::new();

        timeline.begin_snapshot();
        timeline.apply(post("p2", "live update"));
        timeline.apply(post("p3", "brand new"));

        timeline.complete_snapshot(vec![post("p2", "stale"), post("p1", "old")]);

        let ids: Vec<&str> = timeline.posts().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p2", "p1"]);
        // The buffered live event wins over the snapshot row.
        assert_eq!(timeline.get("p2").unwrap().content, "live update");
    }
}
