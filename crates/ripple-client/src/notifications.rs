//! Notification projection.
//!
//! The inbox holds the recipient's notifications most-recent-first, tracks
//! an unread counter, and surfaces each inbound notification as a toast.
//! The subscription feeding it is parameterized per recipient, never
//! global.

use crate::backfill::Backfill;
use crate::toast::{Toast, ToastSink};
use ripple_events::{NotificationKind, NotificationRow, UserSummary};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default toast auto-dismiss duration.
pub const TOAST_DURATION: Duration = Duration::from_secs(5);

/// Fallback display name when the sender summary is missing.
const FALLBACK_SENDER: &str = "Someone";

/// Derive the toast for a notification.
#[must_use]
pub fn toast_for(notification: &NotificationRow, duration: Duration) -> Toast {
    let sender = notification
        .sender
        .as_ref()
        .map(UserSummary::display_name)
        .unwrap_or_else(|| FALLBACK_SENDER.to_string());

    let (title, body) = match notification.kind {
        NotificationKind::Follow => ("New Follower", format!("{sender} started following you")),
        NotificationKind::Like => ("New Like", format!("{sender} liked your post")),
        NotificationKind::Comment => ("New Comment", format!("{sender} commented on your post")),
    };

    Toast::new(title, body, duration)
}

/// The recipient's notification list plus unread counter.
pub struct NotificationInbox {
    entries: Vec<NotificationRow>,
    unread: usize,
    sink: Arc<dyn ToastSink>,
    toast_duration: Duration,
    backfill: Backfill<NotificationRow>,
}

impl NotificationInbox {
    /// Create an inbox surfacing toasts through the given sink.
    #[must_use]
    pub fn new(sink: Arc<dyn ToastSink>) -> Self {
        Self {
            entries: Vec::new(),
            unread: 0,
            sink,
            toast_duration: TOAST_DURATION,
            backfill: Backfill::live(),
        }
    }

    /// Override the toast auto-dismiss duration.
    #[must_use]
    pub fn with_toast_duration(mut self, duration: Duration) -> Self {
        self.toast_duration = duration;
        self
    }

    /// Apply an inbound notification INSERT.
    ///
    /// Prepends the notification, bumps the unread counter, and surfaces a
    /// toast. While a snapshot fetch is in flight the event is buffered
    /// instead (see [`begin_snapshot`]).
    ///
    /// [`begin_snapshot`]: NotificationInbox::begin_snapshot
    pub fn apply(&mut self, notification: NotificationRow) {
        let Some(notification) = self.backfill.intercept(notification) else {
            return;
        };
        self.ingest(notification);
    }

    fn ingest(&mut self, notification: NotificationRow) {
        if self.entries.iter().any(|n| n.id == notification.id) {
            return;
        }

        let toast = toast_for(&notification, self.toast_duration);
        if !notification.is_read {
            self.unread += 1;
        }
        self.entries.insert(0, notification);

        // Toast delivery is best-effort and happens after the state update;
        // a failing sink never blocks the inbox.
        self.sink.show(toast);
    }

    /// Start buffering live events while a historical fetch runs.
    pub fn begin_snapshot(&mut self) {
        self.backfill.begin();
    }

    /// Seed the inbox from a snapshot (newest first) and replay the events
    /// buffered since [`begin_snapshot`], deduplicating by id.
    ///
    /// [`begin_snapshot`]: NotificationInbox::begin_snapshot
    pub fn complete_snapshot(&mut self, snapshot: Vec<NotificationRow>) {
        self.unread = snapshot.iter().filter(|n| !n.is_read).count();
        self.entries = snapshot;

        let buffered = self.backfill.complete();
        debug!(buffered = buffered.len(), "Replaying events buffered during snapshot fetch");
        for notification in buffered {
            self.ingest(notification);
        }
    }

    /// Mark one notification read.
    ///
    /// Decrements the unread counter, floored at zero. Idempotent: marking
    /// an already-read notification again changes nothing. Returns whether
    /// anything changed.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.entries.iter_mut().find(|n| n.id == id) {
            Some(n) if !n.is_read => {
                n.is_read = true;
                self.unread = self.unread.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    /// Mark every notification read and zero the unread counter.
    pub fn mark_all_read(&mut self) {
        for n in &mut self.entries {
            n.is_read = true;
        }
        self.unread = 0;
    }

    /// Current unread count.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.unread
    }

    /// Notifications, most recent first.
    #[must_use]
    pub fn notifications(&self) -> &[NotificationRow] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toast::ChannelToastSink;
    use tokio::sync::mpsc;

    fn notification(id: &str, kind: NotificationKind, username: Option<&str>) -> NotificationRow {
        NotificationRow {
            id: id.to_string(),
            recipient_id: "u1".to_string(),
            sender_id: "u2".to_string(),
            kind,
            post_id: None,
            message: None,
            is_read: false,
            created_at: 0,
            sender: username.map(|u| UserSummary {
                username: u.to_string(),
                first_name: None,
                last_name: None,
                avatar_url: None,
            }),
        }
    }

    fn inbox() -> (NotificationInbox, mpsc::UnboundedReceiver<Toast>) {
        let (sink, rx) = ChannelToastSink::new();
        (NotificationInbox::new(Arc::new(sink)), rx)
    }

    #[test]
    fn test_insert_prepends_counts_and_toasts() {
        let (mut inbox, mut toasts) = inbox();

        inbox.apply(notification("n1", NotificationKind::Comment, Some("alice")));

        assert_eq!(inbox.unread_count(), 1);
        assert_eq!(inbox.notifications().len(), 1);

        let toast = toasts.try_recv().unwrap();
        assert_eq!(toast.title, "New Comment");
        assert_eq!(toast.body, "alice commented on your post");
        assert_eq!(toast.duration, Duration::from_secs(5));
    }

    #[test]
    fn test_most_recent_first() {
        let (mut inbox, _toasts) = inbox();
        inbox.apply(notification("n1", NotificationKind::Like, Some("alice")));
        inbox.apply(notification("n2", NotificationKind::Follow, Some("bob")));

        let ids: Vec<&str> = inbox.notifications().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["n2", "n1"]);
        assert_eq!(inbox.unread_count(), 2);
    }

    #[test]
    fn test_toast_titles_per_kind() {
        let follow = toast_for(
            &notification("n1", NotificationKind::Follow, Some("alice")),
            TOAST_DURATION,
        );
        assert_eq!(follow.title, "New Follower");
        assert_eq!(follow.body, "alice started following you");

        let like = toast_for(
            &notification("n2", NotificationKind::Like, Some("alice")),
            TOAST_DURATION,
        );
        assert_eq!(like.title, "New Like");
        assert_eq!(like.body, "alice liked your post");
    }

    #[test]
    fn test_unknown_sender_falls_back() {
        let toast = toast_for(
            &notification("n1", NotificationKind::Like, None),
            TOAST_DURATION,
        );
        assert_eq!(toast.body, "Someone liked your post");
    }

    #[test]
    fn test_full_name_preferred_in_toast() {
        let mut n = notification("n1", NotificationKind::Follow, Some("adoe"));
        if let Some(sender) = &mut n.sender {
            sender.first_name = Some("Alice".to_string());
            sender.last_name = Some("Doe".to_string());
        }
        let toast = toast_for(&n, TOAST_DURATION);
        assert_eq!(toast.body, "Alice Doe started following you");
    }

    #[test]
    fn test_mark_read_is_idempotent_and_floored() {
        let (mut inbox, _toasts) = inbox();
        inbox.apply(notification("n1", NotificationKind::Like, Some("alice")));
        assert_eq!(inbox.unread_count(), 1);

        assert!(inbox.mark_read("n1"));
        assert_eq!(inbox.unread_count(), 0);

        // Already read: counter stays put.
        assert!(!inbox.mark_read("n1"));
        assert_eq!(inbox.unread_count(), 0);

        // Unknown id: no-op.
        assert!(!inbox.mark_read("nope"));
        assert_eq!(inbox.unread_count(), 0);
    }

    #[test]
    fn test_mark_all_read_zeroes_counter() {
        let (mut inbox, _toasts) = inbox();
        for i in 0..3 {
            inbox.apply(notification(
                &format!("n{i}"),
                NotificationKind::Like,
                Some("alice"),
            ));
        }
        assert_eq!(inbox.unread_count(), 3);

        inbox.mark_all_read();
        assert_eq!(inbox.unread_count(), 0);
        assert!(inbox.notifications().iter().all(|n| n.is_read));

        // Idempotent, and individual re-marks stay no-ops.
        inbox.mark_all_read();
        assert!(!inbox.mark_read("n0"));
        assert_eq!(inbox.unread_count(), 0);
    }

    #[test]
    fn test_duplicate_insert_ignored() {
        let (mut inbox, _toasts) = inbox();
        inbox.apply(notification("n1", NotificationKind::Like, Some("alice")));
        inbox.apply(notification("n1", NotificationKind::Like, Some("alice")));

        assert_eq!(inbox.notifications().len(), 1);
        assert_eq!(inbox.unread_count(), 1);
    }

    #[test]
    fn test_snapshot_buffers_and_replays() {
        let (mut inbox, _toasts) = inbox();

        inbox.begin_snapshot();
        // Live events racing the fetch: one overlaps the snapshot.
        inbox.apply(notification("n2", NotificationKind::Like, Some("alice")));
        inbox.apply(notification("n3", NotificationKind::Follow, Some("bob")));

        let mut seeded = notification("n1", NotificationKind::Comment, Some("carol"));
        seeded.is_read = true;
        inbox.complete_snapshot(vec![
            notification("n2", NotificationKind::Like, Some("alice")),
            seeded,
        ]);

        // n2 deduplicated, n3 replayed on top.
        let ids: Vec<&str> = inbox.notifications().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["n3", "n2", "n1"]);
        // n1 came read from the snapshot; n2 and n3 are unread.
        assert_eq!(inbox.unread_count(), 2);
    }
}
