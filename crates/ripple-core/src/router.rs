//! Change-event routing for Ripple.
//!
//! The router takes an inbound event tagged with the channel it arrived on,
//! selects the channel's matching bindings, and invokes each with the row
//! image relevant to the operation.

use crate::registry::ChannelRegistry;
use ripple_events::ChangeEvent;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{trace, warn};

/// Dispatches inbound change events to channel bindings.
///
/// Unmatched events are not an error: events for unknown or torn-down
/// channels, events no binding listens for, and events missing their row
/// image are all dropped silently. Within one channel the router preserves
/// feed emission order; it never reorders.
#[derive(Debug, Clone)]
pub struct EventRouter {
    registry: Arc<ChannelRegistry>,
}

impl EventRouter {
    /// Create a router over a registry.
    #[must_use]
    pub fn new(registry: Arc<ChannelRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this router dispatches against.
    #[must_use]
    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    /// Dispatch an event that arrived on the named channel.
    ///
    /// Returns the number of handlers that ran to completion. A panicking
    /// handler is isolated: it is logged and skipped, and neither the other
    /// bindings nor subsequent events are affected.
    pub fn dispatch(&self, channel_name: &str, event: &ChangeEvent) -> usize {
        let Some(channel) = self.registry.get(channel_name) else {
            trace!(channel = %channel_name, "Dropping event for unknown channel");
            return 0;
        };

        if channel.is_closed() {
            trace!(channel = %channel_name, "Dropping event for closed channel");
            return 0;
        }

        let Some(image) = event.image() else {
            trace!(channel = %channel_name, op = %event.op, "Dropping event without row image");
            return 0;
        };

        let mut delivered = 0;
        for binding in channel.bindings() {
            if !binding.filter().matches(event) {
                continue;
            }

            match catch_unwind(AssertUnwindSafe(|| binding.invoke(image))) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    warn!(
                        channel = %channel_name,
                        table = %event.table,
                        op = %event.op,
                        "Handler panicked; skipping"
                    );
                }
            }
        }

        trace!(
            channel = %channel_name,
            table = %event.table,
            op = %event.op,
            handlers = delivered,
            "Dispatched event"
        );
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Binding;
    use ripple_events::{ChangeOp, EventFilter, Table};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn setup() -> (Arc<ChannelRegistry>, EventRouter) {
        let registry = Arc::new(ChannelRegistry::new());
        let router = EventRouter::new(registry.clone());
        (registry, router)
    }

    #[test]
    fn test_dispatch_selects_matching_binding() {
        let (registry, router) = setup();
        let inserts = Arc::new(AtomicUsize::new(0));
        let deletes = Arc::new(AtomicUsize::new(0));

        let i = inserts.clone();
        let d = deletes.clone();
        registry
            .subscribe("likes:public", move || {
                vec![
                    Binding::new(EventFilter::new(ChangeOp::Insert, Table::Likes), move |_| {
                        i.fetch_add(1, Ordering::SeqCst);
                    }),
                    Binding::new(EventFilter::new(ChangeOp::Delete, Table::Likes), move |_| {
                        d.fetch_add(1, Ordering::SeqCst);
                    }),
                ]
            })
            .unwrap();

        let event = ChangeEvent::insert(Table::Likes, json!({"id": "l1"}));
        assert_eq!(router.dispatch("likes:public", &event), 1);
        assert_eq!(inserts.load(Ordering::SeqCst), 1);
        assert_eq!(deletes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_delete_gets_before_image() {
        let (registry, router) = setup();
        let seen = Arc::new(std::sync::Mutex::new(None));

        let s = seen.clone();
        registry
            .subscribe("likes:public", move || {
                vec![Binding::new(
                    EventFilter::new(ChangeOp::Delete, Table::Likes),
                    move |image| {
                        *s.lock().unwrap() = Some(image.clone());
                    },
                )]
            })
            .unwrap();

        let event = ChangeEvent::delete(Table::Likes, json!({"id": "l9"}));
        router.dispatch("likes:public", &event);
        assert_eq!(seen.lock().unwrap().clone(), Some(json!({"id": "l9"})));
    }

    #[test]
    fn test_unknown_channel_dropped_silently() {
        let (_registry, router) = setup();
        let event = ChangeEvent::insert(Table::Posts, json!({"id": "p1"}));
        assert_eq!(router.dispatch("nope", &event), 0);
    }

    #[test]
    fn test_closed_channel_discards_in_flight_events() {
        let (registry, router) = setup();
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        registry
            .subscribe("posts:public", move || {
                vec![Binding::new(
                    EventFilter::new(ChangeOp::Insert, Table::Posts),
                    move |_| {
                        c.fetch_add(1, Ordering::SeqCst);
                    },
                )]
            })
            .unwrap();

        let event = ChangeEvent::insert(Table::Posts, json!({"id": "p1"}));
        assert_eq!(router.dispatch("posts:public", &event), 1);

        registry.unsubscribe("posts:public");
        assert_eq!(router.dispatch("posts:public", &event), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_handler_is_isolated() {
        let (registry, router) = setup();
        let survivors = Arc::new(AtomicUsize::new(0));

        let s = survivors.clone();
        registry
            .subscribe("posts:public", move || {
                vec![
                    Binding::new(EventFilter::new(ChangeOp::Insert, Table::Posts), |_| {
                        panic!("bad handler");
                    }),
                    Binding::new(EventFilter::new(ChangeOp::Insert, Table::Posts), move |_| {
                        s.fetch_add(1, Ordering::SeqCst);
                    }),
                ]
            })
            .unwrap();

        let event = ChangeEvent::insert(Table::Posts, json!({"id": "p1"}));

        // The panicking binding is skipped; the second still runs.
        assert_eq!(router.dispatch("posts:public", &event), 1);
        assert_eq!(survivors.load(Ordering::SeqCst), 1);

        // The router stays usable for subsequent events.
        assert_eq!(router.dispatch("posts:public", &event), 1);
        assert_eq!(survivors.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_row_filter_scopes_delivery() {
        let (registry, router) = setup();
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        registry
            .subscribe("notifications:u1", move || {
                vec![Binding::new(
                    EventFilter::new(ChangeOp::Insert, Table::Notifications)
                        .with_row_filter("recipient_id", "u1"),
                    move |_| {
                        c.fetch_add(1, Ordering::SeqCst);
                    },
                )]
            })
            .unwrap();

        let mine = ChangeEvent::insert(Table::Notifications, json!({"recipient_id": "u1"}));
        let theirs = ChangeEvent::insert(Table::Notifications, json!({"recipient_id": "u2"}));

        assert_eq!(router.dispatch("notifications:u1", &mine), 1);
        assert_eq!(router.dispatch("notifications:u1", &theirs), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
