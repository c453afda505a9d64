//! Metrics instrumentation for the Ripple client engine.
//!
//! Uses the `metrics` facade; the embedding application decides whether to
//! install a recorder and exporter.

use metrics::{counter, gauge};

/// Metric names.
pub mod names {
    pub const EVENTS_TOTAL: &str = "ripple_events_total";
    pub const CHANNELS_ACTIVE: &str = "ripple_channels_active";
    pub const SUBSCRIPTIONS_TOTAL: &str = "ripple_subscriptions_total";
    pub const TOASTS_TOTAL: &str = "ripple_toasts_total";
}

/// Describe the metrics this crate emits.
pub fn init_metrics() {
    metrics::describe_counter!(names::EVENTS_TOTAL, "Change events pumped through the router");
    metrics::describe_gauge!(names::CHANNELS_ACTIVE, "Current number of live channels");
    metrics::describe_counter!(names::SUBSCRIPTIONS_TOTAL, "Total channel subscriptions opened");
    metrics::describe_counter!(names::TOASTS_TOTAL, "Toasts surfaced to the user");
}

/// Record one inbound change event.
pub fn record_event() {
    counter!(names::EVENTS_TOTAL).increment(1);
}

/// Update the live channel count.
pub fn set_active_channels(count: usize) {
    gauge!(names::CHANNELS_ACTIVE).set(count as f64);
}

/// Record a newly opened subscription.
pub fn record_subscription() {
    counter!(names::SUBSCRIPTIONS_TOTAL).increment(1);
}

/// Record a surfaced toast.
pub fn record_toast() {
    counter!(names::TOASTS_TOTAL).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_safe() {
        init_metrics();
        record_event();
        record_subscription();
        record_toast();
        set_active_channels(3);
    }
}
