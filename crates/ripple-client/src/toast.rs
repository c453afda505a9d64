//! Transient user notifications.
//!
//! Toasts are best-effort UI feedback: a sink that cannot deliver logs and
//! drops, and never blocks the state update that produced the toast.

use crate::metrics;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

/// A transient, auto-dismissing user notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub body: String,
    /// How long the toast stays visible before auto-dismissing.
    pub duration: Duration,
}

impl Toast {
    /// Create a toast.
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>, duration: Duration) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            duration,
        }
    }
}

/// Where toasts go. Implementations must not block or fail loudly.
pub trait ToastSink: Send + Sync {
    fn show(&self, toast: Toast);
}

/// Discards every toast. Useful for headless sessions and tests.
#[derive(Debug, Default)]
pub struct NullToastSink;

impl ToastSink for NullToastSink {
    fn show(&self, _toast: Toast) {}
}

/// Forwards toasts over an unbounded channel to whatever renders them.
#[derive(Debug, Clone)]
pub struct ChannelToastSink {
    sender: mpsc::UnboundedSender<Toast>,
}

impl ChannelToastSink {
    /// Create a sink and the receiving end for the renderer.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Toast>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ToastSink for ChannelToastSink {
    fn show(&self, toast: Toast) {
        metrics::record_toast();
        if self.sender.send(toast).is_err() {
            warn!("Toast receiver gone; dropping toast");
        }
    }
}
