//! Buffering for the snapshot/live-event race.
//!
//! A projection seeded from a historical snapshot can receive live events
//! while the snapshot fetch is still in flight. Those events must not be
//! lost: while loading, `Backfill` holds them; once the snapshot lands they
//! are replayed on top of it (the projection's own id checks handle rows
//! present in both).

/// Holds live events that arrive during an initial snapshot fetch.
#[derive(Debug)]
pub struct Backfill<E> {
    pending: Option<Vec<E>>,
}

impl<E> Backfill<E> {
    /// Start in live mode: events pass straight through.
    #[must_use]
    pub fn live() -> Self {
        Self { pending: None }
    }

    /// Start in loading mode: events are buffered until [`complete`].
    ///
    /// [`complete`]: Backfill::complete
    #[must_use]
    pub fn loading() -> Self {
        Self {
            pending: Some(Vec::new()),
        }
    }

    /// Check whether a snapshot fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Enter loading mode, discarding any previous buffer.
    pub fn begin(&mut self) {
        self.pending = Some(Vec::new());
    }

    /// Offer an event. Returns it back when live (apply it now); buffers it
    /// and returns `None` while loading.
    pub fn intercept(&mut self, event: E) -> Option<E> {
        match &mut self.pending {
            Some(buffer) => {
                buffer.push(event);
                None
            }
            None => Some(event),
        }
    }

    /// Leave loading mode, yielding the buffered events in arrival order
    /// for replay.
    pub fn complete(&mut self) -> Vec<E> {
        self.pending.take().unwrap_or_default()
    }
}

impl<E> Default for Backfill<E> {
    fn default() -> Self {
        Self::live()
    }
}
