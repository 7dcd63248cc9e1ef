//! # Error feed for caught session failures.
//!
//! [`ErrorFeed`] is a thin wrapper around [`tokio::sync::broadcast`]. Every
//! failure the core catches (and does not propagate) is published here so the
//! host can observe it.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits.
//! - **No persistence**: errors are lost when nobody is subscribed.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest errors.

use tokio::sync::broadcast;

use crate::error::SessionError;

/// Broadcast channel of caught [`SessionError`]s.
#[derive(Clone, Debug)]
pub struct ErrorFeed {
    tx: broadcast::Sender<SessionError>,
}

impl ErrorFeed {
    /// Creates a feed with the given capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an error to all current receivers.
    pub fn publish(&self, err: SessionError) {
        let _ = self.tx.send(err);
    }

    /// Creates a receiver that observes errors published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionError> {
        self.tx.subscribe()
    }
}
