//! # Event bus for session lifecycle events.
//!
//! [`Bus`] keeps an ordered list of [`Subscribe`] handlers and delivers each
//! published [`Event`] to them one after another.
//!
//! ## Architecture
//! ```text
//! Publishers:                         Handlers (registration order):
//!   SessionController::login  ──┐
//!   SessionController::logout ──┼──► Bus::publish ──► [1] session listener
//!   auth UI flow              ──┘        (await)      [2] LogWriter
//!                                                     [N] user subscriber
//! ```
//!
//! ## Rules
//! - **In-order delivery**: handlers run sequentially, in registration order,
//!   and `publish` returns after the last one.
//! - **Snapshot semantics**: a handler registered after `publish` started never
//!   sees that event; one removed mid-publish still gets it.
//! - **No buffering**: there is no replay for late subscribers.
//! - **Explicit teardown**: [`Subscription::unsubscribe`], or dropping the handle,
//!   removes the handler.
//! - **Panic isolation**: a panicking handler is logged and skipped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::FutureExt;

use crate::events::event::Event;
use crate::subscribers::Subscribe;

struct Entry {
    id: u64,
    sub: Arc<dyn Subscribe>,
}

#[derive(Default)]
struct Shared {
    handlers: Mutex<Vec<Entry>>,
    next_id: AtomicU64,
}

impl Shared {
    fn handlers(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: u64) -> bool {
        let mut handlers = self.handlers();
        let before = handlers.len();
        handlers.retain(|e| e.id != id);
        handlers.len() != before
    }
}

/// Publish/subscribe channel for [`Event`]s.
///
/// Cheap to clone; clones share the same handler list.
#[derive(Clone, Default)]
pub struct Bus {
    shared: Arc<Shared>,
}

impl Bus {
    /// Creates a bus with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `sub` for all future events.
    ///
    /// The handler stays registered until the returned [`Subscription`] is
    /// unsubscribed or dropped.
    pub fn subscribe(&self, sub: Arc<dyn Subscribe>) -> Subscription {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let name = sub.name();
        self.shared.handlers().push(Entry { id, sub });
        tracing::debug!(subscriber = name, id, "bus subscriber registered");

        Subscription {
            id,
            name,
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Delivers `ev` to every handler registered at call time, in registration order.
    ///
    /// Returns the number of handlers that completed without panicking.
    pub async fn publish(&self, ev: Event) -> usize {
        let targets: Vec<Arc<dyn Subscribe>> = self
            .shared
            .handlers()
            .iter()
            .map(|e| Arc::clone(&e.sub))
            .collect();

        let mut delivered = 0;
        for sub in targets {
            let fut = sub.on_event(&ev);
            match std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                Ok(()) => delivered += 1,
                Err(_) => {
                    tracing::warn!(
                        subscriber = sub.name(),
                        event = ev.label(),
                        seq = ev.seq,
                        "bus subscriber panicked"
                    );
                }
            }
        }
        delivered
    }

    /// Number of registered handlers.
    pub fn subscriber_count(&self) -> usize {
        self.shared.handlers().len()
    }
}

/// Handle to a registered bus handler.
///
/// Dropping the handle unsubscribes; keep it alive for as long as the handler
/// should receive events.
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    id: u64,
    name: &'static str,
    shared: Weak<Shared>,
}

impl Subscription {
    /// Removes the handler from the bus.
    pub fn unsubscribe(self) {
        // removal happens in Drop
    }

    /// True while the handler is still registered on a live bus.
    pub fn is_active(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|s| s.handlers().iter().any(|e| e.id == self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            if shared.remove(self.id) {
                tracing::debug!(subscriber = self.name, id = self.id, "bus subscriber removed");
            }
        }
    }
}
