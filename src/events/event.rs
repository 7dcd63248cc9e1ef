//! # Session events.
//!
//! [`EventKind`] is the typed replacement for string topics: exactly one
//! variant per lifecycle transition, each carrying the user identifier.
//! [`Event`] wraps it with a global sequence number and a timestamp.
//!
//! ## Example
//! ```rust
//! use sessionvisor::{Event, EventKind, UserId};
//!
//! let ev = Event::logged_in(UserId::from("u42"));
//! assert!(matches!(ev.kind, EventKind::LoggedIn { .. }));
//! assert_eq!(ev.user_id().as_str(), "u42");
//! assert_eq!(ev.label(), "logged_in");
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::model::UserId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Session lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A user signed in.
    LoggedIn { user_id: UserId },
    /// A user signed out.
    LoggedOut { user_id: UserId },
}

/// Session event with ordering metadata.
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// What happened.
    pub kind: EventKind,
}

impl Event {
    /// Creates an event with the current timestamp and the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
        }
    }

    #[inline]
    pub fn logged_in(user_id: UserId) -> Self {
        Self::new(EventKind::LoggedIn { user_id })
    }

    #[inline]
    pub fn logged_out(user_id: UserId) -> Self {
        Self::new(EventKind::LoggedOut { user_id })
    }

    /// The user the event is about.
    pub fn user_id(&self) -> &UserId {
        match &self.kind {
            EventKind::LoggedIn { user_id } | EventKind::LoggedOut { user_id } => user_id,
        }
    }

    /// Short stable label (snake_case) for logs.
    pub fn label(&self) -> &'static str {
        match self.kind {
            EventKind::LoggedIn { .. } => "logged_in",
            EventKind::LoggedOut { .. } => "logged_out",
        }
    }
}
