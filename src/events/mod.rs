//! Session events: types, the handler bus, and the error feed.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] typed login/logout events with sequence metadata
//! - [`Bus`] in-order, registration-ordered delivery to [`Subscribe`](crate::Subscribe) handlers
//! - [`Subscription`] handle that tears a handler down
//! - [`ErrorFeed`] thin wrapper over `tokio::sync::broadcast` for caught failures
//!
//! ## Quick reference
//! - **Publishers**: the authentication UI flow (through `SessionController::login`)
//!   and `SessionController::logout`.
//! - **Consumers**: the controller's own session listener, then any user
//!   subscribers (e.g. `LogWriter`) in registration order.

mod bus;
mod event;
mod feed;

pub use bus::{Bus, Subscription};
pub use event::{Event, EventKind};
pub use feed::ErrorFeed;
