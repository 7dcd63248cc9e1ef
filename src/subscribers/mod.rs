//! # Session event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the built-in
//! [`LogWriter`] (behind the `logging` feature).
//!
//! ## Architecture
//! ```text
//! SessionController::login ── publish(Event) ──► Bus
//!                                                 │  (registration order)
//!                                                 ├──► session listener (controller)
//!                                                 ├──► LogWriter
//!                                                 └──► custom subscribers
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscribe;
