//! # Bus subscriber trait.
//!
//! Provides [`Subscribe`], the extension point for reacting to session events
//! published on the [`Bus`](crate::Bus).
//!
//! ## Rules
//! - Handlers run **in the publisher's task**, one after another, in
//!   registration order; `Bus::publish` resolves after the last handler.
//! - A slow handler delays every later handler for that event. Spawn
//!   long-running work instead of awaiting it inline.
//! - Panics are caught by the bus and logged; later handlers still run.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use sessionvisor::{Event, EventKind, Subscribe};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Subscribe for Audit {
//!     async fn on_event(&self, ev: &Event) {
//!         if let EventKind::LoggedOut { user_id } = &ev.kind {
//!             let _ = user_id; // write an audit record...
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "audit" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Handler for session events.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose; override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
