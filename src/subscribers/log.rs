//! # LogWriter: session event logger
//!
//! A minimal subscriber that writes every session event through `tracing`.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO sessionvisor: session event event="logged_in" user_id=u42 seq=7
//! INFO sessionvisor: session event event="logged_out" user_id=u42 seq=9
//! ```

use async_trait::async_trait;

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        tracing::info!(
            event = e.label(),
            user_id = %e.user_id(),
            seq = e.seq,
            "session event"
        );
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
