//! # WatchActor: restart loop around one [`Watch`].
//!
//! ```text
//! loop {
//!   ├─► run = watch.run(token)
//!   │       ├─ Ok   → failures = 0
//!   │       └─ Err  → warn + ErrorFeed, failures += 1
//!   ├─► cancelled?                       → exit Cancelled
//!   ├─► RestartPolicy::should_restart?   → no: exit Exhausted
//!   └─► sleep(backoff.next(failures))    (cancellable)
//! }
//! ```
//!
//! ## Rules
//! - Runs are sequential; a watch never runs twice at the same time.
//! - The failure counter resets after a clean end, so a stream that ends
//!   normally is reopened after `backoff.first`.

use std::sync::Arc;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::events::ErrorFeed;
use crate::policies::{BackoffPolicy, RestartPolicy};
use crate::watches::Watch;

/// Why an actor loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActorExitReason {
    /// The owning token was cancelled.
    Cancelled,
    /// The restart policy forbade another run.
    Exhausted,
}

pub(crate) struct WatchActor {
    watch: Arc<dyn Watch>,
    restart: RestartPolicy,
    backoff: BackoffPolicy,
    feed: ErrorFeed,
}

impl WatchActor {
    pub(crate) fn new(
        watch: Arc<dyn Watch>,
        restart: RestartPolicy,
        backoff: BackoffPolicy,
        feed: ErrorFeed,
    ) -> Self {
        Self {
            watch,
            restart,
            backoff,
            feed,
        }
    }

    /// Runs the watch until cancellation or restart exhaustion.
    pub(crate) async fn run(self, token: CancellationToken) -> ActorExitReason {
        let name = self.watch.name().to_string();
        let mut failures: u32 = 0;
        let mut runs: u64 = 0;

        loop {
            if token.is_cancelled() {
                return ActorExitReason::Cancelled;
            }
            runs += 1;
            tracing::debug!(watch = %name, run = runs, "watch starting");

            let failed = match self.watch.run(token.clone()).await {
                Ok(()) => {
                    failures = 0;
                    tracing::debug!(watch = %name, run = runs, "watch ended");
                    false
                }
                Err(e) => {
                    tracing::warn!(watch = %name, run = runs, error = %e, "watch failed");
                    self.feed.publish(e);
                    true
                }
            };

            if token.is_cancelled() {
                return ActorExitReason::Cancelled;
            }
            if !self.restart.should_restart(failed) {
                tracing::debug!(watch = %name, runs, "watch finished");
                return ActorExitReason::Exhausted;
            }

            let delay = self.backoff.next(failures);
            if failed {
                failures = failures.saturating_add(1);
            }
            tracing::debug!(watch = %name, delay_ms = delay.as_millis() as u64, "watch restart scheduled");

            select! {
                _ = time::sleep(delay) => {}
                _ = token.cancelled() => return ActorExitReason::Cancelled,
            }
        }
    }
}
