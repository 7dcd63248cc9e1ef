//! # Run a single collaborator call.
//!
//! Wraps one provider future with the configured timeout and the owning
//! scope's cancellation token.
//!
//! ```text
//! call(fut, timeout, ctx)
//!   ├─ fut resolves            → its result
//!   ├─ timeout elapses first   → Err(Timeout)   (future dropped)
//!   └─ ctx cancelled first     → Err(Canceled)  (future dropped)
//! ```
//!
//! ## Rules
//! - `timeout = None` (or zero) means no timeout.
//! - A cancelled token short-circuits before the future is polled, and wins
//!   over a result that becomes ready in the same poll.

use std::future::Future;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::ProviderError;

/// Awaits `fut`, bounded by `timeout` and `ctx`.
pub(crate) async fn call<T, F>(
    fut: F,
    timeout: Option<Duration>,
    ctx: &CancellationToken,
) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    if ctx.is_cancelled() {
        return Err(ProviderError::Canceled);
    }

    let bounded = async {
        match timeout.filter(|d| *d > Duration::ZERO) {
            Some(dur) => match time::timeout(dur, fut).await {
                Ok(res) => res,
                Err(_elapsed) => Err(ProviderError::Timeout { timeout: dur }),
            },
            None => fut.await,
        }
    };

    tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(ProviderError::Canceled),
        res = bounded => res,
    }
}
