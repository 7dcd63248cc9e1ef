//! # Watch abstraction.
//!
//! A [`Watch`] has a stable name and an async [`run`](Watch::run) that
//! receives a [`CancellationToken`]. `run` returns when its stream ends
//! (`Ok`), when it hits a failure it cannot skip (`Err`), or promptly after
//! the token is cancelled.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::SessionError;

/// Asynchronous, cancelable subscription.
#[async_trait]
pub trait Watch: Send + Sync + 'static {
    /// Returns a stable, human-readable name (the registry key).
    fn name(&self) -> &str;

    /// Consumes the underlying stream until it ends, fails or `ctx` is cancelled.
    async fn run(&self, ctx: CancellationToken) -> Result<(), SessionError>;
}
