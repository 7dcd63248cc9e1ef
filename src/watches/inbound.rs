//! # Inbound push watch.
//!
//! Drains the provider's notification stream and hands each message to
//! [`PushManager::on_inbound_message`]. Runs in the session scope, so logout
//! stops it.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::error::SessionError;
use crate::push::PushManager;
use crate::watches::Watch;

/// Routes inbound push messages while a session is active.
pub struct InboundPushWatch {
    manager: Arc<PushManager>,
}

impl InboundPushWatch {
    pub const NAME: &'static str = "push-inbound";

    pub fn new(manager: Arc<PushManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl Watch for InboundPushWatch {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), SessionError> {
        let mut stream = self.manager.provider().notifications();
        loop {
            let next = tokio::select! {
                _ = ctx.cancelled() => return Ok(()),
                next = stream.next() => next,
            };
            match next {
                Some(payload) => {
                    self.manager.on_inbound_message(&payload);
                }
                None => {
                    tracing::debug!("push message stream ended");
                    return Ok(());
                }
            }
        }
    }
}
