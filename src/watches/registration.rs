//! # One-shot push registration.
//!
//! Wraps [`PushManager::register_and_persist`] as a session-scoped watch so the
//! registration chain is cancelled with the session that started it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::SessionError;
use crate::model::UserId;
use crate::push::PushManager;
use crate::watches::Watch;

/// Registers the device for push on behalf of `user_id`.
pub struct PushRegistration {
    manager: Arc<PushManager>,
    user_id: Option<UserId>,
}

impl PushRegistration {
    pub const NAME: &'static str = "push-registration";

    pub fn new(manager: Arc<PushManager>, user_id: Option<UserId>) -> Self {
        Self { manager, user_id }
    }
}

#[async_trait]
impl Watch for PushRegistration {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), SessionError> {
        match self
            .manager
            .register_and_persist(self.user_id.as_ref(), &ctx)
            .await
        {
            Ok(_) => Ok(()),
            Err(SessionError::PushRegistrationFailed { error, .. }) if error.is_canceled() => {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
