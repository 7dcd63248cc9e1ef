//! # Push registration manager.
//!
//! Owns the device-registration chain and the inbound-message routing.
//!
//! ## Registration flow
//! ```text
//! register_and_persist(user_id)
//!   ├─► platform.has_native_push()?  no ─► Ok(None)          (not an error)
//!   ├─► push.register()              err ─► PushRegistrationFailed{Register}
//!   ├─► push.save_token(handle)      err ─► PushRegistrationFailed{SaveToken}
//!   └─► user_id known?
//!         ├─ no  ─► token not persisted
//!         └─ yes ─► spawn persist_token(uid, token)
//!                     store.write("users/<uid>/pushToken", token)
//!                     (fire-and-forget; failure → TokenPersistFailed on the feed)
//! ```
//!
//! ## Rules
//! - No retries: a failed step aborts this invocation only.
//! - The token write is not awaited by the registration flow.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::runner::call;
use crate::error::{PushStage, SessionError};
use crate::events::ErrorFeed;
use crate::model::{NotificationPayload, PushToken, UserId};
use crate::providers::{Platform, ProfileStore, PushProvider, push_token_path};
use crate::push::{InboundAction, classify};
use crate::ui::{AlertConfig, Alerter};

/// Registers the device for push and routes inbound messages.
pub struct PushManager {
    platform: Arc<dyn Platform>,
    push: Arc<dyn PushProvider>,
    store: Arc<dyn ProfileStore>,
    alerter: Arc<dyn Alerter>,
    feed: ErrorFeed,
    timeout: Option<Duration>,
    alert_title: String,
    close_label: String,
}

impl PushManager {
    pub fn new(
        platform: Arc<dyn Platform>,
        push: Arc<dyn PushProvider>,
        store: Arc<dyn ProfileStore>,
        alerter: Arc<dyn Alerter>,
        feed: ErrorFeed,
        cfg: &Config,
    ) -> Self {
        Self {
            platform,
            push,
            store,
            alerter,
            feed,
            timeout: cfg.call_timeout(),
            alert_title: cfg.friend_alert_title.clone(),
            close_label: cfg.alert_close_label.clone(),
        }
    }

    /// The inbound message stream of the underlying provider.
    pub(crate) fn provider(&self) -> &Arc<dyn PushProvider> {
        &self.push
    }

    /// True when the platform can receive native push.
    pub fn is_supported(&self) -> bool {
        self.platform.has_native_push()
    }

    /// Registers the device and persists the confirmed token for `user_id`.
    ///
    /// Returns `Ok(None)` on platforms without native push. The token write is
    /// spawned and not awaited; its failure is reported on the error feed.
    /// `ctx` bounds every provider call (and the spawned write).
    pub async fn register_and_persist(
        self: &Arc<Self>,
        user_id: Option<&UserId>,
        ctx: &CancellationToken,
    ) -> Result<Option<PushToken>, SessionError> {
        if !self.is_supported() {
            tracing::debug!("native push unavailable; skipping registration");
            return Ok(None);
        }

        let handle = call(self.push.register(), self.timeout, ctx)
            .await
            .map_err(|error| SessionError::PushRegistrationFailed {
                stage: PushStage::Register,
                error,
            })?;

        let token = call(self.push.save_token(handle), self.timeout, ctx)
            .await
            .map_err(|error| SessionError::PushRegistrationFailed {
                stage: PushStage::SaveToken,
                error,
            })?;
        tracing::info!("push token saved");

        if let Some(uid) = user_id {
            let this = Arc::clone(self);
            let uid = uid.clone();
            let token = token.clone();
            let ctx = ctx.clone();
            tokio::spawn(async move {
                match this.persist_token(Some(&uid), &token, &ctx).await {
                    Ok(_) => {}
                    Err(SessionError::TokenPersistFailed { error, .. }) if error.is_canceled() => {
                        tracing::debug!(user_id = %uid, "push token write cancelled");
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, user_id = %uid, "push token write failed");
                        this.feed.publish(err);
                    }
                }
            });
        } else {
            tracing::debug!("no user id yet; push token not persisted");
        }

        Ok(Some(token))
    }

    /// Writes `token` under `users/<user_id>/pushToken` and waits for the store.
    ///
    /// Returns `Ok(false)` without touching the store when `user_id` is `None`.
    pub async fn persist_token(
        &self,
        user_id: Option<&UserId>,
        token: &PushToken,
        ctx: &CancellationToken,
    ) -> Result<bool, SessionError> {
        let Some(uid) = user_id else {
            return Ok(false);
        };
        let path = push_token_path(uid);
        call(self.store.write(&path, Value::String(token.value.clone())), self.timeout, ctx)
            .await
            .map_err(|error| SessionError::TokenPersistFailed {
                user_id: uid.clone(),
                error,
            })?;
        tracing::debug!(path = %path, "push token written");
        Ok(true)
    }

    /// Classifies one inbound message and triggers its UI side effect.
    pub fn on_inbound_message(&self, payload: &NotificationPayload) -> InboundAction {
        let action = classify(payload);
        match action {
            InboundAction::FriendCheckIn => {
                tracing::info!(
                    friend = payload.additional_data.id.as_deref().unwrap_or("unknown"),
                    "friend check-in received"
                );
                let alert =
                    AlertConfig::friend_check_in(payload, &self.alert_title, &self.close_label);
                self.alerter.show(&alert);
            }
            InboundAction::Ignore => {
                tracing::debug!(
                    page = payload.additional_data.page.as_deref().unwrap_or(""),
                    title = %payload.title,
                    "push message without ui action"
                );
            }
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::model::AdditionalData;
    use crate::testing::{FakePlatform, FakePush, FakeStore, RecordingAlerter, wait_for};

    struct Rig {
        platform: Arc<FakePlatform>,
        push: Arc<FakePush>,
        store: Arc<FakeStore>,
        alerter: Arc<RecordingAlerter>,
        feed: ErrorFeed,
        manager: Arc<PushManager>,
    }

    fn rig(native_push: bool) -> Rig {
        let platform = Arc::new(FakePlatform::new(native_push));
        let push = Arc::new(FakePush::new("tok-1"));
        let store = Arc::new(FakeStore::new());
        let alerter = Arc::new(RecordingAlerter::default());
        let feed = ErrorFeed::new(16);
        let manager = Arc::new(PushManager::new(
            platform.clone(),
            push.clone(),
            store.clone(),
            alerter.clone(),
            feed.clone(),
            &Config::default(),
        ));
        Rig {
            platform,
            push,
            store,
            alerter,
            feed,
            manager,
        }
    }

    #[tokio::test]
    async fn registers_and_writes_token_under_user_path() {
        let r = rig(true);
        let uid = UserId::from("u-7");
        let ctx = CancellationToken::new();

        let token = r.manager.register_and_persist(Some(&uid), &ctx).await.unwrap();
        assert_eq!(token, Some(PushToken::new("tok-1")));

        let (path, value) = wait_for(r.store.next_write()).await;
        assert_eq!(path, "users/u-7/pushToken");
        assert_eq!(value, Value::String("tok-1".into()));
        assert_eq!(r.push.registrations(), 1);
    }

    #[tokio::test]
    async fn unknown_user_means_no_write() {
        let r = rig(true);
        let ctx = CancellationToken::new();

        let token = r.manager.register_and_persist(None, &ctx).await.unwrap();
        assert!(token.is_some());
        assert!(!r.manager.persist_token(None, &PushToken::new("t"), &ctx).await.unwrap());

        tokio::task::yield_now().await;
        assert!(r.store.writes().is_empty());
    }

    #[tokio::test]
    async fn persist_path_is_the_literal_user_id() {
        let r = rig(true);
        let ctx = CancellationToken::new();
        for raw in ["a", "user with spaces", "ÜID", "x/y"] {
            let uid = UserId::from(raw);
            assert!(r.manager.persist_token(Some(&uid), &PushToken::new("t"), &ctx).await.unwrap());
            let (path, _) = r.store.writes().pop().unwrap();
            assert_eq!(path, format!("users/{raw}/pushToken"));
        }
    }

    #[tokio::test]
    async fn no_native_push_is_a_silent_noop() {
        let r = rig(false);
        let res = r
            .manager
            .register_and_persist(Some(&UserId::from("u")), &CancellationToken::new())
            .await;
        assert_eq!(res, Ok(None));
        assert_eq!(r.push.registrations(), 0);
        assert!(!r.platform.has_native_push());
    }

    #[tokio::test]
    async fn register_failure_aborts_the_chain() {
        let r = rig(true);
        r.push.fail_register("no play services");
        let err = r
            .manager
            .register_and_persist(Some(&UserId::from("u")), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::PushRegistrationFailed {
                stage: PushStage::Register,
                error: ProviderError::fail("no play services"),
            }
        );
        assert_eq!(r.push.saves(), 0);
        assert!(r.store.writes().is_empty());
    }

    #[tokio::test]
    async fn save_failure_reports_its_stage() {
        let r = rig(true);
        r.push.fail_save("backend down");
        let err = r
            .manager
            .register_and_persist(Some(&UserId::from("u")), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::PushRegistrationFailed {
                stage: PushStage::SaveToken,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn failed_write_lands_on_the_feed() {
        let r = rig(true);
        r.store.fail_writes("permission denied");
        let mut errors = r.feed.subscribe();

        let res = r
            .manager
            .register_and_persist(Some(&UserId::from("u")), &CancellationToken::new())
            .await;
        assert!(res.is_ok());

        let err = wait_for(errors.recv()).await.unwrap();
        assert_eq!(err.as_label(), "token_persist_failed");
    }

    #[tokio::test]
    async fn cancelled_write_is_dropped_quietly() {
        let r = rig(true);
        r.store.hold_writes();
        let mut errors = r.feed.subscribe();
        let ctx = CancellationToken::new();

        let token = r.manager.register_and_persist(Some(&UserId::from("u")), &ctx).await;
        assert_eq!(token, Ok(Some(PushToken::new("tok-1"))));
        wait_for(r.store.wait_writes_started(1)).await;

        ctx.cancel();
        r.store.release_writes();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(r.store.writes().is_empty());
        assert!(errors.try_recv().is_err());
    }

    fn message(page: &str, foreground: bool) -> NotificationPayload {
        NotificationPayload {
            title: "Check-in".into(),
            text: "Sam checked in".into(),
            additional_data: AdditionalData {
                page: Some(page.into()),
                foreground: Some(foreground),
                image: Some("sam.png".into()),
                id: Some("sam".into()),
            },
        }
    }

    #[test]
    fn background_friend_message_shows_alert() {
        let r = rig(true);
        let action = r.manager.on_inbound_message(&message("friends", false));
        assert_eq!(action, InboundAction::FriendCheckIn);

        let shown = r.alerter.shown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "Friend Checked-In");
        assert_eq!(shown[0].message, "Sam checked in");
        assert_eq!(shown[0].friend_id.as_deref(), Some("sam"));
        assert_eq!(shown[0].buttons[0].text, "Close");
    }

    #[test]
    fn foreground_and_other_messages_show_nothing() {
        let r = rig(true);
        r.manager.on_inbound_message(&message("friends", true));
        r.manager.on_inbound_message(&message("other", false));
        assert!(r.alerter.shown().is_empty());
    }
}
