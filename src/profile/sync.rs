//! # ProfileSync: one live subscription to the current user's record.
//!
//! ```text
//! attach(Some(uid))
//!   ├─ same uid attached, pump running  → no-op
//!   ├─ same uid attached, stream ended  → release, subscribe again
//!   ├─ other uid attached               → invalidate generation, cancel, join, reset profile
//!   ├─ store.subscribe("users/<uid>")   → Err → ProfileSubscriptionFailed (returned + feed)
//!   └─ spawn pump(generation)
//!         for each snapshot:
//!           ├─ null          → empty snapshot
//!           ├─ malformed     → ProfileSubscriptionFailed on the feed, keep going
//!           └─ generation still current? → context.profile = normalized record
//!         stream ends on its own → ProfileSubscriptionFailed on the feed
//! detach()
//!   └─ invalidate generation, cancel, join, reset profile
//! ```
//!
//! ## Rules
//! - At most one pump is alive; `attach` returns only after the previous one has stopped.
//! - A snapshot from a released subscription never reaches the context: the
//!   generation check and the write happen under the same lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::context::SessionContext;
use crate::core::runner::call;
use crate::error::SessionError;
use crate::events::ErrorFeed;
use crate::model::{ProfileRecord, ProfileSnapshot, UserId};
use crate::providers::{ProfileStore, SnapshotStream, user_path};

struct Attachment {
    user_id: UserId,
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

struct Shared {
    store: Arc<dyn ProfileStore>,
    context: Arc<SessionContext>,
    feed: ErrorFeed,
    timeout: Option<Duration>,
    parent: CancellationToken,
    /// Generation whose snapshots may be applied; 0 means none.
    live: Mutex<u64>,
}

impl Shared {
    fn report(&self, err: SessionError) {
        tracing::warn!(error = %err, label = err.as_label(), "profile sync error");
        self.feed.publish(err);
    }

    fn apply(&self, user_id: &UserId, generation: u64, value: Value) {
        let snapshot = if value.is_null() {
            ProfileSnapshot::default()
        } else {
            match serde_json::from_value::<ProfileSnapshot>(value) {
                Ok(s) => s,
                Err(e) => {
                    self.report(SessionError::ProfileSubscriptionFailed {
                        user_id: user_id.clone(),
                        reason: format!("malformed snapshot: {e}"),
                    });
                    return;
                }
            }
        };

        let live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
        if *live != generation {
            tracing::debug!(user_id = %user_id, "stale profile snapshot dropped");
            return;
        }
        let record = ProfileRecord::from_snapshot(&snapshot, self.context.default_photo());
        self.context.set_profile(record);
    }

    fn is_live(&self, generation: u64) -> bool {
        *self.live.lock().unwrap_or_else(PoisonError::into_inner) == generation
    }

    fn invalidate(&self) {
        *self.live.lock().unwrap_or_else(PoisonError::into_inner) = 0;
    }
}

/// Keeps the profile fields of the current user in sync with the store.
pub struct ProfileSync {
    shared: Arc<Shared>,
    slot: tokio::sync::Mutex<Option<Attachment>>,
    generation: AtomicU64,
}

impl ProfileSync {
    /// Creates an idle sync; pumps run under children of `parent`.
    pub fn new(
        store: Arc<dyn ProfileStore>,
        context: Arc<SessionContext>,
        feed: ErrorFeed,
        timeout: Option<Duration>,
        parent: CancellationToken,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                context,
                feed,
                timeout,
                parent,
                live: Mutex::new(0),
            }),
            slot: tokio::sync::Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Subscribes to `users/<user_id>`, releasing any previous subscription first.
    ///
    /// `None` is a no-op, as is the user already attached while its stream is
    /// still open. After the stream ended, attaching the same user subscribes again. On failure the error is also published on the feed
    /// and no subscription is left active.
    pub async fn attach(&self, user_id: Option<&UserId>) -> Result<(), SessionError> {
        let Some(user_id) = user_id else {
            tracing::debug!("profile attach without user id ignored");
            return Ok(());
        };

        let mut slot = self.slot.lock().await;
        if let Some(prev) = slot.take() {
            if &prev.user_id == user_id && !prev.join.is_finished() {
                *slot = Some(prev);
                return Ok(());
            }
            let switching = &prev.user_id != user_id;
            self.release(prev).await;
            if switching {
                self.shared.context.reset_profile();
            }
        }

        let cancel = self.shared.parent.child_token();
        let path = user_path(user_id);
        let stream = call(self.shared.store.subscribe(&path), self.shared.timeout, &cancel)
            .await
            .map_err(|e| SessionError::ProfileSubscriptionFailed {
                user_id: user_id.clone(),
                reason: e.to_string(),
            });
        let stream = match stream {
            Ok(s) => s,
            Err(err) => {
                self.shared.report(err.clone());
                return Err(err);
            }
        };

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        *self
            .shared
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = generation;

        let join = tokio::spawn(pump(
            Arc::clone(&self.shared),
            user_id.clone(),
            generation,
            stream,
            cancel.clone(),
        ));
        tracing::info!(user_id = %user_id, path = %path, "profile subscription attached");

        *slot = Some(Attachment {
            user_id: user_id.clone(),
            cancel,
            join,
        });
        Ok(())
    }

    /// Releases the subscription and resets the profile fields to defaults.
    pub async fn detach(&self) {
        let mut slot = self.slot.lock().await;
        if let Some(prev) = slot.take() {
            self.release(prev).await;
        }
        self.shared.context.reset_profile();
    }

    /// User whose record is currently observed.
    pub async fn attached_user(&self) -> Option<UserId> {
        self.slot.lock().await.as_ref().map(|a| a.user_id.clone())
    }

    async fn release(&self, prev: Attachment) {
        self.shared.invalidate();
        prev.cancel.cancel();
        if let Err(e) = prev.join.await {
            tracing::warn!(user_id = %prev.user_id, error = %e, "profile pump ended abnormally");
        }
        tracing::info!(user_id = %prev.user_id, "profile subscription released");
    }
}

async fn pump(
    shared: Arc<Shared>,
    user_id: UserId,
    generation: u64,
    mut stream: SnapshotStream,
    cancel: CancellationToken,
) {
    loop {
        let item = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            item = stream.next() => item,
        };
        match item {
            Some(Ok(value)) => shared.apply(&user_id, generation, value),
            Some(Err(e)) => shared.report(SessionError::ProfileSubscriptionFailed {
                user_id: user_id.clone(),
                reason: e.to_string(),
            }),
            None => {
                if shared.is_live(generation) {
                    shared.report(SessionError::ProfileSubscriptionFailed {
                        user_id: user_id.clone(),
                        reason: "snapshot stream ended".into(),
                    });
                } else {
                    tracing::debug!(user_id = %user_id, "released profile stream ended");
                }
                break;
            }
        }
    }
}
