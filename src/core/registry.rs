//! # WatchRegistry: owner of every long-lived subscription.
//!
//! Each watch runs inside a [`WatchActor`] on its own task, tagged with a
//! [`Scope`]. App watches hang directly off the runtime token; session watches
//! hang off a session token that is itself a child of the runtime token.
//!
//! ```text
//! runtime token
//!   ├─ App watch tokens
//!   └─ session token ─┬─ Session watch tokens
//!                     └─ anything those watches spawned with their token
//!
//! spawn(scope, restart, watch)
//!   ├─ same name running?  → cancel + join it first
//!   └─ child token ──► tokio::spawn(WatchActor::run)
//!
//! cancel_scope(Session)   (logout)    → cancel session token, join all, new session token
//! cancel_all()            (shutdown)  → cancel all, then join all
//! ```
//!
//! ## Rules
//! - Names are unique; spawning a name replaces the previous watch.
//! - Handles whose actor already returned are pruned lazily. Work such an actor
//!   left behind under its token is still reached through the session token.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::actor::{ActorExitReason, WatchActor};
use crate::events::ErrorFeed;
use crate::policies::{BackoffPolicy, RestartPolicy};
use crate::watches::Watch;

/// Lifetime a watch is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Lives until [`SessionController::shutdown`](crate::SessionController::shutdown).
    App,
    /// Cancelled when the signed-in session ends.
    Session,
}

struct Handle {
    scope: Scope,
    cancel: CancellationToken,
    join: JoinHandle<ActorExitReason>,
}

struct Inner {
    watches: HashMap<String, Handle>,
    session: CancellationToken,
}

/// Registry of running watches, keyed by name.
pub struct WatchRegistry {
    inner: Mutex<Inner>,
    runtime_token: CancellationToken,
    backoff: BackoffPolicy,
    feed: ErrorFeed,
}

impl WatchRegistry {
    /// Creates an empty registry whose watches inherit `runtime_token`.
    pub fn new(runtime_token: CancellationToken, backoff: BackoffPolicy, feed: ErrorFeed) -> Self {
        Self {
            inner: Mutex::new(Inner {
                watches: HashMap::new(),
                session: runtime_token.child_token(),
            }),
            runtime_token,
            backoff,
            feed,
        }
    }

    /// Starts `watch` in `scope`, replacing a running watch with the same name.
    pub async fn spawn(&self, scope: Scope, restart: RestartPolicy, watch: Arc<dyn Watch>) {
        let name = watch.name().to_string();
        let mut inner = self.inner.lock().await;
        inner.watches.retain(|_, h| !h.join.is_finished());

        if let Some(prev) = inner.watches.remove(&name) {
            tracing::debug!(watch = %name, "replacing running watch");
            prev.cancel.cancel();
            join(&name, prev.join).await;
        }

        let cancel = match scope {
            Scope::App => self.runtime_token.child_token(),
            Scope::Session => inner.session.child_token(),
        };
        let actor = WatchActor::new(watch, restart, self.backoff, self.feed.clone());
        let join = tokio::spawn(actor.run(cancel.clone()));
        tracing::info!(watch = %name, ?scope, ?restart, "watch spawned");

        inner.watches.insert(
            name,
            Handle {
                scope,
                cancel,
                join,
            },
        );
    }

    /// Cancels and joins the watch called `name`. Returns false if it was not registered.
    pub async fn cancel(&self, name: &str) -> bool {
        let handle = self.inner.lock().await.watches.remove(name);
        match handle {
            Some(h) => {
                h.cancel.cancel();
                join(name, h.join).await;
                true
            }
            None => false,
        }
    }

    /// Cancels and joins every watch in `scope`. Returns how many were removed.
    ///
    /// For [`Scope::Session`] this also cancels whatever session watches left
    /// running under their tokens, and opens a fresh session token.
    pub async fn cancel_scope(&self, scope: Scope) -> usize {
        let handles: Vec<(String, Handle)> = {
            let mut inner = self.inner.lock().await;
            if scope == Scope::Session {
                inner.session.cancel();
                inner.session = self.runtime_token.child_token();
            }
            let names: Vec<String> = inner
                .watches
                .iter()
                .filter(|(_, h)| h.scope == scope)
                .map(|(n, _)| n.clone())
                .collect();
            names
                .into_iter()
                .filter_map(|n| inner.watches.remove(&n).map(|h| (n, h)))
                .collect()
        };
        let count = handles.len();
        stop_all(handles).await;
        tracing::debug!(?scope, count, "watch scope cancelled");
        count
    }

    /// Cancels and joins every watch.
    pub async fn cancel_all(&self) {
        let handles: Vec<(String, Handle)> = {
            let mut inner = self.inner.lock().await;
            inner.session.cancel();
            inner.session = self.runtime_token.child_token();
            inner.watches.drain().collect()
        };
        stop_all(handles).await;
    }

    /// Sorted names of watches whose actor is still running.
    pub async fn list(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        let mut names: Vec<String> = inner
            .watches
            .iter()
            .filter(|(_, h)| !h.join.is_finished())
            .map(|(n, _)| n.clone())
            .collect();
        names.sort_unstable();
        names
    }

    /// True if a watch called `name` is running.
    pub async fn is_active(&self, name: &str) -> bool {
        self.inner
            .lock()
            .await
            .watches
            .get(name)
            .is_some_and(|h| !h.join.is_finished())
    }

    /// The token every watch token descends from.
    pub fn runtime_token(&self) -> CancellationToken {
        self.runtime_token.clone()
    }
}

async fn stop_all(handles: Vec<(String, Handle)>) {
    for (_, h) in &handles {
        h.cancel.cancel();
    }
    for (name, h) in handles {
        join(&name, h.join).await;
    }
}

async fn join(name: &str, handle: JoinHandle<ActorExitReason>) {
    match handle.await {
        Ok(reason) => tracing::debug!(watch = %name, ?reason, "watch stopped"),
        Err(e) => tracing::warn!(watch = %name, error = %e, "watch task ended abnormally"),
    }
}
