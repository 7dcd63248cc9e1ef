//! # SessionController: the session state machine.
//!
//! Owns the bus, the error feed, the watch registry, profile sync and the push
//! manager, and drives them from session transitions.
//!
//! ## Transitions
//! ```text
//! start()
//!   ├─► platform.ready()
//!   ├─► auth.is_logged_in()          err → AuthCheckFailed, treated as false
//!   ├─► still Initializing? → Authenticated | Unauthenticated
//!   ├─► navigator.set_root(home | login)
//!   ├─► spawn GeoWatch                (Scope::App)
//!   └─► platform.hide_splash()
//!
//! Bus: LoggedIn{uid}
//!   ├─► other user active? → end that session first
//!   ├─► session = Authenticated{uid}
//!   ├─► profile.attach(uid)
//!   ├─► spawn PushRegistration(uid)   (Scope::Session, Never)
//!   └─► spawn InboundPushWatch        (Scope::Session, only with native push)
//!
//! logout()
//!   ├─► auth.log_out()   false | err → LogoutRefused (returned + feed), nothing else
//!   ├─► end session: cancel Scope::Session, profile.detach(), Unauthenticated
//!   ├─► navigator.set_root(login), toaster.show(..), menu.close()
//!   └─► Bus: LoggedOut{uid}
//!
//! Bus: LoggedOut{uid}
//!   └─► uid is the current user (or none is known) → end session; otherwise ignored
//! ```
//!
//! ## Rules
//! - Transitions are serialized by one async lock; the bus is never awaited
//!   while that lock is held.
//! - The internal listener is registered before any user subscriber, so user
//!   subscribers observe an already-applied transition.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::context::SessionContext;
use crate::core::registry::{Scope, WatchRegistry};
use crate::core::runner::call;
use crate::error::SessionError;
use crate::events::{Bus, ErrorFeed, Event, EventKind, Subscription};
use crate::model::{Session, SessionState, UserId};
use crate::policies::RestartPolicy;
use crate::profile::ProfileSync;
use crate::providers::Providers;
use crate::push::PushManager;
use crate::subscribers::Subscribe;
use crate::ui::{NavParams, Page, Route, Surfaces};
use crate::watches::{GeoWatch, InboundPushWatch, PushRegistration};

/// Coordinates the session lifecycle and everything bound to it.
pub struct SessionController {
    pub(super) cfg: Config,
    pub(super) providers: Providers,
    pub(super) surfaces: Surfaces,
    pub(super) context: Arc<SessionContext>,
    pub(super) bus: Bus,
    pub(super) feed: ErrorFeed,
    pub(super) registry: WatchRegistry,
    pub(super) push: Arc<PushManager>,
    pub(super) profile: ProfileSync,
    pub(super) runtime_token: CancellationToken,
    pub(super) transition: tokio::sync::Mutex<()>,
    pub(super) subscriptions: Mutex<Vec<Subscription>>,
    pub(super) pages: Vec<Page>,
}

/// Bus handler that feeds login/logout events back into the controller.
pub(super) struct SessionListener {
    pub(super) controller: Weak<SessionController>,
}

#[async_trait]
impl Subscribe for SessionListener {
    async fn on_event(&self, event: &Event) {
        let Some(ctl) = self.controller.upgrade() else {
            return;
        };
        match &event.kind {
            EventKind::LoggedIn { user_id } => ctl.on_logged_in(user_id.clone()).await,
            EventKind::LoggedOut { user_id } => ctl.on_logged_out(user_id).await,
        }
    }

    fn name(&self) -> &'static str {
        "session-listener"
    }
}

impl SessionController {
    /// Resolves the initial session once the platform is ready and starts the
    /// app-scoped geolocation watch. Returns the resulting state.
    pub async fn start(&self) -> SessionState {
        self.providers.platform.ready().await;

        let logged_in = match call(
            self.providers.auth.is_logged_in(),
            self.cfg.call_timeout(),
            &self.runtime_token,
        )
        .await
        {
            Ok(v) => v,
            Err(e) if e.is_canceled() => false,
            Err(error) => {
                self.report(SessionError::AuthCheckFailed { error });
                false
            }
        };

        let state = {
            let _t = self.transition.lock().await;
            let applied = self.context.update_session(|s| {
                if s.state != SessionState::Initializing {
                    return false;
                }
                *s = if logged_in {
                    Session::authenticated(None)
                } else {
                    Session::unauthenticated()
                };
                true
            });
            if !applied {
                tracing::debug!("session already resolved by an event; auth status not applied");
            }
            self.context.state()
        };

        let root = match state {
            SessionState::Authenticated => self.cfg.home_route,
            _ => self.cfg.login_route,
        };
        self.surfaces.navigator.set_root(root);
        tracing::info!(?state, ?root, "session resolved");

        let geo = GeoWatch::new(
            Arc::clone(&self.providers.geolocation),
            Arc::clone(&self.providers.geocoder),
            Arc::clone(&self.context),
            self.feed.clone(),
            self.cfg.call_timeout(),
        );
        self.registry
            .spawn(Scope::App, self.cfg.watch_restart, Arc::new(geo))
            .await;

        self.providers.platform.hide_splash();
        state
    }

    /// Announces a login on the bus. Entry point for the authentication UI flow.
    pub async fn login(&self, user_id: impl Into<UserId>) {
        self.bus.publish(Event::logged_in(user_id.into())).await;
    }

    /// Logs the current user out.
    ///
    /// A refusal (or failure) of the auth provider leaves everything as it was
    /// and is returned as [`SessionError::LogoutRefused`].
    pub async fn logout(&self) -> Result<(), SessionError> {
        let allowed = call(
            self.providers.auth.log_out(),
            self.cfg.call_timeout(),
            &self.runtime_token,
        )
        .await;
        match allowed {
            Ok(true) => {}
            Ok(false) => return Err(self.refuse("denied by auth provider".to_string())),
            Err(e) => return Err(self.refuse(e.to_string())),
        }

        let user_id = {
            let _t = self.transition.lock().await;
            let user_id = self.context.session().user_id;
            self.end_session().await;
            user_id
        };

        self.surfaces.navigator.set_root(self.cfg.login_route);
        self.surfaces.toaster.show(&self.cfg.logout_toast);
        self.surfaces.menu.close();
        tracing::info!(user_id = ?user_id.as_ref().map(UserId::as_str), "logged out");

        if let Some(uid) = user_id {
            self.bus.publish(Event::logged_out(uid)).await;
        }
        Ok(())
    }

    /// Closes the side menu and makes `page` the navigation root.
    pub fn open_page(&self, page: &Page) {
        self.surfaces.menu.close();
        self.surfaces.navigator.set_root(page.route);
    }

    /// Opens another user's profile in lookup mode.
    pub fn open_profile(&self, user_id: UserId) {
        self.surfaces
            .navigator
            .push(Route::Profile, NavParams::lookup(user_id));
    }

    /// Side-menu entries.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Current session.
    pub fn session(&self) -> Session {
        self.context.session()
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Receiver of every caught error, from now on.
    pub fn errors(&self) -> broadcast::Receiver<SessionError> {
        self.feed.subscribe()
    }

    /// Names of the running watches.
    pub async fn active_watches(&self) -> Vec<String> {
        self.registry.list().await
    }

    /// Stops every watch, releases the profile subscription and leaves the bus.
    pub async fn shutdown(&self) {
        self.runtime_token.cancel();
        self.registry.cancel_all().await;
        self.profile.detach().await;
        let subs: Vec<Subscription> = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        drop(subs);
        tracing::info!("session controller stopped");
    }

    async fn on_logged_in(&self, user_id: UserId) {
        let _t = self.transition.lock().await;
        let current = self.context.session();
        if current.is_authenticated() && current.user_id.as_ref() == Some(&user_id) {
            tracing::debug!(user_id = %user_id, "already logged in");
            return;
        }
        if let Some(prev) = current.user_id.as_ref() {
            tracing::info!(previous = %prev, user_id = %user_id, "switching user");
            self.end_session().await;
        }

        self.context
            .set_session(Session::authenticated(Some(user_id.clone())));
        tracing::info!(user_id = %user_id, "logged in");

        if let Err(e) = self.profile.attach(Some(&user_id)).await {
            tracing::debug!(error = %e, "profile sync unavailable for this session");
        }

        let registration = PushRegistration::new(Arc::clone(&self.push), Some(user_id));
        self.registry
            .spawn(Scope::Session, RestartPolicy::Never, Arc::new(registration))
            .await;

        if self.push.is_supported() {
            let inbound = InboundPushWatch::new(Arc::clone(&self.push));
            self.registry
                .spawn(Scope::Session, self.cfg.watch_restart, Arc::new(inbound))
                .await;
        }
    }

    async fn on_logged_out(&self, user_id: &UserId) {
        let _t = self.transition.lock().await;
        let current = self.context.session();
        match current.user_id.as_ref() {
            Some(active) if active != user_id => {
                tracing::debug!(user_id = %user_id, active = %active, "logout for another user ignored");
            }
            _ => self.end_session().await,
        }
    }

    /// Tears down everything bound to the signed-in session. Caller holds `transition`.
    async fn end_session(&self) {
        self.registry.cancel_scope(Scope::Session).await;
        self.profile.detach().await;
        self.context.set_session(Session::unauthenticated());
    }

    fn refuse(&self, reason: String) -> SessionError {
        let err = SessionError::LogoutRefused { reason };
        self.report(err.clone());
        err
    }

    fn report(&self, err: SessionError) {
        tracing::warn!(error = %err, label = err.as_label(), "session error");
        self.feed.publish(err);
    }
}
