//! # sessionvisor
//!
//! **Sessionvisor** is the session-bound core of a mobile app shell: it decides
//! whether a user is signed in, registers the device for push, mirrors the
//! user's profile record, resolves the device position to a city/state, and
//! tears all of that down again on logout.
//!
//! Every external system (auth, geolocation, reverse geocoding, push, the
//! profile store) and every UI surface (navigation, menu, toasts, alerts) is an
//! abstract trait supplied by the host application.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   auth UI flow          host UI (menu, logout button)
//!        │ login(uid)              │ logout(), open_page()
//!        ▼                         ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  SessionController                                                │
//! │  - Bus (typed LoggedIn / LoggedOut, in-order delivery)            │
//! │  - SessionContext (watch channels: session, profile, geo)         │
//! │  - ErrorFeed (broadcast of caught SessionErrors)                  │
//! │  - WatchRegistry (App / Session scoped cancelable watches)        │
//! │  - PushManager, ProfileSync                                       │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               ▼
//!   ┌──────────┐     ┌──────────────┐   ┌──────────────┐  ┌────────────┐
//!   │ GeoWatch │     │InboundPush   │   │PushRegistr.  │  │ProfileSync │
//!   │ (App)    │     │Watch(Session)│   │(Session,once)│  │  pump      │
//!   └────┬─────┘     └──────┬───────┘   └──────┬───────┘  └─────┬──────┘
//!        ▼                  ▼                  ▼                ▼
//!  geolocation +       push stream ──►   register ─►       users/<uid>
//!  geocoder ──► geo    classify ──► alert save ─► write    snapshots ──► profile
//! ```
//!
//! ### Lifecycle
//! ```text
//! start():   ready ─► is_logged_in ─► Authenticated | Unauthenticated ─► set_root ─► GeoWatch
//! LoggedIn:  Authenticated{uid} ─► ProfileSync::attach ─► PushRegistration ─► InboundPushWatch
//! logout():  log_out == true ─► cancel Session scope ─► detach ─► set_root(login), toast, close menu
//!            log_out == false ─► Err(LogoutRefused), nothing else changes
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Session**       | State machine, login/logout, navigation side effects.         | [`SessionController`], [`SessionContext`]   |
//! | **Events**        | Typed bus with explicit subscription handles.                 | [`Bus`], [`Event`], [`Subscribe`]           |
//! | **Push**          | Registration chain and inbound message routing.               | [`PushManager`], [`classify`]               |
//! | **Profile**       | Single live subscription to the user's record.                | [`ProfileSync`], [`ProfileRecord`]          |
//! | **Watches**       | Cancelable long-lived streams with restart policies.          | [`Watch`], [`WatchRegistry`], [`Scope`]     |
//! | **Errors**        | Typed errors, observable through the error feed.              | [`SessionError`], [`ProviderError`]         |
//! | **Configuration** | Timeouts, routes, UI strings, restart policies.               | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a subscriber that logs every session event.
//!
//! ## Example
//! ```rust,no_run
//! use sessionvisor::{Config, Providers, SessionController, Surfaces};
//!
//! # async fn run(providers: Providers, surfaces: Surfaces) {
//! let ctl = SessionController::builder(Config::default(), providers, surfaces).build();
//! let _errors = ctl.errors();
//!
//! ctl.start().await;
//! ctl.login("u42").await;
//! if let Err(e) = ctl.logout().await {
//!     eprintln!("{}", e.as_message());
//! }
//! ctl.shutdown().await;
//! # }
//! ```

mod config;
mod context;
mod core;
mod error;
mod events;
mod model;
mod policies;
mod profile;
mod providers;
mod push;
mod subscribers;
mod ui;
mod watches;

#[cfg(test)]
pub(crate) mod testing;

// ---- Public re-exports ----

pub use config::Config;
pub use context::SessionContext;
pub use core::{Scope, SessionController, SessionControllerBuilder, WatchRegistry};
pub use error::{ProviderError, PushStage, SessionError};
pub use events::{Bus, ErrorFeed, Event, EventKind, Subscription};
pub use model::{
    AdditionalData, Coordinates, GeoState, NotificationPayload, Place, ProfileRecord,
    ProfileSnapshot, PushToken, Session, SessionState, TokenHandle, UserId,
};
pub use policies::{BackoffPolicy, JitterPolicy, RestartPolicy};
pub use profile::ProfileSync;
pub use providers::{
    AuthProvider, GeolocationProvider, Platform, ProfileStore, Providers, PushProvider,
    ReverseGeocoder, SnapshotStream, push_token_path, user_path,
};
pub use push::{InboundAction, PushManager, classify};
pub use subscribers::Subscribe;
pub use ui::{
    AlertButton, AlertConfig, Alerter, ButtonRole, Menu, NavParams, Navigator, Page, Route,
    Surfaces, ToastConfig, ToastPosition, Toaster, default_pages,
};
pub use watches::{GeoWatch, InboundPushWatch, PushRegistration, Watch};

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
