//! # Session-scoped shared state.
//!
//! [`SessionContext`] replaces process-wide mutable fields (city/state, display
//! name, profile image) with explicit `tokio::sync::watch` channels owned by the
//! controller and handed to consumers.
//!
//! ## Initial values
//! - session: [`SessionState::Initializing`], no user
//! - profile: empty display name, default photo sentinel
//! - geo: city and state both `None` until the first successful lookup
//!
//! ## Rules
//! - Writers are the session flows only (controller, profile sync, geolocation watch).
//! - Readers get the latest value; intermediate values may be skipped.

use tokio::sync::watch;

use crate::model::{GeoState, ProfileRecord, Session, SessionState};

/// Live values published by the session core.
#[derive(Debug)]
pub struct SessionContext {
    session: watch::Sender<Session>,
    profile: watch::Sender<ProfileRecord>,
    geo: watch::Sender<GeoState>,
    default_photo: String,
}

impl SessionContext {
    /// Creates a context with defined initial values.
    pub fn new(default_photo: impl Into<String>) -> Self {
        let default_photo = default_photo.into();
        let (session, _) = watch::channel(Session::default());
        let (profile, _) = watch::channel(ProfileRecord::empty(&default_photo));
        let (geo, _) = watch::channel(GeoState::default());
        Self {
            session,
            profile,
            geo,
            default_photo,
        }
    }

    /// Current session.
    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.session.borrow().state
    }

    /// Current normalized profile.
    pub fn profile(&self) -> ProfileRecord {
        self.profile.borrow().clone()
    }

    /// Last resolved city/state.
    pub fn geo(&self) -> GeoState {
        self.geo.borrow().clone()
    }

    /// The "no photo" sentinel.
    pub fn default_photo(&self) -> &str {
        &self.default_photo
    }

    pub fn watch_session(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    pub fn watch_profile(&self) -> watch::Receiver<ProfileRecord> {
        self.profile.subscribe()
    }

    pub fn watch_geo(&self) -> watch::Receiver<GeoState> {
        self.geo.subscribe()
    }

    pub(crate) fn set_session(&self, session: Session) {
        self.session.send_replace(session);
    }

    /// Applies `f` to the session; watchers are notified only when `f` returns true.
    pub(crate) fn update_session(&self, f: impl FnOnce(&mut Session) -> bool) -> bool {
        self.session.send_if_modified(f)
    }

    pub(crate) fn set_profile(&self, record: ProfileRecord) {
        self.profile.send_replace(record);
    }

    pub(crate) fn reset_profile(&self) {
        self.profile
            .send_replace(ProfileRecord::empty(&self.default_photo));
    }

    pub(crate) fn set_geo(&self, geo: GeoState) {
        self.geo.send_replace(geo);
    }
}
