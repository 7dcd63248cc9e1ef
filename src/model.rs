//! # Data model shared by the session flows.
//!
//! - [`UserId`] the join key for push token persistence and profile subscription
//! - [`Session`] / [`SessionState`] the authenticated lifecycle of the device user
//! - [`TokenHandle`] / [`PushToken`] raw and confirmed push registration results
//! - [`NotificationPayload`] one inbound push message
//! - [`ProfileSnapshot`] / [`ProfileRecord`] remote profile record, raw and normalized
//! - [`Coordinates`] / [`Place`] / [`GeoState`] geolocation input and resolved city/state

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identity of the signed-in user.
///
/// Cheap to clone; used verbatim inside store paths (`users/<id>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Arc<str>);

impl UserId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

/// Lifecycle state of the session.
///
/// ```text
/// Initializing ──► Unauthenticated ◄──► Authenticated
///              └──────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Platform not ready or auth status not resolved yet.
    #[default]
    Initializing,
    /// No user is signed in (also the fail-closed state).
    Unauthenticated,
    /// A user is signed in.
    Authenticated,
}

/// Current session as seen by consumers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    /// Lifecycle state.
    pub state: SessionState,
    /// Known identity of the signed-in user.
    ///
    /// May be `None` while authenticated when the auth check succeeded before
    /// any login event carried an identifier.
    pub user_id: Option<UserId>,
}

impl Session {
    /// Session for a user who just logged in.
    pub fn authenticated(user_id: Option<UserId>) -> Self {
        Self {
            state: SessionState::Authenticated,
            user_id,
        }
    }

    /// Signed-out session.
    pub fn unauthenticated() -> Self {
        Self {
            state: SessionState::Unauthenticated,
            user_id: None,
        }
    }

    /// True when the state is [`SessionState::Authenticated`].
    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }
}

/// Raw handle returned by device registration, before it is confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHandle(pub String);

/// Confirmed push token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushToken {
    /// Opaque token value issued by the push backend.
    pub value: String,
}

impl PushToken {
    /// Wraps a token value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Extra data attached to a push message by the sender.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct AdditionalData {
    /// Page the message refers to (`"friends"` for check-ins).
    pub page: Option<String>,
    /// Whether the app was in the foreground when the message arrived.
    pub foreground: Option<bool>,
    /// Image attached to the message.
    pub image: Option<String>,
    /// Sender-specific identifier (the friend's user id for check-ins).
    pub id: Option<String>,
}

/// One inbound push message. Consumed once.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct NotificationPayload {
    pub title: String,
    pub text: String,
    #[serde(rename = "additionalData")]
    pub additional_data: AdditionalData,
}

/// Raw profile record as emitted by the store.
///
/// A missing or `null` record deserializes to the default (all fields absent).
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ProfileSnapshot {
    pub name: Option<String>,
    pub photo: Option<String>,
}

/// Normalized profile fields republished to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    /// Display name (empty when unknown).
    pub display_name: String,
    /// Photo URL, or the configured "no photo" sentinel.
    pub photo_url: String,
}

impl ProfileRecord {
    /// The record shown before any snapshot arrives and after logout.
    pub fn empty(default_photo: &str) -> Self {
        Self {
            display_name: String::new(),
            photo_url: default_photo.to_string(),
        }
    }

    /// Normalizes a snapshot.
    ///
    /// A `null` or empty photo falls back to `default_photo`.
    pub fn from_snapshot(snapshot: &ProfileSnapshot, default_photo: &str) -> Self {
        let photo_url = match snapshot.photo.as_deref() {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => default_photo.to_string(),
        };
        Self {
            display_name: snapshot.name.clone().unwrap_or_default(),
            photo_url,
        }
    }
}

/// A single geolocation emission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Result of a reverse-geocode lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub city: String,
    pub state: String,
}

/// Last resolved city/state.
///
/// Both fields stay `None` until the first successful lookup; readers must
/// tolerate that.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeoState {
    pub city: Option<String>,
    pub state: Option<String>,
}

impl From<Place> for GeoState {
    fn from(p: Place) -> Self {
        Self {
            city: Some(p.city),
            state: Some(p.state),
        }
    }
}
