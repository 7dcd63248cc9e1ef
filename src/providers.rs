//! # External collaborators consumed by the session core.
//!
//! Each trait is an abstract contract; the host application supplies the
//! implementation (native plugins, HTTP clients, a realtime database SDK).
//!
//! ```text
//! Platform ──► ready(), has_native_push()
//! AuthProvider ──► is_logged_in(), log_out()
//! GeolocationProvider ──► watch() : infinite, restartable stream
//! ReverseGeocoder ──► lookup(coords)
//! PushProvider ──► register() ─► save_token() ; notifications() : infinite stream
//! ProfileStore ──► write(path, value) ; subscribe(path) : snapshot stream
//! ```
//!
//! ## Rules
//! - One-shot calls return `Result<_, ProviderError>`; the core wraps them
//!   with the configured timeout and the owning scope's cancellation.
//! - Streams are `'static` and owned by whoever polls them; dropping the
//!   stream is how the core unsubscribes.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use crate::error::ProviderError;
use crate::model::{Coordinates, NotificationPayload, Place, PushToken, TokenHandle};

/// Host platform readiness and capabilities.
#[async_trait]
pub trait Platform: Send + Sync + 'static {
    /// Completes once native plugins are available.
    async fn ready(&self);

    /// True on platforms that can receive native push notifications.
    fn has_native_push(&self) -> bool;

    /// Hides the splash screen once the shell is up.
    fn hide_splash(&self) {}
}

/// Authentication status and logout.
#[async_trait]
pub trait AuthProvider: Send + Sync + 'static {
    /// Whether a user is currently signed in.
    async fn is_logged_in(&self) -> Result<bool, ProviderError>;

    /// Logs the user out. `Ok(false)` means the logout was not permitted.
    async fn log_out(&self) -> Result<bool, ProviderError>;
}

/// Source of device coordinates.
pub trait GeolocationProvider: Send + Sync + 'static {
    /// Opens a new coordinate stream. May be called again after a stream ends.
    fn watch(&self) -> BoxStream<'static, Result<Coordinates, ProviderError>>;
}

/// Coordinates to city/state resolution.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync + 'static {
    async fn lookup(&self, coords: Coordinates) -> Result<Place, ProviderError>;
}

/// Push notification backend.
#[async_trait]
pub trait PushProvider: Send + Sync + 'static {
    /// Registers the device and returns the raw token handle.
    async fn register(&self) -> Result<TokenHandle, ProviderError>;

    /// Confirms a raw handle with the backend.
    async fn save_token(&self, handle: TokenHandle) -> Result<PushToken, ProviderError>;

    /// Opens the stream of inbound messages.
    fn notifications(&self) -> BoxStream<'static, NotificationPayload>;
}

/// Stream of raw record snapshots (`Value::Null` when the record does not exist).
pub type SnapshotStream = BoxStream<'static, Result<Value, ProviderError>>;

/// Persisted key-value profile store.
///
/// Paths are slash-separated, e.g. `users/<uid>` and `users/<uid>/pushToken`.
#[async_trait]
pub trait ProfileStore: Send + Sync + 'static {
    /// Writes `value` at `path`.
    async fn write(&self, path: &str, value: Value) -> Result<(), ProviderError>;

    /// Opens a live subscription to the record at `path`.
    async fn subscribe(&self, path: &str) -> Result<SnapshotStream, ProviderError>;
}

/// All collaborators the controller consumes.
#[derive(Clone)]
pub struct Providers {
    pub platform: Arc<dyn Platform>,
    pub auth: Arc<dyn AuthProvider>,
    pub geolocation: Arc<dyn GeolocationProvider>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
    pub push: Arc<dyn PushProvider>,
    pub store: Arc<dyn ProfileStore>,
}

/// Store path of a user's record.
pub fn user_path(user_id: &crate::model::UserId) -> String {
    format!("users/{user_id}")
}

/// Store path of a user's push token.
pub fn push_token_path(user_id: &crate::model::UserId) -> String {
    format!("users/{user_id}/pushToken")
}
