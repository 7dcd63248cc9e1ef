//! # Session runtime configuration.
//!
//! Provides [`Config`], centralized settings for the [`SessionController`](crate::SessionController).
//!
//! ## Sentinel values
//! - `provider_timeout = 0s` → collaborator calls are never timed out
//! - `error_feed_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::policies::{BackoffPolicy, JitterPolicy, RestartPolicy};
use crate::ui::{Route, ToastConfig};

/// Global configuration for the session core.
///
/// ## Field semantics
/// - `provider_timeout`: limit for each one-shot collaborator call (`0s` = none)
/// - `error_feed_capacity`: ring buffer size of the [`ErrorFeed`](crate::ErrorFeed)
/// - `watch_restart` / `watch_backoff`: what happens when a long-lived stream ends or fails
/// - `home_route` / `login_route`: landing routes after the auth check and logout
/// - `default_photo_url`: "no photo" sentinel for profile records
/// - `logout_toast`: toast shown after a successful logout
/// - `friend_alert_title` / `alert_close_label`: friend check-in alert text
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum duration of a single collaborator call.
    ///
    /// Applies to the auth check, logout, push registration, token save, token
    /// write, reverse-geocode lookups and opening the profile subscription.
    pub provider_timeout: Duration,

    /// Capacity of the error feed broadcast channel.
    ///
    /// Receivers that fall behind observe `Lagged` and skip the oldest errors.
    pub error_feed_capacity: usize,

    /// Restart policy for long-lived stream watches (geolocation, inbound push).
    pub watch_restart: RestartPolicy,

    /// Delay policy between stream restarts.
    pub watch_backoff: BackoffPolicy,

    /// Root route when the user is authenticated.
    pub home_route: Route,

    /// Root route when the user is not authenticated.
    pub login_route: Route,

    /// Photo URL used when a profile has no photo.
    pub default_photo_url: String,

    /// Toast shown after a successful logout.
    pub logout_toast: ToastConfig,

    /// Title of the friend check-in alert.
    pub friend_alert_title: String,

    /// Label of the alert's dismiss button.
    pub alert_close_label: String,
}

impl Config {
    /// Returns the collaborator call timeout as an `Option`.
    ///
    /// - `None` → no timeout
    /// - `Some(d)` → each call is limited to `d`
    #[inline]
    pub fn call_timeout(&self) -> Option<Duration> {
        if self.provider_timeout == Duration::ZERO {
            None
        } else {
            Some(self.provider_timeout)
        }
    }

    /// Returns the error feed capacity clamped to a minimum of 1.
    #[inline]
    pub fn error_feed_capacity_clamped(&self) -> usize {
        self.error_feed_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `provider_timeout = 15s`
    /// - `error_feed_capacity = 256`
    /// - `watch_restart = Always`, backoff 500ms → 60s, factor 2, equal jitter
    /// - `home_route = Home`, `login_route = Login`
    /// - `default_photo_url = "images/default-profile.png"`
    /// - logout toast "Log out was successful", top, 3s
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(15),
            error_feed_capacity: 256,
            watch_restart: RestartPolicy::Always,
            watch_backoff: BackoffPolicy {
                first: Duration::from_millis(500),
                max: Duration::from_secs(60),
                factor: 2.0,
                jitter: JitterPolicy::Equal,
            },
            home_route: Route::Home,
            login_route: Route::Login,
            default_photo_url: "images/default-profile.png".to_string(),
            logout_toast: ToastConfig::top("Log out was successful", Duration::from_millis(3000)),
            friend_alert_title: "Friend Checked-In".to_string(),
            alert_close_label: "Close".to_string(),
        }
    }
}
