//! Error types used by the session core and its collaborators.
//!
//! This module defines two enums:
//!
//! - [`ProviderError`]: a failure reported by (or while calling) an external collaborator.
//! - [`SessionError`]: a failure of one of the session flows, carrying the provider error that caused it.
//!
//! Both provide `as_label` / `as_message` helpers for logging.
//! None of these errors is fatal: every flow degrades to a safe default
//! (unauthenticated UI, missing push token, stale profile, missing city/state).

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::model::{Coordinates, UserId};

/// # Errors produced by external collaborators.
///
/// Returned by provider trait methods and by the call wrapper that applies
/// the configured timeout and cancellation.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The collaborator reported a failure.
    #[error("provider failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The call did not complete within the configured timeout.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// The call was abandoned because its owning scope was cancelled.
    #[error("call cancelled")]
    Canceled,
}

impl ProviderError {
    /// Shorthand for [`ProviderError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        ProviderError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ProviderError::Fail { .. } => "provider_failed",
            ProviderError::Timeout { .. } => "provider_timeout",
            ProviderError::Canceled => "provider_canceled",
        }
    }

    /// Returns true if the call was dropped because of cancellation.
    pub fn is_canceled(&self) -> bool {
        matches!(self, ProviderError::Canceled)
    }
}

/// Step of the push registration chain that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStage {
    /// Device registration with the push backend.
    Register,
    /// Confirming (saving) the raw token handle.
    SaveToken,
}

impl fmt::Display for PushStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushStage::Register => f.write_str("register"),
            PushStage::SaveToken => f.write_str("save_token"),
        }
    }
}

/// # Errors produced by the session flows.
///
/// Registration, persistence and lookup failures are caught where they
/// happen, logged and published on the [`ErrorFeed`](crate::ErrorFeed).
/// Only [`SessionError::LogoutRefused`] is also returned to a caller that
/// expects a user-visible answer.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The initial authentication status query failed; the session fails closed.
    #[error("auth status check failed: {error}")]
    AuthCheckFailed {
        /// Cause reported by the auth provider.
        #[source]
        error: ProviderError,
    },

    /// The auth provider refused (or failed) to log the user out.
    #[error("logout refused: {reason}")]
    LogoutRefused {
        /// Why the logout did not happen.
        reason: String,
    },

    /// Device registration or token confirmation failed.
    #[error("push registration failed at {stage}: {error}")]
    PushRegistrationFailed {
        /// Step that failed.
        stage: PushStage,
        /// Cause reported by the push provider.
        #[source]
        error: ProviderError,
    },

    /// Writing the push token into the profile store failed.
    #[error("persisting push token for {user_id} failed: {error}")]
    TokenPersistFailed {
        /// User the token was written for.
        user_id: UserId,
        /// Cause reported by the store.
        #[source]
        error: ProviderError,
    },

    /// A geolocation emission or its reverse-geocode lookup failed.
    #[error("geolocation lookup failed: {error}")]
    GeolocationLookupFailed {
        /// Coordinates being resolved, if the failure happened after an emission.
        coords: Option<Coordinates>,
        /// Cause reported by the provider.
        #[source]
        error: ProviderError,
    },

    /// Opening the profile subscription, or reading one of its snapshots, failed.
    #[error("profile subscription for {user_id} failed: {reason}")]
    ProfileSubscriptionFailed {
        /// User whose record was being observed.
        user_id: UserId,
        /// What went wrong.
        reason: String,
    },
}

impl SessionError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use sessionvisor::SessionError;
    ///
    /// let err = SessionError::LogoutRefused { reason: "denied".into() };
    /// assert_eq!(err.as_label(), "logout_refused");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SessionError::AuthCheckFailed { .. } => "auth_check_failed",
            SessionError::LogoutRefused { .. } => "logout_refused",
            SessionError::PushRegistrationFailed { .. } => "push_registration_failed",
            SessionError::TokenPersistFailed { .. } => "token_persist_failed",
            SessionError::GeolocationLookupFailed { .. } => "geolocation_lookup_failed",
            SessionError::ProfileSubscriptionFailed { .. } => "profile_subscription_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SessionError::AuthCheckFailed { error } => format!("auth check: {error}"),
            SessionError::LogoutRefused { reason } => format!("logout: {reason}"),
            SessionError::PushRegistrationFailed { stage, error } => {
                format!("push {stage}: {error}")
            }
            SessionError::TokenPersistFailed { user_id, error } => {
                format!("token write user={user_id}: {error}")
            }
            SessionError::GeolocationLookupFailed { coords, error } => match coords {
                Some(c) => format!("geocode lat={} lon={}: {error}", c.latitude, c.longitude),
                None => format!("geolocation stream: {error}"),
            },
            SessionError::ProfileSubscriptionFailed { user_id, reason } => {
                format!("profile user={user_id}: {reason}")
            }
        }
    }

    /// Indicates whether the error should be shown to the user.
    ///
    /// Everything except a refused logout is a background failure.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, SessionError::LogoutRefused { .. })
    }
}
