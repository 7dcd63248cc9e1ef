//! Toast and alert descriptions handed to the presentation surfaces.

use std::time::Duration;

use crate::model::NotificationPayload;

/// Where a toast is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPosition {
    Top,
    Middle,
    Bottom,
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastConfig {
    pub message: String,
    pub position: ToastPosition,
    pub duration: Duration,
}

impl ToastConfig {
    /// Top-anchored toast shown for `duration`.
    pub fn top(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            message: message.into(),
            position: ToastPosition::Top,
            duration,
        }
    }
}

/// Semantic role of an alert button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonRole {
    Cancel,
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertButton {
    pub text: String,
    pub role: ButtonRole,
}

/// A modal alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertConfig {
    pub title: String,
    pub message: String,
    /// Image carried by the triggering payload, if any.
    pub image: Option<String>,
    /// Friend the alert is about, if the payload named one.
    pub friend_id: Option<String>,
    pub buttons: Vec<AlertButton>,
}

impl AlertConfig {
    /// Alert for a friend check-in push, with a single cancel button.
    pub fn friend_check_in(
        payload: &NotificationPayload,
        title: &str,
        close_label: &str,
    ) -> Self {
        let data = &payload.additional_data;
        Self {
            title: title.to_string(),
            message: payload.text.clone(),
            image: data.image.clone(),
            friend_id: data.id.clone(),
            buttons: vec![AlertButton {
                text: close_label.to_string(),
                role: ButtonRole::Cancel,
            }],
        }
    }
}
