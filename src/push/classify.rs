//! # Inbound push classification.
//!
//! Pure function over payload fields; performs no I/O.
//!
//! | `additionalData.page` | `additionalData.foreground` | Action                     |
//! |-----------------------|-----------------------------|----------------------------|
//! | `"friends"`           | `false` / absent            | [`InboundAction::FriendCheckIn`] |
//! | `"friends"`           | `true`                      | [`InboundAction::Ignore`]  |
//! | anything else         | any                         | [`InboundAction::Ignore`]  |

use crate::model::NotificationPayload;

/// What an inbound message should trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundAction {
    /// A friend checked in while the app was in the background: show the alert.
    FriendCheckIn,
    /// No UI action.
    Ignore,
}

/// Classifies an inbound push message.
pub fn classify(payload: &NotificationPayload) -> InboundAction {
    let data = &payload.additional_data;
    let foreground = data.foreground.unwrap_or(false);
    match data.page.as_deref() {
        Some("friends") if !foreground => InboundAction::FriendCheckIn,
        _ => InboundAction::Ignore,
    }
}
