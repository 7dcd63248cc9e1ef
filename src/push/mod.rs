//! # Push registration and inbound message handling.
//!
//! - [`PushManager`] registers the device, persists the token under the user
//!   record, and routes inbound messages.
//! - [`classify`] decides what an inbound message should trigger.

mod classify;
mod manager;

pub use classify::{InboundAction, classify};
pub use manager::PushManager;
