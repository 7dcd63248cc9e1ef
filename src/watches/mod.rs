//! # Long-lived, cancelable stream watches.
//!
//! Every infinite subscription the session core holds is a [`Watch`] owned by
//! the [`WatchRegistry`](crate::core::WatchRegistry):
//!
//! | Watch                  | Scope   | Restart            | Source                           |
//! |------------------------|---------|--------------------|----------------------------------|
//! | [`GeoWatch`]           | App     | `watch_restart`    | geolocation stream + geocoder    |
//! | [`InboundPushWatch`]   | Session | `watch_restart`    | push provider notifications      |
//! | [`PushRegistration`]   | Session | `Never`            | one register → save → persist run|

mod geo;
mod inbound;
mod registration;
mod watch;

pub use geo::GeoWatch;
pub use inbound::InboundPushWatch;
pub use registration::PushRegistration;
pub use watch::Watch;
