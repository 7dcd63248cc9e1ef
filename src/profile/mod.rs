//! # Profile sync.
//!
//! Mirrors the signed-in user's remote record (`users/<uid>`) into
//! [`SessionContext::profile`](crate::SessionContext::profile).

mod sync;

pub use sync::ProfileSync;
