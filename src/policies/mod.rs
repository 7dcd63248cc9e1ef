//! Restart and backoff policies for long-lived stream watches.
//!
//! A geolocation or inbound-push stream is expected to run forever. When it
//! ends or fails anyway, these policies decide **whether** the watch is
//! reopened and **how long** to wait first.
//!
//! ## Contents
//! - [`RestartPolicy`] whether to reopen (never / on-failure / always)
//! - [`BackoffPolicy`] delay before reopening (first / factor / max + jitter)
//! - [`JitterPolicy`] randomization of that delay
//!
//! ## Quick wiring
//! ```text
//! WatchRegistry::spawn(scope, restart, watch)
//!      └─► core::actor::WatchActor uses:
//!           - restart to decide reopen/exit
//!           - backoff.next(failures) to schedule the reopen
//! ```

mod backoff;
mod jitter;
mod restart;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use restart::RestartPolicy;
