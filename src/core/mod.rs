//! Runtime core: session orchestration and watch lifecycle.
//!
//! The public API from this module is [`SessionController`] (built through
//! [`SessionControllerBuilder`]) and the [`WatchRegistry`] it owns.
//!
//! Internal modules:
//! - [`runner`]: runs one collaborator call with timeout and cancellation;
//! - [`actor`]: runs a single watch with restart policy and backoff;
//! - [`registry`]: owns watches by name and scope;
//! - [`controller`]: the session state machine;
//! - [`builder`]: wires the controller together.

mod actor;
mod builder;
mod controller;
mod registry;
pub(crate) mod runner;

pub use builder::SessionControllerBuilder;
pub use controller::SessionController;
pub use registry::{Scope, WatchRegistry};
