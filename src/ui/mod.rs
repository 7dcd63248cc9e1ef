//! # UI surfaces driven by the session core.
//!
//! The core never renders anything. It invokes these surfaces as side effects:
//! - [`Navigator`] root replacement and page push
//! - [`Menu`] side menu (drawer) control
//! - [`Toaster`] transient notifications
//! - [`Alerter`] modal alerts
//!
//! Implementations live in the host application and must not block.

mod overlay;
mod route;

pub use overlay::{AlertButton, AlertConfig, ButtonRole, ToastConfig, ToastPosition};
pub use route::{NavParams, Page, Route, default_pages};

use std::sync::Arc;

/// Navigation stack.
pub trait Navigator: Send + Sync + 'static {
    /// Replaces the whole stack with `route`.
    fn set_root(&self, route: Route);

    /// Pushes `route` on top of the stack.
    fn push(&self, route: Route, params: NavParams);
}

/// Side menu.
pub trait Menu: Send + Sync + 'static {
    /// Closes the menu if it is open.
    fn close(&self);
}

/// Toast presenter.
pub trait Toaster: Send + Sync + 'static {
    fn show(&self, toast: &ToastConfig);
}

/// Alert presenter.
pub trait Alerter: Send + Sync + 'static {
    fn show(&self, alert: &AlertConfig);
}

/// All surfaces the controller talks to.
#[derive(Clone)]
pub struct Surfaces {
    pub navigator: Arc<dyn Navigator>,
    pub menu: Arc<dyn Menu>,
    pub toaster: Arc<dyn Toaster>,
    pub alerter: Arc<dyn Alerter>,
}
