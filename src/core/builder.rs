use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use super::controller::{SessionController, SessionListener};
use super::registry::WatchRegistry;
use crate::{
    config::Config,
    context::SessionContext,
    events::{Bus, ErrorFeed},
    profile::ProfileSync,
    providers::Providers,
    push::PushManager,
    subscribers::Subscribe,
    ui::{Surfaces, default_pages},
};

/// Builder for a [`SessionController`].
pub struct SessionControllerBuilder {
    cfg: Config,
    providers: Providers,
    surfaces: Surfaces,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SessionControllerBuilder {
    /// Creates a builder from configuration, collaborators and UI surfaces.
    pub fn new(cfg: Config, providers: Providers, surfaces: Surfaces) -> Self {
        Self {
            cfg,
            providers,
            surfaces,
            subscribers: Vec::new(),
        }
    }

    /// Sets bus subscribers.
    ///
    /// They are registered in the given order, after the controller's own
    /// listener, and stay registered until [`SessionController::shutdown`].
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Wires the controller. Nothing runs until [`SessionController::start`].
    pub fn build(self) -> Arc<SessionController> {
        let runtime_token = CancellationToken::new();
        let feed = ErrorFeed::new(self.cfg.error_feed_capacity_clamped());
        let context = Arc::new(SessionContext::new(self.cfg.default_photo_url.clone()));
        let bus = Bus::new();

        let push = Arc::new(PushManager::new(
            Arc::clone(&self.providers.platform),
            Arc::clone(&self.providers.push),
            Arc::clone(&self.providers.store),
            Arc::clone(&self.surfaces.alerter),
            feed.clone(),
            &self.cfg,
        ));
        let profile = ProfileSync::new(
            Arc::clone(&self.providers.store),
            Arc::clone(&context),
            feed.clone(),
            self.cfg.call_timeout(),
            runtime_token.clone(),
        );
        let registry = WatchRegistry::new(runtime_token.clone(), self.cfg.watch_backoff, feed.clone());

        Arc::new_cyclic(|weak| {
            let mut subscriptions = Vec::with_capacity(self.subscribers.len() + 1);
            subscriptions.push(bus.subscribe(Arc::new(SessionListener {
                controller: weak.clone(),
            })));
            for sub in self.subscribers {
                subscriptions.push(bus.subscribe(sub));
            }

            SessionController {
                cfg: self.cfg,
                providers: self.providers,
                surfaces: self.surfaces,
                context,
                bus,
                feed,
                registry,
                push,
                profile,
                runtime_token,
                transition: tokio::sync::Mutex::new(()),
                subscriptions: Mutex::new(subscriptions),
                pages: default_pages(),
            }
        })
    }
}

impl SessionController {
    /// Starts building a controller.
    pub fn builder(cfg: Config, providers: Providers, surfaces: Surfaces) -> SessionControllerBuilder {
        SessionControllerBuilder::new(cfg, providers, surfaces)
    }
}
