//! # Example: session
//!
//! Wires a [`SessionController`] to in-process providers and console surfaces,
//! then walks one user through login, a friend check-in and logout.
//!
//! ## Flow
//! ```text
//! start()   ──► is_logged_in = false ──► set_root(Login) ──► GeoWatch
//! login(u)  ──► LoggedIn ──► ProfileSync::attach(users/u)
//!                        ├─► PushRegistration ──► write users/u/pushToken
//!                        └─► InboundPushWatch ──► friend check-in alert
//! logout()  ──► log_out = true ──► cancel session watches ──► set_root(Login)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example session --features logging
//! ```

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::{StreamExt, stream, stream::BoxStream};
use serde_json::{Value, json};

use sessionvisor::{
    AdditionalData, AlertConfig, Alerter, AuthProvider, Config, Coordinates, GeolocationProvider,
    Menu, NavParams, Navigator, NotificationPayload, Place, Platform, ProfileStore, ProviderError,
    Providers, PushProvider, PushToken, ReverseGeocoder, Route, SessionController, SnapshotStream,
    Subscribe, Surfaces, ToastConfig, Toaster, TokenHandle,
};

struct Device;

#[async_trait]
impl Platform for Device {
    async fn ready(&self) {}

    fn has_native_push(&self) -> bool {
        true
    }

    fn hide_splash(&self) {
        println!("[platform] splash hidden");
    }
}

struct Auth;

#[async_trait]
impl AuthProvider for Auth {
    async fn is_logged_in(&self) -> Result<bool, ProviderError> {
        Ok(false)
    }

    async fn log_out(&self) -> Result<bool, ProviderError> {
        Ok(true)
    }
}

/// One fix, then silence.
struct Gps;

impl GeolocationProvider for Gps {
    fn watch(&self) -> BoxStream<'static, Result<Coordinates, ProviderError>> {
        stream::iter([Ok(Coordinates::new(51.5072, -0.1276))])
            .chain(stream::pending())
            .boxed()
    }
}

struct Geocoder;

#[async_trait]
impl ReverseGeocoder for Geocoder {
    async fn lookup(&self, _coords: Coordinates) -> Result<Place, ProviderError> {
        Ok(Place {
            city: "London".into(),
            state: "England".into(),
        })
    }
}

/// Registers instantly and delivers a single friend check-in.
struct Push;

#[async_trait]
impl PushProvider for Push {
    async fn register(&self) -> Result<TokenHandle, ProviderError> {
        Ok(TokenHandle("raw-device-token".into()))
    }

    async fn save_token(&self, handle: TokenHandle) -> Result<PushToken, ProviderError> {
        Ok(PushToken::new(handle.0.trim_start_matches("raw-")))
    }

    fn notifications(&self) -> BoxStream<'static, NotificationPayload> {
        let check_in = NotificationPayload {
            title: "Check-in".into(),
            text: "Sam checked in at The Crown".into(),
            additional_data: AdditionalData {
                page: Some("friends".into()),
                foreground: Some(false),
                image: None,
                id: Some("sam".into()),
            },
        };
        stream::once(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            check_in
        })
        .chain(stream::pending())
        .boxed()
    }
}

struct Store;

#[async_trait]
impl ProfileStore for Store {
    async fn write(&self, path: &str, value: Value) -> Result<(), ProviderError> {
        println!("[store] write {path} = {value}");
        Ok(())
    }

    async fn subscribe(&self, path: &str) -> Result<SnapshotStream, ProviderError> {
        println!("[store] subscribe {path}");
        let record = json!({ "name": "Uma", "photo": "" });
        Ok(stream::iter([Ok(record)]).chain(stream::pending()).boxed())
    }
}

struct Console;

impl Navigator for Console {
    fn set_root(&self, route: Route) {
        println!("[nav] root = {route:?}");
    }

    fn push(&self, route: Route, params: NavParams) {
        println!("[nav] push {route:?} {params:?}");
    }
}

impl Menu for Console {
    fn close(&self) {
        println!("[menu] closed");
    }
}

impl Toaster for Console {
    fn show(&self, toast: &ToastConfig) {
        println!("[toast] {}", toast.message);
    }
}

impl Alerter for Console {
    fn show(&self, alert: &AlertConfig) {
        println!("[alert] {}: {}", alert.title, alert.message);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let providers = Providers {
        platform: Arc::new(Device),
        auth: Arc::new(Auth),
        geolocation: Arc::new(Gps),
        geocoder: Arc::new(Geocoder),
        push: Arc::new(Push),
        store: Arc::new(Store),
    };
    let console = Arc::new(Console);
    let surfaces = Surfaces {
        navigator: console.clone(),
        menu: console.clone(),
        toaster: console.clone(),
        alerter: console,
    };

    #[allow(unused_mut)]
    let mut subscribers: Vec<Arc<dyn Subscribe>> = Vec::new();
    #[cfg(feature = "logging")]
    subscribers.push(Arc::new(sessionvisor::LogWriter::new()));

    let ctl = SessionController::builder(Config::default(), providers, surfaces)
        .with_subscribers(subscribers)
        .build();

    let mut errors = ctl.errors();
    tokio::spawn(async move {
        while let Ok(err) = errors.recv().await {
            eprintln!("[error] {}: {}", err.as_label(), err.as_message());
        }
    });

    let state = ctl.start().await;
    println!("[session] started as {state:?}");

    ctl.login("uma").await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let geo = ctl.context().geo();
    let profile = ctl.context().profile();
    println!(
        "[session] {} ({}) in {}, {}",
        profile.display_name,
        profile.photo_url,
        geo.city.as_deref().unwrap_or("?"),
        geo.state.as_deref().unwrap_or("?"),
    );
    println!("[session] watches: {:?}", ctl.active_watches().await);

    match ctl.logout().await {
        Ok(()) => println!("[session] logged out; watches: {:?}", ctl.active_watches().await),
        Err(e) => eprintln!("[session] logout refused: {}", e.as_message()),
    }

    ctl.shutdown().await;
}
