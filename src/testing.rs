//! Fake collaborators and recording surfaces shared by the unit tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::stream::BoxStream;
use serde_json::Value;
use tokio::sync::{Notify, watch};

use crate::config::Config;
use crate::core::SessionController;
use crate::error::ProviderError;
use crate::model::{Coordinates, NotificationPayload, Place, PushToken, TokenHandle};
use crate::providers::{
    AuthProvider, GeolocationProvider, Platform, ProfileStore, Providers, PushProvider,
    ReverseGeocoder, SnapshotStream,
};
use crate::subscribers::Subscribe;
use crate::ui::{
    AlertConfig, Alerter, Menu, NavParams, Navigator, Route, Surfaces, ToastConfig, Toaster,
};

/// Awaits `fut`, failing the test if it takes longer than five seconds.
pub(crate) async fn wait_for<F: Future>(fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), fut)
        .await
        .expect("timed out waiting")
}

/// Reopenable channel: items sent before the first open are buffered.
struct Channel<T> {
    state: Mutex<(Option<UnboundedReceiver<T>>, Option<UnboundedSender<T>>)>,
    opens: AtomicUsize,
}

impl<T: Send + 'static> Channel<T> {
    fn new() -> Self {
        let (tx, rx) = mpsc::unbounded();
        Self {
            state: Mutex::new((Some(rx), Some(tx))),
            opens: AtomicUsize::new(0),
        }
    }

    fn open(&self) -> BoxStream<'static, T> {
        let mut state = self.state.lock().unwrap();
        let rx = match state.0.take() {
            Some(rx) => rx,
            None => {
                let (tx, rx) = mpsc::unbounded();
                state.1 = Some(tx);
                rx
            }
        };
        self.opens.fetch_add(1, Ordering::SeqCst);
        rx.boxed()
    }

    fn send(&self, item: T) -> bool {
        let state = self.state.lock().unwrap();
        state
            .1
            .as_ref()
            .is_some_and(|tx| tx.unbounded_send(item).is_ok())
    }

    fn close(&self) {
        self.state.lock().unwrap().1 = None;
    }

    fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

pub(crate) struct FakePlatform {
    native_push: bool,
    splash_hidden: AtomicBool,
}

impl FakePlatform {
    pub(crate) fn new(native_push: bool) -> Self {
        Self {
            native_push,
            splash_hidden: AtomicBool::new(false),
        }
    }

    pub(crate) fn splash_hidden(&self) -> bool {
        self.splash_hidden.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn ready(&self) {}

    fn has_native_push(&self) -> bool {
        self.native_push
    }

    fn hide_splash(&self) {
        self.splash_hidden.store(true, Ordering::SeqCst);
    }
}

/// Auth provider with scripted answers and an optional gate on the status check.
pub(crate) struct FakeAuth {
    status: Mutex<Result<bool, ProviderError>>,
    log_out: Mutex<Result<bool, ProviderError>>,
    held: AtomicBool,
    gate: Notify,
    log_outs: AtomicUsize,
}

impl FakeAuth {
    pub(crate) fn new(logged_in: bool) -> Self {
        Self {
            status: Mutex::new(Ok(logged_in)),
            log_out: Mutex::new(Ok(true)),
            held: AtomicBool::new(false),
            gate: Notify::new(),
            log_outs: AtomicUsize::new(0),
        }
    }

    pub(crate) fn fail_status(&self, msg: &str) {
        *self.status.lock().unwrap() = Err(ProviderError::fail(msg));
    }

    pub(crate) fn set_log_out(&self, res: Result<bool, ProviderError>) {
        *self.log_out.lock().unwrap() = res;
    }

    /// Makes `is_logged_in` wait until [`FakeAuth::release_status`].
    pub(crate) fn hold_status(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    pub(crate) fn release_status(&self) {
        self.gate.notify_one();
    }

    pub(crate) fn log_outs(&self) -> usize {
        self.log_outs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn is_logged_in(&self) -> Result<bool, ProviderError> {
        if self.held.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }
        self.status.lock().unwrap().clone()
    }

    async fn log_out(&self) -> Result<bool, ProviderError> {
        self.log_outs.fetch_add(1, Ordering::SeqCst);
        self.log_out.lock().unwrap().clone()
    }
}

pub(crate) struct FakeGeolocation {
    channel: Channel<Result<Coordinates, ProviderError>>,
}

impl FakeGeolocation {
    pub(crate) fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    pub(crate) fn emit(&self, coords: Coordinates) -> bool {
        self.channel.send(Ok(coords))
    }

    pub(crate) fn emit_error(&self, msg: &str) -> bool {
        self.channel.send(Err(ProviderError::fail(msg)))
    }

    /// Ends the current stream once its buffered items are drained.
    pub(crate) fn close(&self) {
        self.channel.close();
    }

    pub(crate) fn opens(&self) -> usize {
        self.channel.opens()
    }
}

impl GeolocationProvider for FakeGeolocation {
    fn watch(&self) -> BoxStream<'static, Result<Coordinates, ProviderError>> {
        self.channel.open()
    }
}

/// Resolves `(lat, _)` to `city-<lat>` / `state-<lat>`.
pub(crate) struct FakeGeocoder {
    failing: Mutex<Vec<f64>>,
    calls: AtomicUsize,
}

impl FakeGeocoder {
    pub(crate) fn new() -> Self {
        Self {
            failing: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn fail_for(&self, latitude: f64) {
        self.failing.lock().unwrap().push(latitude);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReverseGeocoder for FakeGeocoder {
    async fn lookup(&self, coords: Coordinates) -> Result<Place, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(&coords.latitude) {
            return Err(ProviderError::fail("no result"));
        }
        let n = coords.latitude as i64;
        Ok(Place {
            city: format!("city-{n}"),
            state: format!("state-{n}"),
        })
    }
}

pub(crate) struct FakePush {
    token: String,
    register_err: Mutex<Option<ProviderError>>,
    save_err: Mutex<Option<ProviderError>>,
    registrations: AtomicUsize,
    saves: AtomicUsize,
    inbox: Channel<NotificationPayload>,
}

impl FakePush {
    pub(crate) fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            register_err: Mutex::new(None),
            save_err: Mutex::new(None),
            registrations: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
            inbox: Channel::new(),
        }
    }

    pub(crate) fn fail_register(&self, msg: &str) {
        *self.register_err.lock().unwrap() = Some(ProviderError::fail(msg));
    }

    pub(crate) fn fail_save(&self, msg: &str) {
        *self.save_err.lock().unwrap() = Some(ProviderError::fail(msg));
    }

    pub(crate) fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    pub(crate) fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub(crate) fn deliver(&self, payload: NotificationPayload) -> bool {
        self.inbox.send(payload)
    }

    pub(crate) fn inbox_opens(&self) -> usize {
        self.inbox.opens()
    }
}

#[async_trait]
impl PushProvider for FakePush {
    async fn register(&self) -> Result<TokenHandle, ProviderError> {
        self.registrations.fetch_add(1, Ordering::SeqCst);
        match self.register_err.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(TokenHandle(format!("raw-{}", self.token))),
        }
    }

    async fn save_token(&self, _handle: TokenHandle) -> Result<PushToken, ProviderError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        match self.save_err.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(PushToken::new(self.token.clone())),
        }
    }

    fn notifications(&self) -> BoxStream<'static, NotificationPayload> {
        self.inbox.open()
    }
}

type SnapshotSender = UnboundedSender<Result<Value, ProviderError>>;

/// In-memory store: records writes and hands out controllable subscriptions.
pub(crate) struct FakeStore {
    writes: Mutex<Vec<(String, Value)>>,
    write_tx: tokio::sync::mpsc::UnboundedSender<(String, Value)>,
    write_rx: tokio::sync::Mutex<tokio::sync::mpsc::UnboundedReceiver<(String, Value)>>,
    write_err: Mutex<Option<ProviderError>>,
    subscribe_err: Mutex<Option<ProviderError>>,
    feeds: Mutex<HashMap<String, Vec<SnapshotSender>>>,
    subscribes: AtomicUsize,
    writes_held: AtomicBool,
    write_gate: Notify,
    writes_started: watch::Sender<usize>,
}

impl FakeStore {
    pub(crate) fn new() -> Self {
        let (write_tx, write_rx) = tokio::sync::mpsc::unbounded_channel();
        Self {
            writes: Mutex::new(Vec::new()),
            write_tx,
            write_rx: tokio::sync::Mutex::new(write_rx),
            write_err: Mutex::new(None),
            subscribe_err: Mutex::new(None),
            feeds: Mutex::new(HashMap::new()),
            subscribes: AtomicUsize::new(0),
            writes_held: AtomicBool::new(false),
            write_gate: Notify::new(),
            writes_started: watch::channel(0).0,
        }
    }

    pub(crate) fn fail_writes(&self, msg: &str) {
        *self.write_err.lock().unwrap() = Some(ProviderError::fail(msg));
    }

    pub(crate) fn fail_subscribe(&self, msg: &str) {
        *self.subscribe_err.lock().unwrap() = Some(ProviderError::fail(msg));
    }

    /// Makes `write` wait until [`FakeStore::release_writes`].
    pub(crate) fn hold_writes(&self) {
        self.writes_held.store(true, Ordering::SeqCst);
    }

    pub(crate) fn release_writes(&self) {
        self.writes_held.store(false, Ordering::SeqCst);
        self.write_gate.notify_waiters();
    }

    /// Resolves once `write` has been entered at least `n` times.
    pub(crate) async fn wait_writes_started(&self, n: usize) {
        let mut rx = self.writes_started.subscribe();
        let _ = rx.wait_for(|c| *c >= n).await;
    }

    pub(crate) fn writes(&self) -> Vec<(String, Value)> {
        self.writes.lock().unwrap().clone()
    }

    /// Waits for the next successful write.
    pub(crate) async fn next_write(&self) -> (String, Value) {
        self.write_rx
            .lock()
            .await
            .recv()
            .await
            .expect("store dropped")
    }

    /// Sends `value` on every live subscription to `path`; returns how many got it.
    pub(crate) fn snapshot(&self, path: &str, value: Value) -> usize {
        self.send(path, Ok(value))
    }

    pub(crate) fn snapshot_error(&self, path: &str, msg: &str) -> usize {
        self.send(path, Err(ProviderError::fail(msg)))
    }

    fn send(&self, path: &str, item: Result<Value, ProviderError>) -> usize {
        let feeds = self.feeds.lock().unwrap();
        feeds
            .get(path)
            .map(|txs| {
                txs.iter()
                    .filter(|tx| tx.unbounded_send(item.clone()).is_ok())
                    .count()
            })
            .unwrap_or(0)
    }

    /// Subscriptions whose consumer is still alive, over all paths.
    pub(crate) fn open_subscriptions(&self) -> Vec<String> {
        let feeds = self.feeds.lock().unwrap();
        let mut open: Vec<String> = feeds
            .iter()
            .flat_map(|(path, txs)| {
                txs.iter()
                    .filter(|tx| !tx.is_closed())
                    .map(move |_| path.clone())
            })
            .collect();
        open.sort();
        open
    }

    /// Ends every subscription to `path`, as a store does when it drops a listener.
    pub(crate) fn end_subscriptions(&self, path: &str) {
        self.feeds.lock().unwrap().remove(path);
    }

    pub(crate) fn subscribes(&self) -> usize {
        self.subscribes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for FakeStore {
    async fn write(&self, path: &str, value: Value) -> Result<(), ProviderError> {
        let gate = self.write_gate.notified();
        self.writes_started.send_modify(|c| *c += 1);
        if self.writes_held.load(Ordering::SeqCst) {
            gate.await;
        }
        if let Some(err) = self.write_err.lock().unwrap().clone() {
            return Err(err);
        }
        self.writes
            .lock()
            .unwrap()
            .push((path.to_string(), value.clone()));
        let _ = self.write_tx.send((path.to_string(), value));
        Ok(())
    }

    async fn subscribe(&self, path: &str) -> Result<SnapshotStream, ProviderError> {
        self.subscribes.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.subscribe_err.lock().unwrap().clone() {
            return Err(err);
        }
        let (tx, rx) = mpsc::unbounded();
        self.feeds
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push(tx);
        Ok(rx.boxed())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NavCall {
    SetRoot(Route),
    Push(Route, NavParams),
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    calls: Mutex<Vec<NavCall>>,
}

impl RecordingNavigator {
    pub(crate) fn calls(&self) -> Vec<NavCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn roots(&self) -> Vec<Route> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                NavCall::SetRoot(r) => Some(r),
                NavCall::Push(..) => None,
            })
            .collect()
    }
}

impl Navigator for RecordingNavigator {
    fn set_root(&self, route: Route) {
        self.calls.lock().unwrap().push(NavCall::SetRoot(route));
    }

    fn push(&self, route: Route, params: NavParams) {
        self.calls.lock().unwrap().push(NavCall::Push(route, params));
    }
}

#[derive(Default)]
pub(crate) struct RecordingMenu {
    closes: AtomicUsize,
}

impl RecordingMenu {
    pub(crate) fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Menu for RecordingMenu {
    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub(crate) struct RecordingToaster {
    shown: Mutex<Vec<ToastConfig>>,
}

impl RecordingToaster {
    pub(crate) fn shown(&self) -> Vec<ToastConfig> {
        self.shown.lock().unwrap().clone()
    }
}

impl Toaster for RecordingToaster {
    fn show(&self, toast: &ToastConfig) {
        self.shown.lock().unwrap().push(toast.clone());
    }
}

pub(crate) struct RecordingAlerter {
    shown: Mutex<Vec<AlertConfig>>,
    count: watch::Sender<usize>,
}

impl Default for RecordingAlerter {
    fn default() -> Self {
        Self {
            shown: Mutex::new(Vec::new()),
            count: watch::channel(0).0,
        }
    }
}

impl RecordingAlerter {
    pub(crate) fn shown(&self) -> Vec<AlertConfig> {
        self.shown.lock().unwrap().clone()
    }

    /// Resolves once at least `n` alerts have been shown.
    pub(crate) async fn wait_shown(&self, n: usize) {
        let mut rx = self.count.subscribe();
        let _ = rx.wait_for(|c| *c >= n).await;
    }
}

impl Alerter for RecordingAlerter {
    fn show(&self, alert: &AlertConfig) {
        self.shown.lock().unwrap().push(alert.clone());
        self.count.send_modify(|c| *c += 1);
    }
}

/// Fake collaborators and recording surfaces wired into a controller.
pub(crate) struct Harness {
    pub(crate) platform: Arc<FakePlatform>,
    pub(crate) auth: Arc<FakeAuth>,
    pub(crate) geolocation: Arc<FakeGeolocation>,
    pub(crate) geocoder: Arc<FakeGeocoder>,
    pub(crate) push: Arc<FakePush>,
    pub(crate) store: Arc<FakeStore>,
    pub(crate) navigator: Arc<RecordingNavigator>,
    pub(crate) menu: Arc<RecordingMenu>,
    pub(crate) toaster: Arc<RecordingToaster>,
    pub(crate) alerter: Arc<RecordingAlerter>,
}

impl Harness {
    pub(crate) fn new(logged_in: bool, native_push: bool) -> Self {
        Self {
            platform: Arc::new(FakePlatform::new(native_push)),
            auth: Arc::new(FakeAuth::new(logged_in)),
            geolocation: Arc::new(FakeGeolocation::new()),
            geocoder: Arc::new(FakeGeocoder::new()),
            push: Arc::new(FakePush::new("tok")),
            store: Arc::new(FakeStore::new()),
            navigator: Arc::new(RecordingNavigator::default()),
            menu: Arc::new(RecordingMenu::default()),
            toaster: Arc::new(RecordingToaster::default()),
            alerter: Arc::new(RecordingAlerter::default()),
        }
    }

    pub(crate) fn providers(&self) -> Providers {
        Providers {
            platform: self.platform.clone(),
            auth: self.auth.clone(),
            geolocation: self.geolocation.clone(),
            geocoder: self.geocoder.clone(),
            push: self.push.clone(),
            store: self.store.clone(),
        }
    }

    pub(crate) fn surfaces(&self) -> Surfaces {
        Surfaces {
            navigator: self.navigator.clone(),
            menu: self.menu.clone(),
            toaster: self.toaster.clone(),
            alerter: self.alerter.clone(),
        }
    }

    pub(crate) fn build(&self) -> Arc<SessionController> {
        self.build_with(Config::default(), Vec::new())
    }

    pub(crate) fn build_with(
        &self,
        cfg: Config,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Arc<SessionController> {
        SessionController::builder(cfg, self.providers(), self.surfaces())
            .with_subscribers(subscribers)
            .build()
    }
}
