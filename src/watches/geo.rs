//! # Geolocation watch.
//!
//! Consumes the geolocation stream and resolves every coordinate pair to a
//! city/state through the reverse geocoder.
//!
//! ```text
//! geolocation.watch() ──► Ok(coords) ──► geocoder.lookup(coords)
//!                    │                    ├─ Ok(place) → context.geo = place
//!                    │                    └─ Err       → warn + ErrorFeed, keep going
//!                    └──► Err(e) ───────────────────────→ warn + ErrorFeed, keep going
//! ```
//!
//! ## Rules
//! - Lookups are independent: one failure never ends the stream.
//! - Lookups run one at a time in emission order, so the last emission wins.
//! - The stream ending returns `Ok(())`; the registry decides whether to reopen it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::context::SessionContext;
use crate::core::runner::call;
use crate::error::SessionError;
use crate::events::ErrorFeed;
use crate::model::{Coordinates, GeoState};
use crate::providers::{GeolocationProvider, ReverseGeocoder};
use crate::watches::Watch;

/// Keeps [`SessionContext::geo`] in sync with the device position.
pub struct GeoWatch {
    geolocation: Arc<dyn GeolocationProvider>,
    geocoder: Arc<dyn ReverseGeocoder>,
    context: Arc<SessionContext>,
    feed: ErrorFeed,
    timeout: Option<Duration>,
}

impl GeoWatch {
    pub const NAME: &'static str = "geolocation";

    pub fn new(
        geolocation: Arc<dyn GeolocationProvider>,
        geocoder: Arc<dyn ReverseGeocoder>,
        context: Arc<SessionContext>,
        feed: ErrorFeed,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            geolocation,
            geocoder,
            context,
            feed,
            timeout,
        }
    }

    async fn resolve(&self, coords: Coordinates, ctx: &CancellationToken) {
        match call(self.geocoder.lookup(coords), self.timeout, ctx).await {
            Ok(place) => {
                tracing::debug!(city = %place.city, state = %place.state, "resolved city/state");
                self.context.set_geo(GeoState::from(place));
            }
            Err(e) if e.is_canceled() => {}
            Err(error) => self.report(SessionError::GeolocationLookupFailed {
                coords: Some(coords),
                error,
            }),
        }
    }

    fn report(&self, err: SessionError) {
        tracing::warn!(error = %err, label = err.as_label(), "geolocation lookup failed");
        self.feed.publish(err);
    }
}

#[async_trait]
impl Watch for GeoWatch {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), SessionError> {
        let mut stream = self.geolocation.watch();
        loop {
            let item = tokio::select! {
                _ = ctx.cancelled() => return Ok(()),
                item = stream.next() => item,
            };
            match item {
                Some(Ok(coords)) => self.resolve(coords, &ctx).await,
                Some(Err(error)) => self.report(SessionError::GeolocationLookupFailed {
                    coords: None,
                    error,
                }),
                None => {
                    tracing::debug!("geolocation stream ended");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeGeocoder, FakeGeolocation, wait_for};

    fn watch(geo: &Arc<FakeGeolocation>, coder: &Arc<FakeGeocoder>) -> (GeoWatch, Arc<SessionContext>, ErrorFeed) {
        let ctx = Arc::new(SessionContext::new("none.png"));
        let feed = ErrorFeed::new(16);
        let w = GeoWatch::new(
            geo.clone(),
            coder.clone(),
            Arc::clone(&ctx),
            feed.clone(),
            Some(Duration::from_secs(5)),
        );
        (w, ctx, feed)
    }

    #[tokio::test]
    async fn failed_lookup_does_not_end_the_stream() {
        let geo = Arc::new(FakeGeolocation::new());
        let coder = Arc::new(FakeGeocoder::new());
        coder.fail_for(1.0);
        let (w, ctx, feed) = watch(&geo, &coder);
        let mut errors = feed.subscribe();
        let mut geo_rx = ctx.watch_geo();

        let token = CancellationToken::new();
        let handle = tokio::spawn({
            let token = token.clone();
            async move { w.run(token).await }
        });

        geo.emit(Coordinates::new(1.0, 1.0));
        let err = wait_for(errors.recv()).await.unwrap();
        assert_eq!(err.as_label(), "geolocation_lookup_failed");
        assert!(ctx.geo().city.is_none());

        geo.emit(Coordinates::new(2.0, 2.0));
        wait_for(geo_rx.changed()).await.unwrap();
        assert_eq!(ctx.geo().city.as_deref(), Some("city-2"));
        assert_eq!(coder.calls(), 2);

        token.cancel();
        assert!(wait_for(handle).await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn stream_errors_are_reported_and_skipped() {
        let geo = Arc::new(FakeGeolocation::new());
        let coder = Arc::new(FakeGeocoder::new());
        let (w, ctx, feed) = watch(&geo, &coder);
        let mut errors = feed.subscribe();
        let mut geo_rx = ctx.watch_geo();

        let token = CancellationToken::new();
        let handle = tokio::spawn({
            let token = token.clone();
            async move { w.run(token).await }
        });

        geo.emit_error("gps off");
        let err = wait_for(errors.recv()).await.unwrap();
        assert!(matches!(
            err,
            SessionError::GeolocationLookupFailed { coords: None, .. }
        ));

        geo.emit(Coordinates::new(3.0, 3.0));
        wait_for(geo_rx.changed()).await.unwrap();
        assert_eq!(ctx.geo().state.as_deref(), Some("state-3"));

        token.cancel();
        assert!(wait_for(handle).await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn ended_stream_returns_ok() {
        let geo = Arc::new(FakeGeolocation::new());
        let coder = Arc::new(FakeGeocoder::new());
        let (w, _ctx, _feed) = watch(&geo, &coder);
        geo.close();
        let res = wait_for(w.run(CancellationToken::new())).await;
        assert!(res.is_ok());
    }
}
