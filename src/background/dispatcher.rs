use crate::{
    controller::{lookup, LookupOutcome, LookupRequest, MapController},
    runtime::{spawn, AsyncSpawner},
    services::{
        geocode::ReverseGeocoder,
        geolocation::{GeolocationError, Geolocator, Position},
    },
};
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;

/// Results of background work, delivered to the UI thread
#[derive(Debug)]
pub enum BackgroundEvent {
    Located(Result<Position, GeolocationError>),
    LookupFinished(LookupOutcome),
}

/// Runs geolocation and reverse-geocode requests on the async runtime.
///
/// Work is fire-and-forget: results arrive on a channel in completion order
/// and are applied to the controller by [`LookupDispatcher::pump`].
pub struct LookupDispatcher {
    spawner: Arc<dyn AsyncSpawner>,
    geocoder: Arc<dyn ReverseGeocoder>,
    geolocator: Arc<dyn Geolocator>,
    tx: Sender<BackgroundEvent>,
    rx: Receiver<BackgroundEvent>,
}

impl LookupDispatcher {
    pub fn new(
        spawner: Arc<dyn AsyncSpawner>,
        geocoder: Arc<dyn ReverseGeocoder>,
        geolocator: Arc<dyn Geolocator>,
    ) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            spawner,
            geocoder,
            geolocator,
            tx,
            rx,
        }
    }

    /// Starts the one-shot geolocation request
    pub fn locate(&self) {
        let geolocator = Arc::clone(&self.geolocator);
        let tx = self.tx.clone();
        spawn(self.spawner.as_ref(), async move {
            let position = geolocator.current_position().await;
            let _ = tx.send(BackgroundEvent::Located(position));
        });
    }

    /// Starts a reverse-geocode lookup
    pub fn submit(&self, request: LookupRequest) {
        let geocoder = Arc::clone(&self.geocoder);
        let tx = self.tx.clone();
        spawn(self.spawner.as_ref(), async move {
            let outcome = lookup(geocoder.as_ref(), request).await;
            let _ = tx.send(BackgroundEvent::LookupFinished(outcome));
        });
    }

    pub fn submit_all(&self, requests: impl IntoIterator<Item = LookupRequest>) {
        for request in requests {
            self.submit(request);
        }
    }

    /// Applies every finished result to `controller`, submitting any lookups
    /// they trigger. Returns how many results were applied.
    pub fn pump(&self, controller: &mut MapController) -> usize {
        let mut applied = 0;
        for event in self.rx.try_iter() {
            if let Some(request) = controller.apply(event) {
                self.submit(request);
            }
            applied += 1;
        }
        applied
    }
}
