//! Event wiring between the map, the geolocation service and the geocoder.
//!
//! The controller owns all widget state: the map (with its marker layer and
//! popup overlay), the cached user coordinate and the dialog queue. Input
//! handlers return [`LookupRequest`]s instead of performing I/O; the caller
//! runs them (see [`lookup`] and [`crate::background::LookupDispatcher`]) and
//! feeds the [`LookupOutcome`] back through [`MapController::on_lookup_complete`].
//!
//! Lookups may finish out of order. Every request carries a sequence number and
//! only the most recently issued one may update the marker and popup.

use crate::{
    background::BackgroundEvent,
    core::{
        config::WidgetConfig,
        geo::{LatLng, Point},
        map::Map,
    },
    input::MapEvent,
    layers::{
        marker::{Marker, MarkerLayer},
        tile::TileLayer,
    },
    services::{
        geocode::{describe, GeocodeError, Placeholders, ReverseGeocoder, ReversePlace},
        geolocation::{GeolocationError, Geolocator, Position},
    },
    ui::{
        dialog::{Alert, DialogQueue},
        popup::{PopupOverlay, PopupTemplate},
    },
    Result,
};

pub const BASEMAP_LAYER_ID: &str = "basemap";
pub const MARKER_LAYER_ID: &str = "marker";
pub const POPUP_OVERLAY_ID: &str = "popup";

/// Container size assumed until the host reports the real one
const INITIAL_SIZE: Point = Point { x: 800.0, y: 600.0 };

/// What triggered a lookup; selects the "no data" placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOrigin {
    UserLocation,
    MapClick,
}

/// A reverse-geocode lookup the controller wants performed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookupRequest {
    pub seq: u64,
    pub origin: LookupOrigin,
    /// Web Mercator coordinate the marker and popup will use
    pub coordinate: Point,
}

impl LookupRequest {
    /// Geographic position sent to the geocoder
    pub fn lat_lng(&self) -> LatLng {
        LatLng::from_mercator(self.coordinate)
    }
}

#[derive(Debug)]
pub struct LookupOutcome {
    pub request: LookupRequest,
    pub result: std::result::Result<ReversePlace, GeocodeError>,
}

/// Runs one lookup against a geocoder
pub async fn lookup(geocoder: &dyn ReverseGeocoder, request: LookupRequest) -> LookupOutcome {
    let position = request.lat_lng();
    log::debug!(
        "lookup #{} ({:?}) at {:.6}, {:.6}",
        request.seq,
        request.origin,
        position.lng,
        position.lat
    );
    LookupOutcome {
        request,
        result: geocoder.reverse(position).await,
    }
}

pub struct MapController {
    map: Map,
    config: WidgetConfig,
    dialogs: DialogQueue,
    user_coordinate: Option<Point>,
    next_seq: u64,
    latest_seq: Option<u64>,
}

impl MapController {
    /// Builds the map: basemap, marker layer and popup overlay, centered on
    /// the configured fallback view.
    pub fn new(config: WidgetConfig) -> Result<Self> {
        config.validate()?;

        let view = &config.view;
        let mut map = Map::new(view.initial_center, view.initial_zoom, INITIAL_SIZE);
        map.viewport_mut()
            .set_zoom_limits(view.min_zoom, view.max_zoom);

        map.add_layer(Box::new(TileLayer::from_config(
            BASEMAP_LAYER_ID.to_string(),
            &config.tiles,
        )))?;
        map.add_layer(Box::new(
            MarkerLayer::new(MARKER_LAYER_ID.to_string()).with_style(config.marker.clone()),
        ))?;
        map.add_overlay(
            PopupOverlay::new(
                POPUP_OVERLAY_ID.to_string(),
                PopupTemplate::from_texts(&config.texts),
            )
            .with_auto_pan(view.auto_pan)
            .with_on_dismiss(|| log::debug!("popup dismissed")),
        )?;
        // Setup events are not interesting to callers
        map.process_events();

        Ok(Self {
            map,
            config,
            dialogs: DialogQueue::new(),
            user_coordinate: None,
            next_seq: 0,
            latest_seq: None,
        })
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn dialogs(&self) -> &DialogQueue {
        &self.dialogs
    }

    /// Last successful geolocation result, projected
    pub fn user_coordinate(&self) -> Option<Point> {
        self.user_coordinate
    }

    pub fn marker(&self) -> Option<&Marker> {
        self.map
            .layer::<MarkerLayer>(MARKER_LAYER_ID)
            .and_then(MarkerLayer::marker)
    }

    pub fn popup(&self) -> Option<&PopupOverlay> {
        self.map.overlay(POPUP_OVERLAY_ID)
    }

    pub fn basemap(&self) -> Option<&TileLayer> {
        self.map.layer::<TileLayer>(BASEMAP_LAYER_ID)
    }

    /// Result of the one-shot geolocation request
    pub fn on_geolocation(
        &mut self,
        result: std::result::Result<Position, GeolocationError>,
    ) -> Option<LookupRequest> {
        match result {
            Ok(position) => {
                let coordinate = position.lat_lng().to_mercator();
                log::info!(
                    "user located at {:.6}, {:.6}",
                    position.longitude,
                    position.latitude
                );
                self.user_coordinate = Some(coordinate);
                self.focus(coordinate);
                Some(self.issue(LookupOrigin::UserLocation, coordinate))
            }
            Err(e) => {
                log::warn!("geolocation failed: {}", e);
                let texts = &self.config.texts;
                self.dialogs
                    .push(Alert::error(&texts.error_title, &texts.geolocation_failed));
                None
            }
        }
    }

    /// A click on the map at a projected coordinate
    pub fn on_map_click(&mut self, coordinate: Point) -> LookupRequest {
        self.issue(LookupOrigin::MapClick, coordinate)
    }

    /// Drains the map's event queue, turning clicks into lookups
    pub fn handle_map_events(&mut self) -> Vec<LookupRequest> {
        let mut requests = Vec::new();
        for event in self.map.process_events() {
            if let MapEvent::Click { coordinate, .. } = event {
                requests.push(self.on_map_click(coordinate));
            }
        }
        requests
    }

    /// The "return to my location" control
    pub fn on_return_to_location(&mut self) -> Option<LookupRequest> {
        match self.user_coordinate {
            Some(coordinate) => {
                self.focus(coordinate);
                Some(self.issue(LookupOrigin::UserLocation, coordinate))
            }
            None => {
                let texts = &self.config.texts;
                self.dialogs
                    .push(Alert::error(&texts.error_title, &texts.user_location_unavailable));
                None
            }
        }
    }

    /// Places the marker and popup for a finished lookup. Returns `false` when
    /// a newer lookup has been issued since, in which case nothing changes.
    pub fn on_lookup_complete(&mut self, outcome: LookupOutcome) -> bool {
        let LookupOutcome { request, result } = outcome;
        if self.latest_seq != Some(request.seq) {
            log::debug!(
                "discarding stale lookup #{} (latest is {:?})",
                request.seq,
                self.latest_seq
            );
            return false;
        }

        let texts = &self.config.texts;
        let placeholders = Placeholders {
            no_data: match request.origin {
                LookupOrigin::UserLocation => texts.no_location_data.as_str(),
                LookupOrigin::MapClick => texts.click_location_not_found.as_str(),
            },
            not_found: texts.location_data_not_found.as_str(),
        };
        let address = describe(&result, placeholders);

        match self.map.layer_mut::<MarkerLayer>(MARKER_LAYER_ID) {
            Some(layer) => {
                layer.set_marker(request.coordinate);
            }
            None => log::warn!("marker layer '{}' is missing", MARKER_LAYER_ID),
        }

        let auto_pan = match self.map.overlay_mut(POPUP_OVERLAY_ID) {
            Some(popup) => {
                popup.show(request.coordinate, address);
                popup.auto_pan()
            }
            None => {
                log::warn!("popup overlay '{}' is missing", POPUP_OVERLAY_ID);
                false
            }
        };
        if auto_pan {
            self.pan_into_view(request.coordinate);
        }
        true
    }

    /// Applies a result delivered by the background dispatcher
    pub fn apply(&mut self, event: BackgroundEvent) -> Option<LookupRequest> {
        match event {
            BackgroundEvent::Located(result) => self.on_geolocation(result),
            BackgroundEvent::LookupFinished(outcome) => {
                self.on_lookup_complete(outcome);
                None
            }
        }
    }

    /// The popup's dismiss control; the marker stays
    pub fn dismiss_popup(&mut self) {
        if let Some(popup) = self.map.overlay_mut(POPUP_OVERLAY_ID) {
            popup.dismiss();
        }
    }

    /// Closes the dialog on screen
    pub fn dismiss_dialog(&mut self) -> Option<Alert> {
        self.dialogs.dismiss()
    }

    /// Geolocates the user and describes the location, awaiting both steps.
    /// Returns whether the marker and popup were updated.
    pub async fn locate(
        &mut self,
        geolocator: &dyn Geolocator,
        geocoder: &dyn ReverseGeocoder,
    ) -> bool {
        let position = geolocator.current_position().await;
        match self.on_geolocation(position) {
            Some(request) => self.resolve(request, geocoder).await,
            None => false,
        }
    }

    /// Performs a lookup and applies its outcome
    pub async fn resolve(&mut self, request: LookupRequest, geocoder: &dyn ReverseGeocoder) -> bool {
        let outcome = lookup(geocoder, request).await;
        self.on_lookup_complete(outcome)
    }

    fn issue(&mut self, origin: LookupOrigin, coordinate: Point) -> LookupRequest {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.latest_seq = Some(seq);
        LookupRequest {
            seq,
            origin,
            coordinate,
        }
    }

    fn focus(&mut self, coordinate: Point) {
        self.map.set_center_projected(coordinate);
        self.map.set_zoom(self.config.view.locate_zoom);
    }

    /// Recenters on `coordinate` when it lies outside the container
    fn pan_into_view(&mut self, coordinate: Point) {
        let viewport = self.map.viewport();
        let pixel = viewport.projected_to_pixel(&coordinate);
        let inside = (0.0..=viewport.size.x).contains(&pixel.x)
            && (0.0..=viewport.size.y).contains(&pixel.y);
        if !inside {
            self.map.set_center_projected(coordinate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{FALLBACK_CENTER_LAT, FALLBACK_CENTER_LNG};

    fn controller() -> MapController {
        MapController::new(WidgetConfig::default()).unwrap()
    }

    fn outcome(request: LookupRequest, name: Option<&str>) -> LookupOutcome {
        LookupOutcome {
            request,
            result: Ok(ReversePlace {
                display_name: name.map(str::to_string),
                ..ReversePlace::default()
            }),
        }
    }

    #[test]
    fn test_initial_state() {
        let controller = controller();
        let center = controller.map().viewport().center;
        assert!((center.lng - FALLBACK_CENTER_LNG).abs() < 1e-9);
        assert!((center.lat - FALLBACK_CENTER_LAT).abs() < 1e-9);
        assert_eq!(controller.map().viewport().zoom, 16.0);
        assert!(controller.marker().is_none());
        assert!(!controller.popup().unwrap().is_visible());
        assert!(controller.basemap().is_some());
        assert!(controller.dialogs().is_empty());
    }

    #[test]
    fn test_geolocation_success_focuses_and_requests() {
        let mut controller = controller();
        let request = controller
            .on_geolocation(Ok(Position::new(-6.9, 107.6)))
            .unwrap();

        assert_eq!(request.origin, LookupOrigin::UserLocation);
        assert_eq!(controller.user_coordinate(), Some(request.coordinate));
        assert_eq!(controller.map().viewport().zoom, 20.0);
        let center = controller.map().viewport().center;
        assert!((center.lat - -6.9).abs() < 1e-9);
        assert!((center.lng - 107.6).abs() < 1e-9);
    }

    #[test]
    fn test_geolocation_failure_raises_dialog() {
        let mut controller = controller();
        assert!(controller
            .on_geolocation(Err(GeolocationError::PermissionDenied))
            .is_none());

        let alert = controller.dialogs().current().unwrap();
        assert_eq!(alert.title, "Error");
        assert!(alert.text.contains("location access"));
        assert!(controller.user_coordinate().is_none());
        assert!(controller.marker().is_none());
    }

    #[test]
    fn test_placeholder_depends_on_origin() {
        let mut controller = controller();
        let click = controller.on_map_click(Point::new(0.0, 0.0));
        assert!(controller.on_lookup_complete(outcome(click, None)));
        assert!(controller
            .popup()
            .unwrap()
            .text()
            .unwrap()
            .contains("Location information not found"));

        let located = controller
            .on_geolocation(Ok(Position::new(1.0, 1.0)))
            .unwrap();
        assert!(controller.on_lookup_complete(outcome(located, None)));
        assert!(controller
            .popup()
            .unwrap()
            .text()
            .unwrap()
            .contains("No location data"));
    }

    #[test]
    fn test_stale_outcome_is_discarded() {
        let mut controller = controller();
        let first = controller.on_map_click(LatLng::new(-6.0, 107.0).to_mercator());
        let second = controller.on_map_click(LatLng::new(-6.1, 107.1).to_mercator());

        assert!(controller.on_lookup_complete(outcome(second, Some("second"))));
        assert!(!controller.on_lookup_complete(outcome(first, Some("first"))));

        assert_eq!(controller.marker().unwrap().position(), second.coordinate);
        assert_eq!(controller.popup().unwrap().content().unwrap().address, "second");
    }

    #[test]
    fn test_dismiss_keeps_marker() {
        let mut controller = controller();
        let request = controller.on_map_click(Point::new(10.0, 10.0));
        controller.on_lookup_complete(outcome(request, Some("here")));

        controller.dismiss_popup();
        assert!(!controller.popup().unwrap().is_visible());
        assert!(controller.marker().is_some());
    }

    #[test]
    fn test_auto_pan_recenters_on_far_popup() {
        let mut controller = controller();
        let far = LatLng::new(51.5, -0.12).to_mercator();
        let request = controller.on_map_click(far);
        controller.on_lookup_complete(outcome(request, Some("London")));

        let center = controller.map().viewport().center;
        assert!((center.lat - 51.5).abs() < 1e-6);
    }

    #[test]
    fn test_map_clicks_become_lookups() {
        let mut controller = controller();
        controller.map_mut().set_zoom(17.0);
        controller.map_mut().click_at(Point::new(100.0, 100.0));

        let requests = controller.handle_map_events();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].origin, LookupOrigin::MapClick);
        assert!(controller.handle_map_events().is_empty());
    }
}
