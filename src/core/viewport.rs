use crate::core::constants::{MAX_ZOOM, MIN_ZOOM, TILE_SIZE};
use crate::core::geo::{LatLng, Point, MERCATOR_HALF_EXTENT};
use serde::{Deserialize, Serialize};

/// What part of the world the container shows.
///
/// "World pixels" are Web Mercator scaled to `256 * 2^zoom` pixels across with
/// the origin at the north-west corner; "container pixels" are relative to
/// the top-left of the widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
    /// Container size in pixels
    pub size: Point,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            size,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }

    /// Sets the center of the viewport, clamping latitude to the projectable range
    pub fn set_center(&mut self, center: LatLng) {
        self.center = LatLng::new(LatLng::clamp_lat(center.lat), LatLng::wrap_lng(center.lng));
    }

    /// Sets the center from a Web Mercator coordinate
    pub fn set_center_projected(&mut self, center: Point) {
        self.set_center(LatLng::from_mercator(center));
    }

    /// The center as a Web Mercator coordinate
    pub fn center_projected(&self) -> Point {
        self.center.to_mercator()
    }

    /// Clamped to `[min_zoom, max_zoom]`
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Replaces the zoom range and re-clamps the current zoom
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom, max_zoom);
    }

    /// Gets the scale factor for the current zoom level
    pub fn scale(&self) -> f64 {
        2_f64.powf(self.zoom)
    }

    /// Edge length of the whole world in pixels at the given zoom
    pub fn world_size(&self, zoom: Option<f64>) -> f64 {
        TILE_SIZE as f64 * 2_f64.powf(zoom.unwrap_or(self.zoom))
    }

    /// Projects a LatLng to world pixel coordinates at the given zoom level.
    /// The world origin is the north-west corner, y grows southwards.
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        let world = self.world_size(zoom);
        let meters = lat_lng.to_mercator();
        Point::new(
            (meters.x + MERCATOR_HALF_EXTENT) / (2.0 * MERCATOR_HALF_EXTENT) * world,
            (MERCATOR_HALF_EXTENT - meters.y) / (2.0 * MERCATOR_HALF_EXTENT) * world,
        )
    }

    /// Unprojects world pixel coordinates back to LatLng at the given zoom level
    pub fn unproject(&self, pixel: &Point, zoom: Option<f64>) -> LatLng {
        let world = self.world_size(zoom);
        let meters = Point::new(
            pixel.x / world * (2.0 * MERCATOR_HALF_EXTENT) - MERCATOR_HALF_EXTENT,
            MERCATOR_HALF_EXTENT - pixel.y / world * (2.0 * MERCATOR_HALF_EXTENT),
        );
        LatLng::from_mercator(meters)
    }

    /// World pixel coordinate of the container's top-left corner
    pub fn pixel_origin(&self) -> Point {
        let center = self.project(&self.center, None);
        center.subtract(&self.size.multiply(0.5))
    }

    /// Converts a geographical coordinate to container pixel coordinates
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        self.project(lat_lng, None).subtract(&self.pixel_origin())
    }

    /// Converts container pixel coordinates back to geographical coordinates
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        self.unproject(&pixel.add(&self.pixel_origin()), None)
    }

    /// Converts container pixel coordinates to a Web Mercator coordinate
    pub fn pixel_to_projected(&self, pixel: &Point) -> Point {
        self.pixel_to_lat_lng(pixel).to_mercator()
    }

    /// Converts a Web Mercator coordinate to container pixel coordinates
    pub fn projected_to_pixel(&self, projected: &Point) -> Point {
        self.lat_lng_to_pixel(&LatLng::from_mercator(*projected))
    }

    /// Moves the center by a pixel offset (positive x pans east, positive y south)
    pub fn pan_by(&mut self, delta: Point) {
        let center = self.project(&self.center, None).add(&delta);
        let center = self.unproject(&center, None);
        self.set_center(center);
    }

    /// Zooms by `delta` levels keeping the coordinate under `anchor` in place
    pub fn zoom_around(&mut self, delta: f64, anchor: Point) {
        let anchored = self.pixel_to_lat_lng(&anchor);
        self.set_zoom(self.zoom + delta);
        let drifted = self.lat_lng_to_pixel(&anchored);
        self.pan_by(drifted.subtract(&anchor));
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::default(), 0.0, Point::new(TILE_SIZE as f64, TILE_SIZE as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn viewport() -> Viewport {
        Viewport::new(LatLng::new(-6.874, 107.576), 16.0, Point::new(800.0, 600.0))
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut vp = viewport();
        vp.set_zoom(40.0);
        assert_eq!(vp.zoom, MAX_ZOOM);
        vp.set_zoom_limits(2.0, 18.0);
        assert_eq!(vp.zoom, 18.0);
        vp.set_zoom(-1.0);
        assert_eq!(vp.zoom, 2.0);
    }

    #[test]
    fn test_world_projection_at_zoom_zero() {
        let vp = Viewport::default();
        let origin = vp.project(&LatLng::new(0.0, 0.0), Some(0.0));
        assert_relative_eq!(origin.x, 128.0, epsilon = 1e-9);
        assert_relative_eq!(origin.y, 128.0, epsilon = 1e-9);
    }

    #[test]
    fn test_center_maps_to_middle_of_container() {
        let vp = viewport();
        let pixel = vp.lat_lng_to_pixel(&vp.center);
        assert_relative_eq!(pixel.x, 400.0, epsilon = 1e-6);
        assert_relative_eq!(pixel.y, 300.0, epsilon = 1e-6);
    }

    #[test]
    fn test_pixel_round_trip() {
        let vp = viewport();
        let pixel = Point::new(123.0, 456.0);
        let lat_lng = vp.pixel_to_lat_lng(&pixel);
        let back = vp.lat_lng_to_pixel(&lat_lng);
        assert_relative_eq!(back.x, pixel.x, epsilon = 1e-6);
        assert_relative_eq!(back.y, pixel.y, epsilon = 1e-6);
    }

    #[test]
    fn test_pan_moves_center_east() {
        let mut vp = viewport();
        let before = vp.center;
        vp.pan_by(Point::new(100.0, 0.0));
        assert!(vp.center.lng > before.lng);
        assert_relative_eq!(vp.center.lat, before.lat, epsilon = 1e-9);
    }

    #[test]
    fn test_zoom_around_keeps_anchor() {
        let mut vp = viewport();
        let anchor = Point::new(200.0, 150.0);
        let under_cursor = vp.pixel_to_lat_lng(&anchor);
        vp.zoom_around(1.0, anchor);
        let after = vp.lat_lng_to_pixel(&under_cursor);
        assert_relative_eq!(after.x, anchor.x, epsilon = 1e-4);
        assert_relative_eq!(after.y, anchor.y, epsilon = 1e-4);
    }
}
