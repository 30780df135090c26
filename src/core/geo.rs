//! Geographic and projected coordinates.
//!
//! Everything the widget stores (marker, popup anchor, user coordinate) is a
//! Web Mercator [`Point`] in meters; [`LatLng`] is used at the edges, for the
//! geocoder, the popup text and configuration.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// WGS84 semi-major axis, the sphere radius of EPSG:3857
const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude at which the projected world becomes square
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Half the width of the projected world in meters.
pub const MERCATOR_HALF_EXTENT: f64 = PI * EARTH_RADIUS;

/// A WGS84 position in degrees
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Creates a coordinate from the `(longitude, latitude)` order used by
    /// GeoJSON and most web APIs.
    pub fn from_lon_lat(lng: f64, lat: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and within ±90° latitude, ±180° longitude
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// Brings a longitude back into [-180, 180]
    pub fn wrap_lng(lng: f64) -> f64 {
        if (-180.0..=180.0).contains(&lng) {
            lng
        } else {
            (lng + 180.0).rem_euclid(360.0) - 180.0
        }
    }

    /// Clamps latitude to the range Web Mercator can represent
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Projects to EPSG:3857 meters. Latitudes beyond the projection's limit
    /// are clamped.
    pub fn to_mercator(&self) -> Point {
        let phi = Self::clamp_lat(self.lat).to_radians();
        Point::new(
            EARTH_RADIUS * self.lng.to_radians(),
            EARTH_RADIUS * (FRAC_PI_4 + phi / 2.0).tan().ln(),
        )
    }

    pub fn from_mercator(point: Point) -> Self {
        let phi = 2.0 * (point.y / EARTH_RADIUS).exp().atan() - FRAC_PI_2;
        Self::new(phi.to_degrees(), (point.x / EARTH_RADIUS).to_degrees())
    }

    /// `"lng, lat"` with `precision` decimals, as shown in the popup
    pub fn format_lon_lat(&self, precision: usize) -> String {
        format!("{:.*}, {:.*}", precision, self.lng, precision, self.lat)
    }
}

/// Projected meters or container pixels, depending on context
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Slippy-map tile address; `y` grows southwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// The tile containing `lat_lng` at `zoom`
    pub fn from_lat_lng(lat_lng: &LatLng, zoom: u8) -> Self {
        let n = Self::tiles_per_edge(zoom);
        let projected = lat_lng.to_mercator();
        // Fraction of the world from the west and north edges
        let fx = (projected.x + MERCATOR_HALF_EXTENT) / (2.0 * MERCATOR_HALF_EXTENT);
        let fy = (MERCATOR_HALF_EXTENT - projected.y) / (2.0 * MERCATOR_HALF_EXTENT);
        let cell = |f: f64| ((f * n as f64).floor() as i64).clamp(0, n as i64 - 1) as u32;
        Self::new(cell(fx), cell(fy), zoom)
    }

    /// Number of tiles along one edge of the world at this zoom
    pub fn tiles_per_edge(zoom: u8) -> u32 {
        1_u32 << zoom
    }

    pub fn is_valid(&self) -> bool {
        let n = Self::tiles_per_edge(self.z);
        self.x < n && self.y < n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lat_lng_validity() {
        let coord = LatLng::from_lon_lat(107.5763, -6.8743);
        assert_eq!(coord.lat, -6.8743);
        assert_eq!(coord.lng, 107.5763);
        assert!(coord.is_valid());
        assert!(!LatLng::new(91.0, 0.0).is_valid());
        assert!(!LatLng::new(f64::NAN, 0.0).is_valid());
        assert!(!LatLng::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_wrap_lng() {
        assert_eq!(LatLng::wrap_lng(107.5), 107.5);
        assert_eq!(LatLng::wrap_lng(180.0), 180.0);
        assert_relative_eq!(LatLng::wrap_lng(190.0), -170.0, epsilon = 1e-9);
        assert_relative_eq!(LatLng::wrap_lng(-540.0), -180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_mercator_round_trip() {
        let bandung = LatLng::from_lon_lat(107.57634352477324, -6.87436891415509);
        let projected = bandung.to_mercator();
        let back = LatLng::from_mercator(projected);

        assert_relative_eq!(back.lat, bandung.lat, epsilon = 1e-9);
        assert_relative_eq!(back.lng, bandung.lng, epsilon = 1e-9);
    }

    #[test]
    fn test_mercator_origin_and_extent() {
        let origin = LatLng::new(0.0, 0.0).to_mercator();
        assert_relative_eq!(origin.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(origin.y, 0.0, epsilon = 1e-9);

        let east = LatLng::new(0.0, 180.0).to_mercator();
        assert_relative_eq!(east.x, MERCATOR_HALF_EXTENT, epsilon = 1e-6);

        // Poles are clamped instead of producing infinities
        let north = LatLng::new(90.0, 0.0).to_mercator();
        assert_relative_eq!(north.y, MERCATOR_HALF_EXTENT, max_relative = 1e-9);
    }

    #[test]
    fn test_format_lon_lat() {
        let coord = LatLng::from_lon_lat(107.57634352477324, -6.87436891415509);
        assert_eq!(coord.format_lon_lat(6), "107.576344, -6.874369");
    }

    #[test]
    fn test_tile_containing_coordinate() {
        assert_eq!(TileCoord::from_lat_lng(&LatLng::new(0.0, 0.0), 0), TileCoord::new(0, 0, 0));
        // Null Island sits on the corner of the four middle tiles at z1
        assert_eq!(TileCoord::from_lat_lng(&LatLng::new(-1.0, 1.0), 1), TileCoord::new(1, 1, 1));
        assert_eq!(TileCoord::from_lat_lng(&LatLng::new(1.0, -1.0), 1), TileCoord::new(0, 0, 1));

        let edge = TileCoord::from_lat_lng(&LatLng::new(-90.0, 180.0), 4);
        assert!(edge.is_valid());
        assert_eq!(edge, TileCoord::new(15, 15, 4));
    }
}
