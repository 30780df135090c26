//! One-shot user location queries.

use crate::core::geo::LatLng;
use async_trait::async_trait;

/// A position fix as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in meters, when the platform reports one
    pub accuracy: Option<f64>,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
        }
    }

    pub fn lat_lng(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

impl From<LatLng> for Position {
    fn from(lat_lng: LatLng) -> Self {
        Self::new(lat_lng.lat, lat_lng.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("location request timed out")]
    Timeout,
}

/// A platform location service. Each call is a single, permission-gated
/// request; callers do not retry.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn current_position(&self) -> Result<Position, GeolocationError>;
}

/// Answers every request with the same outcome. Used where no location
/// service exists, with the position taken from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedGeolocator {
    outcome: Result<Position, GeolocationError>,
}

impl FixedGeolocator {
    pub fn new(outcome: Result<Position, GeolocationError>) -> Self {
        Self { outcome }
    }

    pub fn at(position: Position) -> Self {
        Self::new(Ok(position))
    }

    pub fn failing(error: GeolocationError) -> Self {
        Self::new(Err(error))
    }

    /// A configured location, or `PositionUnavailable` when there is none
    pub fn from_config(location: Option<LatLng>) -> Self {
        match location {
            Some(lat_lng) => Self::at(lat_lng.into()),
            None => Self::failing(GeolocationError::PositionUnavailable),
        }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Position, GeolocationError> {
        self.outcome.clone()
    }
}
