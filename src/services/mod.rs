pub mod geocode;
pub mod geolocation;

pub use geocode::{GeocodeError, NominatimClient, ReverseGeocoder, ReversePlace};
pub use geolocation::{FixedGeolocator, GeolocationError, Geolocator, Position};
