//! Widget-wide defaults: the fallback view, zoom levels, the marker icon,
//! the Nominatim endpoint and the placeholder texts shown in the popup.
//! Keeping them in a single place makes it easier to tweak the defaults.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Longitude of the view center used before the user location is known.
pub const FALLBACK_CENTER_LNG: f64 = 107.576_343_524_773_24;

/// Latitude of the view center used before the user location is known.
pub const FALLBACK_CENTER_LAT: f64 = -6.874_368_914_155_09;

/// Initial zoom level of the view.
pub const DEFAULT_ZOOM: f64 = 16.0;

/// Zoom level applied when the view jumps to the user's location.
pub const LOCATE_ZOOM: f64 = 20.0;

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;

/// Deepest zoom the tile grid can address (`2^z` tiles per edge in a `u32`).
pub const ZOOM_LIMIT: f64 = 30.0;

/// Highest zoom the OpenStreetMap tile server renders; deeper views upscale.
pub const MAX_NATIVE_TILE_ZOOM: u8 = 19;

/// Marker icon (a 512x512 PNG pin).
pub const MARKER_ICON_URL: &str = "https://cdn-icons-png.flaticon.com/512/684/684908.png";

/// Native edge length of the marker icon in pixels.
pub const MARKER_ICON_SOURCE_SIZE: f64 = 512.0;

/// Scale applied to the marker icon when drawn.
pub const MARKER_ICON_SCALE: f64 = 0.05;

/// Reverse-geocoding endpoint.
pub const NOMINATIM_REVERSE_URL: &str = "https://nominatim.openstreetmap.org/reverse";

/// Identifies the client to tile and geocoding servers, which reject anonymous requests.
pub const USER_AGENT: &str = concat!("geopin/", env!("CARGO_PKG_VERSION"));

pub const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";

/// Decoded tiles kept in memory.
pub const DEFAULT_TILE_CACHE_SIZE: usize = 512;

/// Decimal digits used when printing a coordinate in the popup.
pub const COORDINATE_PRECISION: usize = 6;

/// Shown when a lookup for the user's own location has no `display_name`.
pub const NO_LOCATION_DATA: &str = "No location data";

/// Shown when a lookup for a clicked point has no `display_name`.
pub const CLICK_LOCATION_NOT_FOUND: &str = "Location information not found";

/// Shown when a lookup fails altogether.
pub const LOCATION_DATA_NOT_FOUND: &str = "Location data not found";

pub const ERROR_TITLE: &str = "Error";
pub const GEOLOCATION_FAILED: &str =
    "Failed to get your location. Make sure location access is allowed.";
pub const USER_LOCATION_UNAVAILABLE: &str = "Your location is not available.";

pub const POPUP_TITLE: &str = "Location";
pub const POPUP_ADDRESS_LABEL: &str = "Address";
pub const POPUP_COORDINATES_LABEL: &str = "Coordinates";
