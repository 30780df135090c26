//! Configuration for the widget
//!
//! Every section deserializes with defaults, so a JSON file only needs to name
//! the values it overrides:
//!
//! ```json
//! { "view": { "initial_zoom": 14.0 }, "geocoder": { "accept_language": "id" } }
//! ```

use crate::core::constants::*;
use crate::core::geo::LatLng;
use crate::layers::marker::MarkerStyle;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub view: ViewConfig,
    pub geocoder: GeocoderConfig,
    pub marker: MarkerStyle,
    pub tiles: TileConfig,
    pub texts: Texts,
    /// Position reported by the fixed geolocator on platforms without a
    /// location service. `None` makes every geolocation request fail.
    pub user_location: Option<LatLng>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub initial_center: LatLng,
    pub initial_zoom: f64,
    pub locate_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Recenter on the popup when it opens
    pub auto_pan: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            initial_center: LatLng::from_lon_lat(FALLBACK_CENTER_LNG, FALLBACK_CENTER_LAT),
            initial_zoom: DEFAULT_ZOOM,
            locate_zoom: LOCATE_ZOOM,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            auto_pan: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub user_agent: String,
    /// Forwarded as Nominatim's `accept-language` parameter
    pub accept_language: Option<String>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: NOMINATIM_REVERSE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            accept_language: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    /// URL template with `{s}`, `{z}`, `{x}` and `{y}` placeholders
    pub url_template: String,
    pub subdomains: Vec<String>,
    pub attribution: String,
    pub max_native_zoom: u8,
    pub cache_size: usize,
    pub user_agent: String,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            url_template: OSM_TILE_URL.to_string(),
            subdomains: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            attribution: OSM_ATTRIBUTION.to_string(),
            max_native_zoom: MAX_NATIVE_TILE_ZOOM,
            cache_size: DEFAULT_TILE_CACHE_SIZE,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// User-facing strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Texts {
    pub no_location_data: String,
    pub click_location_not_found: String,
    pub location_data_not_found: String,
    pub error_title: String,
    pub geolocation_failed: String,
    pub user_location_unavailable: String,
    pub popup_title: String,
    pub popup_address_label: String,
    pub popup_coordinates_label: String,
}

impl Default for Texts {
    fn default() -> Self {
        Self {
            no_location_data: NO_LOCATION_DATA.to_string(),
            click_location_not_found: CLICK_LOCATION_NOT_FOUND.to_string(),
            location_data_not_found: LOCATION_DATA_NOT_FOUND.to_string(),
            error_title: ERROR_TITLE.to_string(),
            geolocation_failed: GEOLOCATION_FAILED.to_string(),
            user_location_unavailable: USER_LOCATION_UNAVAILABLE.to_string(),
            popup_title: POPUP_TITLE.to_string(),
            popup_address_label: POPUP_ADDRESS_LABEL.to_string(),
            popup_coordinates_label: POPUP_COORDINATES_LABEL.to_string(),
        }
    }
}

impl WidgetConfig {
    /// Parses and validates a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        let view = &self.view;
        if !(view.min_zoom >= MIN_ZOOM && view.max_zoom <= ZOOM_LIMIT) {
            return Err(MapError::InvalidConfig(format!(
                "zoom range [{}, {}] outside [{MIN_ZOOM}, {ZOOM_LIMIT}]",
                view.min_zoom, view.max_zoom
            )));
        }
        if f64::from(self.tiles.max_native_zoom) > ZOOM_LIMIT {
            return Err(MapError::InvalidConfig(format!(
                "tile max_native_zoom {} exceeds {ZOOM_LIMIT}",
                self.tiles.max_native_zoom
            )));
        }
        if !(view.min_zoom <= view.max_zoom) {
            return Err(MapError::InvalidConfig(format!(
                "min_zoom {} exceeds max_zoom {}",
                view.min_zoom, view.max_zoom
            )));
        }
        for (name, zoom) in [("initial_zoom", view.initial_zoom), ("locate_zoom", view.locate_zoom)] {
            if !(view.min_zoom..=view.max_zoom).contains(&zoom) {
                return Err(MapError::InvalidConfig(format!(
                    "{name} {zoom} outside [{}, {}]",
                    view.min_zoom, view.max_zoom
                )));
            }
        }
        if !view.initial_center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "initial_center {:?}",
                view.initial_center
            )));
        }
        if let Some(location) = self.user_location {
            if !location.is_valid() {
                return Err(MapError::InvalidCoordinates(format!("user_location {location:?}")));
            }
        }
        if !(self.marker.scale > 0.0) {
            return Err(MapError::InvalidConfig(format!(
                "marker scale must be positive, got {}",
                self.marker.scale
            )));
        }
        if self.geocoder.endpoint.is_empty() {
            return Err(MapError::InvalidConfig("geocoder endpoint is empty".to_string()));
        }
        if self.tiles.cache_size == 0 {
            return Err(MapError::InvalidConfig("tile cache_size must be at least 1".to_string()));
        }
        Ok(())
    }
}
