//! # geopin
//!
//! An interactive map widget: an OpenStreetMap basemap, a single location
//! marker, a popup describing the marked place, and reverse geocoding through
//! Nominatim.
//!
//! The library is headless at its core. [`MapController`] owns the map state
//! and turns user input into [`controller::LookupRequest`]s; the requests run
//! on an async runtime through [`background::LookupDispatcher`] or directly with
//! [`MapController::resolve`]. The `egui` feature adds [`ui::MapWidget`], which
//! draws the map and forwards pointer input.

pub mod background;
pub mod controller;
pub mod core;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod runtime;
pub mod services;
pub mod tiles;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::WidgetConfig,
    geo::{LatLng, Point, TileCoord},
    map::Map,
    viewport::Viewport,
};

pub use controller::MapController;

pub use layers::{
    base::LayerTrait,
    marker::{Marker, MarkerLayer},
    tile::TileLayer,
};

pub use input::MapEvent;

pub use ui::{Alert, DialogQueue, PopupOverlay};

pub use services::{FixedGeolocator, Geolocator, NominatimClient, ReverseGeocoder};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Overlay error: {0}")]
    Overlay(String),
}

/// Error type alias for convenience
pub type Error = MapError;
