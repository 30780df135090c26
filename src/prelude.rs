//! Prelude module for common geopin types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use geopin::prelude::*;`

pub use crate::core::{
    config::{GeocoderConfig, Texts, TileConfig, ViewConfig, WidgetConfig},
    geo::{LatLng, Point, TileCoord},
    map::Map,
    viewport::Viewport,
};

pub use crate::controller::{
    LookupOrigin, LookupOutcome, LookupRequest, MapController, BASEMAP_LAYER_ID,
    MARKER_LAYER_ID, POPUP_OVERLAY_ID,
};

pub use crate::layers::{
    base::LayerTrait,
    manager::LayerManager,
    marker::{Marker, MarkerLayer, MarkerStyle},
    tile::{TileLayer, TilePlacement},
};

pub use crate::input::MapEvent;

pub use crate::services::{
    FixedGeolocator, GeocodeError, GeolocationError, Geolocator, NominatimClient, Position,
    ReverseGeocoder, ReversePlace,
};

pub use crate::ui::{Alert, AlertIcon, DialogQueue, PopupOverlay, PopupTemplate};

pub use crate::background::{BackgroundEvent, LookupDispatcher};

pub use crate::runtime::{spawn, AsyncHandle, AsyncSpawner};

#[cfg(feature = "tokio-runtime")]
pub use crate::runtime::TokioSpawner;

pub use crate::tiles::{TemplateSource, TileCache, TileImage, TileLoader, TileSource};

#[cfg(feature = "egui")]
pub use crate::ui::widget::{MapWidget, MapWidgetExt, WidgetResponse};

pub use crate::{Error as MapError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
