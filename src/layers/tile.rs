use crate::{
    core::{
        config::TileConfig,
        constants::{MAX_NATIVE_TILE_ZOOM, OSM_ATTRIBUTION, TILE_SIZE},
        geo::{Point, TileCoord},
        viewport::Viewport,
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
    tiles::source::{TemplateSource, TileSource},
};
use std::sync::Arc;

/// Where a tile lands inside the map container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub coord: TileCoord,
    /// Top-left corner in container pixels
    pub min: Point,
    /// Bottom-right corner in container pixels
    pub max: Point,
}

/// The basemap: a slippy-map raster tile layer
pub struct TileLayer {
    properties: LayerProperties,
    source: Arc<dyn TileSource>,
    max_native_zoom: u8,
    attribution: String,
}

impl TileLayer {
    pub fn new(id: String, name: String, source: Arc<dyn TileSource>) -> Self {
        Self {
            properties: LayerProperties::new(id, name, LayerType::Tile),
            source,
            max_native_zoom: MAX_NATIVE_TILE_ZOOM,
            attribution: String::new(),
        }
    }

    pub fn openstreetmap(id: String) -> Self {
        Self::new(
            id,
            "OpenStreetMap".to_string(),
            Arc::new(TemplateSource::openstreetmap()),
        )
        .with_attribution(OSM_ATTRIBUTION)
    }

    pub fn from_config(id: String, config: &TileConfig) -> Self {
        Self::new(
            id,
            "Basemap".to_string(),
            Arc::new(TemplateSource::from_config(config)),
        )
        .with_max_native_zoom(config.max_native_zoom)
        .with_attribution(config.attribution.clone())
    }

    pub fn with_max_native_zoom(mut self, zoom: u8) -> Self {
        self.max_native_zoom = zoom;
        self
    }

    pub fn with_attribution(mut self, attribution: impl Into<String>) -> Self {
        self.attribution = attribution.into();
        self
    }

    pub fn source(&self) -> Arc<dyn TileSource> {
        Arc::clone(&self.source)
    }

    pub fn attribution(&self) -> &str {
        &self.attribution
    }

    /// Tile zoom used for a view zoom; deeper views upscale the native tiles
    pub fn tile_zoom(&self, zoom: f64) -> u8 {
        zoom.round().clamp(0.0, self.max_native_zoom as f64) as u8
    }

    /// Tiles covering the viewport, with their container-pixel rectangles.
    /// Columns wrap around the antimeridian; rows outside the world are skipped.
    pub fn visible_tiles(&self, viewport: &Viewport) -> Vec<TilePlacement> {
        let tile_zoom = self.tile_zoom(viewport.zoom);
        let tile_px = TILE_SIZE as f64 * 2_f64.powf(viewport.zoom - tile_zoom as f64);
        let origin = viewport.pixel_origin();
        let n = TileCoord::tiles_per_edge(tile_zoom) as i64;

        let min_tx = (origin.x / tile_px).floor() as i64;
        let max_tx = ((origin.x + viewport.size.x) / tile_px).ceil() as i64 - 1;
        let min_ty = ((origin.y / tile_px).floor() as i64).max(0);
        let max_ty = (((origin.y + viewport.size.y) / tile_px).ceil() as i64 - 1).min(n - 1);

        let mut placements = Vec::new();
        for ty in min_ty..=max_ty {
            for tx in min_tx..=max_tx {
                let coord = TileCoord::new(tx.rem_euclid(n) as u32, ty as u32, tile_zoom);
                let min = Point::new(
                    tx as f64 * tile_px - origin.x,
                    ty as f64 * tile_px - origin.y,
                );
                placements.push(TilePlacement {
                    coord,
                    min,
                    max: Point::new(min.x + tile_px, min.y + tile_px),
                });
            }
        }
        placements
    }
}

impl LayerTrait for TileLayer {
    crate::impl_layer_trait!(properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "max_native_zoom": self.max_native_zoom,
            "attribution": self.attribution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;

    #[test]
    fn test_tile_zoom_caps_at_native_zoom() {
        let layer = TileLayer::openstreetmap("osm".to_string());
        assert_eq!(layer.tile_zoom(16.0), 16);
        assert_eq!(layer.tile_zoom(20.0), 19);
        assert_eq!(layer.tile_zoom(-1.0), 0);
    }

    #[test]
    fn test_whole_world_at_zoom_zero() {
        let layer = TileLayer::openstreetmap("osm".to_string());
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 0.0, Point::new(256.0, 256.0));
        let tiles = layer.visible_tiles(&viewport);

        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].coord, TileCoord::new(0, 0, 0));
        assert!(tiles[0].min.distance_to(&Point::new(0.0, 0.0)) < 1e-6);
        assert!(tiles[0].max.distance_to(&Point::new(256.0, 256.0)) < 1e-6);
    }

    #[test]
    fn test_visible_tiles_cover_viewport() {
        let layer = TileLayer::openstreetmap("osm".to_string());
        let viewport = Viewport::new(LatLng::new(-6.874, 107.576), 16.0, Point::new(800.0, 600.0));
        let tiles = layer.visible_tiles(&viewport);

        assert!(!tiles.is_empty());
        assert!(tiles.iter().all(|t| t.coord.z == 16 && t.coord.is_valid()));
        let min_x = tiles.iter().map(|t| t.min.x).fold(f64::INFINITY, f64::min);
        let max_y = tiles.iter().map(|t| t.max.y).fold(f64::NEG_INFINITY, f64::max);
        assert!(min_x <= 0.0);
        assert!(max_y >= 600.0);

        let center_tile = TileCoord::from_lat_lng(&viewport.center, 16);
        assert!(tiles.iter().any(|t| t.coord == center_tile));
    }

    #[test]
    fn test_overzoomed_tiles_are_upscaled() {
        let layer = TileLayer::openstreetmap("osm".to_string());
        let viewport = Viewport::new(LatLng::new(-6.874, 107.576), 20.0, Point::new(800.0, 600.0));
        let tiles = layer.visible_tiles(&viewport);
        let first = tiles[0];
        assert_eq!(first.coord.z, 19);
        assert!((first.max.x - first.min.x - 512.0).abs() < 1e-9);
    }

    #[test]
    fn test_columns_wrap_around_antimeridian() {
        let layer = TileLayer::openstreetmap("osm".to_string());
        let viewport = Viewport::new(LatLng::new(0.0, 179.9), 2.0, Point::new(512.0, 256.0));
        let tiles = layer.visible_tiles(&viewport);
        assert!(tiles.iter().any(|t| t.coord.x == 0));
        assert!(tiles.iter().any(|t| t.coord.x == 3));
    }
}
