use crate::core::geo::{LatLng, Point};
use serde::{Deserialize, Serialize};

/// Map-level events, queued by the map and drained by whoever drives it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapEvent {
    /// Map view has changed (center or zoom)
    ViewChanged { center: LatLng, zoom: f64 },
    /// Click on the map. `coordinate` is Web Mercator, `pixel` container-relative.
    Click { coordinate: Point, pixel: Point },
    /// Layer was added to the map
    LayerAdd { layer_id: String },
    /// Layer was removed from the map
    LayerRemove { layer_id: String },
    /// Overlay was added to the map
    OverlayAdd { overlay_id: String },
}

impl MapEvent {
    /// Geographic position of a click event
    pub fn click_lat_lng(&self) -> Option<LatLng> {
        match self {
            MapEvent::Click { coordinate, .. } => Some(LatLng::from_mercator(*coordinate)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_lat_lng() {
        let lat_lng = LatLng::new(-6.9, 107.6);
        let event = MapEvent::Click {
            coordinate: lat_lng.to_mercator(),
            pixel: Point::new(1.0, 2.0),
        };
        let back = event.click_lat_lng().unwrap();
        assert!((back.lat - lat_lng.lat).abs() < 1e-9);
        assert!((back.lng - lat_lng.lng).abs() < 1e-9);

        let layer_event = MapEvent::LayerAdd {
            layer_id: "osm".to_string(),
        };
        assert!(layer_event.click_lat_lng().is_none());
    }
}
