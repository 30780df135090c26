use crate::{
    core::{
        constants::{MARKER_ICON_SCALE, MARKER_ICON_SOURCE_SIZE, MARKER_ICON_URL},
        geo::{LatLng, Point},
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
};
use serde::{Deserialize, Serialize};

/// How the marker icon is drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    pub icon_src: String,
    /// Scale relative to the icon's native size
    pub scale: f64,
    /// Native edge length of the icon image in pixels
    pub icon_size: f64,
}

impl MarkerStyle {
    /// Edge length of the drawn icon in pixels
    pub fn display_size(&self) -> f64 {
        self.icon_size * self.scale
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            icon_src: MARKER_ICON_URL.to_string(),
            scale: MARKER_ICON_SCALE,
            icon_size: MARKER_ICON_SOURCE_SIZE,
        }
    }
}

/// A point feature in Web Mercator coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    position: Point,
    style: MarkerStyle,
}

impl Marker {
    pub fn new(position: Point, style: MarkerStyle) -> Self {
        Self { position, style }
    }

    /// Projected position
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn lat_lng(&self) -> LatLng {
        LatLng::from_mercator(self.position)
    }

    pub fn style(&self) -> &MarkerStyle {
        &self.style
    }
}

/// Vector layer holding at most one marker. Setting a marker replaces the
/// previous one.
pub struct MarkerLayer {
    properties: LayerProperties,
    style: MarkerStyle,
    marker: Option<Marker>,
}

impl MarkerLayer {
    pub fn new(id: String) -> Self {
        let properties =
            LayerProperties::new(id, "Marker".to_string(), LayerType::Marker).with_z_index(10);
        Self {
            properties,
            style: MarkerStyle::default(),
            marker: None,
        }
    }

    pub fn with_style(mut self, style: MarkerStyle) -> Self {
        self.style = style;
        self
    }

    /// Clears the layer and places a single marker at `position`
    pub fn set_marker(&mut self, position: Point) -> &Marker {
        self.clear();
        self.marker.insert(Marker::new(position, self.style.clone()))
    }

    pub fn clear(&mut self) {
        self.marker = None;
    }

    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    pub fn feature_count(&self) -> usize {
        usize::from(self.marker.is_some())
    }

    pub fn style(&self) -> &MarkerStyle {
        &self.style
    }
}

impl LayerTrait for MarkerLayer {
    crate::impl_layer_trait!(properties);

    fn options(&self) -> serde_json::Value {
        let position = self.marker.as_ref().map(|m| {
            let lat_lng = m.lat_lng();
            serde_json::json!({ "lat": lat_lng.lat, "lng": lat_lng.lng })
        });
        serde_json::json!({
            "position": position,
            "icon": self.style.icon_src,
            "scale": self.style.scale,
        })
    }
}
