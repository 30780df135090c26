use crate::{
    core::{
        geo::{LatLng, Point},
        viewport::Viewport,
    },
    input::MapEvent,
    layers::{base::LayerTrait, manager::LayerManager},
    ui::popup::PopupOverlay,
    MapError, Result,
};
use std::collections::VecDeque;

type ClickListener = Box<dyn FnMut(&MapEvent) + Send>;

/// The map surface: a view, a stack of layers and a set of overlays.
///
/// State changes worth reacting to are queued as [`MapEvent`]s and drained with
/// [`Map::process_events`]; click listeners registered with [`Map::on_click`]
/// are invoked synchronously as well.
pub struct Map {
    viewport: Viewport,
    layers: LayerManager,
    overlays: Vec<PopupOverlay>,
    events: VecDeque<MapEvent>,
    click_listeners: Vec<ClickListener>,
}

impl Map {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            viewport: Viewport::new(center, zoom, size),
            layers: LayerManager::new(),
            overlays: Vec::new(),
            events: VecDeque::new(),
            click_listeners: Vec::new(),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.viewport.set_center(center);
        self.view_changed();
    }

    /// Centers the view on a Web Mercator coordinate
    pub fn set_center_projected(&mut self, center: Point) {
        self.viewport.set_center_projected(center);
        self.view_changed();
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.viewport.set_zoom(zoom);
        self.view_changed();
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.viewport.set_center(center);
        self.viewport.set_zoom(zoom);
        self.view_changed();
    }

    pub fn set_size(&mut self, size: Point) {
        self.viewport.set_size(size);
    }

    /// Pans by a pixel delta, as when dragging the map
    pub fn pan(&mut self, delta: Point) {
        self.viewport.pan_by(delta);
        self.view_changed();
    }

    /// Zooms by `delta` levels around a container pixel
    pub fn zoom_by(&mut self, delta: f64, anchor: Point) {
        self.viewport.zoom_around(delta, anchor);
        self.view_changed();
    }

    fn view_changed(&mut self) {
        self.events.push_back(MapEvent::ViewChanged {
            center: self.viewport.center,
            zoom: self.viewport.zoom,
        });
    }

    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        self.layers.add_layer(layer)?;
        self.events.push_back(MapEvent::LayerAdd { layer_id });
        Ok(())
    }

    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Box<dyn LayerTrait>> {
        let removed = self.layers.remove_layer(layer_id);
        if removed.is_some() {
            self.events.push_back(MapEvent::LayerRemove {
                layer_id: layer_id.to_string(),
            });
        }
        removed
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    /// Layer lookup by id and concrete type
    pub fn layer<T: LayerTrait + 'static>(&self, layer_id: &str) -> Option<&T> {
        self.layers.get_as::<T>(layer_id)
    }

    pub fn layer_mut<T: LayerTrait + 'static>(&mut self, layer_id: &str) -> Option<&mut T> {
        self.layers.get_as_mut::<T>(layer_id)
    }

    pub fn list_layers(&self) -> Vec<String> {
        self.layers.list_layers()
    }

    pub fn add_overlay(&mut self, overlay: PopupOverlay) -> Result<()> {
        if self.overlay(overlay.id()).is_some() {
            return Err(MapError::Overlay(format!(
                "overlay '{}' already exists",
                overlay.id()
            )));
        }
        let overlay_id = overlay.id().to_string();
        self.overlays.push(overlay);
        self.events.push_back(MapEvent::OverlayAdd { overlay_id });
        Ok(())
    }

    pub fn overlay(&self, overlay_id: &str) -> Option<&PopupOverlay> {
        self.overlays.iter().find(|o| o.id() == overlay_id)
    }

    pub fn overlay_mut(&mut self, overlay_id: &str) -> Option<&mut PopupOverlay> {
        self.overlays.iter_mut().find(|o| o.id() == overlay_id)
    }

    pub fn overlays(&self) -> &[PopupOverlay] {
        &self.overlays
    }

    /// Registers a listener invoked for every click on the map
    pub fn on_click(&mut self, listener: impl FnMut(&MapEvent) + Send + 'static) {
        self.click_listeners.push(Box::new(listener));
    }

    /// Records a click at a container pixel and returns its Web Mercator coordinate
    pub fn click_at(&mut self, pixel: Point) -> Point {
        let coordinate = self.viewport.pixel_to_projected(&pixel);
        let event = MapEvent::Click { coordinate, pixel };
        for listener in self.click_listeners.iter_mut() {
            listener(&event);
        }
        self.events.push_back(event);
        coordinate
    }

    /// Drains queued events in the order they happened
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        self.events.drain(..).collect()
    }
}
