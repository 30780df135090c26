use crate::{layers::base::LayerTrait, prelude::HashMap, MapError, Result};

/// Owns the map's layers and the order they are drawn in
#[derive(Default)]
pub struct LayerManager {
    layers: HashMap<String, Box<dyn LayerTrait>>,
    /// Ids from bottom to top; ties keep insertion order
    render_order: Vec<String>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a layer; ids must be unique
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        if self.layers.contains_key(&layer_id) {
            return Err(MapError::Layer(format!("layer '{layer_id}' already exists")));
        }

        let z_index = layer.z_index();
        let slot = self
            .render_order
            .partition_point(|id| self.z_index_of(id) <= z_index);
        self.render_order.insert(slot, layer_id.clone());
        self.layers.insert(layer_id, layer);
        Ok(())
    }

    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Box<dyn LayerTrait>> {
        let layer = self.layers.remove(layer_id)?;
        self.render_order.retain(|id| id != layer_id);
        Some(layer)
    }

    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layers.get(layer_id).map(|layer| layer.as_ref())
    }

    /// Looks a layer up and downcasts it to its concrete type
    pub fn get_as<T: LayerTrait + 'static>(&self, layer_id: &str) -> Option<&T> {
        self.get_layer(layer_id)?.as_any().downcast_ref::<T>()
    }

    pub fn get_as_mut<T: LayerTrait + 'static>(&mut self, layer_id: &str) -> Option<&mut T> {
        self.layers
            .get_mut(layer_id)?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// Layer ids, bottom first
    pub fn list_layers(&self) -> Vec<String> {
        self.render_order.clone()
    }

    /// Layers, bottom first
    pub fn layers(&self) -> Vec<&dyn LayerTrait> {
        self.render_order
            .iter()
            .filter_map(|id| self.get_layer(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn z_index_of(&self, layer_id: &str) -> i32 {
        self.layers.get(layer_id).map_or(0, |layer| layer.z_index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::marker::MarkerLayer;
    use crate::layers::tile::TileLayer;

    #[test]
    fn test_render_order_follows_z_index() {
        let mut manager = LayerManager::new();
        manager
            .add_layer(Box::new(MarkerLayer::new("markers".to_string())))
            .unwrap();
        manager
            .add_layer(Box::new(TileLayer::openstreetmap("osm".to_string())))
            .unwrap();

        assert_eq!(manager.list_layers(), vec!["osm".to_string(), "markers".to_string()]);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut manager = LayerManager::new();
        manager
            .add_layer(Box::new(MarkerLayer::new("markers".to_string())))
            .unwrap();
        let err = manager
            .add_layer(Box::new(MarkerLayer::new("markers".to_string())))
            .unwrap_err();
        assert!(matches!(err, MapError::Layer(_)));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_typed_lookup_and_removal() {
        let mut manager = LayerManager::new();
        manager
            .add_layer(Box::new(MarkerLayer::new("markers".to_string())))
            .unwrap();

        assert!(manager.get_as::<MarkerLayer>("markers").is_some());
        assert!(manager.get_as::<TileLayer>("markers").is_none());
        assert!(manager.get_as_mut::<MarkerLayer>("markers").is_some());

        assert!(manager.remove_layer("markers").is_some());
        assert!(manager.is_empty());
        assert!(manager.list_layers().is_empty());
    }
}
