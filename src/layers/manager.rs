use crate::{
    core::{geo::Point, viewport::Viewport},
    layers::{base::LayerTrait, feature::RenderedFeature},
    prelude::HashMap,
    MapError, Result,
};

/// Manages layers for the map, handling ordering and hit testing.
///
/// Every structural change (layer added or removed, layer mutated through
/// [`LayerManager::with_layer_as_mut`]) bumps [`LayerManager::revision`].
pub struct LayerManager {
    /// All layers indexed by ID
    layers: HashMap<String, Box<dyn LayerTrait>>,
    /// Ordered list of layer IDs for rendering (sorted by z-index)
    render_order: Vec<String>,
    revision: u64,
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            render_order: Vec::new(),
            revision: 0,
        }
    }

    /// Adds a layer to the manager; an id can only be held once
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        if self.layers.contains_key(&layer_id) {
            return Err(MapError::Layer(format!("layer '{}' already exists", layer_id)).into());
        }
        let z_index = layer.z_index();

        self.layers.insert(layer_id.clone(), layer);

        // Insert in sorted order by z-index
        let insert_pos = self
            .render_order
            .iter()
            .position(|id| {
                self.layers
                    .get(id)
                    .map(|l| l.z_index() > z_index)
                    .unwrap_or(false)
            })
            .unwrap_or(self.render_order.len());

        self.render_order.insert(insert_pos, layer_id);
        self.revision += 1;
        Ok(())
    }

    /// Removes a layer from the manager
    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Box<dyn LayerTrait>> {
        let removed = self.layers.remove(layer_id);
        if removed.is_some() {
            self.render_order.retain(|id| id != layer_id);
            self.revision += 1;
        }
        removed
    }

    /// Gets a reference to a layer by ID
    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layers.get(layer_id).map(|l| l.as_ref())
    }

    /// Gets a layer downcast to its concrete type
    pub fn get_layer_as<T: 'static>(&self, layer_id: &str) -> Option<&T> {
        self.get_layer(layer_id)?.as_any().downcast_ref::<T>()
    }

    pub fn contains(&self, layer_id: &str) -> bool {
        self.layers.contains_key(layer_id)
    }

    /// Applies a function to a layer of concrete type `T`
    pub fn with_layer_as_mut<T, F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        T: 'static,
        F: FnOnce(&mut T) -> R,
    {
        let layer = self
            .layers
            .get_mut(layer_id)?
            .as_any_mut()
            .downcast_mut::<T>()?;
        self.revision += 1;
        Some(f(layer))
    }

    /// Gets all layers in render order
    pub fn layers(&self) -> Vec<&dyn LayerTrait> {
        self.render_order
            .iter()
            .filter_map(|id| self.layers.get(id).map(|l| l.as_ref()))
            .collect()
    }

    /// Topmost visible feature under `pixel`, searching layers from the top
    /// down and features in reverse draw order.
    pub fn hit_test(
        &self,
        viewport: &Viewport,
        pixel: Point,
        tolerance: f64,
    ) -> Option<&RenderedFeature> {
        self.render_order
            .iter()
            .rev()
            .filter_map(|id| self.layers.get(id))
            .filter(|layer| layer.is_visible())
            .flat_map(|layer| layer.features().iter().rev())
            .find(|feature| {
                let anchor = viewport.lat_lng_to_pixel(&feature.position());
                feature.hit(anchor, pixel, tolerance)
            })
    }

    /// Total number of features over every layer
    pub fn feature_count(&self) -> usize {
        self.layers.values().map(|layer| layer.feature_count()).sum()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Gets the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Checks if the manager is empty
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::geo::LatLng,
        data::model::{LocationGroup, LocationRecord, TaggedLocation},
        layers::marker::{MarkerLayer, MARKER_LAYER_ID},
        style::cache::StyleCache,
    };

    fn group(name: &str, lat: f64, lon: f64) -> LocationGroup {
        LocationGroup::seeded(
            TaggedLocation {
                record: LocationRecord::new(name, "addr").with_coordinates(lat, lon),
                dataset_id: "d1".to_string(),
                dataset_name: "d1".to_string(),
                dataset_color: "#9b59b6".to_string(),
            },
            lat,
            lon,
        )
    }

    #[test]
    fn test_duplicate_layer_rejected() {
        let mut manager = LayerManager::new();
        manager.add_layer(Box::new(MarkerLayer::new())).unwrap();
        assert!(manager.add_layer(Box::new(MarkerLayer::new())).is_err());
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.revision(), 1);

        assert!(manager.remove_layer(MARKER_LAYER_ID).is_some());
        assert!(manager.remove_layer(MARKER_LAYER_ID).is_none());
        assert_eq!(manager.revision(), 2);
    }

    #[test]
    fn test_hit_test_finds_marker() {
        let mut styles = StyleCache::default();
        let mut manager = LayerManager::new();
        let mut layer = MarkerLayer::new();
        layer.set_dataset("d1", &[group("a", 37.5, 127.0)], true, &mut styles);
        manager.add_layer(Box::new(layer)).unwrap();

        let viewport = Viewport::new(LatLng::new(37.5, 127.0), 14.0, Point::new(800.0, 600.0));
        let hit = manager.hit_test(&viewport, Point::new(400.0, 290.0), 5.0);
        assert_eq!(hit.and_then(|f| f.as_group()).map(|m| m.group.name.as_str()), Some("a"));
        assert!(manager.hit_test(&viewport, Point::new(10.0, 10.0), 5.0).is_none());

        let typed = manager.get_layer_as::<MarkerLayer>(MARKER_LAYER_ID).unwrap();
        assert_eq!(typed.feature_count(), 1);
        assert_eq!(manager.feature_count(), 1);
    }
}
