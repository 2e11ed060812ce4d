use crate::{
    data::model::LocationGroup,
    impl_layer_trait,
    layers::{
        base::{LayerProperties, LayerTrait, LayerType},
        feature::{GroupMarker, RenderedFeature},
    },
    style::cache::StyleCache,
};

pub const MARKER_LAYER_ID: &str = "markers";
pub const MARKER_LAYER_Z_INDEX: i32 = 20;

/// Shared layer holding the individually rendered groups of every dataset
/// in the flat state. Each dataset owns a contiguous slice of features.
pub struct MarkerLayer {
    properties: LayerProperties,
    datasets: Vec<(String, Vec<RenderedFeature>)>,
    features: Vec<RenderedFeature>,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self {
            properties: LayerProperties::new(
                MARKER_LAYER_ID.to_string(),
                "Markers".to_string(),
                LayerType::Marker,
            )
            .with_z_index(MARKER_LAYER_Z_INDEX),
            datasets: Vec::new(),
            features: Vec::new(),
        }
    }

    /// Replaces the features of one dataset with freshly styled groups
    pub fn set_dataset(
        &mut self,
        dataset_id: &str,
        groups: &[LocationGroup],
        show_labels: bool,
        styles: &mut StyleCache,
    ) {
        let features = groups
            .iter()
            .map(|group| {
                RenderedFeature::Group(GroupMarker {
                    styles: styles.marker(group, show_labels),
                    group: group.clone(),
                })
            })
            .collect();

        match self.datasets.iter_mut().find(|(id, _)| id == dataset_id) {
            Some((_, existing)) => *existing = features,
            None => self.datasets.push((dataset_id.to_string(), features)),
        }
        self.flatten();
    }

    /// Drops one dataset's features. Returns whether it had any.
    pub fn remove_dataset(&mut self, dataset_id: &str) -> bool {
        let before = self.datasets.len();
        self.datasets.retain(|(id, _)| id != dataset_id);
        let removed = self.datasets.len() != before;
        if removed {
            self.flatten();
        }
        removed
    }

    /// Re-applies marker styles in place; the set of features is unchanged.
    /// Returns the number of restyled features.
    pub fn restyle(&mut self, show_labels: bool, styles: &mut StyleCache) -> usize {
        let mut count = 0;
        for (_, features) in &mut self.datasets {
            for feature in features.iter_mut() {
                if let RenderedFeature::Group(marker) = feature {
                    marker.styles = styles.marker(&marker.group, show_labels);
                    count += 1;
                }
            }
        }
        self.flatten();
        count
    }

    pub fn has_dataset(&self, dataset_id: &str) -> bool {
        self.datasets.iter().any(|(id, _)| id == dataset_id)
    }

    pub fn dataset_feature_count(&self, dataset_id: &str) -> usize {
        self.datasets
            .iter()
            .find(|(id, _)| id == dataset_id)
            .map(|(_, features)| features.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    fn flatten(&mut self) {
        self.features = self
            .datasets
            .iter()
            .flat_map(|(_, features)| features.iter().cloned())
            .collect();
    }
}

impl Default for MarkerLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerTrait for MarkerLayer {
    impl_layer_trait!(MarkerLayer, properties);

    fn features(&self) -> &[RenderedFeature] {
        &self.features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{LocationRecord, TaggedLocation};

    fn group(name: &str, dataset: &str) -> LocationGroup {
        LocationGroup::seeded(
            TaggedLocation {
                record: LocationRecord::new(name, "addr").with_coordinates(37.5, 127.0),
                dataset_id: dataset.to_string(),
                dataset_name: dataset.to_string(),
                dataset_color: "#9b59b6".to_string(),
            },
            37.5,
            127.0,
        )
    }

    #[test]
    fn test_datasets_share_one_layer() {
        let mut styles = StyleCache::default();
        let mut layer = MarkerLayer::new();

        layer.set_dataset("d1", &[group("a", "d1"), group("b", "d1")], true, &mut styles);
        layer.set_dataset("d2", &[group("c", "d2")], true, &mut styles);
        assert_eq!(layer.feature_count(), 3);
        assert_eq!(layer.dataset_feature_count("d1"), 2);

        layer.set_dataset("d1", &[group("a", "d1")], true, &mut styles);
        assert_eq!(layer.feature_count(), 2);

        assert!(layer.remove_dataset("d1"));
        assert!(!layer.remove_dataset("d1"));
        assert!(!layer.has_dataset("d1"));
        assert_eq!(layer.feature_count(), 1);
    }

    #[test]
    fn test_restyle_toggles_labels_in_place() {
        let mut styles = StyleCache::default();
        let mut layer = MarkerLayer::new();
        layer.set_dataset("d1", &[group("a", "d1")], true, &mut styles);

        assert_eq!(layer.restyle(false, &mut styles), 1);
        let marker = layer.features()[0].as_group().unwrap();
        assert!(marker.styles[0].as_pin().unwrap().label.is_none());
        assert_eq!(marker.group.name, "a");
    }
}
