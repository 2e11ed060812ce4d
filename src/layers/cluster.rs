use crate::{
    data::model::LocationGroup,
    impl_layer_trait,
    layers::{
        base::{LayerProperties, LayerTrait, LayerType},
        feature::{ClusterMarker, RenderedFeature},
    },
    spatial::clustering::Clustering,
    style::cache::StyleCache,
    Result,
};

pub const CLUSTER_LAYER_Z_INDEX: i32 = 10;

/// Clustered rendering of one dataset's groups.
///
/// Owns the spatial index over the groups; clusters never mix datasets
/// because every dataset gets its own layer.
pub struct ClusterLayer {
    properties: LayerProperties,
    dataset_id: String,
    clustering: Clustering<LocationGroup>,
    features: Vec<RenderedFeature>,
    zoom: f64,
}

impl ClusterLayer {
    pub fn layer_id(dataset_id: &str) -> String {
        format!("cluster:{}", dataset_id)
    }

    /// Indexes `groups` and clusters them at `zoom`.
    ///
    /// Fails if any group has coordinates the projection cannot represent.
    pub fn build(
        dataset_id: &str,
        groups: &[LocationGroup],
        distance_px: f64,
        zoom: f64,
        styles: &mut StyleCache,
    ) -> Result<Self> {
        let mut clustering = Clustering::new(distance_px);
        clustering.load(
            groups
                .iter()
                .map(|group| (group.id.clone(), group.lat_lng(), group.clone())),
        )?;

        let properties = LayerProperties::new(
            Self::layer_id(dataset_id),
            format!("Clusters {}", dataset_id),
            LayerType::Cluster,
        )
        .with_z_index(CLUSTER_LAYER_Z_INDEX);

        let mut layer = Self {
            properties,
            dataset_id: dataset_id.to_string(),
            clustering,
            features: Vec::new(),
            zoom,
        };
        layer.refresh_features(styles);
        Ok(layer)
    }

    /// Re-partitions the groups for a new zoom level. Returns `false` when
    /// the clusters for `zoom` are already current.
    pub fn recluster(&mut self, zoom: f64, styles: &mut StyleCache) -> bool {
        if self.clustering.is_cached(zoom) && self.zoom == zoom {
            return false;
        }
        self.zoom = zoom;
        self.refresh_features(styles);
        true
    }

    fn refresh_features(&mut self, styles: &mut StyleCache) {
        let dataset_id = &self.dataset_id;
        self.features = self
            .clustering
            .get_clusters(self.zoom)
            .iter()
            .map(|cluster| {
                let members: Vec<LocationGroup> = cluster.data().cloned().collect();
                RenderedFeature::Cluster(ClusterMarker {
                    id: cluster.id.clone(),
                    dataset_id: dataset_id.clone(),
                    position: cluster.center,
                    extent: cluster.bounds.clone(),
                    style: styles.cluster(&members),
                    members,
                })
            })
            .collect();
    }

    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn group_count(&self) -> usize {
        self.clustering.len()
    }
}

impl LayerTrait for ClusterLayer {
    impl_layer_trait!(ClusterLayer, properties);

    fn features(&self) -> &[RenderedFeature] {
        &self.features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{LocationRecord, TaggedLocation};

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
    fn test_build_and_recluster() {
        let groups = vec![
            group("a", 37.500, 127.000),
            group("b", 37.501, 127.001),
            group("c", 37.700, 127.300),
        ];
        let mut styles = StyleCache::default();
        let mut layer = ClusterLayer::build("d1", &groups, 30.0, 9.0, &mut styles).unwrap();

        assert_eq!(layer.id(), "cluster:d1");
        assert_eq!(layer.layer_type(), LayerType::Cluster);
        assert_eq!(layer.feature_count(), 2);
        let first = layer.features()[0].as_cluster().unwrap();
        assert_eq!(first.members.len(), 2);
        assert_eq!(first.radius(), 24.0);

        assert!(!layer.recluster(9.0, &mut styles));
        assert!(layer.recluster(16.0, &mut styles));
        assert_eq!(layer.feature_count(), 3);
        assert_eq!(layer.group_count(), 3);
    }

    #[test]
    fn test_invalid_coordinates_fail_build() {
        let groups = vec![group("bad", 95.0, 127.0)];
        let mut styles = StyleCache::default();
        assert!(ClusterLayer::build("d1", &groups, 30.0, 9.0, &mut styles).is_err());
    }
}
