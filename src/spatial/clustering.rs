use crate::{
    core::{
        bounds::Bounds,
        geo::{LatLng, LatLngBounds, Point},
    },
    prelude::HashSet,
    spatial::index::{SpatialIndex, SpatialItem},
    Result,
};

/// Represents a cluster of items
#[derive(Debug, Clone)]
pub struct Cluster<T> {
    /// Unique identifier for the cluster
    pub id: String,
    /// Centroid of the members in projected space
    pub center: LatLng,
    /// Geographic extent of the members
    pub bounds: LatLngBounds,
    /// Items in this cluster, in input order
    pub items: Vec<SpatialItem<T>>,
    /// Zoom level at which this cluster was created
    pub zoom_level: f64,
}

impl<T> Cluster<T> {
    pub fn new(id: String, items: Vec<SpatialItem<T>>, zoom_level: f64) -> Self {
        let center = Self::calculate_centroid(&items);
        let bounds = LatLngBounds::from_points(items.iter().map(|item| item.position))
            .unwrap_or_else(|| LatLngBounds::new(center, center));

        Self {
            id,
            center,
            bounds,
            items,
            zoom_level,
        }
    }

    fn calculate_centroid(items: &[SpatialItem<T>]) -> LatLng {
        if items.is_empty() {
            return LatLng::default();
        }
        let (sum_x, sum_y) = items
            .iter()
            .fold((0.0, 0.0), |(x, y), item| (x + item.point.x, y + item.point.y));
        let n = items.len() as f64;
        LatLng::from_world_pixel(Point::new(sum_x / n, sum_y / n), 0.0)
    }

    pub fn data(&self) -> impl Iterator<Item = &T> {
        self.items.iter().map(|item| &item.data)
    }
}

/// Distance-based clustering over a fixed set of items.
///
/// Results are cached for the last zoom level and recomputed only when the
/// zoom or the items change.
pub struct Clustering<T> {
    distance_px: f64,
    spatial_index: SpatialIndex<T>,
    cached: Vec<Cluster<T>>,
    /// Last zoom level used for caching
    last_zoom: Option<f64>,
}

impl<T: Clone> Clustering<T> {
    pub fn new(distance_px: f64) -> Self {
        Self {
            distance_px,
            spatial_index: SpatialIndex::new(),
            cached: Vec::new(),
            last_zoom: None,
        }
    }

    /// Replaces every item. Fails without touching the current items if any
    /// position is invalid.
    pub fn load<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, LatLng, T)>,
    {
        let items = items
            .into_iter()
            .map(|(id, position, data)| SpatialItem::from_lat_lng(id, position, data))
            .collect::<Result<Vec<_>>>()?;

        self.spatial_index = SpatialIndex::bulk_load(items);
        self.invalidate_cache();
        Ok(())
    }

    fn invalidate_cache(&mut self) {
        self.cached.clear();
        self.last_zoom = None;
    }

    /// Whether clusters for `zoom_level` are already cached
    pub fn is_cached(&self, zoom_level: f64) -> bool {
        matches!(self.last_zoom, Some(last) if (last - zoom_level).abs() < 1e-9)
    }

    /// Clusters for the given zoom level.
    ///
    /// Items are visited in input order; each unclaimed item seeds a cluster
    /// with every unclaimed item inside the square of half-width
    /// `distance_px` around it, measured in screen pixels at `zoom_level`.
    pub fn get_clusters(&mut self, zoom_level: f64) -> &[Cluster<T>] {
        if !self.is_cached(zoom_level) {
            self.cached = self.compute(zoom_level);
            self.last_zoom = Some(zoom_level);
        }
        &self.cached
    }

    fn compute(&self, zoom_level: f64) -> Vec<Cluster<T>> {
        // Pixel distance at `zoom_level` expressed in zoom-0 world pixels
        let reach = self.distance_px / 2_f64.powf(zoom_level);
        let mut claimed: HashSet<usize> = HashSet::default();
        let mut clusters = Vec::new();

        for seed in self.spatial_index.all_items() {
            if claimed.contains(&seed.order) {
                continue;
            }

            let members: Vec<SpatialItem<T>> = self
                .spatial_index
                .query(&Bounds::around(seed.point, reach))
                .into_iter()
                .filter(|item| claimed.insert(item.order))
                .cloned()
                .collect();

            let id = format!("cluster_{}_{}", zoom_level, seed.id);
            clusters.push(Cluster::new(id, members, zoom_level));
        }

        log::debug!(
            "clustered {} items into {} clusters at zoom {}",
            self.spatial_index.len(),
            clusters.len(),
            zoom_level
        );
        clusters
    }

    pub fn len(&self) -> usize {
        self.spatial_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spatial_index.is_empty()
    }
}

impl<T: Clone> Default for Clustering<T> {
    fn default() -> Self {
        Self::new(crate::core::constants::CLUSTER_DISTANCE_PX)
    }
}
