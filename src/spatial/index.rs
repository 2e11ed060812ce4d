use crate::{
    core::{
        bounds::Bounds,
        geo::{LatLng, Point},
    },
    MapError, Result,
};

use rstar::{RTree, RTreeObject, AABB};

/// A spatial item that can be indexed via an R-tree.
///
/// Items are stored at their zoom-0 world-pixel position so that one tree
/// serves every zoom level; `order` remembers the insertion sequence.
#[derive(Debug, Clone)]
pub struct SpatialItem<T> {
    pub id: String,
    pub position: LatLng,
    pub point: Point,
    pub data: T,
    pub order: usize,
}

impl<T> SpatialItem<T> {
    pub fn from_lat_lng(id: String, position: LatLng, data: T) -> Result<Self> {
        if !position.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "{} at ({}, {})",
                id, position.lat, position.lng
            ))
            .into());
        }
        Ok(Self {
            id,
            point: position.to_world_pixel(0.0),
            position,
            data,
            order: 0,
        })
    }

}

impl<T> PartialEq for SpatialItem<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for SpatialItem<T> {}

// --- rstar integration -------------------------------------------------------------------------

impl<T> RTreeObject for SpatialItem<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.point.x, self.point.y])
    }
}

/// R-tree backed index over zoom-0 world pixels
pub struct SpatialIndex<T> {
    rtree: RTree<SpatialItem<T>>,
}

impl<T> SpatialIndex<T> {
    pub fn new() -> Self {
        Self {
            rtree: RTree::new(),
        }
    }

    /// Bulk-loads items, numbering them in iteration order
    pub fn bulk_load(items: Vec<SpatialItem<T>>) -> Self {
        let numbered = items
            .into_iter()
            .enumerate()
            .map(|(order, mut item)| {
                item.order = order;
                item
            })
            .collect();
        Self {
            rtree: RTree::bulk_load(numbered),
        }
    }

    /// Items whose point lies inside `bounds`, in insertion order
    pub fn query(&self, bounds: &Bounds) -> Vec<&SpatialItem<T>> {
        let envelope =
            AABB::from_corners([bounds.min.x, bounds.min.y], [bounds.max.x, bounds.max.y]);
        let mut found: Vec<_> = self.rtree.locate_in_envelope(&envelope).collect();
        found.sort_by_key(|item| item.order);
        found
    }

    /// All items in insertion order
    pub fn all_items(&self) -> Vec<&SpatialItem<T>> {
        let mut items: Vec<_> = self.rtree.iter().collect();
        items.sort_by_key(|item| item.order);
        items
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }
}

impl<T> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}
