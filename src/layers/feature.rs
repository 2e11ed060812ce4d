use crate::{
    core::{
        constants::PIN_ICON_SIZE,
        geo::{LatLng, LatLngBounds, Point},
    },
    data::model::LocationGroup,
    style::resolver::RenderStyle,
};

/// One group rendered as an individual pin
#[derive(Debug, Clone)]
pub struct GroupMarker {
    pub group: LocationGroup,
    pub styles: Vec<RenderStyle>,
}

impl GroupMarker {
    pub fn pin_size(&self) -> f64 {
        self.styles
            .iter()
            .find_map(RenderStyle::as_pin)
            .map(|pin| pin.size)
            .unwrap_or(PIN_ICON_SIZE) as f64
    }
}

/// One cluster of a single dataset's groups
#[derive(Debug, Clone)]
pub struct ClusterMarker {
    pub id: String,
    pub dataset_id: String,
    /// Centroid of the member groups
    pub position: LatLng,
    /// Geographic extent of the member groups
    pub extent: LatLngBounds,
    /// Member groups in input order
    pub members: Vec<LocationGroup>,
    pub style: RenderStyle,
}

impl ClusterMarker {
    pub fn radius(&self) -> f64 {
        self.style.as_circle().map(|c| c.radius).unwrap_or_default()
    }
}

/// A feature on a marker or cluster layer
#[derive(Debug, Clone)]
pub enum RenderedFeature {
    Group(GroupMarker),
    Cluster(ClusterMarker),
}

impl RenderedFeature {
    pub fn position(&self) -> LatLng {
        match self {
            RenderedFeature::Group(marker) => marker.group.lat_lng(),
            RenderedFeature::Cluster(cluster) => cluster.position,
        }
    }

    pub fn dataset_id(&self) -> Option<&str> {
        match self {
            RenderedFeature::Group(marker) => marker.group.dataset_id(),
            RenderedFeature::Cluster(cluster) => Some(&cluster.dataset_id),
        }
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, RenderedFeature::Cluster(_))
    }

    pub fn as_group(&self) -> Option<&GroupMarker> {
        match self {
            RenderedFeature::Group(marker) => Some(marker),
            RenderedFeature::Cluster(_) => None,
        }
    }

    pub fn as_cluster(&self) -> Option<&ClusterMarker> {
        match self {
            RenderedFeature::Cluster(cluster) => Some(cluster),
            RenderedFeature::Group(_) => None,
        }
    }

    /// Whether `pointer` hits this feature drawn with its anchor at `anchor`.
    ///
    /// Clusters hit inside their circle; pins hit inside the icon box that
    /// sits above its bottom-centre tip. Both grow by `tolerance` pixels.
    pub fn hit(&self, anchor: Point, pointer: Point, tolerance: f64) -> bool {
        match self {
            RenderedFeature::Cluster(cluster) => {
                anchor.distance_to(&pointer) <= cluster.radius() + tolerance
            }
            RenderedFeature::Group(marker) => {
                let half = marker.pin_size() / 2.0;
                pointer.x >= anchor.x - half - tolerance
                    && pointer.x <= anchor.x + half + tolerance
                    && pointer.y >= anchor.y - marker.pin_size() - tolerance
                    && pointer.y <= anchor.y + tolerance
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::model::{LocationRecord, TaggedLocation},
        style::resolver::{cluster_style, marker_style},
    };

    fn group() -> LocationGroup {
        LocationGroup::seeded(
            TaggedLocation {
                record: LocationRecord::new("a", "addr").with_coordinates(37.5, 127.0),
                dataset_id: "d1".to_string(),
                dataset_name: "d1".to_string(),
                dataset_color: "#9b59b6".to_string(),
            },
            37.5,
            127.0,
        )
    }

    #[test]
    fn test_pin_hit_box_sits_above_tip() {
        let g = group();
        let feature = RenderedFeature::Group(GroupMarker {
            styles: marker_style(&g, true),
            group: g,
        });
        let tip = Point::new(100.0, 100.0);

        assert!(feature.hit(tip, Point::new(100.0, 90.0), 5.0));
        assert!(feature.hit(tip, Point::new(112.0, 76.0), 5.0));
        assert!(feature.hit(tip, Point::new(100.0, 104.0), 5.0));
        assert!(!feature.hit(tip, Point::new(100.0, 110.0), 5.0));
        assert!(!feature.hit(tip, Point::new(120.0, 90.0), 5.0));
    }

    #[test]
    fn test_cluster_hit_uses_radius() {
        let members = vec![group(), group(), group()];
        let feature = RenderedFeature::Cluster(ClusterMarker {
            id: "c".to_string(),
            dataset_id: "d1".to_string(),
            position: LatLng::new(37.5, 127.0),
            extent: LatLngBounds::from_coords(37.5, 127.0, 37.5, 127.0),
            style: cluster_style(&members),
            members,
        });
        let center = Point::new(50.0, 50.0);

        // radius 26 + tolerance 5
        assert!(feature.hit(center, Point::new(80.0, 50.0), 5.0));
        assert!(!feature.hit(center, Point::new(82.0, 50.0), 5.0));
        assert_eq!(feature.dataset_id(), Some("d1"));
    }
}
