pub mod base;
pub mod cluster;
pub mod feature;
pub mod macros;
pub mod manager;
pub mod marker;

pub use cluster::ClusterLayer;
pub use feature::{ClusterMarker, GroupMarker, RenderedFeature};
pub use manager::LayerManager;
pub use marker::MarkerLayer;
