pub mod clustering;
pub mod index;

pub use clustering::{Cluster, Clustering};
pub use index::{SpatialIndex, SpatialItem};
