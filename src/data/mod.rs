pub mod comparison;
pub mod grouping;
pub mod model;

pub use comparison::locations_changed;
pub use grouping::group_locations_by_coordinates;
pub use model::{Dataset, LocationGroup, LocationRecord, Price, PriceSet, TaggedLocation};
