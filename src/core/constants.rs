//! Engine-wide defaults for marker grouping, clustering and interaction.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

/// Default square tile size in pixels; the world is this wide at zoom 0.
pub const TILE_SIZE: u32 = 256;

/// Zoom levels at or below this render clusters, above it individual markers.
pub const CLUSTER_ZOOM_THRESHOLD: f64 = 11.0;

/// Pixel distance within which groups merge into one cluster.
pub const CLUSTER_DISTANCE_PX: f64 = 30.0;

/// Coalescing delay applied to zoom and data changes before a rebuild.
pub const REBUILD_DEBOUNCE_MS: u64 = 50;

/// Hit-test tolerance around rendered features.
pub const HIT_TOLERANCE_PX: f64 = 5.0;

/// Fit-to-cluster never zooms past this level.
pub const CLUSTER_FIT_MAX_ZOOM: f64 = 14.0;

/// Animation length of the fit-to-cluster transition.
pub const CLUSTER_FIT_DURATION_MS: u64 = 500;

/// Padding kept around a cluster extent when fitting to it.
pub const CLUSTER_FIT_PADDING_PX: f64 = 100.0;

/// Class name marking the popup overlay in the pointer target ancestry.
pub const POPUP_CLASS: &str = "ol-popup";

/// Initial zoom of a freshly created map.
pub const DEFAULT_ZOOM: f64 = 13.0;

/// Zoom range of the map view.
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 19.0;

/// Hard cap on concurrently held datasets (enforced at upload validation).
pub const MAX_DATASETS: usize = 3;

/// Marker pin icon size in pixels, anchored at its bottom-centre tip.
pub const PIN_ICON_SIZE: u32 = 24;

/// Cluster circle radius bounds and growth per contained group.
pub const CLUSTER_BASE_RADIUS: f64 = 20.0;
pub const CLUSTER_MAX_RADIUS: f64 = 50.0;
pub const CLUSTER_RADIUS_STEP: f64 = 2.0;

/// Fallback colour when a dataset colour is missing or malformed.
pub const DEFAULT_MARKER_COLOR: &str = "#3498db";

/// Default capacity of the memoised style cache.
pub const STYLE_CACHE_CAPACITY: usize = 256;
