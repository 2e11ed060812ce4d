//! # listmap
//!
//! Marker lifecycle and clustering for uploaded real-estate listing datasets.
//!
//! Uploaded spreadsheets become [`Dataset`]s; the selected ones are flattened
//! into tagged locations, grouped by exact coordinate, and rendered either as
//! per-dataset clusters (low zoom) or as individual pins on a shared layer
//! (high zoom). Pointer events on the rendered features resolve back to the
//! clicked [`LocationGroup`] or to a zoom-to-cluster request.

pub mod controller;
pub mod core;
pub mod data;
pub mod dataset;
pub mod ingest;
pub mod input;
pub mod layers;
pub mod prelude;
#[cfg(feature = "tokio-runtime")]
pub mod runtime;
pub mod session;
pub mod spatial;
pub mod style;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    bounds::Bounds,
    config::MarkerConfig,
    geo::{LatLng, LatLngBounds, Point},
    map::Map,
    viewport::Viewport,
};

pub use data::{
    comparison::locations_changed,
    grouping::group_locations_by_coordinates,
    model::{Dataset, LocationGroup, LocationRecord, Price, PriceSet, TaggedLocation},
};

pub use dataset::manager::DatasetManager;

pub use controller::{controller::MarkerController, state::RenderState};

pub use input::{
    events::{MapEvent, PointerEvent},
    interaction::{Interaction, InteractionResolver},
};

pub use layers::feature::RenderedFeature;

pub use session::MapSession;

pub use style::resolver::{cluster_style, marker_style, RenderStyle};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Error type alias for convenience
pub type Error = MapError;
