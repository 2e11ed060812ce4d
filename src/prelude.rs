//! Prelude module for common listmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use listmap::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    config::{ClusterConfig, DatasetConfig, InteractionConfig, MarkerConfig, StyleConfig},
    geo::{LatLng, LatLngBounds, Point},
    map::{Map, MapCursor},
    viewport::Viewport,
};

pub use crate::data::{
    comparison::locations_changed,
    grouping::group_locations_by_coordinates,
    model::{Dataset, LocationGroup, LocationRecord, Price, PriceSet, TaggedLocation},
};

pub use crate::layers::{
    base::LayerTrait,
    cluster::ClusterLayer,
    feature::{ClusterMarker, GroupMarker, RenderedFeature},
    manager::LayerManager,
    marker::MarkerLayer,
};

pub use crate::input::{
    events::{MapEvent, PointerEvent, PointerKind},
    handler::{Action, EventBus, Subscription},
    interaction::{FitRequest, Interaction, InteractionResolver},
};

pub use crate::controller::{MarkerController, RenderState, SyncReport};

pub use crate::dataset::{manager::DatasetManager, palette::PALETTE};

pub use crate::ingest::{
    client::{HttpIngestionClient, IngestionService, UploadResponse},
    validation::ValidationResult,
};

pub use crate::spatial::{
    clustering::{Cluster, Clustering},
    index::{SpatialIndex, SpatialItem},
};

pub use crate::style::{cache::StyleCache, color::Color, resolver::RenderStyle};

pub use crate::session::MapSession;

pub use crate::traits::{CacheStats, Configurable, LayerOperations};

#[cfg(feature = "tokio-runtime")]
pub use crate::runtime::{async_delay, settle};

pub use crate::{Error as MapError, Result};

pub use instant::Instant;
pub use std::{sync::Arc, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

#[cfg(feature = "tokio-runtime")]
pub use futures::Future;
