//! Configuration for marker clustering, interaction and styling
//!
//! Settings are grouped per concern and can be parsed from a (partial)
//! JSON document layered over the defaults.

use crate::{core::constants, MapError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete marker-subsystem configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkerConfig {
    pub clustering: ClusterConfig,
    pub interaction: InteractionConfig,
    pub styling: StyleConfig,
    pub datasets: DatasetConfig,
}

impl MarkerConfig {
    /// Parses a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: MarkerConfig = serde_json::from_str(json).map_err(MapError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let clustering = &self.clustering;
        if !(clustering.distance_px > 0.0) {
            return Err(MapError::Config("cluster distance must be positive".to_string()).into());
        }
        if !(self.interaction.hit_tolerance_px >= 0.0) {
            return Err(MapError::Config("hit tolerance must not be negative".to_string()).into());
        }
        if self.interaction.fit_max_zoom < clustering.zoom_threshold {
            return Err(MapError::Config(format!(
                "fit max zoom {} is below the cluster threshold {}",
                self.interaction.fit_max_zoom, clustering.zoom_threshold
            ))
            .into());
        }
        if self.styling.cache_capacity == 0 {
            return Err(MapError::Config("style cache capacity must be non-zero".to_string()).into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterConfig {
    /// Zoom levels `<=` this value render clusters
    pub zoom_threshold: f64,
    /// Merge distance between groups, in screen pixels
    pub distance_px: f64,
    pub debounce_ms: u64,
}

impl ClusterConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn is_cluster_zoom(&self, zoom: f64) -> bool {
        zoom <= self.zoom_threshold
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            zoom_threshold: constants::CLUSTER_ZOOM_THRESHOLD,
            distance_px: constants::CLUSTER_DISTANCE_PX,
            debounce_ms: constants::REBUILD_DEBOUNCE_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InteractionConfig {
    pub hit_tolerance_px: f64,
    pub fit_max_zoom: f64,
    pub fit_duration_ms: u64,
    pub fit_padding_px: f64,
    /// Clicks whose target ancestry contains this class are ignored
    pub popup_class: String,
}

impl InteractionConfig {
    pub fn fit_duration(&self) -> Duration {
        Duration::from_millis(self.fit_duration_ms)
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            hit_tolerance_px: constants::HIT_TOLERANCE_PX,
            fit_max_zoom: constants::CLUSTER_FIT_MAX_ZOOM,
            fit_duration_ms: constants::CLUSTER_FIT_DURATION_MS,
            fit_padding_px: constants::CLUSTER_FIT_PADDING_PX,
            popup_class: constants::POPUP_CLASS.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleConfig {
    pub cache_capacity: usize,
    pub pin_size: u32,
    pub show_labels: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            cache_capacity: constants::STYLE_CACHE_CAPACITY,
            pin_size: constants::PIN_ICON_SIZE,
            show_labels: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatasetConfig {
    pub max_datasets: usize,
    pub max_file_size_mb: u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            max_datasets: constants::MAX_DATASETS,
            max_file_size_mb: 10,
        }
    }
}
