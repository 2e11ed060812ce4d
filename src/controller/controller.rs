use crate::{
    controller::{debounce::Debouncer, state::RenderState},
    core::{config::MarkerConfig, map::Map},
    data::{
        comparison::locations_changed,
        grouping::group_locations_by_coordinates,
        model::{LocationGroup, TaggedLocation},
    },
    layers::{
        cluster::ClusterLayer,
        marker::{MarkerLayer, MARKER_LAYER_ID},
    },
    prelude::Instant,
    style::cache::StyleCache,
    traits::Configurable,
    MapError, Result,
};
use serde::Serialize;

/// Render bookkeeping for one dataset
#[derive(Debug, Clone)]
struct DatasetSlot {
    dataset_id: String,
    groups: Vec<LocationGroup>,
    state: RenderState,
    /// Zoom the cluster layer was last partitioned at
    cluster_zoom: Option<f64>,
    dirty: bool,
}

impl DatasetSlot {
    fn new(dataset_id: String) -> Self {
        Self {
            dataset_id,
            groups: Vec::new(),
            state: RenderState::Absent,
            cluster_zoom: None,
            dirty: false,
        }
    }

    fn units(&self) -> Vec<TaggedLocation> {
        units_of(&self.groups)
    }
}

fn units_of(groups: &[LocationGroup]) -> Vec<TaggedLocation> {
    groups.iter().flat_map(|g| g.units.iter().cloned()).collect()
}

/// What a single synchronisation pass changed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Datasets that entered a rendered state
    pub built: Vec<String>,
    /// Datasets whose previous rendering was removed
    pub torn_down: Vec<String>,
    /// Datasets re-rendered in the same state because their groups changed
    pub rebuilt: Vec<String>,
    /// Clustered datasets re-partitioned for a new zoom level
    pub reclustered: Vec<String>,
    /// Datasets whose build failed, with the error message
    pub failed: Vec<(String, String)>,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.built.is_empty()
            && self.torn_down.is_empty()
            && self.rebuilt.is_empty()
            && self.reclustered.is_empty()
            && self.failed.is_empty()
    }
}

/// Drives the per-dataset render lifecycle.
///
/// Location updates and zoom changes only record intent and arm the
/// debouncer; the map's layers are touched exclusively in [`sync`], which
/// reconciles every dataset with the state its group count and the current
/// zoom call for. Each dataset is rendered at most once: either by its own
/// cluster layer or as a slice of the shared marker layer.
///
/// [`sync`]: MarkerController::sync
pub struct MarkerController {
    config: MarkerConfig,
    zoom: f64,
    show_labels: bool,
    previous: Vec<TaggedLocation>,
    slots: Vec<DatasetSlot>,
    debouncer: Debouncer,
    styles: StyleCache,
}

impl MarkerController {
    pub fn new(config: MarkerConfig, zoom: f64) -> Self {
        Self {
            show_labels: config.styling.show_labels,
            debouncer: Debouncer::new(config.clustering.debounce()),
            styles: StyleCache::new(config.styling.cache_capacity, config.styling.pin_size),
            config,
            zoom,
            previous: Vec::new(),
            slots: Vec::new(),
        }
    }

    /// Accepts the full list of currently selected locations.
    ///
    /// Returns `false` when the list is equivalent to the last one accepted;
    /// nothing is scheduled then. Otherwise the locations are regrouped,
    /// datasets whose groups changed are marked for a rebuild and a sync is
    /// scheduled.
    pub fn set_locations(&mut self, locations: Vec<TaggedLocation>, now: Instant) -> bool {
        if !locations_changed(&locations, &self.previous) {
            log::debug!("location update ignored, nothing changed");
            return false;
        }

        let mut partitions: Vec<(String, Vec<LocationGroup>)> = Vec::new();
        for group in group_locations_by_coordinates(&locations) {
            let dataset_id = group.dataset_id().unwrap_or_default().to_string();
            match partitions.iter_mut().find(|(id, _)| *id == dataset_id) {
                Some((_, groups)) => groups.push(group),
                None => partitions.push((dataset_id, vec![group])),
            }
        }

        // Datasets no longer selected drain to zero groups
        for slot in &mut self.slots {
            if !partitions.iter().any(|(id, _)| *id == slot.dataset_id) && !slot.groups.is_empty() {
                slot.groups.clear();
                slot.dirty = true;
            }
        }

        for (dataset_id, groups) in partitions {
            let index = match self.slots.iter().position(|s| s.dataset_id == dataset_id) {
                Some(index) => index,
                None => {
                    self.slots.push(DatasetSlot::new(dataset_id));
                    self.slots.len() - 1
                }
            };
            let slot = &mut self.slots[index];
            if slot.groups.is_empty() || locations_changed(&units_of(&groups), &slot.units()) {
                slot.groups = groups;
                slot.dirty = true;
            }
        }

        log::debug!(
            "accepted {} locations across {} datasets",
            locations.len(),
            self.slots.len()
        );
        self.previous = locations;
        self.debouncer.schedule(now);
        true
    }

    /// Records a new zoom level; the re-evaluation is debounced
    pub fn set_zoom(&mut self, zoom: f64, now: Instant) {
        if zoom == self.zoom {
            return;
        }
        self.zoom = zoom;
        self.debouncer.schedule(now);
    }

    /// Forces every tracked dataset to be rebuilt on the next sync
    pub fn invalidate(&mut self, now: Instant) {
        for slot in &mut self.slots {
            slot.dirty = true;
        }
        self.debouncer.schedule(now);
    }

    /// Toggles pin labels. Existing flat markers are restyled in place; the
    /// set of rendered features does not change. Returns the number of
    /// restyled features.
    pub fn set_show_labels(&mut self, show_labels: bool, map: &mut Map) -> usize {
        if show_labels == self.show_labels {
            return 0;
        }
        self.show_labels = show_labels;

        let styles = &mut self.styles;
        let restyled = map
            .layers_mut()
            .with_layer_as_mut::<MarkerLayer, _, _>(MARKER_LAYER_ID, |layer| {
                layer.restyle(show_labels, styles)
            })
            .unwrap_or(0);
        log::debug!("labels {}: restyled {} markers", show_labels, restyled);
        restyled
    }

    /// Runs a sync if the debounce deadline has passed
    pub fn poll(&mut self, map: &mut Map, now: Instant) -> Option<SyncReport> {
        if self.debouncer.fire(now) {
            Some(self.sync(map))
        } else {
            None
        }
    }

    /// Cancels the pending deadline and syncs immediately
    pub fn flush(&mut self, map: &mut Map) -> SyncReport {
        self.debouncer.cancel();
        self.sync(map)
    }

    /// Reconciles every dataset with its target state. Running it twice in
    /// a row leaves the map untouched the second time.
    pub fn sync(&mut self, map: &mut Map) -> SyncReport {
        let mut report = SyncReport::default();
        let zoom = self.zoom;
        let threshold = self.config.clustering.zoom_threshold;

        for slot in &mut self.slots {
            let target = RenderState::target(zoom, slot.groups.len(), threshold);

            if target != slot.state {
                if slot.state.is_rendered() {
                    teardown(slot, map);
                    report.torn_down.push(slot.dataset_id.clone());
                }
                match build(slot, target, zoom, &self.config, self.show_labels, &mut self.styles, map) {
                    Ok(()) if target.is_rendered() => report.built.push(slot.dataset_id.clone()),
                    Ok(()) => {}
                    Err(e) => fail(slot, e, &mut report),
                }
            } else if slot.dirty && slot.state.is_rendered() {
                let state = slot.state;
                teardown(slot, map);
                match build(slot, state, zoom, &self.config, self.show_labels, &mut self.styles, map) {
                    Ok(()) => report.rebuilt.push(slot.dataset_id.clone()),
                    Err(e) => fail(slot, e, &mut report),
                }
            } else if slot.state == RenderState::Clustered && slot.cluster_zoom != Some(zoom) {
                let styles = &mut self.styles;
                let layer_id = ClusterLayer::layer_id(&slot.dataset_id);
                map.layers_mut()
                    .with_layer_as_mut::<ClusterLayer, _, _>(&layer_id, |layer| {
                        layer.recluster(zoom, styles)
                    });
                slot.cluster_zoom = Some(zoom);
                report.reclustered.push(slot.dataset_id.clone());
            }
            slot.dirty = false;
        }

        self.slots
            .retain(|slot| slot.state.is_rendered() || !slot.groups.is_empty());

        if !report.is_noop() {
            log::info!(
                "marker sync at zoom {}: built {:?}, torn down {:?}, rebuilt {:?}, reclustered {:?}",
                zoom,
                report.built,
                report.torn_down,
                report.rebuilt,
                report.reclustered
            );
        }
        report
    }

    /// Render state of a dataset; unknown datasets are absent
    pub fn state(&self, dataset_id: &str) -> RenderState {
        self.slot(dataset_id)
            .map(|slot| slot.state)
            .unwrap_or(RenderState::Absent)
    }

    /// Render state of every tracked dataset, in first-seen order
    pub fn states(&self) -> Vec<(String, RenderState)> {
        self.slots
            .iter()
            .map(|slot| (slot.dataset_id.clone(), slot.state))
            .collect()
    }

    /// Current groups of a dataset
    pub fn groups(&self, dataset_id: &str) -> &[LocationGroup] {
        self.slot(dataset_id)
            .map(|slot| slot.groups.as_slice())
            .unwrap_or(&[])
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn show_labels(&self) -> bool {
        self.show_labels
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn style_cache(&self) -> &StyleCache {
        &self.styles
    }

    fn slot(&self, dataset_id: &str) -> Option<&DatasetSlot> {
        self.slots.iter().find(|slot| slot.dataset_id == dataset_id)
    }
}

fn fail(slot: &mut DatasetSlot, error: Box<dyn std::error::Error + Send + Sync>, report: &mut SyncReport) {
    log::error!("failed to render dataset {}: {}", slot.dataset_id, error);
    slot.state = RenderState::Absent;
    slot.cluster_zoom = None;
    report.failed.push((slot.dataset_id.clone(), error.to_string()));
}

/// Removes whatever `slot` currently has on the map
fn teardown(slot: &mut DatasetSlot, map: &mut Map) {
    match slot.state {
        RenderState::Clustered => {
            map.remove_layer(&ClusterLayer::layer_id(&slot.dataset_id));
        }
        RenderState::Flat => {
            let now_empty = map
                .layers_mut()
                .with_layer_as_mut::<MarkerLayer, _, _>(MARKER_LAYER_ID, |layer| {
                    layer.remove_dataset(&slot.dataset_id);
                    layer.is_empty()
                })
                .unwrap_or(false);
            if now_empty {
                map.remove_layer(MARKER_LAYER_ID);
            }
        }
        RenderState::Absent => {}
    }
    slot.state = RenderState::Absent;
    slot.cluster_zoom = None;
}

/// Renders `slot` in `target`. The slot must be torn down already.
fn build(
    slot: &mut DatasetSlot,
    target: RenderState,
    zoom: f64,
    config: &MarkerConfig,
    show_labels: bool,
    styles: &mut StyleCache,
    map: &mut Map,
) -> Result<()> {
    match target {
        RenderState::Absent => {}
        RenderState::Clustered => {
            let layer = ClusterLayer::build(
                &slot.dataset_id,
                &slot.groups,
                config.clustering.distance_px,
                zoom,
                styles,
            )?;
            map.add_layer(Box::new(layer))?;
            slot.cluster_zoom = Some(zoom);
        }
        RenderState::Flat => {
            if let Some(bad) = slot.groups.iter().find(|g| !g.lat_lng().is_valid()) {
                return Err(MapError::InvalidCoordinates(format!(
                    "group '{}' at ({}, {})",
                    bad.name, bad.lat, bad.lon
                ))
                .into());
            }
            if !map.layers().contains(MARKER_LAYER_ID) {
                map.add_layer(Box::new(MarkerLayer::new()))?;
            }
            let groups = &slot.groups;
            let dataset_id = &slot.dataset_id;
            map.layers_mut()
                .with_layer_as_mut::<MarkerLayer, _, _>(MARKER_LAYER_ID, |layer| {
                    layer.set_dataset(dataset_id, groups, show_labels, styles)
                })
                .ok_or_else(|| MapError::Layer("marker layer has an unexpected type".to_string()))?;
        }
    }
    slot.state = target;
    Ok(())
}

impl Configurable for MarkerController {
    type Config = MarkerConfig;

    fn config(&self) -> &MarkerConfig {
        &self.config
    }

    /// Applies a new configuration. Rendered datasets are rebuilt on the
    /// next sync so new thresholds and distances take effect.
    fn set_config(&mut self, config: MarkerConfig) -> Result<()> {
        Self::validate_config(&config)?;
        self.debouncer.set_delay(config.clustering.debounce());
        if config.styling != self.config.styling {
            self.styles = StyleCache::new(config.styling.cache_capacity, config.styling.pin_size);
        }
        for slot in &mut self.slots {
            slot.dirty = true;
        }
        self.config = config;
        Ok(())
    }

    fn validate_config(config: &MarkerConfig) -> Result<()> {
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::geo::{LatLng, Point},
        data::model::LocationRecord,
    };
    use std::time::Duration;

    fn location(name: &str, dataset: &str, lat: f64, lon: f64) -> TaggedLocation {
        TaggedLocation {
            record: LocationRecord::new(name, "addr").with_coordinates(lat, lon),
            dataset_id: dataset.to_string(),
            dataset_name: dataset.to_string(),
            dataset_color: "#9b59b6".to_string(),
        }
    }

    fn map(zoom: f64) -> Map {
        Map::new(LatLng::new(37.5, 127.0), zoom, Point::new(800.0, 600.0))
    }

    #[test]
    fn test_unchanged_locations_do_not_schedule() {
        let now = Instant::now();
        let mut controller = MarkerController::new(MarkerConfig::default(), 9.0);
        let locations = vec![location("a", "d1", 37.5, 127.0)];

        assert!(controller.set_locations(locations.clone(), now));
        controller.flush(&mut map(9.0));
        assert!(!controller.set_locations(locations, now));
        assert!(!controller.is_pending());
    }

    #[test]
    fn test_poll_waits_for_debounce() {
        let now = Instant::now();
        let mut map = map(9.0);
        let mut controller = MarkerController::new(MarkerConfig::default(), 9.0);
        controller.set_locations(vec![location("a", "d1", 37.5, 127.0)], now);

        assert!(controller.poll(&mut map, now + Duration::from_millis(10)).is_none());
        assert!(map.layers().is_empty());

        let report = controller
            .poll(&mut map, now + Duration::from_millis(50))
            .unwrap();
        assert_eq!(report.built, vec!["d1".to_string()]);
        assert_eq!(controller.state("d1"), RenderState::Clustered);
        assert!(map.layers().contains("cluster:d1"));
    }

    #[test]
    fn test_zoom_crossing_switches_layers() {
        let now = Instant::now();
        let mut map = map(9.0);
        let mut controller = MarkerController::new(MarkerConfig::default(), 9.0);
        controller.set_locations(
            vec![location("a", "d1", 37.5, 127.0), location("b", "d1", 37.6, 127.1)],
            now,
        );
        controller.flush(&mut map);

        controller.set_zoom(13.0, now);
        let report = controller.flush(&mut map);
        assert_eq!(report.torn_down, vec!["d1".to_string()]);
        assert_eq!(controller.state("d1"), RenderState::Flat);
        assert!(!map.layers().contains("cluster:d1"));
        assert_eq!(map.layers().feature_count(), 2);

        assert!(controller.flush(&mut map).is_noop());
    }

    #[test]
    fn test_second_sync_is_noop() {
        let now = Instant::now();
        let mut map = map(9.0);
        let mut controller = MarkerController::new(MarkerConfig::default(), 9.0);
        controller.set_locations(vec![location("a", "d1", 37.5, 127.0)], now);
        controller.flush(&mut map);

        let revision = map.layers().revision();
        assert!(controller.sync(&mut map).is_noop());
        assert_eq!(map.layers().revision(), revision);
    }

    #[test]
    fn test_invalid_group_fails_in_isolation() {
        let now = Instant::now();
        let mut map = map(14.0);
        let mut controller = MarkerController::new(MarkerConfig::default(), 14.0);
        controller.set_locations(
            vec![location("bad", "d1", 95.0, 127.0), location("ok", "d2", 37.5, 127.0)],
            now,
        );

        let report = controller.flush(&mut map);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "d1");
        assert_eq!(controller.state("d1"), RenderState::Absent);
        assert_eq!(controller.state("d2"), RenderState::Flat);
        assert_eq!(map.layers().feature_count(), 1);
    }

    #[test]
    fn test_label_toggle_restyles_without_rebuild() {
        let now = Instant::now();
        let mut map = map(14.0);
        let mut controller = MarkerController::new(MarkerConfig::default(), 14.0);
        controller.set_locations(vec![location("a", "d1", 37.5, 127.0)], now);
        controller.flush(&mut map);

        assert_eq!(controller.set_show_labels(false, &mut map), 1);
        assert_eq!(controller.set_show_labels(false, &mut map), 0);
        assert!(!controller.is_pending());
        assert_eq!(map.layers().feature_count(), 1);
    }

    #[test]
    fn test_config_change_rejects_invalid() {
        let mut controller = MarkerController::new(MarkerConfig::default(), 9.0);
        assert!(controller
            .update_config(|c| c.clustering.distance_px = -1.0)
            .is_err());
        controller
            .update_config(|c| c.clustering.debounce_ms = 120)
            .unwrap();
        assert_eq!(controller.config().clustering.debounce_ms, 120);
    }
}
