use crate::{
    data::model::{Dataset, LocationRecord, TaggedLocation},
    dataset::palette::available_color,
    input::{events::MapEvent, handler::EventBus},
    MapError, Result,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Coordinate coverage of one dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStats {
    pub total: usize,
    pub valid_coordinates: usize,
    pub invalid_coordinates: usize,
}

/// Persistable state of the manager
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub datasets: Vec<Dataset>,
    #[serde(default)]
    pub selected_ids: Vec<String>,
}

/// Holds the uploaded datasets and which of them are selected.
///
/// Every mutation broadcasts [`MapEvent::LocationDataUpdated`] with the
/// flattened selection, including the empty list when nothing is selected.
/// The dataset count is not capped here; upload validation enforces limits.
pub struct DatasetManager {
    datasets: Vec<Dataset>,
    selected: Vec<String>,
    events: EventBus,
}

impl DatasetManager {
    pub fn new() -> Self {
        Self::with_events(EventBus::new())
    }

    pub fn with_events(events: EventBus) -> Self {
        Self {
            datasets: Vec::new(),
            selected: Vec::new(),
            events,
        }
    }

    /// Adds a dataset, selects it and returns its id. An empty name falls
    /// back to `Dataset {n}`.
    pub fn add_dataset(&mut self, records: Vec<LocationRecord>, name: &str) -> String {
        let uploaded_at = Utc::now();
        let random = uuid::Uuid::new_v4().simple().to_string();
        let id = format!("dataset_{}_{}", uploaded_at.timestamp_millis(), &random[..9]);

        let name = if name.trim().is_empty() {
            format!("Dataset {}", self.datasets.len() + 1)
        } else {
            name.to_string()
        };
        let color = available_color(self.datasets.iter().map(|d| d.color.as_str())).to_string();

        log::info!(
            "added dataset '{}' ({} records), color {}",
            name,
            records.len(),
            color
        );
        self.datasets.push(Dataset {
            id: id.clone(),
            name,
            uploaded_at,
            data: records,
            color,
        });
        self.selected.push(id.clone());
        self.broadcast();
        id
    }

    /// Flips the selection of `id`. Unknown ids are ignored.
    pub fn toggle_dataset(&mut self, id: &str) {
        if !self.contains(id) {
            log::debug!("toggle of unknown dataset {}", id);
            return;
        }
        match self.selected.iter().position(|selected| selected == id) {
            Some(index) => {
                self.selected.remove(index);
            }
            None => self.selected.push(id.to_string()),
        }
        self.broadcast();
    }

    /// Removes a dataset and drops it from the selection
    pub fn remove_dataset(&mut self, id: &str) -> Option<Dataset> {
        let index = self.datasets.iter().position(|d| d.id == id)?;
        let removed = self.datasets.remove(index);
        self.selected.retain(|selected| selected != id);
        log::info!("removed dataset '{}'", removed.name);
        self.broadcast();
        Some(removed)
    }

    pub fn rename_dataset(&mut self, id: &str, name: &str) -> Result<()> {
        let dataset = self
            .datasets
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| MapError::Dataset(format!("unknown dataset {}", id)))?;
        dataset.name = name.to_string();
        self.broadcast();
        Ok(())
    }

    pub fn clear_all(&mut self) {
        self.datasets.clear();
        self.selected.clear();
        log::info!("cleared all datasets");
        self.broadcast();
    }

    /// Selects every dataset, or none
    pub fn toggle_all(&mut self, select_all: bool) {
        self.selected = if select_all {
            self.datasets.iter().map(|d| d.id.clone()).collect()
        } else {
            Vec::new()
        };
        self.broadcast();
    }

    /// Tagged records of every selected dataset, in dataset order
    pub fn selected_data(&self) -> Vec<TaggedLocation> {
        self.datasets
            .iter()
            .filter(|d| self.is_selected(&d.id))
            .flat_map(|d| d.tagged())
            .collect()
    }

    /// Tagged records of one dataset regardless of selection
    pub fn dataset_data(&self, id: &str) -> Vec<TaggedLocation> {
        self.get(id)
            .map(|d| d.tagged().collect())
            .unwrap_or_default()
    }

    pub fn dataset_stats(&self, id: &str) -> Option<DatasetStats> {
        let dataset = self.get(id)?;
        let total = dataset.data.len();
        let valid_coordinates = dataset.data.iter().filter(|r| r.has_coordinates()).count();
        Some(DatasetStats {
            total,
            valid_coordinates,
            invalid_coordinates: total - valid_coordinates,
        })
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|selected| selected == id)
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selected
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn get(&self, id: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn has_datasets(&self) -> bool {
        !self.is_empty()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn snapshot(&self) -> SessionState {
        SessionState {
            datasets: self.datasets.clone(),
            selected_ids: self.selected.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.snapshot()).map_err(MapError::from)?)
    }

    /// Replaces the whole state, as on a fresh start. Selected ids that do
    /// not name a dataset are dropped.
    pub fn restore(&mut self, state: SessionState) {
        let SessionState {
            datasets,
            selected_ids,
        } = state;
        self.selected = selected_ids
            .into_iter()
            .filter(|id| datasets.iter().any(|d| &d.id == id))
            .collect();
        self.datasets = datasets;
        log::info!(
            "restored {} datasets, {} selected",
            self.datasets.len(),
            self.selected.len()
        );
        self.broadcast();
    }

    /// Restores from JSON. A corrupt snapshot resets to an empty manager
    /// and is reported as an error.
    pub fn restore_json(&mut self, json: &str) -> Result<()> {
        match serde_json::from_str::<SessionState>(json) {
            Ok(state) => {
                self.restore(state);
                Ok(())
            }
            Err(e) => {
                log::error!("failed to restore datasets: {}", e);
                self.restore(SessionState::default());
                Err(MapError::Serialization(e).into())
            }
        }
    }

    /// Re-broadcasts the current selection without changing anything
    pub fn reload(&self) {
        self.broadcast();
    }

    fn broadcast(&self) {
        let locations = self.selected_data();
        log::debug!(
            "broadcasting {} locations from {} selected datasets",
            locations.len(),
            self.selected.len()
        );
        self.events.publish(MapEvent::LocationDataUpdated { locations });
    }
}

impl Default for DatasetManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: usize) -> Vec<LocationRecord> {
        (0..n)
            .map(|i| {
                LocationRecord::new(format!("unit {}", i), "addr")
                    .with_coordinates(37.5 + i as f64 * 0.01, 127.0)
            })
            .collect()
    }

    #[test]
    fn test_add_assigns_color_and_selects() {
        let mut manager = DatasetManager::new();
        let first = manager.add_dataset(records(2), "north.csv");
        let second = manager.add_dataset(records(1), "");

        assert!(first.starts_with("dataset_"));
        assert_eq!(first.rsplit('_').next().map(str::len), Some(9));
        assert_eq!(manager.get(&first).unwrap().color, "#9b59b6");
        assert_eq!(manager.get(&second).unwrap().color, "#34495e");
        assert_eq!(manager.get(&second).unwrap().name, "Dataset 2");
        assert_eq!(manager.selected_count(), 2);
        assert_eq!(manager.selected_data().len(), 3);
    }

    #[test]
    fn test_mutations_broadcast_selection() {
        let mut manager = DatasetManager::new();
        let events = manager.events().subscribe();
        let id = manager.add_dataset(records(2), "a");
        manager.toggle_dataset(&id);
        manager.toggle_all(true);

        let sizes: Vec<usize> = events
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                MapEvent::LocationDataUpdated { locations } => Some(locations.len()),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![2, 0, 2]);
    }

    #[test]
    fn test_remove_drops_selection() {
        let mut manager = DatasetManager::new();
        let a = manager.add_dataset(records(1), "a");
        let b = manager.add_dataset(records(1), "b");

        assert!(manager.remove_dataset(&a).is_some());
        assert!(manager.remove_dataset(&a).is_none());
        assert!(!manager.is_selected(&a));
        assert_eq!(manager.selected_ids(), &[b]);

        manager.clear_all();
        assert!(!manager.has_datasets());
        assert!(manager.selected_data().is_empty());
    }

    #[test]
    fn test_stats_and_rename() {
        let mut manager = DatasetManager::new();
        let mut data = records(2);
        data.push(LocationRecord::new("ungeocoded", "somewhere"));
        let id = manager.add_dataset(data, "a");

        let stats = manager.dataset_stats(&id).unwrap();
        assert_eq!((stats.total, stats.valid_coordinates, stats.invalid_coordinates), (3, 2, 1));

        manager.rename_dataset(&id, "renamed").unwrap();
        assert_eq!(manager.dataset_data(&id)[0].dataset_name, "renamed");
        assert!(manager.rename_dataset("missing", "x").is_err());
        assert!(manager.dataset_stats("missing").is_none());
    }

    #[test]
    fn test_snapshot_round_trip_and_corrupt_restore() {
        let mut manager = DatasetManager::new();
        let a = manager.add_dataset(records(2), "a");
        manager.add_dataset(records(1), "b");
        manager.toggle_dataset(&a);
        let json = manager.to_json().unwrap();
        assert!(json.contains("selectedIds"));

        let mut restored = DatasetManager::new();
        restored.restore_json(&json).unwrap();
        assert_eq!(restored.len(), 2);
        assert!(!restored.is_selected(&a));
        assert_eq!(restored.selected_data().len(), 1);

        assert!(restored.restore_json("{not json").is_err());
        assert!(restored.is_empty());
        assert_eq!(restored.selected_count(), 0);
    }
}
