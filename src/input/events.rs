use crate::{
    core::geo::Point,
    data::model::{LocationGroup, TaggedLocation},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    Click,
    Move,
}

/// Pointer input on the map container.
///
/// `target_classes` lists the CSS classes of the event target and all of
/// its ancestors, innermost first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub pixel: Point,
    #[serde(default)]
    pub target_classes: Vec<String>,
}

impl PointerEvent {
    pub fn click(pixel: Point) -> Self {
        Self {
            kind: PointerKind::Click,
            pixel,
            target_classes: Vec::new(),
        }
    }

    pub fn moved(pixel: Point) -> Self {
        Self {
            kind: PointerKind::Move,
            pixel,
            target_classes: Vec::new(),
        }
    }

    pub fn with_target_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    /// True if the target or any ancestor carries `class`
    pub fn originates_in(&self, class: &str) -> bool {
        self.target_classes.iter().any(|c| c == class)
    }
}

/// Broadcast notifications between the map, the dataset manager and the UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MapEvent {
    /// The flattened selected location list changed
    LocationDataUpdated { locations: Vec<TaggedLocation> },
    /// The UI asks for the current list to be re-broadcast
    ReloadRequested,
    /// The map zoom level changed
    ZoomChanged { zoom: f64 },
    /// Layer was added to the map
    LayerAdd { layer_id: String },
    /// Layer was removed from the map
    LayerRemove { layer_id: String },
    /// The selected group changed; `None` clears the selection
    SelectionChanged { group: Option<LocationGroup> },
}

impl MapEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            MapEvent::LocationDataUpdated { .. } => "locationdataupdated",
            MapEvent::ReloadRequested => "reloadrequested",
            MapEvent::ZoomChanged { .. } => "zoomchanged",
            MapEvent::LayerAdd { .. } => "layeradd",
            MapEvent::LayerRemove { .. } => "layerremove",
            MapEvent::SelectionChanged { .. } => "selectionchanged",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popup_ancestry() {
        let event = PointerEvent::click(Point::new(10.0, 10.0))
            .with_target_classes(["copy-button", "ol-popup", "ol-overlay-container"]);
        assert!(event.originates_in("ol-popup"));
        assert!(!PointerEvent::click(Point::new(0.0, 0.0)).originates_in("ol-popup"));
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let value = serde_json::to_value(MapEvent::ZoomChanged { zoom: 12.0 }).unwrap();
        assert_eq!(value["type"], "zoomChanged");
        assert_eq!(value["zoom"], 12.0);
        assert_eq!(MapEvent::ReloadRequested.event_type(), "reloadrequested");
    }
}
