use crate::{
    core::{
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    input::{
        events::MapEvent,
        handler::{Action, EventBus},
        interaction::FitRequest,
    },
    layers::{base::LayerTrait, feature::RenderedFeature, manager::LayerManager},
    Result,
};

/// Cursor affordance shown over the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapCursor {
    #[default]
    Default,
    Pointer,
}

/// Headless map: the viewport, the shared layer collection and the event
/// bus. Renderers read from it; only the marker controller adds or removes
/// layers.
pub struct Map {
    pub viewport: Viewport,
    layer_manager: LayerManager,
    events: EventBus,
    cursor: MapCursor,
    last_action: Option<Action>,
}

impl Map {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self::with_events(Viewport::new(center, zoom, size), EventBus::new())
    }

    /// Builds a map publishing on an existing bus
    pub fn with_events(viewport: Viewport, events: EventBus) -> Self {
        Self {
            viewport,
            layer_manager: LayerManager::new(),
            events,
            cursor: MapCursor::Default,
            last_action: None,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    /// Sets the zoom level and announces it when it actually changed
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        let old_zoom = self.viewport.zoom;
        let applied = self.viewport.set_zoom(zoom);
        self.last_action = Some(Action::Zoom { level: applied });

        if applied != old_zoom {
            log::debug!("zoom {} -> {}", old_zoom, applied);
            self.events.publish(MapEvent::ZoomChanged { zoom: applied });
        }
        applied
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.viewport.set_center(center);
    }

    /// Fits the view to `request.extent`, never zooming past
    /// `request.max_zoom`, and records the animated action.
    pub fn fit_extent(&mut self, request: &FitRequest) -> f64 {
        let (center, zoom) =
            self.viewport
                .fit_view(&request.extent, request.padding, request.max_zoom);
        self.viewport.set_center(center);
        let applied = self.set_zoom(zoom);

        self.last_action = Some(Action::FitExtent {
            bounds: request.extent.clone(),
            center,
            zoom: applied,
            max_zoom: request.max_zoom,
            padding: request.padding,
            duration: request.duration,
        });
        applied
    }

    /// Fits the view to every feature currently rendered
    pub fn fit_all(&mut self, padding: f64, max_zoom: f64) -> Option<f64> {
        let extent = LatLngBounds::from_points(
            self.layer_manager
                .layers()
                .into_iter()
                .flat_map(|layer| layer.features().iter().map(RenderedFeature::position)),
        )?;
        let (center, zoom) = self.viewport.fit_view(&extent, padding, max_zoom);
        self.viewport.set_center(center);
        Some(self.set_zoom(zoom))
    }

    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        self.layer_manager.add_layer(layer)?;
        self.events.publish(MapEvent::LayerAdd { layer_id });
        Ok(())
    }

    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Box<dyn LayerTrait>> {
        let removed = self.layer_manager.remove_layer(layer_id);
        if removed.is_some() {
            self.events.publish(MapEvent::LayerRemove {
                layer_id: layer_id.to_string(),
            });
        }
        removed
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layer_manager
    }

    pub fn layers_mut(&mut self) -> &mut LayerManager {
        &mut self.layer_manager
    }

    /// Topmost feature within `tolerance` pixels of `pixel`
    pub fn hit_test(&self, pixel: Point, tolerance: f64) -> Option<&RenderedFeature> {
        self.layer_manager.hit_test(&self.viewport, pixel, tolerance)
    }

    /// Screen position of a rendered feature's anchor
    pub fn feature_pixel(&self, feature: &RenderedFeature) -> Point {
        self.viewport.lat_lng_to_pixel(&feature.position())
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn cursor(&self) -> MapCursor {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: MapCursor) {
        self.cursor = cursor;
    }

    pub fn last_action(&self) -> Option<&Action> {
        self.last_action.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn map() -> Map {
        Map::new(LatLng::new(37.5, 127.0), 9.0, Point::new(800.0, 600.0))
    }

    #[test]
    fn test_set_zoom_publishes_change_once() {
        let mut map = map();
        let events = map.events().subscribe();

        assert_eq!(map.set_zoom(12.0), 12.0);
        map.set_zoom(12.0);

        let received = events.drain();
        assert_eq!(received.len(), 1);
        assert!(matches!(received[0], MapEvent::ZoomChanged { zoom } if zoom == 12.0));
    }

    #[test]
    fn test_fit_extent_clamps_and_records_action() {
        let mut map = map();
        let extent = LatLngBounds::from_coords(37.5000, 127.0000, 37.5002, 127.0002);
        let request = FitRequest {
            extent: extent.clone(),
            max_zoom: 14.0,
            padding: 100.0,
            duration: Duration::from_millis(500),
        };

        assert_eq!(map.fit_extent(&request), 14.0);
        assert_eq!(map.zoom(), 14.0);
        match map.last_action() {
            Some(Action::FitExtent {
                bounds, max_zoom, duration, ..
            }) => {
                assert_eq!(bounds, &extent);
                assert_eq!(*max_zoom, 14.0);
                assert_eq!(*duration, Duration::from_millis(500));
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_cursor_defaults() {
        let mut map = map();
        assert_eq!(map.cursor(), MapCursor::Default);
        map.set_cursor(MapCursor::Pointer);
        assert_eq!(map.cursor(), MapCursor::Pointer);
        assert!(map.hit_test(Point::new(400.0, 300.0), 5.0).is_none());
        assert!(map.fit_all(100.0, 14.0).is_none());
    }
}
