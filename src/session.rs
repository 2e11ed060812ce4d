//! End-to-end wiring of one interactive map.
//!
//! The dataset manager and the map publish on one shared [`EventBus`]; the
//! session holds the only data subscription and feeds what it receives into
//! the marker controller. Dropping the session drops the subscription.

use crate::{
    controller::{MarkerController, SyncReport},
    core::{
        config::MarkerConfig,
        geo::{LatLng, Point},
        map::Map,
        viewport::Viewport,
    },
    data::{
        grouping::group_locations_by_coordinates,
        model::{LocationGroup, TaggedLocation},
    },
    dataset::manager::DatasetManager,
    input::{
        events::{MapEvent, PointerEvent, PointerKind},
        handler::{EventBus, Subscription},
        interaction::{Interaction, InteractionResolver},
    },
    prelude::Instant,
};

pub struct MapSession {
    datasets: DatasetManager,
    map: Map,
    controller: MarkerController,
    resolver: InteractionResolver,
    subscription: Subscription,
    selection: Option<LocationGroup>,
}

impl MapSession {
    pub fn new(config: MarkerConfig, center: LatLng, zoom: f64, size: Point) -> Self {
        let events = EventBus::new();
        let subscription = events.subscribe();
        let map = Map::with_events(Viewport::new(center, zoom, size), events.clone());
        let controller = MarkerController::new(config.clone(), map.zoom());

        Self {
            datasets: DatasetManager::with_events(events),
            resolver: InteractionResolver::new(&config),
            map,
            controller,
            subscription,
            selection: None,
        }
    }

    /// Feeds pending bus events into the controller, then runs the
    /// debounced sync if it is due.
    pub fn pump(&mut self, now: Instant) -> Option<SyncReport> {
        self.drain_events(now);
        self.controller.poll(&mut self.map, now)
    }

    /// Applies everything pending immediately, skipping the debounce delay
    pub fn flush(&mut self) -> SyncReport {
        self.drain_events(Instant::now());
        self.controller.flush(&mut self.map)
    }

    /// Handles queued events until none are left, including any published
    /// while handling them
    fn drain_events(&mut self, now: Instant) {
        loop {
            let events = self.subscription.drain();
            if events.is_empty() {
                break;
            }
            for event in events {
                self.handle_event(event, now);
            }
        }
    }

    fn handle_event(&mut self, event: MapEvent, now: Instant) {
        match event {
            MapEvent::LocationDataUpdated { locations } => {
                self.refresh_selection(&locations);
                self.controller.set_locations(locations, now);
            }
            MapEvent::ZoomChanged { zoom } => self.controller.set_zoom(zoom, now),
            MapEvent::ReloadRequested => self.datasets.reload(),
            MapEvent::LayerAdd { .. }
            | MapEvent::LayerRemove { .. }
            | MapEvent::SelectionChanged { .. } => {}
        }
    }

    /// Dispatches a pointer event: clicks resolve and apply an interaction,
    /// moves update the cursor.
    pub fn pointer(&mut self, event: &PointerEvent) -> Interaction {
        match event.kind {
            PointerKind::Click => {
                let interaction = self.resolver.resolve_click(event, &self.map);
                self.apply(&interaction);
                interaction
            }
            PointerKind::Move => {
                let cursor = self.resolver.resolve_hover(event, &self.map);
                self.map.set_cursor(cursor);
                Interaction::Ignored
            }
        }
    }

    pub fn click(&mut self, pixel: Point) -> Interaction {
        self.pointer(&PointerEvent::click(pixel))
    }

    pub fn hover(&mut self, pixel: Point) {
        self.pointer(&PointerEvent::moved(pixel));
    }

    fn apply(&mut self, interaction: &Interaction) {
        match interaction {
            Interaction::Select(group) => self.select(group.clone()),
            Interaction::ZoomToExtent(request) => {
                self.map.fit_extent(request);
            }
            Interaction::Ignored => {}
        }
    }

    /// Re-derives the selected group from a new location list: units of
    /// datasets that left are dropped, new units at the same coordinate
    /// join, and the selection clears once nothing is left there.
    fn refresh_selection(&mut self, locations: &[TaggedLocation]) {
        let Some(selected_id) = self.selection.as_ref().map(|g| g.id.clone()) else {
            return;
        };
        let refreshed = group_locations_by_coordinates(locations)
            .into_iter()
            .find(|group| group.id == selected_id);
        self.select(refreshed);
    }

    fn select(&mut self, group: Option<LocationGroup>) {
        if self.selection == group {
            return;
        }
        log::debug!(
            "selection -> {}",
            group.as_ref().map(|g| g.name.as_str()).unwrap_or("none")
        );
        self.selection = group.clone();
        self.map
            .events()
            .publish(MapEvent::SelectionChanged { group });
    }

    /// Zoom is re-evaluated on the next due [`pump`](Self::pump)
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.map.set_zoom(zoom)
    }

    /// Restyles flat markers in place
    pub fn set_show_labels(&mut self, show_labels: bool) -> usize {
        self.controller.set_show_labels(show_labels, &mut self.map)
    }

    pub fn selection(&self) -> Option<&LocationGroup> {
        self.selection.as_ref()
    }

    pub fn datasets(&self) -> &DatasetManager {
        &self.datasets
    }

    pub fn datasets_mut(&mut self) -> &mut DatasetManager {
        &mut self.datasets
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    pub fn controller(&self) -> &MarkerController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut MarkerController {
        &mut self.controller
    }

    pub fn resolver(&self) -> &InteractionResolver {
        &self.resolver
    }
}
