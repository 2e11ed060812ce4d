use crate::{
    core::{
        config::{InteractionConfig, MarkerConfig},
        geo::LatLngBounds,
        map::{Map, MapCursor},
    },
    data::model::LocationGroup,
    input::events::PointerEvent,
    layers::feature::RenderedFeature,
    prelude::Duration,
    traits::Configurable,
    MapError, Result,
};

/// Viewport fit the map should animate to
#[derive(Debug, Clone, PartialEq)]
pub struct FitRequest {
    pub extent: LatLngBounds,
    pub max_zoom: f64,
    pub padding: f64,
    pub duration: Duration,
}

/// Outcome of a click on the map
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// Select a group, or clear the selection with `None`
    Select(Option<LocationGroup>),
    /// Drill into a cluster; the selection is left untouched
    ZoomToExtent(FitRequest),
    /// The click belongs to an overlay and is not the map's business
    Ignored,
}

/// Maps pointer events on rendered features back to domain objects
#[derive(Debug, Clone)]
pub struct InteractionResolver {
    config: InteractionConfig,
    zoom_threshold: f64,
}

impl InteractionResolver {
    pub fn new(config: &MarkerConfig) -> Self {
        Self {
            config: config.interaction.clone(),
            zoom_threshold: config.clustering.zoom_threshold,
        }
    }

    pub fn resolve_click(&self, event: &PointerEvent, map: &Map) -> Interaction {
        if event.originates_in(&self.config.popup_class) {
            log::debug!("click inside popup ignored");
            return Interaction::Ignored;
        }

        match map.hit_test(event.pixel, self.config.hit_tolerance_px) {
            None => Interaction::Select(None),
            Some(RenderedFeature::Group(marker)) => Interaction::Select(Some(marker.group.clone())),
            Some(RenderedFeature::Cluster(cluster)) => match cluster.members.as_slice() {
                [] => Interaction::Select(None),
                [only] => Interaction::Select(Some(only.clone())),
                members if map.zoom() <= self.zoom_threshold => {
                    log::debug!(
                        "zooming into cluster {} of {} groups",
                        cluster.id,
                        members.len()
                    );
                    Interaction::ZoomToExtent(FitRequest {
                        extent: cluster.extent.clone(),
                        max_zoom: self.config.fit_max_zoom,
                        padding: self.config.fit_padding_px,
                        duration: self.config.fit_duration(),
                    })
                }
                members => {
                    // Rebuild to flat markers is still pending
                    log::warn!(
                        "stale cluster {} of {} groups clicked at zoom {}",
                        cluster.id,
                        members.len(),
                        map.zoom()
                    );
                    Interaction::Select(None)
                }
            },
        }
    }

    /// Pointer cursor over any hit-testable feature, default elsewhere
    pub fn resolve_hover(&self, event: &PointerEvent, map: &Map) -> MapCursor {
        match map.hit_test(event.pixel, self.config.hit_tolerance_px) {
            Some(_) => MapCursor::Pointer,
            None => MapCursor::Default,
        }
    }

    pub fn zoom_threshold(&self) -> f64 {
        self.zoom_threshold
    }
}

impl Default for InteractionResolver {
    fn default() -> Self {
        Self::new(&MarkerConfig::default())
    }
}

impl Configurable for InteractionResolver {
    type Config = InteractionConfig;

    fn config(&self) -> &InteractionConfig {
        &self.config
    }

    fn set_config(&mut self, config: InteractionConfig) -> Result<()> {
        Self::validate_config(&config)?;
        self.config = config;
        Ok(())
    }

    fn validate_config(config: &InteractionConfig) -> Result<()> {
        if !(config.hit_tolerance_px >= 0.0) {
            return Err(MapError::Config("hit tolerance must not be negative".to_string()).into());
        }
        if config.popup_class.is_empty() {
            return Err(MapError::Config("popup class must not be empty".to_string()).into());
        }
        Ok(())
    }
}
