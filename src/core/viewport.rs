use crate::core::{
    constants::{MAX_ZOOM, MIN_ZOOM},
    geo::{LatLng, LatLngBounds, Point},
};
use serde::{Deserialize, Serialize};

/// Manages the current view of the map: center, zoom, and screen dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Viewport {
    /// Creates a new viewport
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            size,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.center = LatLng::new(LatLng::clamp_lat(center.lat), center.lng.clamp(-180.0, 180.0));
    }

    /// Sets the zoom level, clamping to valid range. Returns the applied zoom.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.zoom
    }

    /// Projects a LatLng to world pixel coordinates at the given zoom level
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        lat_lng.to_world_pixel(zoom.unwrap_or(self.zoom))
    }

    pub fn unproject(&self, pixel: &Point, zoom: Option<f64>) -> LatLng {
        LatLng::from_world_pixel(*pixel, zoom.unwrap_or(self.zoom))
    }

    /// Converts a geographical coordinate to screen pixel coordinates (container relative)
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        let origin = self.project(&self.center, None);
        let point = self.project(lat_lng, None).subtract(&origin);
        Point::new(point.x + self.size.x / 2.0, point.y + self.size.y / 2.0)
    }

    /// Converts screen pixel coordinates back to geographical coordinates
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let origin = self.project(&self.center, None);
        let world = Point::new(
            pixel.x - self.size.x / 2.0 + origin.x,
            pixel.y - self.size.y / 2.0 + origin.y,
        );
        self.unproject(&world, None)
    }

    /// Gets the current viewport bounds in geographical coordinates
    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.pixel_to_lat_lng(&Point::new(0.0, 0.0));
        let se = self.pixel_to_lat_lng(&Point::new(self.size.x, self.size.y));

        LatLngBounds::new(LatLng::new(se.lat, nw.lng), LatLng::new(nw.lat, se.lng))
    }

    /// Finds the view that fits `bounds` inside the viewport minus `padding`
    /// on every side, never exceeding `max_zoom`.
    ///
    /// Returns the target `(center, zoom)` without applying it; a degenerate
    /// (single point) extent resolves straight to `max_zoom`.
    pub fn fit_view(&self, bounds: &LatLngBounds, padding: f64, max_zoom: f64) -> (LatLng, f64) {
        let center = bounds.center();
        let ceiling = max_zoom.clamp(self.min_zoom, self.max_zoom);

        if bounds.is_point() {
            return (center, ceiling);
        }

        let available = Point::new(
            (self.size.x - 2.0 * padding).max(1.0),
            (self.size.y - 2.0 * padding).max(1.0),
        );

        // Project bounds to pixels at each integer zoom to find the best fit
        let mut best_zoom = self.min_zoom;
        for test_zoom in (self.min_zoom as i32)..=(ceiling.floor() as i32) {
            let zoom = test_zoom as f64;

            let nw = self.project(
                &LatLng::new(bounds.north_east.lat, bounds.south_west.lng),
                Some(zoom),
            );
            let se = self.project(
                &LatLng::new(bounds.south_west.lat, bounds.north_east.lng),
                Some(zoom),
            );

            if (se.x - nw.x).abs() <= available.x && (se.y - nw.y).abs() <= available.y {
                best_zoom = zoom;
            } else {
                break;
            }
        }

        (center, best_zoom.min(ceiling))
    }

    /// Applies [`Viewport::fit_view`] and returns the resulting zoom
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds, padding: f64, max_zoom: f64) -> f64 {
        let (center, zoom) = self.fit_view(bounds, padding, max_zoom);
        log::debug!(
            "fitting view to ({:.5}, {:.5}) at zoom {}",
            center.lat,
            center.lng,
            zoom
        );
        self.set_center(center);
        self.set_zoom(zoom)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_creation() {
        let viewport = Viewport::new(LatLng::new(37.5, 127.0), 10.0, Point::new(800.0, 600.0));

        assert_eq!(viewport.zoom, 10.0);
        assert_eq!(viewport.center.lat, 37.5);
        assert_eq!(viewport.size.x, 800.0);
    }

    #[test]
    fn test_coordinate_conversion() {
        let viewport = Viewport::new(LatLng::new(37.5, 127.0), 12.0, Point::new(512.0, 512.0));

        let center_pixel = viewport.lat_lng_to_pixel(&LatLng::new(37.5, 127.0));
        assert!((center_pixel.x - 256.0).abs() < 1e-6);
        assert!((center_pixel.y - 256.0).abs() < 1e-6);

        let back = viewport.pixel_to_lat_lng(&Point::new(100.0, 400.0));
        let again = viewport.lat_lng_to_pixel(&back);
        assert!((again.x - 100.0).abs() < 1e-6);
        assert!((again.y - 400.0).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_limits() {
        let mut viewport = Viewport::default();

        assert_eq!(viewport.set_zoom(-1.0), MIN_ZOOM);
        assert_eq!(viewport.set_zoom(25.0), MAX_ZOOM);
        assert_eq!(Viewport::new(LatLng::default(), 30.0, Point::default()).zoom, MAX_ZOOM);
    }

    #[test]
    fn test_fit_view_respects_max_zoom() {
        let viewport = Viewport::new(LatLng::new(37.5, 127.0), 9.0, Point::new(800.0, 600.0));

        let tiny = LatLngBounds::from_coords(37.5000, 127.0000, 37.5001, 127.0001);
        let (_, zoom) = viewport.fit_view(&tiny, 100.0, 14.0);
        assert_eq!(zoom, 14.0);

        let point = LatLngBounds::from_coords(37.5, 127.0, 37.5, 127.0);
        assert_eq!(viewport.fit_view(&point, 100.0, 14.0).1, 14.0);
    }

    #[test]
    fn test_fit_bounds_contains_extent() {
        let mut viewport = Viewport::new(LatLng::new(0.0, 0.0), 3.0, Point::new(800.0, 600.0));
        let extent = LatLngBounds::from_coords(37.40, 126.80, 37.70, 127.20);

        let zoom = viewport.fit_bounds(&extent, 100.0, 14.0);

        assert!(zoom < 14.0);
        assert!((viewport.center.lat - 37.55).abs() < 1e-9);
        let sw = viewport.lat_lng_to_pixel(&extent.south_west);
        let ne = viewport.lat_lng_to_pixel(&extent.north_east);
        assert!(sw.x >= 100.0 - 1e-6 && ne.x <= 700.0 + 1e-6);
        assert!(ne.y >= 100.0 - 1e-6 && sw.y <= 500.0 + 1e-6);
    }
}
