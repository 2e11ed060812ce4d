use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::core::constants::TILE_SIZE;

/// Web Mercator latitude limit
const MAX_LATITUDE: f64 = 85.0511287798;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are finite and within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }

    /// Clamps latitude to the range Web Mercator can represent
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Projects to world pixel coordinates at the given zoom level.
    ///
    /// At zoom 0 the whole world is one `TILE_SIZE` square; y grows southwards.
    pub fn to_world_pixel(&self, zoom: f64) -> Point {
        let scale = TILE_SIZE as f64 * 2_f64.powf(zoom);
        let lat_rad = Self::clamp_lat(self.lat).to_radians();
        let x = (self.lng + 180.0) / 360.0 * scale;
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * scale;
        Point::new(x, y)
    }

    /// Inverse of [`LatLng::to_world_pixel`]
    pub fn from_world_pixel(point: Point, zoom: f64) -> Self {
        let scale = TILE_SIZE as f64 * 2_f64.powf(zoom);
        let lng = point.x / scale * 360.0 - 180.0;
        let n = PI * (1.0 - 2.0 * point.y / scale);
        let lat = n.sinh().atan().to_degrees();
        Self::new(lat, lng)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a point in screen or projected pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a bounding box of geographical coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    /// Smallest bounds containing every point, `None` for an empty iterator
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LatLng>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self::new(first, first);
        for point in points {
            bounds.extend(&point);
        }
        Some(bounds)
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    /// True when the bounds collapse to a single coordinate
    pub fn is_point(&self) -> bool {
        self.south_west == self.north_east
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_validity() {
        assert!(LatLng::new(37.5, 127.04).is_valid());
        assert!(!LatLng::new(95.0, 127.04).is_valid());
        assert!(!LatLng::new(f64::NAN, 127.04).is_valid());
        assert!(!LatLng::new(37.5, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_world_pixel_projection() {
        let origin = LatLng::new(0.0, 0.0).to_world_pixel(0.0);
        assert!((origin.x - 128.0).abs() < 1e-9);
        assert!((origin.y - 128.0).abs() < 1e-9);

        let seoul = LatLng::new(37.5, 127.04);
        let back = LatLng::from_world_pixel(seoul.to_world_pixel(12.0), 12.0);
        assert!((back.lat - seoul.lat).abs() < 1e-9);
        assert!((back.lng - seoul.lng).abs() < 1e-9);
    }

    #[test]
    fn test_projection_doubles_per_zoom() {
        let a = LatLng::new(37.50, 127.04).to_world_pixel(10.0);
        let b = LatLng::new(37.50, 127.04).to_world_pixel(11.0);
        assert!((b.x - a.x * 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_bounds_from_points() {
        let bounds = LatLngBounds::from_points(vec![
            LatLng::new(37.50, 127.04),
            LatLng::new(37.52, 126.92),
        ])
        .unwrap();

        assert_eq!(bounds.south_west, LatLng::new(37.50, 126.92));
        assert_eq!(bounds.north_east, LatLng::new(37.52, 127.04));
        assert!(bounds.contains(&LatLng::new(37.51, 127.0)));
        assert!(LatLngBounds::from_points(Vec::new()).is_none());
    }
}
