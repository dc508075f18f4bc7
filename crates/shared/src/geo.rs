//! Geographic and container-space primitives.
//!
//! The widget never projects coordinates itself; it asks its host. `Viewport`
//! is the plain linear projection used by the demo map surface and by tests:
//! a rectangular container of `width` x `height` pixels centred on `center`,
//! where one pixel spans `degrees_per_px` degrees on both axes.

use serde::{Deserialize, Serialize};

/// Tile edge used to derive the scale of a zoom level (zoom 0 shows 360° of
/// longitude across one tile).
pub const TILE_SIZE_PX: f64 = 256.0;

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 18.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// A point in container (screen) space, y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Degrees covered by one pixel at `zoom`.
pub fn degrees_per_px(zoom: f64) -> f64 {
    360.0 / (TILE_SIZE_PX * 2f64.powf(zoom.clamp(MIN_ZOOM, MAX_ZOOM)))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub degrees_per_px: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(center: LatLng, degrees_per_px: f64, width: f64, height: f64) -> Self {
        Self {
            center,
            degrees_per_px,
            width,
            height,
        }
    }

    pub fn at_zoom(center: LatLng, zoom: f64, width: f64, height: f64) -> Self {
        Self::new(center, degrees_per_px(zoom), width, height)
    }

    pub fn container_point_to_lat_lng(&self, point: Point) -> LatLng {
        let dx = point.x - self.width / 2.0;
        let dy = point.y - self.height / 2.0;
        LatLng::new(
            self.center.lat - dy * self.degrees_per_px,
            self.center.lng + dx * self.degrees_per_px,
        )
    }

    pub fn lat_lng_to_container_point(&self, lat_lng: LatLng) -> Point {
        Point::new(
            self.width / 2.0 + (lat_lng.lng - self.center.lng) / self.degrees_per_px,
            self.height / 2.0 - (lat_lng.lat - self.center.lat) / self.degrees_per_px,
        )
    }

    /// Move the view so content follows a drag of `dx`/`dy` pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.center.lng -= dx * self.degrees_per_px;
        self.center.lat += dy * self.degrees_per_px;
        self.center.lat = self.center.lat.clamp(-90.0, 90.0);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> Viewport {
        Viewport::new(LatLng::new(20.0, 10.0), 0.375, 800.0, 600.0)
    }

    #[test]
    fn test_center_point_maps_to_center() {
        let ll = view().container_point_to_lat_lng(Point::new(400.0, 300.0));
        assert_eq!(ll, LatLng::new(20.0, 10.0));
    }

    #[test]
    fn test_point_above_center_has_higher_lat() {
        let ll = view().container_point_to_lat_lng(Point::new(400.0, 292.0));
        assert_eq!(ll.lat, 23.0);
        assert_eq!(ll.lng, 10.0);
    }

    #[test]
    fn test_projection_roundtrip() {
        let v = view();
        let p = v.lat_lng_to_container_point(LatLng::new(12.5, -3.25));
        let back = v.container_point_to_lat_lng(p);
        assert!((back.lat - 12.5).abs() < 1e-9);
        assert!((back.lng + 3.25).abs() < 1e-9);
    }

    #[test]
    fn test_pan_moves_center_against_drag() {
        let mut v = view();
        v.pan_by(8.0, -8.0);
        assert!((v.center.lng - 7.0).abs() < 1e-9);
        assert!((v.center.lat - 17.0).abs() < 1e-9);
    }

    #[test]
    fn test_degrees_per_px_zoom0() {
        assert!((degrees_per_px(0.0) - 360.0 / 256.0).abs() < 1e-12);
        assert!((degrees_per_px(1.0) - 180.0 / 256.0).abs() < 1e-12);
    }

    #[test]
    fn test_degrees_per_px_clamps_zoom() {
        assert_eq!(degrees_per_px(-4.0), degrees_per_px(MIN_ZOOM));
        assert_eq!(degrees_per_px(99.0), degrees_per_px(MAX_ZOOM));
    }
}
