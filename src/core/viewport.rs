use serde::{Deserialize, Serialize};

use crate::core::{
    geo::{GeoPoint, Point},
    projection::{lat2pixel, lon2pixel, pixel2lat, pixel2lon, project, scale_at_point},
};

/// Manages the current view of the map: zoom, pixel offset, geographic
/// center and screen dimensions.
///
/// The pixel offset (`map_offset`, the world pixel under the top-left screen
/// corner) and the geographic center always describe the same view. Every
/// mutator updates both before returning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    zoom: i32,
    min_zoom: i32,
    max_zoom: i32,
    /// World pixel coordinate of the top-left screen corner
    map_offset: Point,
    /// Geographic center of the screen
    center: GeoPoint,
    width: u32,
    height: u32,
}

impl Viewport {
    /// Creates a new viewport. `zoom` is clamped into `[min_zoom, max_zoom]`.
    pub fn new(
        center: GeoPoint,
        zoom: i32,
        min_zoom: i32,
        max_zoom: i32,
        width: u32,
        height: u32,
    ) -> Self {
        let (min_zoom, max_zoom) = (min_zoom.min(max_zoom), max_zoom.max(min_zoom));
        let mut viewport = Self {
            zoom: zoom.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
            map_offset: Point::default(),
            center: Self::representable(center),
            width,
            height,
        };
        viewport.update_offset_from_center();
        viewport
    }

    pub fn zoom(&self) -> i32 {
        self.zoom
    }

    pub fn min_zoom(&self) -> i32 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> i32 {
        self.max_zoom
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn map_offset(&self) -> Point {
        self.map_offset
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Screen coordinates of the viewport center
    pub fn screen_center(&self) -> Point {
        Point::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Sets the zoom limits; the current zoom is pulled into range, keeping the center.
    pub fn set_zoom_limits(&mut self, min_zoom: i32, max_zoom: i32) -> bool {
        self.min_zoom = min_zoom.min(max_zoom);
        self.max_zoom = max_zoom.max(min_zoom);
        self.set_zoom(self.zoom)
    }

    /// Moves the center and recomputes the pixel offset at the current zoom.
    /// Latitudes past the Mercator cut-off are clamped to it.
    pub fn set_center(&mut self, center: GeoPoint) {
        self.center = Self::representable(center);
        self.update_offset_from_center();
    }

    /// Changes the zoom level keeping the geographic center fixed.
    /// Returns `false` (and changes nothing) when the clamped level equals the current one.
    pub fn set_zoom(&mut self, zoom: i32) -> bool {
        let zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if zoom == self.zoom {
            return false;
        }
        self.zoom = zoom;
        self.update_offset_from_center();
        true
    }

    /// Changes the zoom level keeping the geographic point under `anchor`
    /// (screen pixels) under the same screen pixel.
    pub fn zoom_at(&mut self, anchor: Point, zoom: i32) -> bool {
        let zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if zoom == self.zoom {
            return false;
        }
        let target = self.screen_to_geographic(anchor);
        self.zoom = zoom;
        let world = project(zoom, target.rlat, target.rlon);
        self.set_map_offset(world.subtract(&anchor));
        true
    }

    /// Places the top-left screen corner at world pixel `offset` and derives the center from it.
    pub fn set_map_offset(&mut self, offset: Point) {
        self.map_offset = offset;
        self.update_center_from_offset();
    }

    /// Scrolls by `dx`, `dy` pixels (positive moves the view east/south).
    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.set_map_offset(self.map_offset.add(&Point::new(dx, dy)));
    }

    /// Adopts a new screen size. The stored geographic center stays centered.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.update_offset_from_center();
    }

    /// Top-left and bottom-right corners of the visible area.
    pub fn bounding_box(&self) -> (GeoPoint, GeoPoint) {
        let top_left = GeoPoint::from_radians(
            pixel2lat(self.zoom, self.map_offset.y),
            pixel2lon(self.zoom, self.map_offset.x),
        );
        let bottom_right = GeoPoint::from_radians(
            pixel2lat(self.zoom, self.map_offset.y + self.height as f64),
            pixel2lon(self.zoom, self.map_offset.x + self.width as f64),
        );
        (top_left, bottom_right)
    }

    /// Converts screen pixel coordinates to a geographic point.
    pub fn screen_to_geographic(&self, screen: Point) -> GeoPoint {
        let world = self.map_offset.add(&screen);
        GeoPoint::from_radians(
            pixel2lat(self.zoom, world.y),
            pixel2lon(self.zoom, world.x),
        )
    }

    /// Converts a geographic point to screen pixel coordinates.
    pub fn geographic_to_screen(&self, point: &GeoPoint) -> Point {
        self.world_to_screen(self.world_pixel(point))
    }

    /// World pixel of a geographic point at the current zoom.
    pub fn world_pixel(&self, point: &GeoPoint) -> Point {
        Point::new(lon2pixel(self.zoom, point.rlon), lat2pixel(self.zoom, point.rlat))
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        world.subtract(&self.map_offset)
    }

    /// Meters per pixel at the center of the view.
    pub fn scale(&self) -> f64 {
        scale_at_point(self.zoom, self.center.rlat)
    }

    fn representable(center: GeoPoint) -> GeoPoint {
        GeoPoint::from_radians(center.clamped_rlat(), center.rlon)
    }

    fn update_offset_from_center(&mut self) {
        let world = self.world_pixel(&self.center);
        self.map_offset = world.subtract(&self.screen_center());
    }

    fn update_center_from_offset(&mut self) {
        let world = self.map_offset.add(&self.screen_center());
        self.center = GeoPoint::from_radians(
            pixel2lat(self.zoom, world.y),
            pixel2lon(self.zoom, world.x),
        );
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(GeoPoint::default(), 3, 1, 18, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn christchurch() -> GeoPoint {
        GeoPoint::from_degrees(-43.5326, 172.6362)
    }

    #[test]
    fn test_viewport_creation() {
        let viewport = Viewport::new(christchurch(), 12, 1, 18, 800, 600);
        assert_eq!(viewport.zoom(), 12);
        let center = viewport.screen_to_geographic(Point::new(400.0, 300.0));
        assert_relative_eq!(center.rlat, christchurch().rlat, epsilon = 1e-9);
        assert_relative_eq!(center.rlon, christchurch().rlon, epsilon = 1e-9);
    }

    #[test]
    fn test_polar_center_matches_offset() {
        let mut viewport = Viewport::new(GeoPoint::default(), 6, 1, 18, 800, 600);
        viewport.set_center(GeoPoint::from_degrees(89.0, 0.0));
        let derived = viewport.screen_to_geographic(viewport.screen_center());
        assert_relative_eq!(viewport.center().rlat, derived.rlat, epsilon = 1e-9);
        assert_relative_eq!(viewport.center().lat_degrees(), 85.051_128_779_8, epsilon = 1e-6);

        let south = Viewport::new(GeoPoint::from_degrees(-90.0, 10.0), 6, 1, 18, 800, 600);
        let derived = south.screen_to_geographic(south.screen_center());
        assert_relative_eq!(south.center().rlat, derived.rlat, epsilon = 1e-9);
        assert_relative_eq!(south.center().rlon, derived.rlon, epsilon = 1e-9);
    }

    #[test]
    fn test_zoom_is_clamped_and_idempotent() {
        let mut viewport = Viewport::new(christchurch(), 12, 2, 15, 800, 600);
        assert!(viewport.set_zoom(30));
        assert_eq!(viewport.zoom(), 15);
        assert!(!viewport.set_zoom(15));
        assert!(!viewport.set_zoom(99));
        assert!(viewport.set_zoom(-4));
        assert_eq!(viewport.zoom(), 2);
    }

    #[test]
    fn test_set_zoom_keeps_geographic_center() {
        let mut viewport = Viewport::new(christchurch(), 12, 1, 18, 800, 600);
        viewport.set_zoom(5);
        let center = viewport.screen_to_geographic(viewport.screen_center());
        assert_relative_eq!(center.rlat, christchurch().rlat, epsilon = 1e-9);
        assert_relative_eq!(center.rlon, christchurch().rlon, epsilon = 1e-9);
    }

    #[test]
    fn test_scroll_updates_center() {
        let mut viewport = Viewport::new(GeoPoint::default(), 4, 1, 18, 512, 512);
        let before = viewport.center();
        viewport.scroll_by(64.0, 0.0);
        assert!(viewport.center().rlon > before.rlon);
        assert_relative_eq!(viewport.center().rlat, before.rlat, epsilon = 1e-12);
        viewport.scroll_by(0.0, 64.0);
        assert!(viewport.center().rlat < before.rlat);
    }

    #[test]
    fn test_resize_keeps_center() {
        let mut viewport = Viewport::new(christchurch(), 10, 1, 18, 800, 600);
        viewport.resize(1024, 200);
        let center = viewport.screen_to_geographic(Point::new(512.0, 100.0));
        assert_relative_eq!(center.rlat, christchurch().rlat, epsilon = 1e-9);
        assert_relative_eq!(center.rlon, christchurch().rlon, epsilon = 1e-9);
    }

    #[test]
    fn test_zoom_at_keeps_anchor_fixed() {
        let mut viewport = Viewport::new(christchurch(), 10, 1, 18, 800, 600);
        let anchor = Point::new(650.0, 120.0);
        let target = viewport.screen_to_geographic(anchor);

        assert!(viewport.zoom_at(anchor, 11));
        let after = viewport.geographic_to_screen(&target);
        assert_relative_eq!(after.x, anchor.x, epsilon = 1e-6);
        assert_relative_eq!(after.y, anchor.y, epsilon = 1e-6);

        assert!(viewport.zoom_at(anchor, 9));
        let after = viewport.geographic_to_screen(&target);
        assert_relative_eq!(after.x, anchor.x, epsilon = 1e-6);
        assert_relative_eq!(after.y, anchor.y, epsilon = 1e-6);
    }

    #[test]
    fn test_bounding_box_orientation() {
        let viewport = Viewport::new(christchurch(), 12, 1, 18, 800, 600);
        let (top_left, bottom_right) = viewport.bounding_box();
        assert!(top_left.rlat > bottom_right.rlat);
        assert!(top_left.rlon < bottom_right.rlon);
    }
}
