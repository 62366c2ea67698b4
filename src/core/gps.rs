use serde::{Deserialize, Serialize};

use crate::core::{
    geo::{GeoPoint, Point, ScreenRect},
    viewport::Viewport,
};

/// Current GPS fix plus the recorded trip.
///
/// The trip history grows without bound while recording is enabled; call
/// [`GpsState::clear_history`] to release it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpsState {
    position: Option<GeoPoint>,
    /// Heading in radians, clockwise from north. `None` hides the direction arrow.
    heading: Option<f64>,
    trip_history: Vec<GeoPoint>,
}

impl GpsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Option<GeoPoint> {
        self.position
    }

    pub fn heading(&self) -> Option<f64> {
        self.heading
    }

    pub fn trip_history(&self) -> &[GeoPoint] {
        &self.trip_history
    }

    /// Stores a new fix. Non-finite headings are treated as "no heading".
    pub fn update(&mut self, position: GeoPoint, heading: Option<f64>, record: bool) {
        self.position = Some(position);
        self.heading = heading.filter(|h| h.is_finite());
        if record {
            self.trip_history.push(position);
        }
    }

    /// Empties the trip history; the current fix is kept.
    pub fn clear_history(&mut self) {
        self.trip_history.clear();
    }
}

/// Decides whether the view must jump to keep `point` visible.
///
/// The point may move freely inside a centered rectangle covering
/// `threshold` of the viewport width and height. Once it leaves it the
/// returned map offset puts the point back in the middle of the screen.
pub fn auto_center_target(viewport: &Viewport, point: &GeoPoint, threshold: f64) -> Option<Point> {
    let width = viewport.width() as f64;
    let height = viewport.height() as f64;
    let center = viewport.screen_center();
    let region = ScreenRect::new(
        center.x - width * threshold / 2.0,
        center.y - height * threshold / 2.0,
        width * threshold,
        height * threshold,
    );

    let world = viewport.world_pixel(point);
    let screen = viewport.world_to_screen(world);
    let inside = screen.x >= region.x
        && screen.x <= region.right()
        && screen.y >= region.y
        && screen.y <= region.bottom();

    if inside {
        None
    } else {
        Some(world.subtract(&center))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_records_only_when_enabled() {
        let mut gps = GpsState::new();
        gps.update(GeoPoint::from_degrees(1.0, 2.0), Some(0.5), false);
        assert!(gps.trip_history().is_empty());
        assert_eq!(gps.heading(), Some(0.5));

        gps.update(GeoPoint::from_degrees(1.5, 2.5), None, true);
        gps.update(GeoPoint::from_degrees(2.0, 3.0), Some(f64::NAN), true);
        assert_eq!(gps.trip_history().len(), 2);
        assert_eq!(gps.heading(), None);
        assert_eq!(gps.position(), Some(GeoPoint::from_degrees(2.0, 3.0)));
    }

    #[test]
    fn test_clear_history_keeps_position() {
        let mut gps = GpsState::new();
        gps.update(GeoPoint::from_degrees(1.0, 2.0), None, true);
        gps.clear_history();
        assert!(gps.trip_history().is_empty());
        assert!(gps.position().is_some());
    }

    #[test]
    fn test_auto_center_ignores_points_near_center() {
        let viewport = Viewport::new(GeoPoint::from_degrees(10.0, 10.0), 10, 1, 18, 800, 800);
        // 50 px east of center, the central region is 200 px wide
        let point = viewport.screen_to_geographic(Point::new(450.0, 400.0));
        assert!(auto_center_target(&viewport, &point, 0.25).is_none());
    }

    #[test]
    fn test_auto_center_recenters_outside_region() {
        let viewport = Viewport::new(GeoPoint::from_degrees(10.0, 10.0), 10, 1, 18, 800, 800);
        let point = viewport.screen_to_geographic(Point::new(700.0, 400.0));
        let offset = auto_center_target(&viewport, &point, 0.25).unwrap();

        let mut moved = viewport.clone();
        moved.set_map_offset(offset);
        let screen = moved.geographic_to_screen(&point);
        assert!((screen.x - 400.0).abs() < 1e-6);
        assert!((screen.y - 400.0).abs() < 1e-6);
    }
}
