use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::core::constants::MAX_LATITUDE;

/// A location on the globe. Stored in radians so the projection never
/// has to convert on the hot path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub rlat: f64,
    pub rlon: f64,
}

impl GeoPoint {
    /// Creates a point from radians. Latitude is clamped to [-π/2, π/2].
    pub fn from_radians(rlat: f64, rlon: f64) -> Self {
        Self {
            rlat: rlat.clamp(-PI / 2.0, PI / 2.0),
            rlon,
        }
    }

    /// Creates a point from degrees. Latitude is clamped to [-90, 90].
    pub fn from_degrees(lat: f64, lon: f64) -> Self {
        Self::from_radians(lat.to_radians(), lon.to_radians())
    }

    pub fn lat_degrees(&self) -> f64 {
        self.rlat.to_degrees()
    }

    pub fn lon_degrees(&self) -> f64 {
        self.rlon.to_degrees()
    }

    /// Returns `(lat, lon)` in degrees.
    pub fn degrees(&self) -> (f64, f64) {
        (self.lat_degrees(), self.lon_degrees())
    }

    /// Longitude folded into [-π, π).
    pub fn wrapped_rlon(&self) -> f64 {
        wrap_radians(self.rlon)
    }

    /// Latitude clamped to the range the Mercator projection can represent.
    pub fn clamped_rlat(&self) -> f64 {
        let max = MAX_LATITUDE.to_radians();
        self.rlat.clamp(-max, max)
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::from_radians(0.0, 0.0)
    }
}

/// Folds an angle in radians into [-π, π).
pub fn wrap_radians(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped.is_finite() {
        wrapped
    } else {
        0.0
    }
}

/// A point in screen, surface or world pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn distance_squared_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        self.distance_squared_to(other).sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Axis aligned rectangle in pixel space, used for dirty regions and hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square of side `2 * half` centered on `center`.
    pub fn around(center: Point, half: f64) -> Self {
        Self::new(center.x - half, center.y - half, half * 2.0, half * 2.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    pub fn union(&self, other: &ScreenRect) -> ScreenRect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        ScreenRect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    pub fn translate(&self, delta: &Point) -> ScreenRect {
        ScreenRect::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }
}

/// Slippy-map tile index. Derived during rendering, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileAddress {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl TileAddress {
    pub fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }

    /// Number of tiles along one axis at this zoom level.
    pub fn tiles_per_axis(zoom: u8) -> u32 {
        1u32 << zoom.min(31)
    }

    /// Checks if the tile exists at its zoom level
    pub fn is_valid(&self) -> bool {
        let max = Self::tiles_per_axis(self.zoom);
        self.x < max && self.y < max
    }
}
