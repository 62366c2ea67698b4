//! Coordinate transform between geographic radians and world pixels.
//!
//! World pixel space at zoom `z` is a square `TILE_SIZE * 2^z` pixels wide,
//! origin in the north-west corner (longitude -180°, latitude +85.05°).
//! Every function here is pure and deterministic.

use std::f64::consts::PI;

use crate::core::{
    constants::{EARTH_RADIUS, MAX_LATITUDE, TILE_SIZE},
    geo::{wrap_radians, Point, TileAddress},
};

/// Width (and height) of the world in pixels at `zoom`.
pub fn world_size(zoom: i32) -> f64 {
    TILE_SIZE as f64 * 2_f64.powi(zoom)
}

pub fn deg2rad(deg: f64) -> f64 {
    deg.to_radians()
}

pub fn rad2deg(rad: f64) -> f64 {
    rad.to_degrees()
}

/// Longitude (radians) to world pixel x.
pub fn lon2pixel(zoom: i32, rlon: f64) -> f64 {
    (rlon + PI) * world_size(zoom) / (2.0 * PI)
}

/// Latitude (radians) to world pixel y. Latitudes beyond the Mercator cut-off
/// (±85.0511°) are clamped so the poles map to the top/bottom world edge
/// instead of infinity.
pub fn lat2pixel(zoom: i32, rlat: f64) -> f64 {
    let max = MAX_LATITUDE.to_radians();
    let rlat = if rlat.is_nan() { 0.0 } else { rlat.clamp(-max, max) };
    let lat_m = rlat.sin().atanh();
    let size = world_size(zoom);
    -(lat_m * size) / (2.0 * PI) + size / 2.0
}

/// World pixel x back to longitude (radians).
pub fn pixel2lon(zoom: i32, pixel_x: f64) -> f64 {
    let size = world_size(zoom);
    (pixel_x - size / 2.0) * 2.0 * PI / size
}

/// World pixel y back to latitude (radians).
pub fn pixel2lat(zoom: i32, pixel_y: f64) -> f64 {
    let size = world_size(zoom);
    let lat_m = -(pixel_y - size / 2.0) * 2.0 * PI / size;
    lat_m.tanh().asin()
}

/// Projects a geographic point to world pixels.
pub fn project(zoom: i32, rlat: f64, rlon: f64) -> Point {
    Point::new(lon2pixel(zoom, rlon), lat2pixel(zoom, rlat))
}

/// Meters covered by one pixel at latitude `rlat`.
pub fn scale_at_point(zoom: i32, rlat: f64) -> f64 {
    rlat.cos() * 2.0 * PI * EARTH_RADIUS / world_size(zoom)
}

/// Largest integer zoom in `[min_zoom, max_zoom]` at which the box spanned by
/// the two points fits inside `width` × `height` pixels.
///
/// Longitude differences wrap at ±180°, so a box crossing the antimeridian is
/// measured the short way round. Identical points fit at any zoom and yield
/// `max_zoom`; a box too large for every level yields `min_zoom`.
#[allow(clippy::too_many_arguments)]
pub fn lat_lon_to_zoom(
    height: u32,
    width: u32,
    rlat1: f64,
    rlat2: f64,
    rlon1: f64,
    rlon2: f64,
    min_zoom: i32,
    max_zoom: i32,
) -> i32 {
    let (min_zoom, max_zoom) = if min_zoom <= max_zoom {
        (min_zoom, max_zoom)
    } else {
        (max_zoom, min_zoom)
    };
    let dlon = wrap_radians(rlon2 - rlon1).abs();

    for zoom in (min_zoom..=max_zoom).rev() {
        let box_width = dlon * world_size(zoom) / (2.0 * PI);
        let box_height = (lat2pixel(zoom, rlat1) - lat2pixel(zoom, rlat2)).abs();
        if box_width <= width as f64 && box_height <= height as f64 {
            return zoom;
        }
    }
    min_zoom
}

/// A tile that intersects the drawable area together with where it lands on
/// the backing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleTile {
    pub address: TileAddress,
    /// Top-left corner in surface pixels.
    pub position: Point,
    /// Edge length in surface pixels (`TILE_SIZE << tile_zoom_offset`).
    pub size: f64,
}

/// Enumerates the tiles covering a `width` × `height` area whose top-left
/// corner sits at world pixel `origin`.
///
/// With a non-zero `tile_zoom_offset` tiles are fetched `offset` levels
/// above the map zoom and stretched to cover the same world area. Tile x
/// wraps around the antimeridian; rows outside the world are skipped.
pub fn visible_tiles(
    zoom: i32,
    tile_zoom_offset: i32,
    origin: Point,
    width: f64,
    height: f64,
) -> Vec<VisibleTile> {
    let offset = tile_zoom_offset.clamp(0, zoom.max(0));
    let tile_zoom = (zoom - offset).max(0);
    let tile_size = TILE_SIZE as f64 * 2_f64.powi(offset);
    let tiles = TileAddress::tiles_per_axis(tile_zoom as u8) as i64;

    let first_x = (origin.x / tile_size).floor() as i64;
    let first_y = (origin.y / tile_size).floor() as i64;
    let last_x = ((origin.x + width) / tile_size).ceil() as i64;
    let last_y = ((origin.y + height) / tile_size).ceil() as i64;

    let mut result = Vec::new();
    for ty in first_y..last_y {
        if ty < 0 || ty >= tiles {
            continue;
        }
        for tx in first_x..last_x {
            let wrapped_x = tx.rem_euclid(tiles);
            result.push(VisibleTile {
                address: TileAddress::new(tile_zoom as u8, wrapped_x as u32, ty as u32),
                position: Point::new(
                    tx as f64 * tile_size - origin.x,
                    ty as f64 * tile_size - origin.y,
                ),
                size: tile_size,
            });
        }
    }
    result
}
