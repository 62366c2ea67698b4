//! Core constants derived from the OpenStreetMap slippy-map conventions.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Equatorial earth radius in meters (WGS84).
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude (degrees) where the Mercator projection is cut off.
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;

/// Smallest zoom level any configuration may ask for.
pub const MIN_ZOOM: i32 = 0;

/// Largest zoom level any configuration may ask for.
pub const MAX_ZOOM: i32 = 20;

/// Default lower zoom bound of a freshly created map.
pub const DEFAULT_MIN_ZOOM: i32 = 1;

/// Default upper zoom bound of a freshly created map.
pub const DEFAULT_MAX_ZOOM: i32 = 18;

/// Zoom level a freshly created map starts at.
pub const DEFAULT_ZOOM: i32 = 3;

/// Keyboard panning moves the map by `width / SCROLL_STEP_DIVISOR` pixels.
pub const SCROLL_STEP_DIVISOR: f64 = 10.0;

/// Pixels the pointer must travel with the button held before a press becomes a drag.
pub const DEFAULT_DRAG_LIMIT: u32 = 10;

/// Fraction of the viewport (centered) the GPS point may wander in before auto-centering.
pub const DEFAULT_AUTO_CENTER_THRESHOLD: f64 = 0.25;

/// Default radius of the solid GPS ball.
pub const DEFAULT_GPS_POINT_INNER_RADIUS: u32 = 10;

/// Default radius of the translucent GPS accuracy disc.
pub const DEFAULT_GPS_POINT_OUTER_RADIUS: u32 = 20;
