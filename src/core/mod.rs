pub mod config;
pub mod constants;
pub mod geo;
pub mod gps;
pub mod map;
pub mod projection;
pub mod viewport;

pub use config::{MapConfig, MapPreset};
pub use geo::{GeoPoint, Point, ScreenRect, TileAddress};
pub use gps::GpsState;
pub use map::Map;
pub use viewport::Viewport;
