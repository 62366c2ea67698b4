pub mod base;
pub mod gps;
pub mod image;
pub mod macros;
pub mod manager;
pub mod osd;
pub mod track;

pub use base::{layer_handle, Layer, LayerHandle, MapView};
pub use gps::{DefaultGpsPainter, GpsPainter, GpsPointStyle};
pub use image::{ImageHandle, ImageRegistry, OverlayImage};
pub use manager::LayerManager;
pub use osd::OsdLayer;
pub use track::{Track, TrackLayer};
