//! # slippymap
//!
//! The toolkit-independent core of an embeddable slippy-map widget.
//!
//! It owns the Web-Mercator projection, the viewport, GPS tracking with
//! trip history, overlay images and layers, coalesced redraw scheduling and
//! the pointer/keyboard interaction state machine. Pixels are produced as
//! recorded draw commands; the embedding toolkit supplies the window through
//! [`traits::HostWindow`] and replays the commands.

pub mod core;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod tiles;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::{MapConfig, MapPreset},
    geo::{GeoPoint, Point, ScreenRect, TileAddress},
    gps::GpsState,
    map::Map,
    viewport::Viewport,
};

pub use layers::{
    base::{layer_handle, Layer, LayerHandle, MapView},
    image::{ImageHandle, OverlayImage},
    osd::OsdLayer,
    track::{Track, TrackLayer},
};

pub use input::{
    events::{InputEvent, MapEvent, MapEventKind},
    handler::{InputHandler, MapKey},
};

pub use rendering::{context::RenderContext, pipeline::RenderPipeline};

pub use tiles::{cache::MemoryTileCache, source::TileProvider};

pub use traits::{Configurable, HostWindow, NullHost};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Layer error: {0}")]
    Layer(String),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs `env_logger` as the `log` backend. Safe to call more than once.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
