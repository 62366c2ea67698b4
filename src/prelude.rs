//! Prelude module for common slippymap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use slippymap::prelude::*;`

pub use crate::core::{
    config::{MapConfig, MapPreset},
    geo::{GeoPoint, Point, ScreenRect, TileAddress},
    gps::GpsState,
    map::Map,
    viewport::Viewport,
};

pub use crate::layers::{
    base::{layer_handle, Layer, LayerHandle, MapView},
    gps::{DefaultGpsPainter, GpsPainter, GpsPointStyle},
    image::{ImageHandle, OverlayImage},
    manager::LayerManager,
    osd::OsdLayer,
    track::{Track, TrackLayer},
};

pub use crate::input::{
    events::{
        ButtonEvent, EventHandled, InputEvent, KeyModifiers, MapEvent, MapEventKind, MapProperty,
        MotionEvent, MouseButton, ScrollDirection,
    },
    handler::{Action, InteractionState, MapKey},
};

pub use crate::rendering::{
    context::{Color, DrawCommand, RenderContext},
    pipeline::{FrameOutcome, SkipReason},
};

pub use crate::tiles::{
    cache::MemoryTileCache,
    source::{TileImage, TileProvider},
};

pub use crate::traits::{Configurable, HostWindow, NullHost};

pub use crate::{MapError, Result};

// Re-export commonly used external types
pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
