//! Shared trait abstractions
//!
//! The widget never talks to a windowing toolkit directly. Everything it
//! needs from the embedding application goes through [`HostWindow`].

use crate::{core::geo::ScreenRect, Result};

/// Outbound interface to the windowing toolkit hosting the map.
///
/// All methods take `&self`: hosts are shared between the widget and its
/// scheduler and are expected to use interior mutability when they record
/// requests.
pub trait HostWindow {
    /// Ask the event loop to call [`crate::Map::run_idle`] once it is idle.
    /// Calling it again before the idle slot runs must not queue a second slot.
    fn schedule_idle(&self);

    /// Request a repaint of the whole widget area.
    fn queue_draw(&self);

    /// Request a repaint of part of the widget area, in screen pixels.
    fn queue_draw_area(&self, area: ScreenRect) {
        let _ = area;
        self.queue_draw();
    }

    /// Switch the top-level window in or out of fullscreen.
    fn set_fullscreen(&self, fullscreen: bool) {
        let _ = fullscreen;
    }
}

/// Host used until the application attaches a real one. Every request is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl HostWindow for NullHost {
    fn schedule_idle(&self) {}

    fn queue_draw(&self) {}
}

/// Trait for configurable components
pub trait Configurable {
    type Config: Clone;

    /// Get the current configuration
    fn config(&self) -> &Self::Config;

    /// Set new configuration
    fn set_config(&mut self, config: Self::Config) -> Result<()>;

    /// Update configuration with a partial change
    fn update_config<F>(&mut self, updater: F) -> Result<()>
    where
        F: FnOnce(&mut Self::Config),
    {
        let mut config = self.config().clone();
        updater(&mut config);
        self.set_config(config)
    }
}
