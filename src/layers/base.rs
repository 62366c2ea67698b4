use std::{any::Any, cell::RefCell, rc::Rc};

use crate::{
    core::{
        geo::{GeoPoint, Point},
        gps::GpsState,
        viewport::Viewport,
    },
    input::{
        events::{ButtonEvent, EventHandled},
        handler::Action,
    },
    rendering::context::RenderContext,
    Result,
};

/// Shared handle to a layer registered on the map.
pub type LayerHandle = Rc<RefCell<dyn Layer>>;

/// Wraps a layer into a handle suitable for [`crate::Map::add_layer`].
pub fn layer_handle<L: Layer + 'static>(layer: L) -> LayerHandle {
    Rc::new(RefCell::new(layer))
}

/// Read-only view of the map handed to layers.
#[derive(Debug, Clone, Copy)]
pub struct MapView<'a> {
    pub viewport: &'a Viewport,
    pub gps: &'a GpsState,
    /// Incremented on every full redraw
    pub redraw_cycle: u64,
    /// Pixel delta of the pan gesture in progress, zero when not dragging
    pub drag_offset: Point,
}

impl MapView<'_> {
    /// Screen position of a geographic point as currently shown, drag included.
    pub fn geographic_to_screen(&self, point: &GeoPoint) -> Point {
        self.viewport.geographic_to_screen(point).add(&self.drag_offset)
    }

    pub fn width(&self) -> u32 {
        self.viewport.width()
    }

    pub fn height(&self) -> u32 {
        self.viewport.height()
    }
}

/// A pluggable overlay drawn above tiles and images.
///
/// `render` runs during a full redraw and is the place to prepare cached
/// geometry; `draw` runs on every screen paint, including the cheap paints
/// issued while the map is being dragged.
pub trait Layer {
    /// Name used in log messages
    fn name(&self) -> &str {
        "layer"
    }

    fn render(&mut self, _view: &MapView<'_>) -> Result<()> {
        Ok(())
    }

    fn draw(&mut self, _view: &MapView<'_>, _frame: &mut RenderContext) -> Result<()> {
        Ok(())
    }

    /// Offered every button press before the map handles it. Return
    /// [`EventHandled::Handled`] to stop the press from starting a drag;
    /// push actions to have the map execute them.
    fn on_button_press(
        &mut self,
        _event: &ButtonEvent,
        _view: &MapView<'_>,
        _actions: &mut Vec<Action>,
    ) -> EventHandled {
        EventHandled::NotHandled
    }

    /// A busy layer (e.g. mid-animation) suppresses full redraws.
    fn is_busy(&self) -> bool {
        false
    }

    /// Dynamic casting support
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
