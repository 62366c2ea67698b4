use std::rc::Rc;

use crate::{
    input::{
        events::{ButtonEvent, EventHandled},
        handler::Action,
    },
    layers::base::{LayerHandle, MapView},
    rendering::context::RenderContext,
};

/// Layers in registration order. The first registered layer is drawn first
/// and is offered button presses first.
#[derive(Default)]
pub struct LayerManager {
    layers: Vec<LayerHandle>,
}

fn same_layer(a: &LayerHandle, b: &LayerHandle) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

impl LayerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer. Adding a layer that is already registered does nothing.
    pub fn add_layer(&mut self, layer: LayerHandle) -> bool {
        if self.contains(&layer) {
            return false;
        }
        self.layers.push(layer);
        true
    }

    /// Returns `false` when the layer is not registered.
    pub fn remove_layer(&mut self, layer: &LayerHandle) -> bool {
        let before = self.layers.len();
        self.layers.retain(|existing| !same_layer(existing, layer));
        self.layers.len() != before
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }

    pub fn contains(&self, layer: &LayerHandle) -> bool {
        self.layers.iter().any(|existing| same_layer(existing, layer))
    }

    /// Gets all layers in render order
    pub fn layers(&self) -> &[LayerHandle] {
        &self.layers
    }

    /// True if any layer reports itself busy. A layer that is currently
    /// borrowed elsewhere counts as busy.
    pub fn any_busy(&self) -> bool {
        self.layers.iter().any(|layer| match layer.try_borrow() {
            Ok(layer) => layer.is_busy(),
            Err(_) => true,
        })
    }

    /// Runs every layer's render step. Failures are logged and skipped.
    pub fn render_all(&self, view: &MapView<'_>) {
        for layer in &self.layers {
            let Ok(mut layer) = layer.try_borrow_mut() else {
                log::warn!("layer busy elsewhere, render skipped");
                continue;
            };
            if let Err(err) = layer.render(view) {
                log::warn!("layer '{}' failed to render: {}", layer.name(), err);
            }
        }
    }

    /// Runs every layer's draw step on top of `frame`.
    pub fn draw_all(&self, view: &MapView<'_>, frame: &mut RenderContext) {
        for layer in &self.layers {
            let Ok(mut layer) = layer.try_borrow_mut() else {
                log::warn!("layer busy elsewhere, draw skipped");
                continue;
            };
            if let Err(err) = layer.draw(view, frame) {
                log::warn!("layer '{}' failed to draw: {}", layer.name(), err);
            }
        }
    }

    /// Offers a press to each layer in order until one claims it.
    pub fn dispatch_button_press(
        &self,
        event: &ButtonEvent,
        view: &MapView<'_>,
        actions: &mut Vec<Action>,
    ) -> EventHandled {
        for layer in &self.layers {
            let Ok(mut layer) = layer.try_borrow_mut() else {
                continue;
            };
            if layer.on_button_press(event, view, actions) == EventHandled::Handled {
                log::debug!("button press claimed by layer '{}'", layer.name());
                return EventHandled::Handled;
            }
        }
        EventHandled::NotHandled
    }

    /// Gets the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Checks if the manager is empty
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{geo::Point, gps::GpsState, viewport::Viewport},
        input::events::{KeyModifiers, MouseButton},
        layers::base::{layer_handle, Layer},
        MapError, Result,
    };

    #[derive(Default)]
    struct Probe {
        claims: bool,
        busy: bool,
        fails: bool,
        renders: usize,
    }

    impl Layer for Probe {
        fn render(&mut self, _view: &MapView<'_>) -> Result<()> {
            self.renders += 1;
            if self.fails {
                return Err(MapError::Layer("broken".into()));
            }
            Ok(())
        }

        fn on_button_press(
            &mut self,
            _event: &ButtonEvent,
            _view: &MapView<'_>,
            actions: &mut Vec<Action>,
        ) -> EventHandled {
            if self.claims {
                actions.push(Action::ZoomIn);
                EventHandled::Handled
            } else {
                EventHandled::NotHandled
            }
        }

        fn is_busy(&self) -> bool {
            self.busy
        }

        crate::impl_layer_any!();
    }

    fn view_fixture() -> (Viewport, GpsState) {
        (Viewport::default(), GpsState::new())
    }

    fn press() -> ButtonEvent {
        ButtonEvent::new(Point::new(1.0, 1.0), MouseButton::Left, KeyModifiers::default())
    }

    #[test]
    fn test_add_remove_preserves_order() {
        let mut manager = LayerManager::new();
        let a = layer_handle(Probe::default());
        let b = layer_handle(Probe::default());
        assert!(manager.add_layer(a.clone()));
        assert!(manager.add_layer(b.clone()));
        assert!(!manager.add_layer(a.clone()));
        assert!(same_layer(&manager.layers()[0], &a));

        assert!(manager.remove_layer(&a));
        assert!(!manager.remove_layer(&a));
        assert_eq!(manager.len(), 1);
        assert!(same_layer(&manager.layers()[0], &b));
    }

    #[test]
    fn test_first_claiming_layer_wins() {
        let (viewport, gps) = view_fixture();
        let view = MapView {
            viewport: &viewport,
            gps: &gps,
            redraw_cycle: 0,
            drag_offset: Point::default(),
        };
        let mut manager = LayerManager::new();
        let passive = layer_handle(Probe::default());
        let first = layer_handle(Probe {
            claims: true,
            ..Probe::default()
        });
        let second = layer_handle(Probe {
            claims: true,
            ..Probe::default()
        });
        manager.add_layer(passive);
        manager.add_layer(first);
        manager.add_layer(second);

        let mut actions = Vec::new();
        assert_eq!(
            manager.dispatch_button_press(&press(), &view, &mut actions),
            EventHandled::Handled
        );
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn test_busy_and_failing_layers() {
        let (viewport, gps) = view_fixture();
        let view = MapView {
            viewport: &viewport,
            gps: &gps,
            redraw_cycle: 0,
            drag_offset: Point::default(),
        };
        let mut manager = LayerManager::new();
        let failing = layer_handle(Probe {
            fails: true,
            ..Probe::default()
        });
        let healthy = layer_handle(Probe::default());
        manager.add_layer(failing.clone());
        manager.add_layer(healthy.clone());
        assert!(!manager.any_busy());

        manager.render_all(&view);
        let renders = |layer: &LayerHandle| {
            layer.borrow().as_any().downcast_ref::<Probe>().map(|p| p.renders)
        };
        assert_eq!(renders(&failing), Some(1));
        assert_eq!(renders(&healthy), Some(1));

        manager.add_layer(layer_handle(Probe {
            busy: true,
            ..Probe::default()
        }));
        assert!(manager.any_busy());
    }
}
