use crate::{
    core::geo::{Point, ScreenRect},
    input::{
        events::{ButtonEvent, EventHandled, MouseButton},
        handler::Action,
    },
    layers::base::{Layer, MapView},
    rendering::context::{Color, LineRenderStyle, PolygonRenderStyle, RenderContext},
    Result,
};

const BUTTON_SIZE: f64 = 24.0;
const BUTTON_GAP: f64 = 6.0;
const CROSSHAIR_ARM: f64 = 10.0;

/// On-screen controls: zoom buttons in a corner and an optional crosshair
/// marking the map center. Both stay fixed on screen while dragging.
#[derive(Debug, Clone)]
pub struct OsdLayer {
    pub margin: f64,
    pub show_zoom: bool,
    pub show_crosshair: bool,
    pub button_fill: Color,
    pub foreground: Color,
}

impl Default for OsdLayer {
    fn default() -> Self {
        Self {
            margin: 10.0,
            show_zoom: true,
            show_crosshair: false,
            button_fill: Color::rgba(255, 255, 255, 200),
            foreground: Color::BLACK,
        }
    }
}

impl OsdLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom_in_rect(&self) -> ScreenRect {
        ScreenRect::new(self.margin, self.margin, BUTTON_SIZE, BUTTON_SIZE)
    }

    pub fn zoom_out_rect(&self) -> ScreenRect {
        ScreenRect::new(
            self.margin,
            self.margin + BUTTON_SIZE + BUTTON_GAP,
            BUTTON_SIZE,
            BUTTON_SIZE,
        )
    }

    fn glyph(&self, frame: &mut RenderContext, rect: ScreenRect, plus: bool) {
        let style = LineRenderStyle {
            color: self.foreground,
            width: 2.0,
            dash_pattern: Vec::new(),
        };
        let center = Point::new(rect.x + rect.width / 2.0, rect.y + rect.height / 2.0);
        let arm = rect.width / 4.0;
        frame.render_line(
            &[Point::new(center.x - arm, center.y), Point::new(center.x + arm, center.y)],
            &style,
        );
        if plus {
            frame.render_line(
                &[Point::new(center.x, center.y - arm), Point::new(center.x, center.y + arm)],
                &style,
            );
        }
    }
}

impl Layer for OsdLayer {
    fn name(&self) -> &str {
        "osd"
    }

    fn draw(&mut self, view: &MapView<'_>, frame: &mut RenderContext) -> Result<()> {
        if self.show_zoom {
            let style = PolygonRenderStyle {
                fill_color: self.button_fill,
                stroke_color: Some(self.foreground),
                stroke_width: 1.0,
            };
            for (rect, plus) in [(self.zoom_in_rect(), true), (self.zoom_out_rect(), false)] {
                frame.render_rect(rect, &style);
                self.glyph(frame, rect, plus);
            }
        }

        if self.show_crosshair {
            let center = view.viewport.screen_center();
            let style = LineRenderStyle {
                color: self.foreground,
                width: 1.0,
                dash_pattern: Vec::new(),
            };
            frame.render_line(
                &[
                    Point::new(center.x - CROSSHAIR_ARM, center.y),
                    Point::new(center.x + CROSSHAIR_ARM, center.y),
                ],
                &style,
            );
            frame.render_line(
                &[
                    Point::new(center.x, center.y - CROSSHAIR_ARM),
                    Point::new(center.x, center.y + CROSSHAIR_ARM),
                ],
                &style,
            );
        }
        Ok(())
    }

    fn on_button_press(
        &mut self,
        event: &ButtonEvent,
        _view: &MapView<'_>,
        actions: &mut Vec<Action>,
    ) -> EventHandled {
        if !self.show_zoom || event.button != MouseButton::Left {
            return EventHandled::NotHandled;
        }
        if self.zoom_in_rect().contains(&event.position) {
            actions.push(Action::ZoomIn);
            EventHandled::Handled
        } else if self.zoom_out_rect().contains(&event.position) {
            actions.push(Action::ZoomOut);
            EventHandled::Handled
        } else {
            EventHandled::NotHandled
        }
    }

    crate::impl_layer_any!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{gps::GpsState, viewport::Viewport},
        input::events::KeyModifiers,
    };

    #[test]
    fn test_buttons_claim_presses() {
        let viewport = Viewport::default();
        let gps = GpsState::new();
        let view = MapView {
            viewport: &viewport,
            gps: &gps,
            redraw_cycle: 0,
            drag_offset: Point::default(),
        };
        let mut osd = OsdLayer::new();
        let mut actions = Vec::new();

        let left = |x: f64, y: f64| {
            ButtonEvent::new(Point::new(x, y), MouseButton::Left, KeyModifiers::default())
        };

        let on_plus = left(15.0, 15.0);
        assert_eq!(osd.on_button_press(&on_plus, &view, &mut actions), EventHandled::Handled);
        let on_minus = left(15.0, 45.0);
        assert_eq!(osd.on_button_press(&on_minus, &view, &mut actions), EventHandled::Handled);
        let elsewhere = left(200.0, 200.0);
        assert_eq!(
            osd.on_button_press(&elsewhere, &view, &mut actions),
            EventHandled::NotHandled
        );

        assert!(matches!(actions[0], Action::ZoomIn));
        assert!(matches!(actions[1], Action::ZoomOut));
    }

    #[test]
    fn test_draw_ignores_drag_offset() {
        let viewport = Viewport::new(Default::default(), 3, 1, 18, 100, 100);
        let gps = GpsState::new();
        let view = MapView {
            viewport: &viewport,
            gps: &gps,
            redraw_cycle: 0,
            drag_offset: Point::new(30.0, 30.0),
        };
        let mut osd = OsdLayer {
            show_crosshair: true,
            ..OsdLayer::new()
        };
        let mut frame = RenderContext::new(100, 100);
        osd.draw(&view, &mut frame).unwrap();
        // two buttons with their glyphs (3 lines) and the crosshair (2 lines)
        assert_eq!(frame.len(), 7);
    }
}
