use crate::{
    core::geo::Point,
    rendering::context::{Color, RenderContext},
};

/// Off-screen surface the map is composed onto.
///
/// It is larger than the widget by `border` pixels on every side so that a
/// drag can reveal a little of the neighbouring area before the next full
/// redraw. Surface pixel `(border, border)` corresponds to screen pixel `(0, 0)`.
#[derive(Debug, Clone)]
pub struct BackingSurface {
    width: u32,
    height: u32,
    border: u32,
    context: RenderContext,
}

impl BackingSurface {
    /// Allocates a surface for a `width` × `height` widget.
    pub fn new(width: u32, height: u32, border: u32) -> Self {
        let full_width = width + 2 * border;
        let full_height = height + 2 * border;
        Self {
            width,
            height,
            border,
            context: RenderContext::new(full_width, full_height),
        }
    }

    /// Widget size the surface was allocated for.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Size including the border on both sides.
    pub fn full_size(&self) -> (u32, u32) {
        (self.context.width, self.context.height)
    }

    pub fn border(&self) -> u32 {
        self.border
    }

    /// Converts a screen point to surface pixels.
    pub fn to_surface(&self, screen: Point) -> Point {
        let border = self.border as f64;
        Point::new(screen.x + border, screen.y + border)
    }

    /// Where the surface lands on screen when blitted with `drag_offset`.
    pub fn blit_origin(&self, drag_offset: Point) -> Point {
        let border = self.border as f64;
        Point::new(drag_offset.x - border, drag_offset.y - border)
    }

    /// Starts a new composition: drops the previous content and fills the surface.
    pub fn clear(&mut self, background: Color) {
        self.context.begin_frame();
        self.context.clear(background);
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut RenderContext {
        &mut self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::context::DrawCommand;

    #[test]
    fn test_surface_includes_border() {
        let surface = BackingSurface::new(800, 600, 16);
        assert_eq!(surface.size(), (800, 600));
        assert_eq!(surface.full_size(), (832, 632));
        assert_eq!(surface.to_surface(Point::new(0.0, 10.0)), Point::new(16.0, 26.0));
        assert_eq!(surface.blit_origin(Point::new(5.0, -3.0)), Point::new(-11.0, -19.0));
    }

    #[test]
    fn test_clear_replaces_content() {
        let mut surface = BackingSurface::new(10, 10, 0);
        surface.clear(Color::WHITE);
        surface.clear(Color::BLACK);
        assert_eq!(
            surface.context().get_drawing_queue(),
            &[DrawCommand::Clear { color: Color::BLACK }]
        );
    }
}
