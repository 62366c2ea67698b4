use crate::{
    core::geo::{Point, ScreenRect},
    rendering::context::{
        Color, LineRenderStyle, PointRenderStyle, PolygonRenderStyle, RenderContext,
    },
    Result,
};

/// Radii of the GPS marker, in pixels. Zero disables that part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsPointStyle {
    pub inner_radius: f64,
    pub outer_radius: f64,
}

/// Draws the current GPS position and the recorded trip onto the backing
/// surface. Replace the default through [`crate::Map::set_gps_painter`].
pub trait GpsPainter {
    /// Draws the marker centered on `position` (surface pixels) and returns
    /// the area it covers.
    fn draw_gps_point(
        &mut self,
        ctx: &mut RenderContext,
        position: Point,
        heading: Option<f64>,
        style: &GpsPointStyle,
    ) -> Result<ScreenRect>;

    fn draw_trip(&mut self, ctx: &mut RenderContext, points: &[Point]) -> Result<()> {
        ctx.render_line(points, &LineRenderStyle::default());
        Ok(())
    }
}

/// Translucent accuracy disc, heading arrow and a solid ball.
#[derive(Debug, Clone)]
pub struct DefaultGpsPainter {
    pub accuracy_fill: Color,
    pub accuracy_stroke: Color,
    pub heading_fill: Color,
    pub ball_fill: Color,
    pub outline: Color,
    pub trip_style: LineRenderStyle,
}

impl Default for DefaultGpsPainter {
    fn default() -> Self {
        Self {
            accuracy_fill: Color::from_unit(0.75, 0.75, 0.75, 0.4),
            accuracy_stroke: Color::from_unit(0.55, 0.55, 0.55, 0.4),
            heading_fill: Color::from_unit(0.3, 0.3, 1.0, 0.5),
            ball_fill: Color::from_unit(0.0, 0.0, 1.0, 1.0),
            outline: Color::BLACK,
            trip_style: LineRenderStyle::default(),
        }
    }
}

/// Triangle pointing along `heading` (radians clockwise from north), with its
/// base across the ball and its tip `3 * r` from the center.
pub fn heading_arrow(center: Point, heading: f64, r: f64) -> [Point; 3] {
    let (sin, cos) = heading.sin_cos();
    [
        Point::new(center.x - r * cos, center.y - r * sin),
        Point::new(center.x + 3.0 * r * sin, center.y - 3.0 * r * cos),
        Point::new(center.x + r * cos, center.y + r * sin),
    ]
}

/// Area touched by the marker: `max(3 * inner, outer)` around the center.
pub fn marker_extent(center: Point, style: &GpsPointStyle) -> ScreenRect {
    let reach = (3.0 * style.inner_radius).max(style.outer_radius);
    ScreenRect::around(center, reach)
}

impl GpsPainter for DefaultGpsPainter {
    fn draw_gps_point(
        &mut self,
        ctx: &mut RenderContext,
        position: Point,
        heading: Option<f64>,
        style: &GpsPointStyle,
    ) -> Result<ScreenRect> {
        if style.outer_radius > 0.0 {
            ctx.render_point(
                &position,
                &PointRenderStyle {
                    fill_color: Some(self.accuracy_fill),
                    stroke_color: Some(self.accuracy_stroke),
                    stroke_width: 1.5,
                    radius: style.outer_radius,
                },
            );
        }

        if style.inner_radius > 0.0 {
            if let Some(heading) = heading {
                ctx.render_polygon(
                    &heading_arrow(position, heading, style.inner_radius),
                    &PolygonRenderStyle {
                        fill_color: self.heading_fill,
                        stroke_color: Some(self.outline.with_alpha(128)),
                        stroke_width: 1.0,
                    },
                );
            }
            ctx.render_point(
                &position,
                &PointRenderStyle {
                    fill_color: Some(self.ball_fill),
                    stroke_color: Some(self.outline),
                    stroke_width: 1.0,
                    radius: style.inner_radius,
                },
            );
        }

        Ok(marker_extent(position, style))
    }

    fn draw_trip(&mut self, ctx: &mut RenderContext, points: &[Point]) -> Result<()> {
        ctx.render_line(points, &self.trip_style);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::context::DrawCommand;
    use approx::assert_relative_eq;

    const STYLE: GpsPointStyle = GpsPointStyle {
        inner_radius: 10.0,
        outer_radius: 20.0,
    };

    #[test]
    fn test_arrow_points_north_for_zero_heading() {
        let arrow = heading_arrow(Point::new(50.0, 50.0), 0.0, 10.0);
        assert_eq!(arrow[0], Point::new(40.0, 50.0));
        assert_eq!(arrow[1], Point::new(50.0, 20.0));
        assert_eq!(arrow[2], Point::new(60.0, 50.0));
    }

    #[test]
    fn test_arrow_points_east_for_quarter_turn() {
        let arrow = heading_arrow(Point::new(0.0, 0.0), std::f64::consts::FRAC_PI_2, 10.0);
        assert_relative_eq!(arrow[1].x, 30.0, epsilon = 1e-9);
        assert_relative_eq!(arrow[1].y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_marker_extent() {
        let rect = marker_extent(Point::new(100.0, 100.0), &STYLE);
        assert_eq!(rect, ScreenRect::new(70.0, 70.0, 60.0, 60.0));

        let wide = GpsPointStyle {
            inner_radius: 2.0,
            outer_radius: 25.0,
        };
        assert_eq!(marker_extent(Point::default(), &wide).width, 50.0);
    }

    #[test]
    fn test_heading_arrow_only_with_heading() {
        let mut painter = DefaultGpsPainter::default();
        let mut ctx = RenderContext::new(200, 200);
        painter
            .draw_gps_point(&mut ctx, Point::new(100.0, 100.0), None, &STYLE)
            .unwrap();
        assert_eq!(ctx.len(), 2);

        ctx.begin_frame();
        painter
            .draw_gps_point(&mut ctx, Point::new(100.0, 100.0), Some(1.0), &STYLE)
            .unwrap();
        assert_eq!(ctx.len(), 3);
        assert!(matches!(ctx.get_drawing_queue()[1], DrawCommand::Polygon { .. }));
    }
}
