use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::geo::{Point, ScreenRect, TileAddress};

/// RGBA color. Serialized as a `#RRGGBBAA` string.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::try_from_hex(&value)
            .ok_or_else(|| format!("invalid color {value:?}, expected #RRGGBB or #RRGGBBAA"))
    }
}

impl From<Color> for String {
    fn from(val: Color) -> Self {
        val.to_hex()
    }
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const GRAY: Color = Color::rgba(170, 170, 170, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Builds a color from unit-range channels, as found in cairo-style code.
    pub fn from_unit(r: f64, g: f64, b: f64, a: f64) -> Self {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgba(channel(r), channel(g), channel(b), channel(a))
    }

    pub fn to_u8_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA`.
    pub fn try_from_hex(hex_string: &str) -> Option<Self> {
        if hex_string.len() != 7 && hex_string.len() != 9 || !hex_string.starts_with('#') {
            return None;
        }

        let r = u8::from_str_radix(hex_string.get(1..3)?, 16).ok()?;
        let g = u8::from_str_radix(hex_string.get(3..5)?, 16).ok()?;
        let b = u8::from_str_radix(hex_string.get(5..7)?, 16).ok()?;
        let a = if hex_string.len() == 9 {
            u8::from_str_radix(hex_string.get(7..9)?, 16).ok()?
        } else {
            255
        };

        Some(Self { r, g, b, a })
    }

    pub fn with_alpha(&self, a: u8) -> Self {
        Self { a, ..*self }
    }

    pub fn alpha(&self) -> u8 {
        self.a
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Styles for different rendering primitives
#[derive(Debug, Clone, PartialEq)]
pub struct PointRenderStyle {
    pub fill_color: Option<Color>,
    pub stroke_color: Option<Color>,
    pub stroke_width: f32,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineRenderStyle {
    pub color: Color,
    pub width: f32,
    pub dash_pattern: Vec<f32>,
}

impl Default for LineRenderStyle {
    fn default() -> Self {
        Self {
            color: Color::rgba(153, 0, 0, 153),
            width: 4.0,
            dash_pattern: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRenderStyle {
    pub fill_color: Color,
    pub stroke_color: Option<Color>,
    pub stroke_width: f32,
}

/// Commands that can be issued to the render context
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole target with a color
    Clear { color: Color },
    /// Copy the backing surface into the frame at `offset`
    Surface {
        offset: Point,
        width: u32,
        height: u32,
    },
    Tile {
        address: TileAddress,
        image: Arc<RgbaImage>,
        position: Point,
        size: f64,
    },
    /// Stand-in for a tile the provider could not supply yet
    PlaceholderTile {
        address: TileAddress,
        position: Point,
        size: f64,
    },
    Image {
        image: Arc<RgbaImage>,
        position: Point,
        rotation: f64,
    },
    Point {
        position: Point,
        style: PointRenderStyle,
    },
    Line {
        points: Vec<Point>,
        style: LineRenderStyle,
    },
    Polygon {
        exterior: Vec<Point>,
        style: PolygonRenderStyle,
    },
    Rect {
        rect: ScreenRect,
        style: PolygonRenderStyle,
    },
}

/// Draw-command recorder. The host replays the queue with its own 2D API.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub width: u32,
    pub height: u32,
    drawing_queue: Vec<DrawCommand>,
    /// Union of every region invalidated since the last `begin_frame`
    dirty: Option<ScreenRect>,
}

impl RenderContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            drawing_queue: Vec::new(),
            dirty: None,
        }
    }

    /// Begin a frame
    pub fn begin_frame(&mut self) {
        self.drawing_queue.clear();
        self.dirty = None;
    }

    pub fn clear(&mut self, color: Color) {
        self.drawing_queue.push(DrawCommand::Clear { color });
    }

    pub fn blit_surface(&mut self, offset: Point, width: u32, height: u32) {
        self.drawing_queue.push(DrawCommand::Surface {
            offset,
            width,
            height,
        });
    }

    pub fn render_tile(
        &mut self,
        address: TileAddress,
        image: Arc<RgbaImage>,
        position: Point,
        size: f64,
    ) {
        self.drawing_queue.push(DrawCommand::Tile {
            address,
            image,
            position,
            size,
        });
    }

    pub fn render_placeholder_tile(&mut self, address: TileAddress, position: Point, size: f64) {
        self.drawing_queue.push(DrawCommand::PlaceholderTile {
            address,
            position,
            size,
        });
    }

    pub fn render_image(&mut self, image: Arc<RgbaImage>, position: Point, rotation: f64) {
        self.drawing_queue.push(DrawCommand::Image {
            image,
            position,
            rotation,
        });
    }

    /// Render a point at the given position with the given style
    pub fn render_point(&mut self, position: &Point, style: &PointRenderStyle) {
        self.drawing_queue.push(DrawCommand::Point {
            position: *position,
            style: style.clone(),
        });
    }

    /// Render a line with the given points and style. Fewer than two points draw nothing.
    pub fn render_line(&mut self, points: &[Point], style: &LineRenderStyle) {
        if points.len() < 2 {
            return;
        }
        self.drawing_queue.push(DrawCommand::Line {
            points: points.to_vec(),
            style: style.clone(),
        });
    }

    pub fn render_polygon(&mut self, exterior: &[Point], style: &PolygonRenderStyle) {
        if exterior.len() < 3 {
            return;
        }
        self.drawing_queue.push(DrawCommand::Polygon {
            exterior: exterior.to_vec(),
            style: style.clone(),
        });
    }

    pub fn render_rect(&mut self, rect: ScreenRect, style: &PolygonRenderStyle) {
        self.drawing_queue.push(DrawCommand::Rect {
            rect,
            style: style.clone(),
        });
    }

    /// Marks `rect` as needing a repaint on screen.
    pub fn invalidate(&mut self, rect: ScreenRect) {
        self.dirty = Some(match self.dirty {
            Some(dirty) => dirty.union(&rect),
            None => rect,
        });
    }

    pub fn dirty_region(&self) -> Option<ScreenRect> {
        self.dirty
    }

    /// Get the current drawing queue
    pub fn get_drawing_queue(&self) -> &[DrawCommand] {
        &self.drawing_queue
    }

    pub fn len(&self) -> usize {
        self.drawing_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawing_queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex() {
        let color = Color::try_from_hex("#10FF80").unwrap();
        assert_eq!(color.to_u8_array(), [16, 255, 128, 255]);
        assert_eq!(color.with_alpha(0).to_hex(), "#10FF8000");
        assert!(Color::try_from_hex("10FF80").is_none());
        assert!(Color::try_from_hex("#GGFF80").is_none());
    }

    #[test]
    fn test_color_from_unit() {
        assert_eq!(Color::from_unit(1.0, 0.0, 2.0, 0.5).to_u8_array(), [255, 0, 255, 128]);
    }

    #[test]
    fn test_short_lines_are_dropped() {
        let mut ctx = RenderContext::new(10, 10);
        ctx.render_line(&[Point::new(1.0, 1.0)], &LineRenderStyle::default());
        assert!(ctx.is_empty());
        ctx.render_line(&[Point::new(1.0, 1.0), Point::new(2.0, 2.0)], &LineRenderStyle::default());
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_invalidate_accumulates_union() {
        let mut ctx = RenderContext::new(100, 100);
        ctx.invalidate(ScreenRect::new(0.0, 0.0, 10.0, 10.0));
        ctx.invalidate(ScreenRect::new(20.0, 5.0, 10.0, 10.0));
        assert_eq!(ctx.dirty_region(), Some(ScreenRect::new(0.0, 0.0, 30.0, 15.0)));

        ctx.begin_frame();
        assert_eq!(ctx.dirty_region(), None);
    }
}
