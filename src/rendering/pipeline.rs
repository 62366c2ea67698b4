//! Frame composition.
//!
//! A full redraw (`compose`) rebuilds the backing surface from tiles,
//! the trip history, overlay images and the GPS marker, then lets every layer
//! run its render step. A screen paint (`paint`) only blits the surface,
//! shifted by the drag in progress, and asks the layers to draw on top.

use crate::{
    core::{
        config::MapConfig,
        geo::{Point, ScreenRect},
        gps::GpsState,
        projection::visible_tiles,
        viewport::Viewport,
    },
    layers::{
        base::MapView,
        gps::{DefaultGpsPainter, GpsPainter, GpsPointStyle},
        image::ImageRegistry,
        manager::LayerManager,
    },
    rendering::{context::RenderContext, surface::BackingSurface},
    tiles::source::{TileImage, TileProvider},
};

/// Everything a frame is built from, borrowed from the map for one call.
pub struct Scene<'a> {
    pub viewport: &'a Viewport,
    pub config: &'a MapConfig,
    pub images: &'a ImageRegistry,
    pub layers: &'a LayerManager,
    pub gps: &'a GpsState,
    pub dragging: bool,
}

/// Why a full redraw did not happen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The widget has not been sized yet
    NoSurface,
    LayerBusy,
    Dragging,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Skipped(SkipReason),
    Composed {
        cycle: u64,
        /// Screen area touched by images and the GPS marker
        dirty: Option<ScreenRect>,
    },
}

/// Owns the backing surface and the drawing collaborators.
pub struct RenderPipeline {
    surface: Option<BackingSurface>,
    redraw_cycle: u64,
    drag_offset: Point,
    tiles: Option<Box<dyn TileProvider>>,
    gps_painter: Box<dyn GpsPainter>,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self {
            surface: None,
            redraw_cycle: 0,
            drag_offset: Point::default(),
            tiles: None,
            gps_painter: Box::new(DefaultGpsPainter::default()),
        }
    }

    pub fn surface(&self) -> Option<&BackingSurface> {
        self.surface.as_ref()
    }

    /// Replaces the backing surface with one sized for a `width` × `height` widget.
    pub fn allocate_surface(&mut self, width: u32, height: u32, border: u32) {
        log::debug!("allocating {}x{} surface (border {})", width, height, border);
        self.surface = Some(BackingSurface::new(width, height, border));
    }

    pub fn redraw_cycle(&self) -> u64 {
        self.redraw_cycle
    }

    pub fn drag_offset(&self) -> Point {
        self.drag_offset
    }

    pub fn set_drag_offset(&mut self, offset: Point) {
        self.drag_offset = offset;
    }

    pub fn set_tile_provider(&mut self, provider: Option<Box<dyn TileProvider>>) {
        self.tiles = provider;
    }

    pub fn has_tile_provider(&self) -> bool {
        self.tiles.is_some()
    }

    pub fn set_gps_painter(&mut self, painter: Box<dyn GpsPainter>) {
        self.gps_painter = painter;
    }

    pub fn view<'a>(&self, scene: &Scene<'a>) -> MapView<'a> {
        MapView {
            viewport: scene.viewport,
            gps: scene.gps,
            redraw_cycle: self.redraw_cycle,
            drag_offset: self.drag_offset,
        }
    }

    /// Rebuilds the backing surface. Skipped while dragging, while any layer
    /// is busy, or before the first resize.
    pub fn compose(&mut self, scene: &Scene<'_>) -> FrameOutcome {
        if self.surface.is_none() {
            return FrameOutcome::Skipped(SkipReason::NoSurface);
        }
        if scene.layers.any_busy() {
            log::debug!("layer busy, frame skipped");
            return FrameOutcome::Skipped(SkipReason::LayerBusy);
        }
        if scene.dragging {
            return FrameOutcome::Skipped(SkipReason::Dragging);
        }
        let Some(surface) = self.surface.as_mut() else {
            return FrameOutcome::Skipped(SkipReason::NoSurface);
        };

        self.redraw_cycle += 1;
        self.drag_offset = Point::default();

        let viewport = scene.viewport;
        let config = scene.config;
        let border = surface.border() as f64;
        let (full_width, full_height) = surface.full_size();
        // world pixel -> surface pixel
        let to_surface = Point::new(border, border).subtract(&viewport.map_offset());

        surface.clear(config.background);
        let ctx = surface.context_mut();

        if let Some(tiles) = self.tiles.as_mut() {
            let origin = viewport.map_offset().subtract(&Point::new(border, border));
            for tile in visible_tiles(
                viewport.zoom(),
                config.tile_zoom_offset,
                origin,
                full_width as f64,
                full_height as f64,
            ) {
                match tiles.tile(tile.address) {
                    TileImage::Ready(image) => {
                        ctx.render_tile(tile.address, image, tile.position, tile.size)
                    }
                    TileImage::Missing => {
                        ctx.render_placeholder_tile(tile.address, tile.position, tile.size)
                    }
                }
            }
        }

        if config.show_trip_history && scene.gps.trip_history().len() > 1 {
            let points: Vec<Point> = scene
                .gps
                .trip_history()
                .iter()
                .map(|p| viewport.world_pixel(p).add(&to_surface))
                .collect();
            if let Err(err) = self.gps_painter.draw_trip(ctx, &points) {
                log::warn!("failed to draw trip history: {}", err);
            }
        }

        let mut dirty: Option<ScreenRect> = None;
        let mut touch = |rect: ScreenRect| {
            dirty = Some(match dirty {
                Some(d) => d.union(&rect),
                None => rect,
            });
        };

        for image in scene.images.iter() {
            let rect = image.screen_rect(viewport);
            let position = Point::new(rect.x + border, rect.y + border);
            ctx.render_image(image.image().clone(), position, image.rotation());
            touch(rect);
        }

        if config.show_gps_point {
            if let Some(position) = scene.gps.position() {
                let style = GpsPointStyle {
                    inner_radius: config.gps_point_inner_radius as f64,
                    outer_radius: config.gps_point_outer_radius as f64,
                };
                let at = viewport.world_pixel(&position).add(&to_surface);
                match self.gps_painter.draw_gps_point(ctx, at, scene.gps.heading(), &style) {
                    Ok(extent) => touch(extent.translate(&Point::new(-border, -border))),
                    Err(err) => log::warn!("failed to draw gps point: {}", err),
                }
            }
        }

        if let Some(rect) = dirty {
            ctx.invalidate(rect.translate(&Point::new(border, border)));
        }

        let view = self.view(scene);
        scene.layers.render_all(&view);

        log::trace!("redraw cycle {} composed", self.redraw_cycle);
        FrameOutcome::Composed {
            cycle: self.redraw_cycle,
            dirty,
        }
    }

    /// Produces the on-screen frame: the backing surface shifted by the drag
    /// delta, with every layer's draw step on top.
    pub fn paint(&mut self, scene: &Scene<'_>) -> RenderContext {
        let mut frame = RenderContext::new(scene.viewport.width(), scene.viewport.height());
        if let Some(surface) = &self.surface {
            let (width, height) = surface.full_size();
            frame.blit_surface(surface.blit_origin(self.drag_offset), width, height);
        }
        let view = self.view(scene);
        scene.layers.draw_all(&view, &mut frame);
        frame
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::geo::{GeoPoint, TileAddress},
        rendering::context::DrawCommand,
    };

    struct Fixture {
        viewport: Viewport,
        config: MapConfig,
        images: ImageRegistry,
        layers: LayerManager,
        gps: GpsState,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                viewport: Viewport::new(GeoPoint::default(), 2, 1, 18, 300, 200),
                config: MapConfig::default(),
                images: ImageRegistry::new(),
                layers: LayerManager::new(),
                gps: GpsState::new(),
            }
        }

        fn scene(&self, dragging: bool) -> Scene<'_> {
            Scene {
                viewport: &self.viewport,
                config: &self.config,
                images: &self.images,
                layers: &self.layers,
                gps: &self.gps,
                dragging,
            }
        }
    }

    #[test]
    fn test_compose_requires_surface() {
        let fixture = Fixture::new();
        let mut pipeline = RenderPipeline::new();
        assert_eq!(
            pipeline.compose(&fixture.scene(false)),
            FrameOutcome::Skipped(SkipReason::NoSurface)
        );
        assert_eq!(pipeline.redraw_cycle(), 0);
    }

    #[test]
    fn test_compose_skipped_while_dragging() {
        let fixture = Fixture::new();
        let mut pipeline = RenderPipeline::new();
        pipeline.allocate_surface(300, 200, 0);
        assert_eq!(
            pipeline.compose(&fixture.scene(true)),
            FrameOutcome::Skipped(SkipReason::Dragging)
        );
    }

    #[test]
    fn test_missing_tiles_become_placeholders() {
        let fixture = Fixture::new();
        let mut pipeline = RenderPipeline::new();
        pipeline.allocate_surface(300, 200, 0);
        pipeline.set_tile_provider(Some(Box::new(|_: TileAddress| TileImage::Missing)));

        assert!(matches!(
            pipeline.compose(&fixture.scene(false)),
            FrameOutcome::Composed { cycle: 1, dirty: None }
        ));
        let queue = pipeline.surface().unwrap().context().get_drawing_queue();
        assert!(matches!(queue[0], DrawCommand::Clear { .. }));
        assert!(queue.len() > 1);
        assert!(queue[1..]
            .iter()
            .all(|cmd| matches!(cmd, DrawCommand::PlaceholderTile { .. })));
    }

    #[test]
    fn test_gps_point_marks_dirty_region() {
        let mut fixture = Fixture::new();
        fixture.gps.update(GeoPoint::default(), None, false);
        let mut pipeline = RenderPipeline::new();
        pipeline.allocate_surface(300, 200, 8);

        let FrameOutcome::Composed { dirty, .. } = pipeline.compose(&fixture.scene(false)) else {
            panic!("frame was skipped");
        };
        // marker centered on screen, reach max(3 * 10, 20) = 30
        assert_eq!(dirty, Some(ScreenRect::new(120.0, 70.0, 60.0, 60.0)));
    }

    #[test]
    fn test_paint_shifts_surface_by_drag() {
        let fixture = Fixture::new();
        let mut pipeline = RenderPipeline::new();
        pipeline.allocate_surface(300, 200, 8);
        pipeline.set_drag_offset(Point::new(12.0, -4.0));

        let frame = pipeline.paint(&fixture.scene(true));
        assert_eq!(
            frame.get_drawing_queue()[0],
            DrawCommand::Surface {
                offset: Point::new(4.0, -12.0),
                width: 316,
                height: 216,
            }
        );
    }
}
