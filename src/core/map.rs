use image::RgbaImage;
use std::{rc::Rc, sync::Arc};

use crate::{
    core::{
        config::{MapConfig, MapPreset},
        constants::MAX_ZOOM,
        geo::{wrap_radians, GeoPoint, Point},
        gps::{auto_center_target, GpsState},
        projection::{deg2rad, lat_lon_to_zoom, rad2deg},
        viewport::Viewport,
    },
    input::{
        events::{
            ButtonEvent, EventHandled, InputEvent, MapEvent, MapEventKind, MapProperty,
            MotionEvent, MouseButton, ScrollDirection,
        },
        handler::{Action, EventManager, InputHandler, InteractionState, MapKey},
    },
    layers::{
        base::LayerHandle,
        gps::GpsPainter,
        image::{ImageHandle, ImageRegistry, OverlayImage},
        manager::LayerManager,
    },
    rendering::{
        context::RenderContext,
        pipeline::{FrameOutcome, RenderPipeline, Scene},
        scheduler::RedrawScheduler,
        surface::BackingSurface,
    },
    tiles::source::TileProvider,
    traits::{Configurable, HostWindow, NullHost},
    Result,
};

/// Borrows the map's fields as a [`Scene`] without borrowing the pipeline.
macro_rules! scene {
    ($map:expr) => {
        Scene {
            viewport: &$map.viewport,
            config: &$map.config,
            images: &$map.images,
            layers: &$map.layers,
            gps: &$map.gps,
            dragging: $map.input.is_dragging(),
        }
    };
}

/// The map widget.
///
/// Owns the viewport, GPS state, overlay registries, interaction state and
/// render pipeline. The host forwards toolkit events to the `*_event`
/// methods, calls [`Map::run_idle`] when its idle slot fires and
/// [`Map::paint`] when the widget must be drawn.
///
/// Every state change that affects the picture requests a coalesced redraw;
/// nothing is recomposed synchronously except on resize.
pub struct Map {
    config: MapConfig,
    viewport: Viewport,
    gps: GpsState,
    images: ImageRegistry,
    layers: LayerManager,
    input: InputHandler,
    events: EventManager,
    scheduler: Rc<RedrawScheduler>,
    pipeline: RenderPipeline,
    fullscreen: bool,
}

impl Map {
    pub fn new(config: MapConfig) -> Self {
        Self::with_host(config, Rc::new(NullHost))
    }

    pub fn with_preset(preset: MapPreset) -> Self {
        Self::new(preset.resolve())
    }

    pub fn with_host(config: MapConfig, host: Rc<dyn HostWindow>) -> Self {
        let config = config.sanitized();
        let (lat, lon) = config.initial_center;
        let viewport = Viewport::new(
            GeoPoint::from_degrees(lat, lon),
            config.zoom,
            config.min_zoom,
            config.max_zoom,
            0,
            0,
        );
        let input = InputHandler::new(config.drag_limit);

        Self {
            config,
            viewport,
            gps: GpsState::new(),
            images: ImageRegistry::new(),
            layers: LayerManager::new(),
            input,
            events: EventManager::new(),
            scheduler: RedrawScheduler::new(host),
            pipeline: RenderPipeline::new(),
            fullscreen: false,
        }
    }

    /// Attaches the toolkit window. Requests already pending are not replayed.
    pub fn set_host(&mut self, host: Rc<dyn HostWindow>) {
        self.scheduler.set_host(host);
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    // ---- view state ----

    /// Centers the map on `(lat, lon)` degrees. Disables auto-center.
    pub fn set_center(&mut self, lat: f64, lon: f64) {
        self.set_auto_center(false);
        self.viewport.set_center(GeoPoint::from_degrees(lat, lon));
        self.request_redraw();
        self.emit_center_changed();
    }

    /// Sets the zoom level, clamped to the configured limits, keeping the
    /// geographic center. Returns the zoom now in effect.
    pub fn set_zoom(&mut self, zoom: i32) -> i32 {
        if self.viewport.set_zoom(zoom) {
            log::debug!("zoom set to {}", self.viewport.zoom());
            self.request_redraw();
            self.emit_zoom_changed();
        }
        self.viewport.zoom()
    }

    pub fn set_center_and_zoom(&mut self, lat: f64, lon: f64, zoom: i32) {
        self.set_center(lat, lon);
        self.set_zoom(zoom);
    }

    pub fn zoom_in(&mut self) -> i32 {
        self.set_zoom(self.viewport.zoom() + 1)
    }

    pub fn zoom_out(&mut self) -> i32 {
        self.set_zoom(self.viewport.zoom() - 1)
    }

    /// Scrolls the view by a pixel delta.
    pub fn scroll(&mut self, dx: f64, dy: f64) {
        self.viewport.scroll_by(dx, dy);
        self.request_redraw();
        self.emit_center_changed();
    }

    /// Adopts a new widget size: the center stays centered, a new backing
    /// surface is allocated and composed right away.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport.resize(width, height);
        self.pipeline
            .allocate_surface(width, height, self.config.extra_border);
        self.perform_redraw();
        self.events.emit(MapEvent::Changed);
        for property in [MapProperty::MapX, MapProperty::MapY] {
            self.events.emit(MapEvent::Notify(property));
        }
    }

    /// Top-left and bottom-right corners of the visible area.
    pub fn bounding_box(&self) -> (GeoPoint, GeoPoint) {
        self.viewport.bounding_box()
    }

    /// Centers on the box spanned by the two corners (degrees) and picks
    /// the largest zoom at which it fits.
    pub fn zoom_fit_bbox(&mut self, lat1: f64, lat2: f64, lon1: f64, lon2: f64) {
        let zoom = lat_lon_to_zoom(
            self.viewport.height(),
            self.viewport.width(),
            deg2rad(lat1),
            deg2rad(lat2),
            deg2rad(lon1),
            deg2rad(lon2),
            self.viewport.min_zoom(),
            self.viewport.max_zoom(),
        );
        let half_span = rad2deg(wrap_radians(deg2rad(lon2 - lon1))) / 2.0;
        self.set_center((lat1 + lat2) / 2.0, lon1 + half_span);
        self.set_zoom(zoom);
    }

    /// Meters per pixel at the center of the view.
    pub fn scale(&self) -> f64 {
        self.viewport.scale()
    }

    pub fn center(&self) -> GeoPoint {
        self.viewport.center()
    }

    pub fn zoom(&self) -> i32 {
        self.viewport.zoom()
    }

    pub fn map_offset(&self) -> Point {
        self.viewport.map_offset()
    }

    /// Places world pixel `(x, y)` under the top-left corner of the widget.
    pub fn set_map_offset(&mut self, x: f64, y: f64) {
        self.viewport.set_map_offset(Point::new(x, y));
        self.request_redraw();
        self.emit_center_changed();
    }

    pub fn tile_zoom_offset(&self) -> i32 {
        self.config.tile_zoom_offset
    }

    pub fn set_tile_zoom_offset(&mut self, offset: i32) {
        let offset = offset.clamp(0, MAX_ZOOM);
        if offset != self.config.tile_zoom_offset {
            self.config.tile_zoom_offset = offset;
            self.request_redraw();
        }
    }

    pub fn screen_to_geographic(&self, x: f64, y: f64) -> GeoPoint {
        self.viewport.screen_to_geographic(Point::new(x, y))
    }

    pub fn geographic_to_screen(&self, point: &GeoPoint) -> Point {
        self.viewport.geographic_to_screen(point)
    }

    // ---- overlays ----

    /// Adds an image centered on `(lat, lon)` with z-order 0.
    pub fn add_image(&mut self, lat: f64, lon: f64, image: Arc<RgbaImage>) -> ImageHandle {
        self.add_image_with_alignment_z(lat, lon, image, 0.5, 0.5, 0)
    }

    pub fn add_image_with_alignment_z(
        &mut self,
        lat: f64,
        lon: f64,
        image: Arc<RgbaImage>,
        xalign: f64,
        yalign: f64,
        z_order: i32,
    ) -> ImageHandle {
        let handle = Rc::new(OverlayImage::with_alignment_z(
            GeoPoint::from_degrees(lat, lon),
            image,
            xalign,
            yalign,
            z_order,
        ));
        self.insert_image(handle.clone());
        handle
    }

    /// Registers an image created by the application.
    pub fn insert_image(&mut self, image: ImageHandle) {
        if self.images.contains(&image) {
            return;
        }
        image.attach(&self.scheduler);
        self.images.insert(image);
        self.request_redraw();
    }

    /// Returns `false` when the image is not on this map.
    pub fn remove_image(&mut self, image: &ImageHandle) -> bool {
        let removed = self.images.remove(image);
        if removed {
            self.request_redraw();
        }
        removed
    }

    pub fn remove_all_images(&mut self) {
        self.images.clear();
        self.request_redraw();
    }

    pub fn images(&self) -> &ImageRegistry {
        &self.images
    }

    pub fn add_layer(&mut self, layer: LayerHandle) {
        if self.layers.add_layer(layer) {
            self.request_redraw();
        }
    }

    /// Returns `false` when the layer is not on this map.
    pub fn remove_layer(&mut self, layer: &LayerHandle) -> bool {
        let removed = self.layers.remove_layer(layer);
        if removed {
            self.request_redraw();
        }
        removed
    }

    pub fn remove_all_layers(&mut self) {
        self.layers.clear();
        self.request_redraw();
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    // ---- GPS ----

    /// Records a GPS fix. `heading` is in degrees clockwise from north;
    /// `None` hides the direction arrow.
    pub fn add_gps_position(&mut self, lat: f64, lon: f64, heading: Option<f64>) {
        let point = GeoPoint::from_degrees(lat, lon);
        self.gps
            .update(point, heading.map(f64::to_radians), self.config.record_trip_history);
        self.request_redraw();
        self.maybe_auto_center(&point);
    }

    /// Empties the trip history; the current position is kept.
    pub fn clear_gps_history(&mut self) {
        self.gps.clear_history();
        self.request_redraw();
    }

    pub fn gps(&self) -> &GpsState {
        &self.gps
    }

    pub fn auto_center(&self) -> bool {
        self.config.auto_center
    }

    pub fn set_auto_center(&mut self, enabled: bool) {
        if self.config.auto_center != enabled {
            self.config.auto_center = enabled;
            self.events.emit(MapEvent::Notify(MapProperty::AutoCenter));
        }
    }

    fn maybe_auto_center(&mut self, point: &GeoPoint) {
        if !self.config.auto_center {
            return;
        }
        if let Some(offset) =
            auto_center_target(&self.viewport, point, self.config.auto_center_threshold)
        {
            log::debug!("gps point left the central region, recentering");
            self.viewport.set_map_offset(offset);
            self.emit_center_changed();
        }
    }

    // ---- collaborators ----

    pub fn set_keyboard_shortcut(&mut self, key: MapKey, keyval: u32) {
        self.input.keys_mut().set(key, keyval);
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn set_tile_provider(&mut self, provider: impl TileProvider + 'static) {
        self.pipeline.set_tile_provider(Some(Box::new(provider)));
        self.request_redraw();
    }

    pub fn clear_tile_provider(&mut self) {
        self.pipeline.set_tile_provider(None);
        self.request_redraw();
    }

    /// Replaces how the GPS point and trip are drawn.
    pub fn set_gps_painter(&mut self, painter: impl GpsPainter + 'static) {
        self.pipeline.set_gps_painter(Box::new(painter));
        self.request_redraw();
    }

    /// Register an event listener
    pub fn on<F>(&mut self, kind: MapEventKind, callback: F)
    where
        F: Fn(&MapEvent) + 'static,
    {
        self.events.on(kind, callback);
    }

    // ---- rendering ----

    /// Schedules a full redraw on the host's next idle slot. Requests made
    /// before the slot runs are merged into one.
    pub fn request_redraw(&self) {
        self.scheduler.request_redraw();
    }

    pub fn is_redraw_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Idle-slot callback. Runs the pending redraw (if any) and the cheap
    /// drag repaint. Returns `true` when the backing surface was recomposed.
    pub fn run_idle(&mut self) -> bool {
        let redraw = self.scheduler.take_redraw();
        let expose = self.scheduler.take_expose();
        if redraw {
            if let FrameOutcome::Composed { .. } = self.perform_redraw() {
                return true;
            }
        }
        if redraw || expose {
            self.scheduler.host().queue_draw();
        }
        false
    }

    /// Recomposes the backing surface now and asks the host to repaint.
    pub fn perform_redraw(&mut self) -> FrameOutcome {
        let scene = scene!(self);
        let outcome = self.pipeline.compose(&scene);
        if let FrameOutcome::Composed { dirty, .. } = &outcome {
            let host = self.scheduler.host();
            if let Some(area) = dirty {
                host.queue_draw_area(*area);
            }
            host.queue_draw();
        }
        outcome
    }

    /// Builds the on-screen frame.
    pub fn paint(&mut self) -> RenderContext {
        let scene = scene!(self);
        self.pipeline.paint(&scene)
    }

    pub fn surface(&self) -> Option<&BackingSurface> {
        self.pipeline.surface()
    }

    pub fn redraw_cycle(&self) -> u64 {
        self.pipeline.redraw_cycle()
    }

    /// Pixel delta of the pan gesture not yet folded into the backing surface.
    pub fn drag_offset(&self) -> Point {
        self.pipeline.drag_offset()
    }

    // ---- input ----

    pub fn interaction_state(&self) -> InteractionState {
        self.input.state()
    }

    pub fn button_press(&mut self, event: ButtonEvent) -> EventHandled {
        let mut actions = Vec::new();
        let claimed = {
            let scene = scene!(self);
            let view = self.pipeline.view(&scene);
            self.layers.dispatch_button_press(&event, &view, &mut actions)
        };
        if claimed == EventHandled::Handled {
            self.execute_actions(actions);
            return EventHandled::Handled;
        }

        let hit = if event.button == MouseButton::Right {
            self.images.hit_test(&self.viewport, event.position)
        } else {
            None
        };
        let actions = self
            .input
            .button_press(&event, self.viewport.map_offset(), hit);
        self.execute_actions(actions);

        if self.input.state() == InteractionState::Idle {
            EventHandled::NotHandled
        } else {
            EventHandled::Handled
        }
    }

    pub fn button_release(&mut self, event: ButtonEvent) -> EventHandled {
        let was_active = self.input.state() != InteractionState::Idle;
        let actions = self.input.button_release(&event);
        self.execute_actions(actions);
        if was_active && self.input.state() == InteractionState::Idle {
            EventHandled::Handled
        } else {
            EventHandled::NotHandled
        }
    }

    pub fn motion_notify(&mut self, event: MotionEvent) -> EventHandled {
        let actions = self.input.motion(&event);
        if actions.is_empty() {
            return EventHandled::NotHandled;
        }
        self.execute_actions(actions);
        EventHandled::Handled
    }

    pub fn scroll_event(&mut self, position: Point, direction: ScrollDirection) -> EventHandled {
        let actions = self.input.scroll(
            position,
            direction,
            self.viewport.zoom(),
            self.viewport.min_zoom(),
            self.viewport.max_zoom(),
        );
        if actions.is_empty() {
            return EventHandled::NotHandled;
        }
        self.execute_actions(actions);
        EventHandled::Handled
    }

    pub fn key_press(&mut self, keyval: u32) -> EventHandled {
        let actions = self.input.key_press(keyval, self.viewport.width());
        if actions.is_empty() {
            return EventHandled::NotHandled;
        }
        self.execute_actions(actions);
        EventHandled::Handled
    }

    /// Single entry point for hosts that deliver events as [`InputEvent`]s.
    pub fn handle_event(&mut self, event: InputEvent) -> EventHandled {
        match event {
            InputEvent::ButtonPress(event) => self.button_press(event),
            InputEvent::ButtonRelease(event) => self.button_release(event),
            InputEvent::Motion(event) => self.motion_notify(event),
            InputEvent::Scroll {
                position,
                direction,
            } => self.scroll_event(position, direction),
            InputEvent::KeyPress(key) => self.key_press(key.keyval),
            InputEvent::Resize { width, height } => {
                self.resize(width, height);
                EventHandled::Handled
            }
        }
    }

    fn execute_actions(&mut self, actions: Vec<Action>) {
        for action in actions {
            self.execute_action(action);
        }
    }

    fn execute_action(&mut self, action: Action) {
        match action {
            Action::StartDrag => {
                self.set_auto_center(false);
            }
            Action::DragMove { delta } => {
                self.pipeline.set_drag_offset(delta);
                self.scheduler.request_expose();
            }
            Action::CommitDrag { offset } => {
                // the surface keeps its drag offset until the next composition
                self.viewport.set_map_offset(offset);
                self.request_redraw();
                self.emit_center_changed();
            }
            Action::MovePoint { image, position } => {
                image.set_point(self.viewport.screen_to_geographic(position));
            }
            Action::ZoomAt { anchor, zoom } => {
                // zooming toward the pointer re-centers the view
                self.set_auto_center(false);
                if self.viewport.zoom_at(anchor, zoom) {
                    log::debug!("zoomed to {} around {:?}", zoom, anchor);
                    self.request_redraw();
                    self.emit_zoom_changed();
                }
            }
            Action::ZoomIn => {
                self.zoom_in();
            }
            Action::ZoomOut => {
                self.zoom_out();
            }
            Action::Scroll { dx, dy } => self.scroll(dx, dy),
            Action::ToggleFullscreen => {
                self.fullscreen = !self.fullscreen;
                self.scheduler.host().set_fullscreen(self.fullscreen);
                self.events.emit(MapEvent::FullscreenToggled {
                    fullscreen: self.fullscreen,
                });
            }
        }
    }

    fn emit_center_changed(&mut self) {
        self.events.emit(MapEvent::Changed);
        for property in [
            MapProperty::MapX,
            MapProperty::MapY,
            MapProperty::Latitude,
            MapProperty::Longitude,
        ] {
            self.events.emit(MapEvent::Notify(property));
        }
    }

    fn emit_zoom_changed(&mut self) {
        self.events.emit(MapEvent::Changed);
        for property in [MapProperty::Zoom, MapProperty::MapX, MapProperty::MapY] {
            self.events.emit(MapEvent::Notify(property));
        }
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::new(MapConfig::default())
    }
}

impl Drop for Map {
    // handles held by the application must stop notifying a dead scheduler
    fn drop(&mut self) {
        self.images.clear();
    }
}

impl Configurable for Map {
    type Config = MapConfig;

    fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Applies a new configuration. View position is kept; zoom limits,
    /// drag limit and drawing options take effect on the next redraw.
    fn set_config(&mut self, config: MapConfig) -> Result<()> {
        let config = config.sanitized();
        let auto_center = config.auto_center;
        let border_changed = config.extra_border != self.config.extra_border;

        if self.viewport.set_zoom_limits(config.min_zoom, config.max_zoom) {
            self.emit_zoom_changed();
        }
        self.input.set_drag_limit(config.drag_limit);
        self.config = MapConfig {
            auto_center: self.config.auto_center,
            ..config
        };
        self.set_auto_center(auto_center);

        if border_changed {
            if let Some((width, height)) = self.pipeline.surface().map(BackingSurface::size) {
                self.pipeline
                    .allocate_surface(width, height, self.config.extra_border);
            }
        }
        self.request_redraw();
        Ok(())
    }
}
