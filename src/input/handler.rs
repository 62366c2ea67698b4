use crate::{
    core::{constants::SCROLL_STEP_DIVISOR, geo::Point},
    input::events::{
        ButtonEvent, MapEvent, MapEventKind, MotionEvent, MouseButton, ScrollDirection,
    },
    layers::image::ImageHandle,
    prelude::HashMap,
};

/// What the map should do in response to an input event
#[derive(Debug, Clone)]
pub enum Action {
    /// A press turned into a pan gesture
    StartDrag,
    /// Pointer moved during a pan; `delta` is relative to the press position
    DragMove { delta: Point },
    /// Pan finished; `offset` is the new permanent map offset
    CommitDrag { offset: Point },
    /// Move an overlay image so that its point lies under `position`
    MovePoint { image: ImageHandle, position: Point },
    /// Zoom to `zoom` keeping the geographic point under `anchor` in place
    ZoomAt { anchor: Point, zoom: i32 },
    ZoomIn,
    ZoomOut,
    /// Scroll by a pixel delta
    Scroll { dx: f64, dy: f64 },
    ToggleFullscreen,
}

/// Current phase of the pointer interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Primary button held, drag threshold not yet exceeded
    ButtonDown,
    /// Panning the map
    Dragging,
    /// Moving an overlay image
    DraggingPoint,
}

/// Book-keeping for the gesture in progress
#[derive(Debug, Clone, Default)]
pub struct DragState {
    pub start_mouse: Point,
    pub start_offset: Point,
    pub delta: Point,
    /// Motion events seen since the threshold was crossed
    pub counter: u32,
    /// Button that started the gesture; only its release ends it
    pub button: Option<MouseButton>,
    pub point_target: Option<ImageHandle>,
}

/// Commands that can be bound to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKey {
    Fullscreen,
    ZoomIn,
    ZoomOut,
    Up,
    Down,
    Left,
    Right,
}

/// Key value bindings. Disabled until the first binding is registered.
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    bindings: HashMap<MapKey, u32>,
    enabled: bool,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: MapKey, keyval: u32) {
        self.bindings.insert(key, keyval);
        self.enabled = true;
    }

    pub fn get(&self, key: MapKey) -> Option<u32> {
        self.bindings.get(&key).copied()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Finds the command bound to `keyval`.
    pub fn lookup(&self, keyval: u32) -> Option<MapKey> {
        if !self.enabled {
            return None;
        }
        self.bindings
            .iter()
            .find(|(_, bound)| **bound == keyval)
            .map(|(key, _)| *key)
    }
}

/// Event listener callback type
pub type EventCallback = Box<dyn Fn(&MapEvent)>;

/// Listener registry for map notifications
#[derive(Default)]
pub struct EventManager {
    /// Event listeners by event type
    listeners: HashMap<MapEventKind, Vec<EventCallback>>,
    emitted: u64,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event listener
    pub fn on<F>(&mut self, kind: MapEventKind, callback: F)
    where
        F: Fn(&MapEvent) + 'static,
    {
        self.listeners.entry(kind).or_default().push(Box::new(callback));
    }

    /// Delivers `event` to its listeners right away.
    pub fn emit(&mut self, event: MapEvent) {
        self.emitted += 1;
        if let Some(callbacks) = self.listeners.get(&event.kind()) {
            for callback in callbacks {
                callback(&event);
            }
        }
    }

    /// Total number of events emitted so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn listener_count(&self, kind: MapEventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }
}

/// Pointer/keyboard state machine. Turns raw input into [`Action`]s for the map.
#[derive(Debug, Clone)]
pub struct InputHandler {
    pub enabled: bool,
    state: InteractionState,
    drag: DragState,
    /// Pixels the pointer must travel before a press becomes a pan
    drag_limit: u32,
    keys: KeyBindings,
}

impl InputHandler {
    pub fn new(drag_limit: u32) -> Self {
        Self {
            enabled: true,
            state: InteractionState::Idle,
            drag: DragState::default(),
            drag_limit,
            keys: KeyBindings::new(),
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn is_dragging(&self) -> bool {
        self.state == InteractionState::Dragging
    }

    pub fn drag_limit(&self) -> u32 {
        self.drag_limit
    }

    pub fn set_drag_limit(&mut self, drag_limit: u32) {
        self.drag_limit = drag_limit;
    }

    pub fn keys(&self) -> &KeyBindings {
        &self.keys
    }

    pub fn keys_mut(&mut self) -> &mut KeyBindings {
        &mut self.keys
    }

    /// Handles a press that no layer claimed. `point_hit` is the image under
    /// the pointer for secondary-button presses.
    pub fn button_press(
        &mut self,
        event: &ButtonEvent,
        map_offset: Point,
        point_hit: Option<ImageHandle>,
    ) -> Vec<Action> {
        if !self.enabled || self.state != InteractionState::Idle {
            return vec![];
        }

        if event.is_plain_primary() {
            self.state = InteractionState::ButtonDown;
            self.drag = DragState {
                start_mouse: event.position,
                start_offset: map_offset,
                button: Some(event.button),
                ..DragState::default()
            };
        } else if let Some(image) = point_hit {
            log::debug!("point drag started at {:?}", event.position);
            self.state = InteractionState::DraggingPoint;
            self.drag = DragState {
                start_mouse: event.position,
                start_offset: map_offset,
                button: Some(event.button),
                point_target: Some(image),
                ..DragState::default()
            };
        }
        vec![]
    }

    pub fn motion(&mut self, event: &MotionEvent) -> Vec<Action> {
        match self.state {
            InteractionState::ButtonDown | InteractionState::Dragging if event.primary_held => {
                // once the threshold is crossed the distance is not checked again
                if self.drag.counter == 0 {
                    let limit = self.drag_limit as f64;
                    if self.drag.start_mouse.distance_squared_to(&event.position) < limit * limit {
                        return vec![];
                    }
                }
                self.drag.counter += 1;
                self.drag.delta = event.position.subtract(&self.drag.start_mouse);

                let mut actions = Vec::with_capacity(2);
                if self.state == InteractionState::ButtonDown {
                    log::debug!("drag started from {:?}", self.drag.start_mouse);
                    self.state = InteractionState::Dragging;
                    actions.push(Action::StartDrag);
                }
                actions.push(Action::DragMove { delta: self.drag.delta });
                actions
            }
            InteractionState::DraggingPoint => match &self.drag.point_target {
                Some(image) => vec![Action::MovePoint {
                    image: image.clone(),
                    position: event.position,
                }],
                None => vec![],
            },
            _ => vec![],
        }
    }

    pub fn button_release(&mut self, event: &ButtonEvent) -> Vec<Action> {
        if self.state != InteractionState::Idle && self.drag.button != Some(event.button) {
            return vec![];
        }
        let state = std::mem::take(&mut self.state);
        let drag = std::mem::take(&mut self.drag);

        match state {
            InteractionState::Dragging => {
                let delta = event.position.subtract(&drag.start_mouse);
                let offset = drag.start_offset.subtract(&delta);
                log::debug!("drag committed, delta {:?}", delta);
                vec![Action::CommitDrag { offset }]
            }
            InteractionState::DraggingPoint => match drag.point_target {
                Some(image) => vec![Action::MovePoint {
                    image,
                    position: event.position,
                }],
                None => vec![],
            },
            // a press that never crossed the threshold is a click
            InteractionState::ButtonDown | InteractionState::Idle => vec![],
        }
    }

    /// Scroll zoom toward the pointer, one level per notch.
    pub fn scroll(
        &mut self,
        position: Point,
        direction: ScrollDirection,
        zoom: i32,
        min_zoom: i32,
        max_zoom: i32,
    ) -> Vec<Action> {
        if !self.enabled {
            return vec![];
        }
        match direction {
            ScrollDirection::Up if zoom < max_zoom => vec![Action::ZoomAt {
                anchor: position,
                zoom: zoom + 1,
            }],
            ScrollDirection::Down if zoom > min_zoom => vec![Action::ZoomAt {
                anchor: position,
                zoom: zoom - 1,
            }],
            _ => vec![],
        }
    }

    /// Maps a key press to an action when a binding matches.
    pub fn key_press(&mut self, keyval: u32, viewport_width: u32) -> Vec<Action> {
        if !self.enabled {
            return vec![];
        }
        let Some(key) = self.keys.lookup(keyval) else {
            return vec![];
        };

        let step = viewport_width as f64 / SCROLL_STEP_DIVISOR;
        let action = match key {
            MapKey::Fullscreen => Action::ToggleFullscreen,
            MapKey::ZoomIn => Action::ZoomIn,
            MapKey::ZoomOut => Action::ZoomOut,
            MapKey::Up => Action::Scroll { dx: 0.0, dy: -step },
            MapKey::Down => Action::Scroll { dx: 0.0, dy: step },
            MapKey::Left => Action::Scroll { dx: -step, dy: 0.0 },
            MapKey::Right => Action::Scroll { dx: step, dy: 0.0 },
        };
        vec![action]
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(crate::core::constants::DEFAULT_DRAG_LIMIT)
    }
}
