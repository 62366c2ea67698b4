use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Input events delivered by the host toolkit, reduced to their semantic payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    ButtonPress(ButtonEvent),
    ButtonRelease(ButtonEvent),
    Motion(MotionEvent),
    Scroll {
        position: Point,
        direction: ScrollDirection,
    },
    KeyPress(KeyEvent),
    /// Viewport/window resize
    Resize { width: u32, height: u32 },
}

impl InputEvent {
    /// Gets the primary position associated with this event, if any
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::ButtonPress(event) | InputEvent::ButtonRelease(event) => {
                Some(event.position)
            }
            InputEvent::Motion(event) => Some(event.position),
            InputEvent::Scroll { position, .. } => Some(*position),
            InputEvent::KeyPress(_) | InputEvent::Resize { .. } => None,
        }
    }

    /// Checks if this is a mouse/pointer event
    pub fn is_pointer_event(&self) -> bool {
        matches!(
            self,
            InputEvent::ButtonPress(_)
                | InputEvent::ButtonRelease(_)
                | InputEvent::Motion(_)
                | InputEvent::Scroll { .. }
        )
    }

    /// Checks if this is a keyboard event
    pub fn is_keyboard_event(&self) -> bool {
        matches!(self, InputEvent::KeyPress(_))
    }
}

/// Mouse button types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Keyboard modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyModifiers {
    pub fn is_empty(&self) -> bool {
        !(self.shift || self.ctrl || self.alt || self.meta)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ButtonEvent {
    pub position: Point,
    pub button: MouseButton,
    pub modifiers: KeyModifiers,
}

impl ButtonEvent {
    pub fn new(position: Point, button: MouseButton, modifiers: KeyModifiers) -> Self {
        Self {
            position,
            button,
            modifiers,
        }
    }

    /// Unmodified left button press, the only press that can start a pan.
    pub fn is_plain_primary(&self) -> bool {
        self.button == MouseButton::Left && self.modifiers.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionEvent {
    pub position: Point,
    /// Whether the left button is held during the motion
    pub primary_held: bool,
}

impl MotionEvent {
    pub fn new(position: Point, primary_held: bool) -> Self {
        Self {
            position,
            primary_held,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Key press carrying the host toolkit's key value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub keyval: u32,
}

/// Whether an event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

/// Observable map properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapProperty {
    Zoom,
    MapX,
    MapY,
    Latitude,
    Longitude,
    AutoCenter,
}

/// Notifications emitted by the map
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Zoom or center changed
    Changed,
    /// A single property changed
    Notify(MapProperty),
    /// Fullscreen was toggled through the keyboard shortcut
    FullscreenToggled { fullscreen: bool },
}

/// Key used to register listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapEventKind {
    Changed,
    Notify,
    FullscreenToggled,
}

impl MapEvent {
    pub fn kind(&self) -> MapEventKind {
        match self {
            MapEvent::Changed => MapEventKind::Changed,
            MapEvent::Notify(_) => MapEventKind::Notify,
            MapEvent::FullscreenToggled { .. } => MapEventKind::FullscreenToggled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_event_position() {
        let press = InputEvent::ButtonPress(ButtonEvent::new(
            Point::new(100.0, 200.0),
            MouseButton::Left,
            KeyModifiers::default(),
        ));
        assert_eq!(press.position(), Some(Point::new(100.0, 200.0)));
        assert_eq!(InputEvent::KeyPress(KeyEvent { keyval: 1 }).position(), None);
    }

    #[test]
    fn test_event_type_checks() {
        let scroll = InputEvent::Scroll {
            position: Point::new(0.0, 0.0),
            direction: ScrollDirection::Up,
        };
        assert!(scroll.is_pointer_event());
        assert!(!scroll.is_keyboard_event());

        let key = InputEvent::KeyPress(KeyEvent { keyval: 0xffc8 });
        assert!(!key.is_pointer_event());
        assert!(key.is_keyboard_event());
    }

    #[test]
    fn test_plain_primary() {
        let plain = ButtonEvent::new(Point::default(), MouseButton::Left, KeyModifiers::default());
        let shifted = ButtonEvent::new(
            Point::default(),
            MouseButton::Left,
            KeyModifiers {
                shift: true,
                ..KeyModifiers::default()
            },
        );
        let right = ButtonEvent::new(Point::default(), MouseButton::Right, KeyModifiers::default());
        assert!(plain.is_plain_primary());
        assert!(!shifted.is_plain_primary());
        assert!(!right.is_plain_primary());
    }

    #[test]
    fn test_event_kind() {
        assert_eq!(MapEvent::Notify(MapProperty::Zoom).kind(), MapEventKind::Notify);
        assert_eq!(MapEvent::Changed.kind(), MapEventKind::Changed);
    }
}
