pub mod events;
pub mod handler;

// Re-export the essential types
pub use events::{
    ButtonEvent, EventHandled, InputEvent, KeyEvent, KeyModifiers, MapEvent, MapEventKind,
    MapProperty, MotionEvent, MouseButton, ScrollDirection,
};
pub use handler::{
    Action, DragState, EventManager, InputHandler, InteractionState, KeyBindings, MapKey,
};
