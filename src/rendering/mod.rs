pub mod context;
pub mod pipeline;
pub mod scheduler;
pub mod surface;

// Re-export main types
pub use context::{Color, DrawCommand, RenderContext};
pub use pipeline::{FrameOutcome, RenderPipeline, Scene, SkipReason};
pub use scheduler::{RedrawScheduler, RedrawState};
pub use surface::BackingSurface;
