//! Composition - layering frame and sprite colors into an output buffer

mod context;
mod error;
mod remap;
mod render;

// Re-export public API
pub use error::RenderError;
pub use remap::{Remap, EXTRA_DOUBLING_HEIGHT};
pub use render::{render_frame, render_frame_with_rotation, RenderOptions};

/// Result type alias for composition operations.
pub type Result<T> = std::result::Result<T, RenderError>;
