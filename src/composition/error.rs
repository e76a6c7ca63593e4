//! Error types for frame composition

use thiserror::Error;

use crate::models::Resolution;

/// Structural problem that prevents a frame from being composited.
///
/// Render functions validate everything up front and return one of these
/// before writing a single output pixel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The frame carries no base source grid
    #[error("frame has no source grid")]
    MissingSource,
    /// One of the involved resolutions has a zero dimension
    #[error("{resolution:?} resolution has a zero dimension")]
    EmptyResolution { resolution: Resolution },
    /// The source grid is smaller than the base resolution
    #[error("source grid has {actual} values, expected {expected}")]
    SourceTooSmall { expected: usize, actual: usize },
    /// The output buffer does not match the target resolution
    #[error("output buffer has {actual} pixels, expected {expected}")]
    OutputSize { expected: usize, actual: usize },
    /// The rotation cache does not match the output buffer
    #[error("rotation cache has {actual} entries, expected {expected}")]
    CacheSize { expected: usize, actual: usize },
    /// A present layer is shorter than the grid it covers
    #[error("layer '{layer}' has {actual} entries, expected at least {expected}")]
    LayerTooSmall { layer: &'static str, expected: usize, actual: usize },
}

impl RenderError {
    pub(crate) fn layer(layer: &'static str, expected: usize) -> impl FnOnce(usize) -> Self {
        move |actual| RenderError::LayerTooSmall { layer, expected, actual }
    }
}
