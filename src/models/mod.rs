//! Data models for the frames, sprites and layers the colorizer consumes.
//!
//! Everything in here is a borrowed view over buffers owned by the catalog.
//! The core never copies or frees pixel data; a view only lives for the
//! duration of one locate or render call.

mod frame;
mod geometry;
mod sprite;

pub use frame::{BackgroundLayer, BackgroundView, DynaShadows, FrameLayers, FrameView, SpriteSlot};
pub use geometry::{BoundingBox, Geometry, Resolution};
pub use sprite::{CatalogView, DetectionArea, DetectionRect, SpriteId, SpriteLayers, SpriteView};

/// Width of the fixed sprite canvas. Sprite grids are always laid out with this stride.
pub const MAX_SPRITE_WIDTH: usize = 256;

/// Height of the fixed sprite canvas.
pub const MAX_SPRITE_HEIGHT: usize = 64;

/// Number of sprite occurrence slots a frame may declare.
pub const MAX_SPRITES_PER_FRAME: usize = 32;

/// Number of detection areas in a sprite's signature index.
pub const MAX_SPRITE_DETECT_AREAS: usize = 4;

/// 8-bit sentinel meaning "transparent", "no dynamic set" or "no override".
pub const TRANSPARENT: u8 = 255;

/// Background identifier meaning "this frame shows no background".
pub const NO_BACKGROUND: u16 = 0xffff;

/// Pixel count of a full sprite canvas.
pub const SPRITE_CANVAS_LEN: usize = MAX_SPRITE_WIDTH * MAX_SPRITE_HEIGHT;

/// Borrow a layer slice only when it covers at least `len` entries.
///
/// Returns `Err(actual_len)` when the slice is present but too short so that
/// callers can report the structural problem.
pub(crate) fn layer<T>(slice: Option<&[T]>, len: usize) -> Result<Option<&[T]>, usize> {
    match slice {
        None => Ok(None),
        Some(s) if s.len() >= len => Ok(Some(&s[..len])),
        Some(s) => Err(s.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_absent() {
        let absent: Option<&[u8]> = None;
        assert_eq!(layer(absent, 4), Ok(None));
    }

    #[test]
    fn test_layer_truncates_to_len() {
        let data = [1u8, 2, 3, 4, 5];
        assert_eq!(layer(Some(&data[..]), 3), Ok(Some(&data[..3])));
    }

    #[test]
    fn test_layer_too_short() {
        let data = [1u16, 2];
        assert_eq!(layer(Some(&data[..]), 3), Err(2));
    }

    #[test]
    fn test_canvas_len() {
        assert_eq!(SPRITE_CANVAS_LEN, 16384);
    }
}
