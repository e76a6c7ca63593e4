//! Fingerprints: four normalized pixels packed into a `u32`.
//!
//! The packing is little-endian: the leftmost pixel lands in the low byte.
//! Frames and sprites normalize differently in shape mode, since a sprite
//! keeps its wildcard value while a frame has none.

use crate::models::{MAX_SPRITE_WIDTH, TRANSPARENT};

/// Normalize a frame source value.
///
/// In shape mode every non-zero value collapses to 1.
#[inline]
pub fn normalize_frame(value: u8, shape_mode: bool) -> u8 {
    if shape_mode {
        (value > 0) as u8
    } else {
        value
    }
}

/// Normalize a sprite source value.
///
/// In shape mode the wildcard stays 255 and every other non-zero value
/// collapses to 1.
#[inline]
pub fn normalize_sprite(value: u8, shape_mode: bool) -> u8 {
    if !shape_mode || value == TRANSPARENT {
        value
    } else {
        (value > 0) as u8
    }
}

/// Pack four values, leftmost first, into a fingerprint.
#[inline]
pub fn pack(values: [u8; 4]) -> u32 {
    u32::from_le_bytes(values)
}

/// Fingerprint register sliding one column to the right at a time.
#[derive(Debug, Clone, Copy)]
pub struct RollingFingerprint {
    value: u32,
}

impl RollingFingerprint {
    /// Preload the first three columns of a row into the upper three bytes.
    pub fn seed(first: [u8; 3]) -> Self {
        Self { value: pack([0, first[0], first[1], first[2]]) }
    }

    /// Shift in the next column and return the fingerprint of the window that
    /// now starts three columns to its left.
    #[inline]
    pub fn push(&mut self, next: u8) -> u32 {
        self.value = (self.value >> 8) | ((next as u32) << 24);
        self.value
    }
}

/// Fingerprint of the four sprite canvas pixels starting at `(x, y)`.
///
/// Returns `None` if the window does not fit inside the canvas row or the
/// canvas slice is too short.
pub fn fingerprint_at(canvas: &[u8], x: u16, y: u16, shape_mode: bool) -> Option<u32> {
    let (x, y) = (x as usize, y as usize);
    if x + 4 > MAX_SPRITE_WIDTH {
        return None;
    }
    let start = y * MAX_SPRITE_WIDTH + x;
    let window = canvas.get(start..start + 4)?;
    let mut values = [0u8; 4];
    for (slot, &value) in values.iter_mut().zip(window) {
        *slot = normalize_sprite(value, shape_mode);
    }
    Some(pack(values))
}

/// Fingerprint of the four frame pixels starting at `(x, y)` in a frame of
/// the given width.
pub fn frame_fingerprint(original: &[u8], width: u32, x: u32, y: u32, shape_mode: bool) -> Option<u32> {
    if x + 4 > width {
        return None;
    }
    let start = (y * width + x) as usize;
    let window = original.get(start..start + 4)?;
    let mut values = [0u8; 4];
    for (slot, &value) in values.iter_mut().zip(window) {
        *slot = normalize_frame(value, shape_mode);
    }
    Some(pack(values))
}
