//! Output canvas shared by the frame pass and sprite stamping.

use crate::rotation::{RotationRef, RotationTable, MAX_COLOR_ROTATIONS};

/// Neighbour offsets in direction-bit order: bit 0 is up-left, then
/// clockwise up to bit 7 for left.
const SHADOW_NEIGHBOURS: [(i32, i32); 8] = [(-1, -1), (0, -1), (1, -1), (1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0)];

/// Rotation lookup applied to every painted pixel.
pub(crate) struct RotationPass<'a> {
    pub table: RotationTable<'a>,
    pub shifts: [u16; MAX_COLOR_ROTATIONS],
    pub cache: &'a mut [Option<RotationRef>],
}

/// A caller-owned output buffer plus the scratch state of one render call.
pub(crate) struct Canvas<'a> {
    pixels: &'a mut [u16],
    width: u32,
    height: u32,
    /// Pixels owned by a dynamic pixel or its shadow, tracked only when
    /// shadow casting is enabled
    claimed: Option<Vec<bool>>,
    rotation: Option<RotationPass<'a>>,
}

impl<'a> Canvas<'a> {
    pub fn new(pixels: &'a mut [u16], width: u32, height: u32) -> Self {
        Self { pixels, width, height, claimed: None, rotation: None }
    }

    pub fn with_shadow_tracking(mut self) -> Self {
        self.claimed = Some(vec![false; self.pixels.len()]);
        self
    }

    pub fn with_rotation(mut self, rotation: RotationPass<'a>) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tracks_shadows(&self) -> bool {
        self.claimed.is_some()
    }

    pub fn is_claimed(&self, index: usize) -> bool {
        self.claimed.as_ref().is_some_and(|c| c[index])
    }

    pub fn claim(&mut self, index: usize) {
        if let Some(claimed) = self.claimed.as_mut() {
            claimed[index] = true;
        }
    }

    /// Write `color`, substituting its phase-shifted rotation color and
    /// recording the rotation identity when a rotation pass is wired in.
    pub fn paint(&mut self, index: usize, color: u16) {
        let Some(rotation) = self.rotation.as_mut() else {
            self.pixels[index] = color;
            return;
        };
        let identity = rotation.table.find(color);
        self.pixels[index] = identity
            .and_then(|r| rotation.table.shifted(r, rotation.shifts[r.slot as usize]))
            .unwrap_or(color);
        rotation.cache[index] = identity;
    }

    /// Paint `color` on every unclaimed neighbour of `(x, y)` selected by the
    /// `directions` bitmask and claim it.
    pub fn cast_shadow(&mut self, x: u32, y: u32, directions: u8, color: u16) {
        for (bit, (dx, dy)) in SHADOW_NEIGHBOURS.iter().enumerate() {
            if directions & (1 << bit) == 0 {
                continue;
            }
            let nx = x as i64 + *dx as i64;
            let ny = y as i64 + *dy as i64;
            if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
                continue;
            }
            let index = ny as usize * self.width as usize + nx as usize;
            if !self.is_claimed(index) {
                self.claim(index);
                self.paint(index, color);
            }
        }
    }
}
