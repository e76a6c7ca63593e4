//! Coordinate mapping between the base grid and the extra resolution.

/// Extra height that selects doubling; any other extra size halves.
pub const EXTRA_DOUBLING_HEIGHT: u32 = 64;

/// How output coordinates relate to base-grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remap {
    /// Output and base grid share dimensions
    Identity,
    /// Output is twice the base grid (nearest-neighbor upsample)
    Double,
    /// Output is half the base grid (sample every other base pixel)
    Halve,
}

impl Remap {
    /// Pick the mapping from the base dimensions to the output dimensions.
    pub fn between(base: (u32, u32), output: (u32, u32)) -> Self {
        if base == output {
            Remap::Identity
        } else if output.1 == EXTRA_DOUBLING_HEIGHT {
            Remap::Double
        } else {
            Remap::Halve
        }
    }

    /// Base coordinate sampled for an output coordinate.
    pub fn to_base(self, v: u32) -> u32 {
        match self {
            Remap::Identity => v,
            Remap::Double => v / 2,
            Remap::Halve => v * 2,
        }
    }

    /// Output coordinate (or extent) of a base coordinate (or extent).
    pub fn scale(self, v: u32) -> u32 {
        match self {
            Remap::Identity => v,
            Remap::Double => v * 2,
            Remap::Halve => v / 2,
        }
    }

    /// Linear index into the base grid for output pixel `(x, y)`.
    pub fn base_index(self, x: u32, y: u32, base_width: u32) -> usize {
        self.to_base(y) as usize * base_width as usize + self.to_base(x) as usize
    }
}
