//! Frame dimensions, resolutions and bounding boxes.

use serde::{Deserialize, Serialize};

/// Which of the two output resolutions a render call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Native resolution of the captured frame
    #[default]
    Base,
    /// Magnified or minified resolution derived from the base one
    Extra,
}

impl Resolution {
    /// Pick the resolution from a `use_extra` flag.
    pub fn from_extra(use_extra: bool) -> Self {
        if use_extra {
            Resolution::Extra
        } else {
            Resolution::Base
        }
    }
}

/// Dimensions shared by every frame of a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Geometry {
    /// Base width in pixels
    pub width: u32,
    /// Base height in pixels
    pub height: u32,
    /// Extra-resolution width (0 when the catalog has no extra resolution)
    #[serde(default)]
    pub width_extra: u32,
    /// Extra-resolution height
    #[serde(default)]
    pub height_extra: u32,
    /// Number of source values per dynamic set, i.e. the row stride of a
    /// dynamic color table
    pub colors_per_set: u32,
}

impl Geometry {
    /// Create a geometry without an extra resolution.
    pub fn new(width: u32, height: u32, colors_per_set: u32) -> Self {
        Self { width, height, width_extra: 0, height_extra: 0, colors_per_set }
    }

    /// Set the extra resolution.
    pub fn with_extra(mut self, width_extra: u32, height_extra: u32) -> Self {
        self.width_extra = width_extra;
        self.height_extra = height_extra;
        self
    }

    /// Width and height of the given resolution.
    pub fn dimensions(&self, resolution: Resolution) -> (u32, u32) {
        match resolution {
            Resolution::Base => (self.width, self.height),
            Resolution::Extra => (self.width_extra, self.height_extra),
        }
    }

    /// Number of pixels of the given resolution.
    pub fn pixel_count(&self, resolution: Resolution) -> usize {
        let (w, h) = self.dimensions(resolution);
        w as usize * h as usize
    }

    /// Number of pixels of the base source grid.
    pub fn base_pixel_count(&self) -> usize {
        self.pixel_count(Resolution::Base)
    }
}

/// Inclusive rectangle restricting where a sprite may be searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: u16,
    pub min_y: u16,
    pub max_x: u16,
    pub max_y: u16,
}

impl BoundingBox {
    pub fn new(min_x: u16, min_y: u16, max_x: u16, max_y: u16) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Build from the catalog's `[minX, minY, maxX, maxY]` layout.
    pub fn from_raw(raw: [u16; 4]) -> Self {
        Self::new(raw[0], raw[1], raw[2], raw[3])
    }

    /// Bounding box covering a whole frame.
    pub fn full(width: u32, height: u32) -> Self {
        let max_x = width.saturating_sub(1).min(u16::MAX as u32) as u16;
        let max_y = height.saturating_sub(1).min(u16::MAX as u32) as u16;
        Self::new(0, 0, max_x, max_y)
    }

    /// Restrict the box to a frame of the given size.
    ///
    /// Returns `None` when nothing of the box lies inside the frame or the box
    /// is inverted.
    pub fn clamped_to(&self, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let max_x = (self.max_x as u32).min(width - 1) as u16;
        let max_y = (self.max_y as u32).min(height - 1) as u16;
        if self.min_x > max_x || self.min_y > max_y {
            return None;
        }
        Some(Self::new(self.min_x, self.min_y, max_x, max_y))
    }

    /// Number of columns covered.
    pub fn width(&self) -> u32 {
        (self.max_x as u32 + 1).saturating_sub(self.min_x as u32)
    }

    /// Number of rows covered.
    pub fn height(&self) -> u32 {
        (self.max_y as u32 + 1).saturating_sub(self.min_y as u32)
    }

    /// Whether the rectangle at `(x, y)` of size `w` x `h` lies entirely inside.
    pub fn contains_rect(&self, x: u32, y: u32, w: u32, h: u32) -> bool {
        x >= self.min_x as u32
            && y >= self.min_y as u32
            && x + w <= self.max_x as u32 + 1
            && y + h <= self.max_y as u32 + 1
    }
}
