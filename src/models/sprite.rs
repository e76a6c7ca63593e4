//! Sprite views and their signature index.

use serde::{Deserialize, Serialize};

use super::geometry::{Geometry, Resolution};
use super::{MAX_SPRITE_DETECT_AREAS, MAX_SPRITE_HEIGHT, MAX_SPRITE_WIDTH, TRANSPARENT};

/// Index of a sprite in the catalog.
pub type SpriteId = u8;

/// Rectangle of the sprite canvas that a detection area verifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DetectionRect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl DetectionRect {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }
}

/// One entry of a sprite's signature index.
///
/// The fingerprint packs four consecutive (normalized) pixels little-endian,
/// sampled at `origin` inside the sprite canvas. A candidate found through the
/// fingerprint is confirmed by comparing the whole `rect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionArea {
    /// Verified rectangle, `None` for an unused area
    pub rect: Option<DetectionRect>,
    pub fingerprint: u32,
    /// Canvas column the fingerprint was sampled from
    pub origin_x: u16,
    /// Canvas row the fingerprint was sampled from
    pub origin_y: u16,
}

impl DetectionArea {
    pub fn new(rect: DetectionRect, fingerprint: u32, origin_x: u16, origin_y: u16) -> Self {
        Self { rect: Some(rect), fingerprint, origin_x, origin_y }
    }

    /// An unused area.
    pub fn unused() -> Self {
        Self { rect: None, fingerprint: 0, origin_x: 0, origin_y: 0 }
    }

    /// Build from the catalog layout: `[x, y, w, h]` with `x == 0xFFFF` for an
    /// unused area, the packed fingerprint, and its linear canvas position.
    pub fn from_raw(area: [u16; 4], fingerprint: u32, position: u16) -> Self {
        let rect = if area[0] == 0xffff {
            None
        } else {
            Some(DetectionRect::new(area[0], area[1], area[2], area[3]))
        };
        let origin_x = (position as usize % MAX_SPRITE_WIDTH) as u16;
        let origin_y = (position as usize / MAX_SPRITE_WIDTH) as u16;
        Self { rect, fingerprint, origin_x, origin_y }
    }

    pub fn is_enabled(&self) -> bool {
        self.rect.is_some()
    }
}

/// Colorization layers of a sprite at one resolution, laid out with the
/// fixed canvas stride.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpriteLayers<'a> {
    pub colored: Option<&'a [u16]>,
    pub dyna_mask: Option<&'a [u8]>,
    pub dyna_colors: Option<&'a [u16]>,
}

/// Read-only view of one catalog sprite.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpriteView<'a> {
    /// Source values of the canvas, `255` meaning "transparent / don't care"
    pub original: Option<&'a [u8]>,
    /// Opacity mask at extra resolution, `255` meaning transparent
    pub mask_extra: Option<&'a [u8]>,
    pub base: SpriteLayers<'a>,
    pub extra: SpriteLayers<'a>,
    /// Signature index; at most [`MAX_SPRITE_DETECT_AREAS`] entries are read
    pub detection: Option<&'a [DetectionArea]>,
    /// Match on the on/off silhouette instead of the exact values
    pub shape_mode: bool,
}

impl<'a> SpriteView<'a> {
    pub fn new(original: &'a [u8]) -> Self {
        Self { original: Some(original), ..Default::default() }
    }

    pub fn with_detection(mut self, areas: &'a [DetectionArea]) -> Self {
        self.detection = Some(areas);
        self
    }

    pub fn with_shape_mode(mut self, shape_mode: bool) -> Self {
        self.shape_mode = shape_mode;
        self
    }

    pub fn with_layers(mut self, resolution: Resolution, layers: SpriteLayers<'a>) -> Self {
        match resolution {
            Resolution::Base => self.base = layers,
            Resolution::Extra => self.extra = layers,
        }
        self
    }

    pub fn layers(&self, resolution: Resolution) -> SpriteLayers<'a> {
        match resolution {
            Resolution::Base => self.base,
            Resolution::Extra => self.extra,
        }
    }

    /// Enabled detection areas, in index order.
    pub fn detection_areas(&self) -> impl Iterator<Item = &'a DetectionArea> + 'a {
        self.detection
            .unwrap_or(&[])
            .iter()
            .take(MAX_SPRITE_DETECT_AREAS)
            .filter(|area| area.is_enabled())
    }

    /// Smallest width and height enclosing every non-transparent pixel,
    /// measured from the canvas origin.
    ///
    /// Returns `None` when the sprite has no source grid or is fully transparent.
    pub fn tight_size(&self) -> Option<(u16, u16)> {
        let original = self.original?;
        let mut size: Option<(usize, usize)> = None;
        for (y, row) in original.chunks(MAX_SPRITE_WIDTH).take(MAX_SPRITE_HEIGHT).enumerate() {
            for (x, &value) in row.iter().enumerate() {
                if value < TRANSPARENT {
                    let (w, h) = size.unwrap_or((0, 0));
                    size = Some((w.max(x + 1), h.max(y + 1)));
                }
            }
        }
        size.map(|(w, h)| (w as u16, h as u16))
    }
}

/// The sprite catalog as seen by one locate or render call.
#[derive(Debug, Clone, Copy)]
pub struct CatalogView<'a> {
    pub geometry: Geometry,
    pub sprites: &'a [SpriteView<'a>],
}

impl<'a> CatalogView<'a> {
    pub fn new(geometry: Geometry, sprites: &'a [SpriteView<'a>]) -> Self {
        Self { geometry, sprites }
    }

    /// Look up a sprite; id `255` never resolves.
    pub fn sprite(&self, id: SpriteId) -> Option<&'a SpriteView<'a>> {
        if id == TRANSPARENT {
            return None;
        }
        self.sprites.get(id as usize)
    }
}
