//! Frame views: the captured source grid plus its colorization layers.

use serde::{Deserialize, Serialize};

use super::geometry::{BoundingBox, Resolution};
use super::sprite::SpriteId;
use super::{MAX_SPRITES_PER_FRAME, NO_BACKGROUND, TRANSPARENT};

/// Colorization layers of a frame at one resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameLayers<'a> {
    /// Precomputed static colors, one per output pixel
    pub colorized: Option<&'a [u16]>,
    /// Per-pixel dynamic set selector, `255` meaning "no dynamic set"
    pub dyna_mask: Option<&'a [u8]>,
    /// Dynamic color table: row = set id, column = source value
    pub dyna_colors: Option<&'a [u16]>,
}

/// Background layer at one resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackgroundLayer<'a> {
    /// Non-zero where the background may show through
    pub mask: Option<&'a [u8]>,
    /// Background colors, one per output pixel
    pub colors: Option<&'a [u16]>,
}

impl<'a> BackgroundLayer<'a> {
    /// Both halves of the layer, when present.
    pub fn parts(&self) -> Option<(&'a [u8], &'a [u16])> {
        Some((self.mask?, self.colors?))
    }
}

/// A background declared by a frame.
///
/// A frame without a background has no `BackgroundView`, or one whose id is
/// [`NO_BACKGROUND`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BackgroundView<'a> {
    /// Background identifier in the catalog
    pub id: u16,
    pub base: BackgroundLayer<'a>,
    pub extra: BackgroundLayer<'a>,
}

impl<'a> BackgroundView<'a> {
    /// Whether the id names a real background.
    pub fn is_shown(&self) -> bool {
        self.id != NO_BACKGROUND
    }

    /// The layer used at the given resolution.
    pub fn layer(&self, resolution: Resolution) -> BackgroundLayer<'a> {
        match resolution {
            Resolution::Base => self.base,
            Resolution::Extra => self.extra,
        }
    }
}

/// Per dynamic set shadow configuration.
///
/// `directions[set]` is a bitmask of the neighbours a dynamic pixel of that set
/// darkens (bit 0 = up-left, then clockwise up to bit 7 = left) and
/// `colors[set]` is the color painted there.
#[derive(Debug, Clone, Copy)]
pub struct DynaShadows<'a> {
    pub directions: &'a [u8],
    pub colors: &'a [u16],
}

impl<'a> DynaShadows<'a> {
    pub fn new(directions: &'a [u8], colors: &'a [u16]) -> Self {
        Self { directions, colors }
    }

    /// Direction mask and shadow color for a dynamic set, `None` if the set
    /// casts no shadow.
    pub fn for_set(&self, set: u8) -> Option<(u8, u16)> {
        let dirs = *self.directions.get(set as usize)?;
        if dirs == 0 {
            return None;
        }
        Some((dirs, *self.colors.get(set as usize)?))
    }
}

/// One sprite occurrence slot declared by a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteSlot {
    /// Sprite to search for, `None` for an unused slot
    pub sprite: Option<SpriteId>,
    /// Where in the frame the sprite may appear
    pub bbox: BoundingBox,
}

impl SpriteSlot {
    pub fn new(sprite: SpriteId, bbox: BoundingBox) -> Self {
        Self { sprite: Some(sprite), bbox }
    }

    /// Build from the catalog layout where sprite id `255` marks an empty slot.
    pub fn from_raw(sprite: u8, bbox: [u16; 4]) -> Self {
        let sprite = if sprite == TRANSPARENT { None } else { Some(sprite) };
        Self { sprite, bbox: BoundingBox::from_raw(bbox) }
    }
}

/// Read-only view of one captured frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameView<'a> {
    /// Source values at base resolution
    pub original: Option<&'a [u8]>,
    /// Layers at base resolution
    pub base: FrameLayers<'a>,
    /// Layers at extra resolution
    pub extra: FrameLayers<'a>,
    pub background: Option<BackgroundView<'a>>,
    pub shadows: Option<DynaShadows<'a>>,
    /// Sprite occurrence slots; only the first [`MAX_SPRITES_PER_FRAME`] are read
    pub sprite_slots: &'a [SpriteSlot],
}

impl<'a> FrameView<'a> {
    /// A frame with only its source grid.
    pub fn new(original: &'a [u8]) -> Self {
        Self { original: Some(original), ..Default::default() }
    }

    pub fn with_layers(mut self, resolution: Resolution, layers: FrameLayers<'a>) -> Self {
        match resolution {
            Resolution::Base => self.base = layers,
            Resolution::Extra => self.extra = layers,
        }
        self
    }

    pub fn with_background(mut self, background: BackgroundView<'a>) -> Self {
        self.background = Some(background);
        self
    }

    pub fn with_shadows(mut self, shadows: DynaShadows<'a>) -> Self {
        self.shadows = Some(shadows);
        self
    }

    pub fn with_sprite_slots(mut self, slots: &'a [SpriteSlot]) -> Self {
        self.sprite_slots = slots;
        self
    }

    /// Layers for the given resolution.
    pub fn layers(&self, resolution: Resolution) -> FrameLayers<'a> {
        match resolution {
            Resolution::Base => self.base,
            Resolution::Extra => self.extra,
        }
    }

    /// Declared slots in slot order, skipping unused ones.
    pub fn declared_slots(&self) -> impl Iterator<Item = (SpriteId, BoundingBox)> + 'a {
        self.sprite_slots
            .iter()
            .take(MAX_SPRITES_PER_FRAME)
            .filter_map(|slot| slot.sprite.map(|id| (id, slot.bbox)))
    }
}
