//! Sprite locator: finds where catalog sprites appear in a captured frame.
//!
//! For every declared sprite slot the frame rows inside the slot's bounding
//! box are scanned with a rolling fingerprint. A fingerprint hit is turned
//! into a placement, the whole detection rectangle is verified, and the
//! surviving placement is clipped against the sprite's tight size and the
//! bounding box.

mod signature;

pub use signature::{
    fingerprint_at, frame_fingerprint, normalize_frame, normalize_sprite, pack, RollingFingerprint,
};

use serde::{Deserialize, Serialize};

use crate::models::{
    BoundingBox, CatalogView, DetectionRect, FrameView, Geometry, SpriteId, SpriteView,
    MAX_SPRITE_WIDTH, TRANSPARENT,
};

/// Default cap on the number of matches collected for one frame.
pub const DEFAULT_MAX_MATCHES: usize = 32;

/// A sprite found in a frame.
///
/// `(frx, fry)` is the destination in the frame, `(spx, spy)` the matching
/// top-left inside the sprite canvas and `width` x `height` the area copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteMatch {
    pub sprite: SpriteId,
    pub frx: u16,
    pub fry: u16,
    pub spx: u16,
    pub spy: u16,
    pub width: u16,
    pub height: u16,
}

impl SpriteMatch {
    /// Whether both matches place the same sprite on the same destination rect.
    pub fn same_placement(&self, other: &SpriteMatch) -> bool {
        self.sprite == other.sprite
            && self.frx == other.frx
            && self.fry == other.fry
            && self.width == other.width
            && self.height == other.height
    }
}

/// Locate every declared sprite of a frame.
///
/// Slots are visited in order; the scan stops as soon as `max_matches`
/// matches have been collected. Missing grids or signatures make the affected
/// sprite contribute nothing.
pub fn locate_sprites(
    frame: &FrameView<'_>,
    catalog: &CatalogView<'_>,
    max_matches: usize,
) -> Vec<SpriteMatch> {
    let mut matches = Vec::new();
    if max_matches == 0 || frame.original.is_none() {
        return matches;
    }

    for (sprite_id, bbox) in frame.declared_slots() {
        let Some(sprite) = catalog.sprite(sprite_id) else {
            tracing::debug!(sprite = sprite_id, "slot references a sprite outside the catalog");
            continue;
        };
        if match_sprite(&catalog.geometry, frame, sprite, sprite_id, bbox, &mut matches, max_matches) {
            tracing::debug!(max_matches, "match capacity reached, stopping scan");
            break;
        }
    }

    matches
}

/// Search one sprite inside one bounding box, appending new matches.
///
/// Returns `true` once `matches` holds `max_matches` entries.
pub fn match_sprite(
    geometry: &Geometry,
    frame: &FrameView<'_>,
    sprite: &SpriteView<'_>,
    sprite_id: SpriteId,
    bbox: BoundingBox,
    matches: &mut Vec<SpriteMatch>,
    max_matches: usize,
) -> bool {
    if matches.len() >= max_matches {
        return true;
    }
    let (Some(original), Some(canvas), Some(_)) = (frame.original, sprite.original, sprite.detection)
    else {
        tracing::trace!(sprite = sprite_id, "sprite or frame grids missing, nothing to match");
        return false;
    };
    let width = geometry.width as usize;
    if original.len() < geometry.base_pixel_count() {
        tracing::warn!(
            expected = geometry.base_pixel_count(),
            actual = original.len(),
            "frame source grid is shorter than the geometry"
        );
        return false;
    }
    let Some((sprite_w, sprite_h)) = sprite.tight_size() else {
        return false;
    };
    let Some(bbox) = bbox.clamped_to(geometry.width, geometry.height) else {
        return false;
    };
    if bbox.width() < 4 {
        return false;
    }

    let shape_mode = sprite.shape_mode;
    let frame_at = |x: i32, y: i32| normalize_frame(original[y as usize * width + x as usize], shape_mode);
    let sprite_at = |x: i32, y: i32| {
        if x as usize >= MAX_SPRITE_WIDTH {
            return TRANSPARENT;
        }
        canvas
            .get(y as usize * MAX_SPRITE_WIDTH + x as usize)
            .map_or(TRANSPARENT, |&v| normalize_sprite(v, shape_mode))
    };

    let (min_x, min_y) = (bbox.min_x as i32, bbox.min_y as i32);
    let (max_x, max_y) = (bbox.max_x as i32, bbox.max_y as i32);

    for area in sprite.detection_areas() {
        let Some(rect) = area.rect else { continue };
        let origin = (area.origin_x as i32, area.origin_y as i32);

        for ty in min_y..=max_y {
            let mut rolling =
                RollingFingerprint::seed([frame_at(min_x, ty), frame_at(min_x + 1, ty), frame_at(min_x + 2, ty)]);
            for tx in min_x..=max_x - 3 {
                if rolling.push(frame_at(tx + 3, ty)) != area.fingerprint {
                    continue;
                }
                let Some((offs_x, offs_y)) = area_position(&bbox, rect, origin, (tx, ty)) else {
                    continue;
                };
                let confirmed = (0..rect.height as i32).all(|y| {
                    (0..rect.width as i32).all(|x| {
                        let expected = sprite_at(rect.x as i32 + x, rect.y as i32 + y);
                        expected == TRANSPARENT || expected == frame_at(offs_x + x, offs_y + y)
                    })
                });
                if !confirmed {
                    continue;
                }
                let Some(found) = placement(sprite_id, &bbox, origin, (tx, ty), (sprite_w, sprite_h)) else {
                    continue;
                };
                if matches.iter().any(|m| m.same_placement(&found)) {
                    continue;
                }
                tracing::debug!(
                    sprite = sprite_id,
                    x = found.frx,
                    y = found.fry,
                    w = found.width,
                    h = found.height,
                    "sprite matched"
                );
                matches.push(found);
                if matches.len() >= max_matches {
                    return true;
                }
            }
        }
    }
    false
}

/// Frame position of the detection rectangle for a fingerprint hit at `hit`,
/// or `None` when the rectangle would leave the bounding box.
fn area_position(
    bbox: &BoundingBox,
    rect: DetectionRect,
    origin: (i32, i32),
    hit: (i32, i32),
) -> Option<(i32, i32)> {
    let (min_x, min_y) = (bbox.min_x as i32, bbox.min_y as i32);
    let (det_x, det_y) = (rect.x as i32, rect.y as i32);
    if hit.0 - min_x < origin.0 - det_x || hit.1 - min_y < origin.1 - det_y {
        return None;
    }
    let offs_x = hit.0 - origin.0 + det_x;
    let offs_y = hit.1 - origin.1 + det_y;
    if offs_x + rect.width as i32 > bbox.max_x as i32 + 1 || offs_y + rect.height as i32 > bbox.max_y as i32 + 1 {
        return None;
    }
    Some((offs_x, offs_y))
}

/// Final placement of a confirmed hit, clipped on the left/top by the
/// bounding box and on the right/bottom by both the sprite and the box.
fn placement(
    sprite: SpriteId,
    bbox: &BoundingBox,
    origin: (i32, i32),
    hit: (i32, i32),
    sprite_size: (u16, u16),
) -> Option<SpriteMatch> {
    let (frx, spx, width) = clip_axis(hit.0, origin.0, bbox.min_x as i32, bbox.max_x as i32, sprite_size.0 as i32);
    let (fry, spy, height) = clip_axis(hit.1, origin.1, bbox.min_y as i32, bbox.max_y as i32, sprite_size.1 as i32);
    if width <= 0 || height <= 0 {
        return None;
    }
    Some(SpriteMatch {
        sprite,
        frx: frx as u16,
        fry: fry as u16,
        spx: spx as u16,
        spy: spy as u16,
        width: width as u16,
        height: height as u16,
    })
}

/// `(destination, sprite offset, extent)` along one axis.
fn clip_axis(hit: i32, origin: i32, min: i32, max: i32, sprite_len: i32) -> (i32, i32, i32) {
    if hit - min < origin {
        let offset = origin - (hit - min);
        (min, offset, (sprite_len - offset).min(max - min + 1))
    } else {
        let dest = hit - origin;
        (dest, 0, sprite_len.min(max - dest + 1))
    }
}
