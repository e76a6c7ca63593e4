//! Frame compositing: background, dynamic and static layers, then sprites.

use serde::{Deserialize, Serialize};

use super::context::{Canvas, RotationPass};
use super::error::RenderError;
use super::remap::Remap;
use crate::locate::SpriteMatch;
use crate::models::{
    layer, BackgroundView, CatalogView, DynaShadows, FrameView, Geometry, Resolution, SpriteView, MAX_SPRITE_HEIGHT,
    MAX_SPRITE_WIDTH, SPRITE_CANVAS_LEN, TRANSPARENT,
};
use crate::rotation::{RotationCache, RotationTable, MAX_COLOR_ROTATIONS};

/// Switches that alter how layers combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Paint the background wherever its mask is set, even over lit source pixels
    pub force_background: bool,
    /// Cast dynamic shadows when the frame declares them
    pub dyna_shadows: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { force_background: false, dyna_shadows: true }
    }
}

/// Composite a frame and stamp its matched sprites into `out`.
///
/// `out` must hold exactly the pixel count of `resolution`. Every layer is
/// validated before the first pixel is written, so on error `out` is left
/// untouched.
pub fn render_frame(
    frame: &FrameView<'_>,
    catalog: &CatalogView<'_>,
    matches: &[SpriteMatch],
    resolution: Resolution,
    options: &RenderOptions,
    out: &mut [u16],
) -> Result<(), RenderError> {
    render(frame, catalog, matches, resolution, options, out, None)
}

/// Like [`render_frame`], but every painted color that belongs to a rotation
/// is replaced by its color at the slot's current shift, and its rotation
/// identity is recorded in `cache` for later scheduler ticks.
pub fn render_frame_with_rotation(
    frame: &FrameView<'_>,
    catalog: &CatalogView<'_>,
    matches: &[SpriteMatch],
    resolution: Resolution,
    options: &RenderOptions,
    table: &RotationTable<'_>,
    shifts: &[u16; MAX_COLOR_ROTATIONS],
    out: &mut [u16],
    cache: &mut RotationCache,
) -> Result<(), RenderError> {
    let pass = RotationPass { table: *table, shifts: *shifts, cache: cache.as_mut_slice() };
    render(frame, catalog, matches, resolution, options, out, Some(pass))
}

fn render<'a>(
    frame: &FrameView<'_>,
    catalog: &CatalogView<'_>,
    matches: &[SpriteMatch],
    resolution: Resolution,
    options: &RenderOptions,
    out: &'a mut [u16],
    rotation: Option<RotationPass<'a>>,
) -> Result<(), RenderError> {
    let result = compose(frame, catalog, matches, resolution, options, out, rotation);
    if let Err(err) = &result {
        tracing::warn!(%err, ?resolution, "frame rejected");
    }
    result
}

fn compose<'a>(
    frame: &FrameView<'_>,
    catalog: &CatalogView<'_>,
    matches: &[SpriteMatch],
    resolution: Resolution,
    options: &RenderOptions,
    out: &'a mut [u16],
    rotation: Option<RotationPass<'a>>,
) -> Result<(), RenderError> {
    let geometry = &catalog.geometry;
    let source = FrameSource::prepare(frame, geometry, resolution, options)?;

    let (width, height) = geometry.dimensions(resolution);
    let expected = geometry.pixel_count(resolution);
    if out.len() != expected {
        return Err(RenderError::OutputSize { expected, actual: out.len() });
    }
    if let Some(pass) = &rotation {
        if pass.cache.len() != expected {
            return Err(RenderError::CacheSize { expected, actual: pass.cache.len() });
        }
    }

    let mut stamps = Vec::with_capacity(matches.len());
    for placement in matches {
        let Some(sprite) = catalog.sprite(placement.sprite) else {
            tracing::trace!(sprite = placement.sprite, "match references a sprite outside the catalog");
            continue;
        };
        if let Some(sprite) = SpriteSource::prepare(sprite, resolution)? {
            stamps.push((placement, sprite));
        }
    }

    let mut canvas = Canvas::new(out, width, height);
    if source.shadows.is_some() {
        canvas = canvas.with_shadow_tracking();
    }
    if let Some(pass) = rotation {
        canvas = canvas.with_rotation(pass);
    }

    composite_frame(&source, &mut canvas, options.force_background);
    for (placement, sprite) in &stamps {
        stamp_sprite(&source, sprite, placement, &mut canvas);
    }

    tracing::debug!(width, height, sprites = stamps.len(), ?resolution, "frame composited");
    Ok(())
}

/// Frame layers validated against the target resolution.
struct FrameSource<'a> {
    original: &'a [u8],
    base_width: u32,
    remap: Remap,
    colors_per_set: usize,
    colorized: Option<&'a [u16]>,
    /// Selector mask and color table
    dynamic: Option<(&'a [u8], &'a [u16])>,
    /// Mask and colors
    background: Option<(&'a [u8], &'a [u16])>,
    shadows: Option<DynaShadows<'a>>,
}

impl<'a> FrameSource<'a> {
    fn prepare(
        frame: &FrameView<'a>,
        geometry: &Geometry,
        resolution: Resolution,
        options: &RenderOptions,
    ) -> Result<Self, RenderError> {
        let original = frame.original.ok_or(RenderError::MissingSource)?;
        let base = geometry.dimensions(Resolution::Base);
        if base.0 == 0 || base.1 == 0 {
            return Err(RenderError::EmptyResolution { resolution: Resolution::Base });
        }
        let target = geometry.dimensions(resolution);
        if target.0 == 0 || target.1 == 0 {
            return Err(RenderError::EmptyResolution { resolution });
        }
        let base_len = geometry.base_pixel_count();
        if original.len() < base_len {
            return Err(RenderError::SourceTooSmall { expected: base_len, actual: original.len() });
        }

        let n = geometry.pixel_count(resolution);
        let layers = frame.layers(resolution);
        let colorized = layer(layers.colorized, n).map_err(RenderError::layer("colorized", n))?;
        let dyna_mask = layer(layers.dyna_mask, n).map_err(RenderError::layer("dynamic mask", n))?;
        let dynamic = dyna_mask.zip(layers.dyna_colors);

        let background = match frame.background.filter(BackgroundView::is_shown) {
            Some(bg) => match bg.layer(resolution).parts() {
                Some((mask, colors)) => {
                    let mask = layer(Some(mask), n).map_err(RenderError::layer("background mask", n))?;
                    let colors = layer(Some(colors), n).map_err(RenderError::layer("background colors", n))?;
                    mask.zip(colors)
                }
                None => None,
            },
            None => None,
        };

        Ok(Self {
            original: &original[..base_len],
            base_width: base.0,
            remap: Remap::between(base, target),
            colors_per_set: geometry.colors_per_set as usize,
            colorized,
            dynamic,
            background,
            shadows: frame.shadows.filter(|_| options.dyna_shadows),
        })
    }

    /// Base source value, 0 outside the grid.
    fn value_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.base_width {
            return 0;
        }
        self.original.get(y as usize * self.base_width as usize + x as usize).copied().unwrap_or(0)
    }
}

fn dynamic_color(colors: &[u16], colors_per_set: usize, set: u8, value: u8) -> u16 {
    colors.get(set as usize * colors_per_set + value as usize).copied().unwrap_or(0)
}

/// Sprite layers validated for one resolution.
struct SpriteSource<'a> {
    resolution: Resolution,
    original: Option<&'a [u8]>,
    mask_extra: Option<&'a [u8]>,
    colored: Option<&'a [u16]>,
    dyna_mask: Option<&'a [u8]>,
    dyna_colors: Option<&'a [u16]>,
}

impl<'a> SpriteSource<'a> {
    /// `Ok(None)` when the sprite has nothing to stamp at this resolution.
    fn prepare(sprite: &SpriteView<'a>, resolution: Resolution) -> Result<Option<Self>, RenderError> {
        const N: usize = SPRITE_CANVAS_LEN;
        if resolution == Resolution::Base && sprite.original.is_none() {
            return Ok(None);
        }
        let layers = sprite.layers(resolution);
        let original = layer(sprite.original, N).map_err(RenderError::layer("sprite original", N))?;
        let mask_extra = match resolution {
            Resolution::Base => None,
            Resolution::Extra => layer(sprite.mask_extra, N).map_err(RenderError::layer("sprite extra mask", N))?,
        };
        Ok(Some(Self {
            resolution,
            original,
            mask_extra,
            colored: layer(layers.colored, N).map_err(RenderError::layer("sprite colored", N))?,
            dyna_mask: layer(layers.dyna_mask, N).map_err(RenderError::layer("sprite dynamic mask", N))?,
            dyna_colors: layers.dyna_colors,
        }))
    }

    fn is_transparent(&self, index: usize) -> bool {
        match self.resolution {
            Resolution::Base => self.original.map_or(true, |o| o[index] >= TRANSPARENT),
            Resolution::Extra => self.mask_extra.is_some_and(|m| m[index] >= TRANSPARENT),
        }
    }
}

/// Paint every output pixel from the frame's own layers.
///
/// Precedence per pixel: background (where its mask is set and the source is
/// dark, or always when forced), then the dynamic layer, then the static
/// layer. Pixels claimed by a dynamic shadow keep the shadow over background
/// and static colors.
fn composite_frame(source: &FrameSource<'_>, canvas: &mut Canvas<'_>, force_background: bool) {
    let (width, height) = (canvas.width(), canvas.height());
    for y in 0..height {
        for x in 0..width {
            let index = y as usize * width as usize + x as usize;
            let value = source.value_at(source.remap.to_base(x), source.remap.to_base(y));

            if let Some((mask, colors)) = source.background {
                if mask[index] > 0 && (value == 0 || force_background) {
                    if !canvas.is_claimed(index) {
                        canvas.paint(index, colors[index]);
                    }
                    continue;
                }
            }

            if let Some((mask, colors)) = source.dynamic {
                let set = mask[index];
                if set != TRANSPARENT {
                    if value > 0 && canvas.tracks_shadows() {
                        if let Some((directions, color)) = source.shadows.and_then(|s| s.for_set(set)) {
                            canvas.cast_shadow(x, y, directions, color);
                        }
                        canvas.claim(index);
                    }
                    canvas.paint(index, dynamic_color(colors, source.colors_per_set, set, value));
                    continue;
                }
            }

            if !canvas.is_claimed(index) {
                canvas.paint(index, source.colorized.map_or(0, |c| c[index]));
            }
        }
    }
}

/// Stamp one matched sprite over the composited frame.
///
/// At extra resolution the placement is rescaled axis by axis; dynamic
/// sprite pixels still look up the frame's base source under the sprite.
fn stamp_sprite(source: &FrameSource<'_>, sprite: &SpriteSource<'_>, placement: &SpriteMatch, canvas: &mut Canvas<'_>) {
    let remap = source.remap;
    let scaled = |v: u16| remap.scale(v as u32);
    let (frx, fry) = (scaled(placement.frx), scaled(placement.fry));
    let (spx, spy) = (scaled(placement.spx), scaled(placement.spy));

    for y in 0..scaled(placement.height) {
        for x in 0..scaled(placement.width) {
            let (dx, dy) = (frx + x, fry + y);
            let (sx, sy) = (spx + x, spy + y);
            if dx >= canvas.width()
                || dy >= canvas.height()
                || sx as usize >= MAX_SPRITE_WIDTH
                || sy as usize >= MAX_SPRITE_HEIGHT
            {
                continue;
            }
            let index = dy as usize * canvas.width() as usize + dx as usize;
            let sprite_index = sy as usize * MAX_SPRITE_WIDTH + sx as usize;
            if sprite.is_transparent(sprite_index) {
                continue;
            }

            let set = sprite.dyna_mask.map_or(TRANSPARENT, |m| m[sprite_index]);
            match sprite.dyna_colors {
                Some(colors) if set != TRANSPARENT => {
                    let value = source.value_at(
                        placement.frx as u32 + remap.to_base(x),
                        placement.fry as u32 + remap.to_base(y),
                    );
                    canvas.paint(index, dynamic_color(colors, source.colors_per_set, set, value));
                }
                _ => {
                    if let Some(colored) = sprite.colored {
                        canvas.paint(index, colored[sprite_index]);
                    }
                }
            }
        }
    }
}
