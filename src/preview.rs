//! Scene previews: locate, composite and animate one scene the way the
//! playback engine would display it.

use image::RgbaImage;
use serde::Serialize;

use crate::color::frame_to_image;
use crate::composition::{render_frame, render_frame_with_rotation, RenderError};
use crate::config::DmdConfig;
use crate::locate::{locate_sprites, SpriteMatch};
use crate::models::CatalogView;
use crate::rotation::{simulate_shifts, RotationCache, RotationScheduler, MAX_COLOR_ROTATIONS};
use crate::scene::Scene;

/// A rendered frame with the matches that were stamped into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub width: u32,
    pub height: u32,
    pub matches: Vec<SpriteMatch>,
    #[serde(skip)]
    pub pixels: Vec<u16>,
}

impl Preview {
    pub fn to_image(&self) -> Option<RgbaImage> {
        frame_to_image(&self.pixels, self.width, self.height)
    }
}

/// One displayed frame of an animated preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedFrame {
    pub pixels: Vec<u16>,
    pub duration_ms: u32,
}

/// Locate the scene's sprites and return them without rendering.
pub fn locate_scene(scene: &Scene, config: &DmdConfig) -> Vec<SpriteMatch> {
    let views = scene.sprite_views();
    let catalog = CatalogView::new(scene.geometry, &views);
    locate_sprites(&scene.frame_view(), &catalog, config.locate.max_matches)
}

/// Render the scene as displayed at `at_ms`.
///
/// Without a time, or when rotations are disabled or absent, the static
/// composite is returned.
pub fn render_scene(scene: &Scene, config: &DmdConfig, at_ms: Option<u32>) -> Result<Preview, RenderError> {
    let frame = scene.frame_view();
    let views = scene.sprite_views();
    let catalog = CatalogView::new(scene.geometry, &views);
    let matches = locate_sprites(&frame, &catalog, config.locate.max_matches);

    let resolution = config.render.resolution();
    let (width, height) = scene.geometry.dimensions(resolution);
    let mut pixels = vec![0u16; scene.geometry.pixel_count(resolution)];
    let options = config.render.options();

    match (scene.rotation_table().filter(|_| config.rotation.enabled), at_ms) {
        (Some(table), Some(at_ms)) => {
            let shifts = simulate_shifts(&table, at_ms).shifts();
            let mut cache = RotationCache::new(pixels.len());
            render_frame_with_rotation(
                &frame,
                &catalog,
                &matches,
                resolution,
                &options,
                &table,
                &shifts,
                &mut pixels,
                &mut cache,
            )?;
        }
        _ => render_frame(&frame, &catalog, &matches, resolution, &options, &mut pixels)?,
    }

    Ok(Preview { width, height, matches, pixels })
}

/// Drive the rotation scheduler over `duration_ms` and collect every
/// displayed frame with the time it stays on screen.
///
/// The scene is composited once with its rotation identity cached; every
/// scheduler tick then rewrites that composite. At most
/// `config.rotation.max_frames` frames are produced.
pub fn cycle_scene(scene: &Scene, config: &DmdConfig, duration_ms: u32) -> Result<(Preview, Vec<TimedFrame>), RenderError> {
    let Some(table) = scene.rotation_table().filter(|_| config.rotation.enabled) else {
        let preview = render_scene(scene, config, None)?;
        let frames = vec![TimedFrame { pixels: preview.pixels.clone(), duration_ms: duration_ms.max(1) }];
        return Ok((preview, frames));
    };

    let frame = scene.frame_view();
    let views = scene.sprite_views();
    let catalog = CatalogView::new(scene.geometry, &views);
    let matches = locate_sprites(&frame, &catalog, config.locate.max_matches);
    let resolution = config.render.resolution();
    let (width, height) = scene.geometry.dimensions(resolution);

    let mut composite = vec![0u16; scene.geometry.pixel_count(resolution)];
    let mut cache = RotationCache::new(composite.len());
    render_frame_with_rotation(
        &frame,
        &catalog,
        &matches,
        resolution,
        &config.render.options(),
        &table,
        &[0; MAX_COLOR_ROTATIONS],
        &mut composite,
        &mut cache,
    )?;

    let max_frames = config.rotation.max_frames.max(1);
    let mut scheduler = RotationScheduler::new(table, 0);
    let mut frames = Vec::new();
    let mut displayed = composite.clone();
    let mut shown_at = 0u32;
    let mut due = scheduler.state().next_trigger();

    while let Some(now) = due {
        if now >= duration_ms || frames.len() + 1 >= max_frames {
            break;
        }
        let mut next = vec![0u16; composite.len()];
        let delay = scheduler.tick_cached(&composite, &mut next, &cache, now);
        frames.push(TimedFrame { pixels: std::mem::replace(&mut displayed, next), duration_ms: now - shown_at });
        shown_at = now;
        due = (delay > 0).then(|| now.saturating_add(delay));
    }
    frames.push(TimedFrame { pixels: displayed, duration_ms: duration_ms.saturating_sub(shown_at).max(1) });

    tracing::debug!(
        frames = frames.len(),
        rotating_pixels = cache.rotating_pixels(),
        duration_ms,
        "rotation cycle rendered"
    );
    Ok((Preview { width, height, matches, pixels: composite }, frames))
}
