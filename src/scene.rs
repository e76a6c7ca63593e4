//! JSON scene fixtures.
//!
//! A scene owns every buffer of one captured frame, its sprite catalog and
//! its rotation table, and lends the borrowed views that locate and render
//! consume. Sprite grids are written as rows and padded onto the fixed canvas
//! on load; detection fingerprints may be left out and are then computed from
//! the sprite's own pixels.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::locate::fingerprint_at;
use crate::models::{
    BackgroundLayer, BackgroundView, DetectionArea, DetectionRect, DynaShadows, FrameLayers, FrameView, Geometry,
    SpriteLayers, SpriteSlot, SpriteView, MAX_SPRITE_HEIGHT, MAX_SPRITE_WIDTH, SPRITE_CANVAS_LEN, TRANSPARENT,
};
use crate::rotation::{pack_rotations, RotationTable, MAX_COLOR_ROTATIONS, MAX_ROTATION_COLORS};

/// Error loading a scene fixture
#[derive(Debug, Error)]
pub enum SceneError {
    /// File I/O error
    #[error("Failed to read scene: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing error
    #[error("Failed to parse scene: {0}")]
    Parse(#[from] serde_json::Error),
    /// Buffers that do not fit the declared geometry
    #[error("Invalid scene: {0}")]
    Invalid(String),
}

/// Frame layers at one resolution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerData {
    pub colorized: Option<Vec<u16>>,
    pub dyna_mask: Option<Vec<u8>>,
    pub dyna_colors: Option<Vec<u16>>,
}

impl LayerData {
    fn view(&self) -> FrameLayers<'_> {
        FrameLayers {
            colorized: self.colorized.as_deref(),
            dyna_mask: self.dyna_mask.as_deref(),
            dyna_colors: self.dyna_colors.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundLayerData {
    pub mask: Option<Vec<u8>>,
    pub colors: Option<Vec<u16>>,
}

impl BackgroundLayerData {
    fn view(&self) -> BackgroundLayer<'_> {
        BackgroundLayer { mask: self.mask.as_deref(), colors: self.colors.as_deref() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundData {
    pub id: u16,
    pub base: BackgroundLayerData,
    pub extra: BackgroundLayerData,
}

/// Per dynamic set shadow tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShadowData {
    pub directions: Vec<u8>,
    pub colors: Vec<u16>,
}

/// The captured frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameData {
    pub original: Vec<u8>,
    #[serde(default)]
    pub base: LayerData,
    #[serde(default)]
    pub extra: LayerData,
    #[serde(default)]
    pub background: Option<BackgroundData>,
    #[serde(default)]
    pub shadows: Option<ShadowData>,
    #[serde(default)]
    pub sprite_slots: Vec<SpriteSlot>,
}

impl FrameData {
    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            original: Some(&self.original),
            base: self.base.view(),
            extra: self.extra.view(),
            background: self.background.as_ref().map(|bg| BackgroundView {
                id: bg.id,
                base: bg.base.view(),
                extra: bg.extra.view(),
            }),
            shadows: self.shadows.as_ref().map(|s| DynaShadows::new(&s.directions, &s.colors)),
            sprite_slots: &self.sprite_slots,
        }
    }
}

/// Sprite layers at one resolution, as rows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteLayerData {
    pub colored: Option<Vec<Vec<u16>>>,
    pub dyna_mask: Option<Vec<Vec<u8>>>,
    pub dyna_colors: Option<Vec<u16>>,
}

/// A detection area; the fingerprint defaults to the four sprite pixels at
/// `origin`, which itself defaults to the area's top-left corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionData {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    #[serde(default)]
    pub fingerprint: Option<u32>,
    #[serde(default)]
    pub origin: Option<[u16; 2]>,
}

/// A catalog sprite as written in a scene file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteData {
    pub name: Option<String>,
    /// Source values, 255 for transparent
    pub rows: Option<Vec<Vec<u8>>>,
    pub shape_mode: bool,
    pub base: SpriteLayerData,
    pub extra: SpriteLayerData,
    pub mask_extra: Option<Vec<Vec<u8>>>,
    pub detection: Vec<DetectionData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationData {
    pub delay_ms: u16,
    pub colors: Vec<u16>,
}

/// On-disk layout of a scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFile {
    pub geometry: Geometry,
    pub frame: FrameData,
    #[serde(default)]
    pub sprites: Vec<SpriteData>,
    #[serde(default)]
    pub rotations: Vec<RotationData>,
}

#[derive(Debug, Clone, Default)]
struct SpriteLayerBuffers {
    colored: Option<Vec<u16>>,
    dyna_mask: Option<Vec<u8>>,
    dyna_colors: Option<Vec<u16>>,
}

impl SpriteLayerBuffers {
    fn expand(data: &SpriteLayerData, sprite: &str) -> Result<Self, SceneError> {
        Ok(Self {
            colored: expand_rows(data.colored.as_deref(), 0, sprite)?,
            dyna_mask: expand_rows(data.dyna_mask.as_deref(), TRANSPARENT, sprite)?,
            dyna_colors: data.dyna_colors.clone(),
        })
    }

    fn view(&self) -> SpriteLayers<'_> {
        SpriteLayers {
            colored: self.colored.as_deref(),
            dyna_mask: self.dyna_mask.as_deref(),
            dyna_colors: self.dyna_colors.as_deref(),
        }
    }
}

/// Owned buffers of one sprite laid out on the fixed canvas
#[derive(Debug, Clone, Default)]
pub struct SpriteBuffers {
    pub name: Option<String>,
    original: Option<Vec<u8>>,
    mask_extra: Option<Vec<u8>>,
    base: SpriteLayerBuffers,
    extra: SpriteLayerBuffers,
    detection: Vec<DetectionArea>,
    shape_mode: bool,
}

impl SpriteBuffers {
    fn from_data(data: &SpriteData, index: usize) -> Result<Self, SceneError> {
        let label = data.name.clone().unwrap_or_else(|| format!("#{}", index));
        let original = expand_rows(data.rows.as_deref(), TRANSPARENT, &label)?;

        let mut detection = Vec::with_capacity(data.detection.len());
        for area in &data.detection {
            let [ox, oy] = area.origin.unwrap_or([area.x, area.y]);
            let fingerprint = match (area.fingerprint, original.as_deref()) {
                (Some(fingerprint), _) => fingerprint,
                (None, Some(canvas)) => fingerprint_at(canvas, ox, oy, data.shape_mode).ok_or_else(|| {
                    SceneError::Invalid(format!("sprite {}: no fingerprint fits at ({}, {})", label, ox, oy))
                })?,
                (None, None) => {
                    return Err(SceneError::Invalid(format!("sprite {}: fingerprint needs sprite rows", label)))
                }
            };
            let rect = DetectionRect::new(area.x, area.y, area.width, area.height);
            detection.push(DetectionArea::new(rect, fingerprint, ox, oy));
        }

        Ok(Self {
            name: data.name.clone(),
            original,
            mask_extra: expand_rows(data.mask_extra.as_deref(), TRANSPARENT, &label)?,
            base: SpriteLayerBuffers::expand(&data.base, &label)?,
            extra: SpriteLayerBuffers::expand(&data.extra, &label)?,
            detection,
            shape_mode: data.shape_mode,
        })
    }

    pub fn view(&self) -> SpriteView<'_> {
        SpriteView {
            original: self.original.as_deref(),
            mask_extra: self.mask_extra.as_deref(),
            base: self.base.view(),
            extra: self.extra.view(),
            detection: Some(&self.detection),
            shape_mode: self.shape_mode,
        }
    }
}

/// Lay rows out on the fixed sprite canvas, padding with `fill`.
fn expand_rows<T: Copy>(rows: Option<&[Vec<T>]>, fill: T, sprite: &str) -> Result<Option<Vec<T>>, SceneError> {
    let Some(rows) = rows else {
        return Ok(None);
    };
    if rows.len() > MAX_SPRITE_HEIGHT {
        return Err(SceneError::Invalid(format!(
            "sprite {}: {} rows exceed the canvas height {}",
            sprite,
            rows.len(),
            MAX_SPRITE_HEIGHT
        )));
    }
    let mut canvas = vec![fill; SPRITE_CANVAS_LEN];
    for (y, row) in rows.iter().enumerate() {
        if row.len() > MAX_SPRITE_WIDTH {
            return Err(SceneError::Invalid(format!(
                "sprite {}: row {} is {} wide, canvas is {}",
                sprite,
                y,
                row.len(),
                MAX_SPRITE_WIDTH
            )));
        }
        let start = y * MAX_SPRITE_WIDTH;
        canvas[start..start + row.len()].copy_from_slice(row);
    }
    Ok(Some(canvas))
}

/// A loaded scene
#[derive(Debug, Clone)]
pub struct Scene {
    pub geometry: Geometry,
    pub frame: FrameData,
    pub sprites: Vec<SpriteBuffers>,
    rotations: Option<Vec<u16>>,
}

impl Scene {
    /// Read and validate a scene file.
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let contents = fs::read_to_string(path)?;
        let scene = Self::from_json(&contents)?;
        tracing::debug!(path = %path.display(), sprites = scene.sprites.len(), "loaded scene");
        Ok(scene)
    }

    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Self::from_file(serde_json::from_str(json)?)
    }

    pub fn from_file(file: SceneFile) -> Result<Self, SceneError> {
        let geometry = file.geometry;
        if geometry.width == 0 || geometry.height == 0 {
            return Err(SceneError::Invalid("geometry must have a non-zero base size".to_string()));
        }
        if file.frame.original.len() != geometry.base_pixel_count() {
            return Err(SceneError::Invalid(format!(
                "frame original has {} values, geometry {}x{} needs {}",
                file.frame.original.len(),
                geometry.width,
                geometry.height,
                geometry.base_pixel_count()
            )));
        }
        if file.rotations.len() > MAX_COLOR_ROTATIONS {
            return Err(SceneError::Invalid(format!(
                "{} rotations declared, at most {} are supported",
                file.rotations.len(),
                MAX_COLOR_ROTATIONS
            )));
        }
        if let Some(long) = file.rotations.iter().find(|r| r.colors.len() > MAX_ROTATION_COLORS) {
            return Err(SceneError::Invalid(format!(
                "rotation with {} colors exceeds {}",
                long.colors.len(),
                MAX_ROTATION_COLORS
            )));
        }

        let sprites = file
            .sprites
            .iter()
            .enumerate()
            .map(|(i, s)| SpriteBuffers::from_data(s, i))
            .collect::<Result<Vec<_>, _>>()?;

        let rotations = (!file.rotations.is_empty()).then(|| {
            let slots: Vec<(u16, &[u16])> = file.rotations.iter().map(|r| (r.delay_ms, r.colors.as_slice())).collect();
            pack_rotations(&slots)
        });

        Ok(Self { geometry, frame: file.frame, sprites, rotations })
    }

    pub fn frame_view(&self) -> FrameView<'_> {
        self.frame.view()
    }

    /// Views of every sprite, indexed by sprite id.
    pub fn sprite_views(&self) -> Vec<SpriteView<'_>> {
        self.sprites.iter().map(SpriteBuffers::view).collect()
    }

    /// The packed rotation table, if the scene declares rotations.
    pub fn rotation_table(&self) -> Option<RotationTable<'_>> {
        self.rotations.as_deref().and_then(RotationTable::new)
    }
}
