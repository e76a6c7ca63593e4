//! Configuration schema types for `dmdcolor.toml`
//!
//! Defines the structure and validation rules for colorizer settings.

use serde::{Deserialize, Serialize};

use crate::composition::RenderOptions;
use crate::locate::DEFAULT_MAX_MATCHES;
use crate::models::Resolution;

/// Sprite locator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocateConfig {
    /// Maximum number of matches collected per frame
    #[serde(default = "default_max_matches")]
    pub max_matches: usize,
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self { max_matches: default_max_matches() }
    }
}

fn default_max_matches() -> usize {
    DEFAULT_MAX_MATCHES
}

/// Compositor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Render at the extra resolution instead of the base one
    #[serde(default)]
    pub extra: bool,
    /// Paint backgrounds over lit source pixels too
    #[serde(default)]
    pub force_background: bool,
    /// Cast dynamic shadows when frames declare them
    #[serde(default = "default_true")]
    pub dyna_shadows: bool,
    /// Integer upscale applied to written images
    #[serde(default = "default_scale")]
    pub scale: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { extra: false, force_background: false, dyna_shadows: true, scale: default_scale() }
    }
}

impl RenderConfig {
    pub fn resolution(&self) -> Resolution {
        Resolution::from_extra(self.extra)
    }

    pub fn options(&self) -> RenderOptions {
        RenderOptions { force_background: self.force_background, dyna_shadows: self.dyna_shadows }
    }
}

fn default_true() -> bool {
    true
}

fn default_scale() -> u32 {
    1
}

/// Color rotation preview settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Apply rotations when rendering
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Length of an animated preview in milliseconds
    #[serde(default = "default_preview_ms")]
    pub preview_ms: u32,
    /// Upper bound on frames encoded in an animated preview
    #[serde(default = "default_max_frames")]
    pub max_frames: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self { enabled: true, preview_ms: default_preview_ms(), max_frames: default_max_frames() }
    }
}

fn default_preview_ms() -> u32 {
    2000
}

fn default_max_frames() -> usize {
    120
}

/// Root configuration structure for `dmdcolor.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmdConfig {
    #[serde(default)]
    pub locate: LocateConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub rotation: RotationConfig,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "render.scale")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dmdcolor.toml: '{}' {}", self.field, self.message)
    }
}

impl DmdConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut check = |ok: bool, field: &str, message: &str| {
            if !ok {
                errors.push(ConfigValidationError { field: field.to_string(), message: message.to_string() });
            }
        };

        check((1..=255).contains(&self.locate.max_matches), "locate.max_matches", "must be between 1 and 255");
        check((1..=16).contains(&self.render.scale), "render.scale", "must be between 1 and 16");
        check(self.rotation.preview_ms > 0, "rotation.preview_ms", "must be a positive integer");
        check(self.rotation.max_frames > 0, "rotation.max_frames", "must be a positive integer");

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
