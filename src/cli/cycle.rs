//! Cycle command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::color::frame_to_image;
use crate::config::CliOverrides;
use crate::gif::render_gif;
use crate::output::{output_path, scale_image};
use crate::preview::cycle_scene;

use super::{load_settings, open_scene, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the cycle command
pub fn run_cycle(scene_path: &Path, output: Option<&Path>, config_path: Option<&Path>, overrides: &CliOverrides) -> ExitCode {
    let config = match load_settings(config_path, scene_path, overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let Some(scene) = open_scene(scene_path) else {
        return ExitCode::from(EXIT_ERROR);
    };
    if scene.rotation_table().is_none() {
        eprintln!("Warning: {} declares no color rotations, the animation is a still frame", scene_path.display());
    }

    let (preview, frames) = match cycle_scene(&scene, &config, config.rotation.preview_ms) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}: {}", scene_path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut images = Vec::with_capacity(frames.len());
    for frame in frames {
        let Some(image) = frame_to_image(&frame.pixels, preview.width, preview.height) else {
            eprintln!("Error: {}: rendered frame has no pixels", scene_path.display());
            return ExitCode::from(EXIT_ERROR);
        };
        images.push((scale_image(image, config.render.scale), frame.duration_ms));
    }

    let target = output_path(scene_path, output, true, "gif");
    if let Err(e) = render_gif(&images, &target) {
        eprintln!("Error: Failed to save '{}': {}", target.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }
    println!("Saved: {} ({} frames)", target.display(), images.len());
    ExitCode::from(EXIT_SUCCESS)
}
