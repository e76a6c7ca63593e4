//! Render command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rayon::prelude::*;

use crate::config::CliOverrides;
use crate::output::{output_path, save_png, scale_image};
use crate::preview::render_scene;

use super::{load_settings, open_scene, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the render command
///
/// Scenes are independent and render in parallel; every failure is reported
/// and turns the exit code into an error once all scenes are done.
pub fn run_render(
    scenes: &[PathBuf],
    output: Option<&Path>,
    config_path: Option<&Path>,
    overrides: &CliOverrides,
    at_ms: Option<u32>,
) -> ExitCode {
    if let Some(out) = output {
        if scenes.len() > 1 && out.extension().is_some_and(|e| e != "png") {
            eprintln!("Error: Output '{}' must be a .png file or a directory", out.display());
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    }

    let is_single = scenes.len() == 1;
    let failures = scenes
        .par_iter()
        .filter(|path| !render_one(path, output, config_path, overrides, at_ms, is_single))
        .count();

    if failures > 0 {
        eprintln!("Error: {} of {} scenes failed to render", failures, scenes.len());
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

fn render_one(
    path: &Path,
    output: Option<&Path>,
    config_path: Option<&Path>,
    overrides: &CliOverrides,
    at_ms: Option<u32>,
    is_single: bool,
) -> bool {
    let config = match load_settings(config_path, path, overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}: {}", path.display(), e);
            return false;
        }
    };
    let Some(scene) = open_scene(path) else {
        return false;
    };

    let preview = match render_scene(&scene, &config, at_ms) {
        Ok(preview) => preview,
        Err(e) => {
            eprintln!("Error: {}: {}", path.display(), e);
            return false;
        }
    };
    let Some(image) = preview.to_image() else {
        eprintln!("Error: {}: rendered frame has no pixels", path.display());
        return false;
    };

    let target = output_path(path, output, is_single, "png");
    match save_png(&scale_image(image, config.render.scale), &target) {
        Ok(()) => {
            tracing::debug!(scene = %path.display(), matches = preview.matches.len(), "rendered scene");
            println!("Saved: {}", target.display());
            true
        }
        Err(e) => {
            eprintln!("Error: Failed to save '{}': {}", target.display(), e);
            false
        }
    }
}
