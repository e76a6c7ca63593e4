//! Locate command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use crate::config::CliOverrides;
use crate::locate::SpriteMatch;
use crate::preview::locate_scene;

use super::{load_settings, open_scene, EXIT_ERROR, EXIT_SUCCESS};

#[derive(Debug, Serialize)]
struct SceneMatches<'a> {
    scene: &'a Path,
    matches: Vec<SpriteMatch>,
}

/// Execute the locate command
pub fn run_locate(scenes: &[PathBuf], config_path: Option<&Path>, overrides: &CliOverrides, pretty: bool) -> ExitCode {
    let mut results = Vec::with_capacity(scenes.len());
    let mut failed = false;

    for path in scenes {
        let config = match load_settings(config_path, path, overrides) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        };
        let Some(scene) = open_scene(path) else {
            failed = true;
            continue;
        };
        results.push(SceneMatches { scene: path, matches: locate_scene(&scene, &config) });
    }

    let json = if pretty { serde_json::to_string_pretty(&results) } else { serde_json::to_string(&results) };
    match json {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: Failed to serialize matches: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    if failed {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}
