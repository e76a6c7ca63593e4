//! CLI integration tests for the dmdc binary
//!
//! These tests run the binary against a copy of the fixture scenes in a
//! temporary directory and check exit codes, stdout and written images.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use image::AnimationDecoder;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// Copy a fixture scene into a fresh directory that has no config above it.
fn workspace(scene: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join(Path::new(scene).file_name().unwrap());
    fs::copy(fixture(scene), &target).unwrap();
    (dir, target)
}

fn dmdc(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dmdc"))
        .args(args)
        .current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute dmdc")
}

fn pixel(path: &Path, x: u32, y: u32) -> [u8; 4] {
    image::open(path).expect("Failed to open output image").to_rgba8().get_pixel(x, y).0
}

fn dimensions(path: &Path) -> (u32, u32) {
    let img = image::open(path).expect("Failed to open output image");
    (img.width(), img.height())
}

#[test]
fn test_locate_prints_matches() {
    let (dir, scene) = workspace("scenes/attract.json");
    let output = dmdc(&dir, &["locate", scene.to_str().unwrap()]);

    assert!(output.status.success(), "Locate failed: {}", String::from_utf8_lossy(&output.stderr));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let matches = &parsed[0]["matches"];
    assert_eq!(matches.as_array().map(Vec::len), Some(1));
    assert_eq!(matches[0]["frx"], 1);
    assert_eq!(matches[0]["fry"], 1);
    assert_eq!(matches[0]["width"], 4);
}

#[test]
fn test_render_writes_png() {
    let (dir, scene) = workspace("scenes/attract.json");
    let out = dir.path().join("frame.png");
    let output = dmdc(&dir, &["render", scene.to_str().unwrap(), "-o", out.to_str().unwrap()]);

    assert!(output.status.success(), "Render failed: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(dimensions(&out), (8, 4));
    assert_eq!(pixel(&out, 1, 1), [255, 0, 0, 255]);
    assert_ne!(pixel(&out, 0, 0), [255, 0, 0, 255]);
}

#[test]
fn test_render_default_output_next_to_scene() {
    let (dir, scene) = workspace("scenes/attract.json");
    let output = dmdc(&dir, &["render", scene.to_str().unwrap()]);

    assert!(output.status.success(), "Render failed: {}", String::from_utf8_lossy(&output.stderr));
    assert!(dir.path().join("attract.png").exists());
}

#[test]
fn test_render_scale_and_rotation_time() {
    let (dir, scene) = workspace("scenes/attract.json");
    let still = dir.path().join("still.png");
    let later = dir.path().join("later.png");

    let output = dmdc(&dir, &["render", scene.to_str().unwrap(), "-o", still.to_str().unwrap(), "--scale", "3"]);
    assert!(output.status.success(), "Render failed: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(dimensions(&still), (24, 12));

    let output = dmdc(&dir, &["render", scene.to_str().unwrap(), "-o", later.to_str().unwrap(), "--at-ms", "150"]);
    assert!(output.status.success(), "Render failed: {}", String::from_utf8_lossy(&output.stderr));
    assert_ne!(pixel(&still, 0, 0), pixel(&later, 0, 0));
    assert_eq!(pixel(&still, 3, 3), [255, 0, 0, 255]);
    assert_eq!(pixel(&later, 1, 1), [255, 0, 0, 255]);
}

#[test]
fn test_render_extra_resolution() {
    let (dir, scene) = workspace("scenes/attract.json");
    let out = dir.path().join("extra.png");
    let output = dmdc(&dir, &["render", scene.to_str().unwrap(), "-o", out.to_str().unwrap(), "--extra"]);

    assert!(output.status.success(), "Render failed: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(dimensions(&out), (4, 2));
}

#[test]
fn test_render_uses_discovered_config() {
    let (dir, scene) = workspace("scenes/attract.json");
    fs::write(dir.path().join("dmdcolor.toml"), "[render]\nscale = 2\n").unwrap();
    let out = dir.path().join("scaled.png");

    let output = dmdc(&dir, &["render", scene.to_str().unwrap(), "-o", out.to_str().unwrap()]);
    assert!(output.status.success(), "Render failed: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(dimensions(&out), (16, 8));
}

#[test]
fn test_invalid_config_is_an_error() {
    let (dir, scene) = workspace("scenes/attract.json");
    fs::write(dir.path().join("dmdcolor.toml"), "[render]\nscale = 0\n").unwrap();

    let output = dmdc(&dir, &["render", scene.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("scale"));
}

#[test]
fn test_render_multiple_scenes_in_parallel() {
    let (dir, scene) = workspace("scenes/attract.json");
    let second = dir.path().join("second.json");
    fs::copy(&scene, &second).unwrap();
    let out_dir = dir.path().join("renders/");

    let output =
        dmdc(&dir, &["render", scene.to_str().unwrap(), second.to_str().unwrap(), "-o", out_dir.to_str().unwrap()]);
    assert!(output.status.success(), "Render failed: {}", String::from_utf8_lossy(&output.stderr));
    assert!(out_dir.join("attract.png").exists());
    assert!(out_dir.join("second.png").exists());
}

#[test]
fn test_invalid_scene_fails() {
    let (dir, scene) = workspace("invalid/short_frame.json");
    let output = dmdc(&dir, &["render", scene.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error"));
}

#[test]
fn test_invalid_arguments_exit_code() {
    let (dir, scene) = workspace("scenes/attract.json");
    let output = dmdc(&dir, &["render", scene.to_str().unwrap(), "--scale", "0"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_cycle_writes_animated_gif() {
    let (dir, scene) = workspace("scenes/attract.json");
    let out = dir.path().join("cycle.gif");
    let output =
        dmdc(&dir, &["cycle", scene.to_str().unwrap(), "-o", out.to_str().unwrap(), "--duration-ms", "500"]);

    assert!(output.status.success(), "Cycle failed: {}", String::from_utf8_lossy(&output.stderr));
    let decoder = image::codecs::gif::GifDecoder::new(fs::File::open(&out).unwrap()).unwrap();
    let frames = decoder.into_frames().collect_frames().unwrap();
    assert_eq!(frames.len(), 5);
}
