//! Integration tests for the locate, render and rotation pipeline
//!
//! Scenes are built as JSON and driven through the public library API the
//! same way a playback engine would: locate, composite, then tick rotations.

use std::path::PathBuf;

use dmdcolor::composition::{render_frame, render_frame_with_rotation, RenderError, RenderOptions};
use dmdcolor::config::DmdConfig;
use dmdcolor::locate::{locate_sprites, SpriteMatch};
use dmdcolor::models::{BoundingBox, CatalogView, Resolution};
use dmdcolor::preview::{cycle_scene, render_scene};
use dmdcolor::rotation::{apply_rotations, apply_rotations_cached, RotationCache, RotationState};
use dmdcolor::scene::Scene;
use serde_json::json;

const RED: u16 = 0xf800;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn scene(value: serde_json::Value) -> Scene {
    Scene::from_json(&value.to_string()).expect("test scene is valid")
}

fn locate(scene: &Scene, max_matches: usize) -> Vec<SpriteMatch> {
    let views = scene.sprite_views();
    let catalog = CatalogView::new(scene.geometry, &views);
    locate_sprites(&scene.frame_view(), &catalog, max_matches)
}

/// A 16x2 frame holding the run 1,2,3,4 three times on its first row, at
/// x = 0, 5 and 10, searched over the whole frame.
fn repeated_scene(detection: serde_json::Value) -> Scene {
    repeated_scene_in(detection, BoundingBox::full(16, 2))
}

fn repeated_scene_in(detection: serde_json::Value, bbox: BoundingBox) -> Scene {
    let mut original = vec![0u8; 32];
    for x in [0usize, 5, 10] {
        original[x..x + 4].copy_from_slice(&[1, 2, 3, 4]);
    }
    scene(json!({
        "geometry": { "width": 16, "height": 2, "colors_per_set": 4 },
        "frame": {
            "original": original,
            "sprite_slots": [ { "sprite": 0, "bbox": bbox } ]
        },
        "sprites": [ { "rows": [[1, 2, 3, 4]], "detection": detection } ]
    }))
}

#[test]
fn test_fixture_end_to_end() {
    let scene = Scene::load(&fixture("scenes/attract.json")).unwrap();

    let matches = locate(&scene, 32);
    assert_eq!(matches, vec![SpriteMatch { sprite: 0, frx: 1, fry: 1, spx: 0, spy: 0, width: 4, height: 2 }]);

    let preview = render_scene(&scene, &DmdConfig::default(), None).unwrap();
    assert_eq!((preview.width, preview.height), (8, 4));
    for y in 0..4u32 {
        for x in 0..8u32 {
            let expected = if (1..5).contains(&x) && (1..3).contains(&y) { RED } else { 100 };
            assert_eq!(preview.pixels[(y * 8 + x) as usize], expected, "pixel ({}, {})", x, y);
        }
    }

    // one rotation step later the static layer shows the slot's second color
    let rotated = render_scene(&scene, &DmdConfig::default(), Some(150)).unwrap();
    assert_eq!(rotated.pixels[0], 200);
    assert_eq!(rotated.pixels[9], RED);
}

#[test]
fn test_duplicate_placements_are_collapsed() {
    // both areas confirm the same sprite at the same rectangles
    let scene = repeated_scene(json!([
        { "x": 0, "y": 0, "width": 4, "height": 1 },
        { "x": 1, "y": 0, "width": 3, "height": 1, "origin": [0, 0] }
    ]));
    let matches = locate(&scene, 32);
    let positions: Vec<u16> = matches.iter().map(|m| m.frx).collect();
    assert_eq!(positions, vec![0, 5, 10]);
}

#[test]
fn test_capacity_stops_the_scan() {
    let scene = repeated_scene(json!([ { "x": 0, "y": 0, "width": 4, "height": 1 } ]));
    let matches = locate(&scene, 2);
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[1].frx, 5);
    assert!(locate(&scene, 0).is_empty());
}

#[test]
fn test_matches_stay_inside_the_frame_and_bbox() {
    let bbox = BoundingBox::new(3, 0, 13, 1);
    let scene = repeated_scene_in(json!([ { "x": 0, "y": 0, "width": 4, "height": 1 } ]), bbox);
    let matches = locate(&scene, 32);
    assert_eq!(matches.iter().map(|m| m.frx).collect::<Vec<_>>(), vec![5, 10]);
    for m in matches {
        let (x, y, w, h) = (m.frx as u32, m.fry as u32, m.width as u32, m.height as u32);
        assert!(w > 0 && h > 0);
        assert!(x + w <= scene.geometry.width && y + h <= scene.geometry.height);
        assert!(bbox.contains_rect(x, y, w, h), "{:?} leaves {:?}", m, bbox);
    }
}

#[test]
fn test_shape_mode_ignores_color_indices() {
    let build = |shape_mode: bool| {
        scene(json!({
            "geometry": { "width": 8, "height": 1, "colors_per_set": 4 },
            "frame": {
                "original": [0, 7, 7, 9, 7, 0, 0, 0],
                "sprite_slots": [ { "sprite": 0, "bbox": { "min_x": 0, "min_y": 0, "max_x": 7, "max_y": 0 } } ]
            },
            "sprites": [ {
                "rows": [[1, 1, 1, 1]],
                "shape_mode": shape_mode,
                "detection": [ { "x": 0, "y": 0, "width": 4, "height": 1 } ]
            } ]
        }))
    };

    let matches = locate(&build(true), 32);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].frx, 1);
    assert!(locate(&build(false), 32).is_empty());
}

#[test]
fn test_precedence_background_dynamic_static() {
    let scene = scene(json!({
        "geometry": { "width": 4, "height": 1, "colors_per_set": 4 },
        "frame": {
            "original": [0, 2, 2, 0],
            "base": {
                "colorized": [1, 1, 1, 1],
                "dyna_mask": [255, 0, 255, 0],
                "dyna_colors": [10, 11, 12, 13]
            },
            "background": { "id": 3, "base": { "mask": [1, 1, 0, 0], "colors": [50, 51, 52, 53] } }
        }
    }));

    let config = DmdConfig::default();
    let preview = render_scene(&scene, &config, None).unwrap();
    // a lit pixel under the background mask falls through to its dynamic set
    assert_eq!(preview.pixels, vec![50, 12, 1, 10]);

    let mut forced = config.clone();
    forced.render.force_background = true;
    let preview = render_scene(&scene, &forced, None).unwrap();
    assert_eq!(preview.pixels, vec![50, 51, 1, 10]);
}

#[test]
fn test_no_background_id_renders_without_background() {
    let scene = scene(json!({
        "geometry": { "width": 4, "height": 1, "colors_per_set": 4 },
        "frame": {
            "original": [0, 2, 2, 0],
            "base": {
                "colorized": [1, 1, 1, 1],
                "dyna_mask": [255, 0, 255, 0],
                "dyna_colors": [10, 11, 12, 13]
            },
            "background": { "id": 65535, "base": { "mask": [1, 1, 0, 0], "colors": [50, 51, 52, 53] } }
        }
    }));

    let mut config = DmdConfig::default();
    assert_eq!(render_scene(&scene, &config, None).unwrap().pixels, vec![1, 12, 1, 10]);
    config.render.force_background = true;
    assert_eq!(render_scene(&scene, &config, None).unwrap().pixels, vec![1, 12, 1, 10]);
}

#[test]
fn test_sprite_doubles_at_extra_resolution() {
    let mut original = vec![0u8; 4 * 32];
    original[..4].copy_from_slice(&[1, 2, 3, 4]);
    let red_row = vec![RED; 8];
    let scene = scene(json!({
        "geometry": { "width": 4, "height": 32, "width_extra": 8, "height_extra": 64, "colors_per_set": 4 },
        "frame": {
            "original": original,
            "sprite_slots": [ { "sprite": 0, "bbox": { "min_x": 0, "min_y": 0, "max_x": 3, "max_y": 31 } } ]
        },
        "sprites": [ {
            "rows": [[1, 2, 3, 4]],
            "extra": { "colored": [red_row.clone(), red_row] },
            "detection": [ { "x": 0, "y": 0, "width": 4, "height": 1 } ]
        } ]
    }));

    let mut config = DmdConfig::default();
    config.render.extra = true;
    let preview = render_scene(&scene, &config, None).unwrap();
    assert_eq!((preview.width, preview.height), (8, 64));
    assert!(preview.pixels[..16].iter().all(|&p| p == RED));
    assert!(preview.pixels[16..].iter().all(|&p| p == 0));
}

#[test]
fn test_sprite_extra_mask_limits_stamped_rows() {
    let mut original = vec![0u8; 4 * 32];
    original[..4].copy_from_slice(&[1, 2, 3, 4]);
    let red_row = vec![RED; 8];
    let colorized = vec![3u16; 8 * 64];
    let scene = scene(json!({
        "geometry": { "width": 4, "height": 32, "width_extra": 8, "height_extra": 64, "colors_per_set": 4 },
        "frame": {
            "original": original,
            "extra": { "colorized": colorized },
            "sprite_slots": [ { "sprite": 0, "bbox": { "min_x": 0, "min_y": 0, "max_x": 3, "max_y": 31 } } ]
        },
        "sprites": [ {
            "rows": [[1, 2, 3, 4]],
            "mask_extra": [[0, 0, 0, 0, 0, 0, 0, 0]],
            "extra": { "colored": [red_row.clone(), red_row] },
            "detection": [ { "x": 0, "y": 0, "width": 4, "height": 1 } ]
        } ]
    }));

    let mut config = DmdConfig::default();
    config.render.extra = true;
    let preview = render_scene(&scene, &config, None).unwrap();
    // only the authored mask row is opaque, the second doubled row keeps the frame
    assert!(preview.pixels[..8].iter().all(|&p| p == RED));
    assert!(preview.pixels[8..16].iter().all(|&p| p == 3));
}

#[test]
fn test_structural_errors_leave_output_untouched() {
    let scene = Scene::load(&fixture("scenes/attract.json")).unwrap();
    let views = scene.sprite_views();
    let catalog = CatalogView::new(scene.geometry, &views);
    let frame = scene.frame_view();

    let mut out = vec![7u16; 31];
    let err = render_frame(&frame, &catalog, &[], Resolution::Base, &RenderOptions::default(), &mut out);
    assert_eq!(err, Err(RenderError::OutputSize { expected: 32, actual: 31 }));
    assert!(out.iter().all(|&p| p == 7));
}

#[test]
fn test_rotation_wraps_around() {
    let scene = Scene::load(&fixture("scenes/attract.json")).unwrap();
    let config = DmdConfig::default();
    let shown: Vec<u16> = [0, 100, 200, 300]
        .iter()
        .map(|&t| render_scene(&scene, &config, Some(t)).unwrap().pixels[0])
        .collect();
    assert_eq!(shown, vec![100, 200, 100, 200]);
}

/// Composite `scene` with rotation caching, then tick both rewrite paths every
/// 10 ms up to `until_ms` and require identical frames and delays.
fn assert_rotation_paths_agree(scene: &Scene, until_ms: u32) -> Vec<u16> {
    let table = scene.rotation_table().unwrap();
    let views = scene.sprite_views();
    let catalog = CatalogView::new(scene.geometry, &views);
    let len = scene.geometry.base_pixel_count();

    let mut base = vec![0u16; len];
    let mut cache = RotationCache::new(len);
    render_frame_with_rotation(
        &scene.frame_view(),
        &catalog,
        &[],
        Resolution::Base,
        &RenderOptions::default(),
        &table,
        &[0; 4],
        &mut base,
        &mut cache,
    )
    .unwrap();

    let mut full_state = RotationState::new(&table, 0);
    let mut cached_state = full_state;
    let (mut full, mut cached) = (vec![0u16; len], vec![0u16; len]);
    for now in (0..=until_ms).step_by(10) {
        let full_delay = apply_rotations(&table, &base, &mut full, &mut full_state, now);
        let cached_delay = apply_rotations_cached(&table, &base, &mut cached, &cache, &mut cached_state, now);
        assert_eq!(full_delay, cached_delay, "delay at {}", now);
        assert_eq!(full, cached, "pixels at {}", now);
    }
    full
}

#[test]
fn test_cached_and_full_scan_rotation_agree() {
    let scene = scene(json!({
        "geometry": { "width": 4, "height": 2, "colors_per_set": 4 },
        "frame": {
            "original": [0, 1, 2, 3, 0, 0, 0, 0],
            "base": {
                "colorized": [5, 6, 7, 8, 5, 5, 9, 9],
                "dyna_mask": [255, 0, 0, 0, 255, 255, 255, 255],
                "dyna_colors": [0, 5, 6, 7]
            }
        },
        "rotations": [
            { "delay_ms": 30, "colors": [5, 6, 7] },
            { "delay_ms": 70, "colors": [8, 9] }
        ]
    }));
    assert_rotation_paths_agree(&scene, 420);
}

#[test]
fn test_disabled_slot_does_not_hide_a_shared_color() {
    // color 5 sits in a zero-delay slot and in an active one
    let scene = scene(json!({
        "geometry": { "width": 1, "height": 1, "colors_per_set": 4 },
        "frame": { "original": [0], "base": { "colorized": [5] } },
        "rotations": [
            { "delay_ms": 0, "colors": [5, 6] },
            { "delay_ms": 100, "colors": [5, 7] }
        ]
    }));
    assert_eq!(assert_rotation_paths_agree(&scene, 100), vec![7]);
    assert_eq!(render_scene(&scene, &DmdConfig::default(), Some(100)).unwrap().pixels, vec![7]);
}

#[test]
fn test_cycle_frames_cover_the_duration() {
    let scene = Scene::load(&fixture("scenes/attract.json")).unwrap();
    let (_, frames) = cycle_scene(&scene, &DmdConfig::default(), 500).unwrap();
    assert_eq!(frames.len(), 5);
    assert_eq!(frames.iter().map(|f| f.duration_ms).sum::<u32>(), 500);
    let corner: Vec<u16> = frames.iter().map(|f| f.pixels[0]).collect();
    assert_eq!(corner, vec![100, 200, 100, 200, 100]);
}
