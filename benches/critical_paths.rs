//! Criterion benchmarks for the per-frame critical paths
//!
//! Benchmarks the operations a playback engine runs for every frame:
//! - Locate: signature scan of a full frame
//! - Render: layer compositing and sprite stamping, with and without rotation caching
//! - Rotation: scheduler ticks over a rendered frame, full scan versus cached

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dmdcolor::composition::{render_frame, render_frame_with_rotation, RenderOptions};
use dmdcolor::locate::locate_sprites;
use dmdcolor::models::{CatalogView, Resolution};
use dmdcolor::rotation::{apply_rotations, apply_rotations_cached, RotationCache, RotationState};
use dmdcolor::scene::Scene;
use serde_json::json;

// =============================================================================
// Test Data Generators
// =============================================================================

/// Source value of the generated frame at (x, y); never 0 so every pixel is lit
fn source_value(x: u32, y: u32) -> u8 {
    ((x * 7 + y * 3) % 15) as u8 + 1
}

/// Build a scene of `width` x `height` with `sprites` 8x8 sprites cut out of
/// the frame itself, so each one matches at least once.
fn make_scene(width: u32, height: u32, sprites: u32) -> Scene {
    let original: Vec<u8> = (0..height).flat_map(|y| (0..width).map(move |x| source_value(x, y))).collect();
    let colorized: Vec<u16> = (0..width * height).map(|i| (i % 16) as u16 + 1).collect();

    let sprite_list: Vec<_> = (0..sprites)
        .map(|i| {
            let (ox, oy) = ((i * 13) % (width - 8), (i * 5) % (height - 8));
            let rows: Vec<Vec<u8>> =
                (0..8).map(|y| (0..8).map(|x| source_value(ox + x, oy + y)).collect()).collect();
            let colored: Vec<Vec<u16>> = (0..8).map(|_| vec![0x07e0; 8]).collect();
            json!({
                "name": format!("sprite_{}", i),
                "rows": rows,
                "base": { "colored": colored },
                "detection": [ { "x": 0, "y": 0, "width": 8, "height": 8 } ]
            })
        })
        .collect();
    let slots: Vec<_> = (0..sprites)
        .map(|i| json!({ "sprite": i, "bbox": { "min_x": 0, "min_y": 0, "max_x": width - 1, "max_y": height - 1 } }))
        .collect();

    let scene = json!({
        "geometry": { "width": width, "height": height, "colors_per_set": 16 },
        "frame": { "original": original, "base": { "colorized": colorized }, "sprite_slots": slots },
        "sprites": sprite_list,
        "rotations": [
            { "delay_ms": 50, "colors": [1, 2, 3, 4, 5, 6, 7, 8] },
            { "delay_ms": 80, "colors": [9, 10, 11, 12] }
        ]
    });
    Scene::from_json(&scene.to_string()).expect("benchmark scene is valid")
}

// =============================================================================
// Locate Benchmarks
// =============================================================================

fn bench_locate(c: &mut Criterion) {
    let mut group = c.benchmark_group("locate");

    for sprites in [1u32, 4, 16].iter() {
        let scene = make_scene(128, 32, *sprites);
        let frame = scene.frame_view();
        let views = scene.sprite_views();
        let catalog = CatalogView::new(scene.geometry, &views);

        group.throughput(Throughput::Elements(scene.geometry.base_pixel_count() as u64));
        group.bench_with_input(BenchmarkId::new("locate_sprites_128x32", sprites), &catalog, |b, catalog| {
            b.iter(|| locate_sprites(black_box(&frame), black_box(catalog), 32))
        });
    }

    group.finish();
}

// =============================================================================
// Render Benchmarks
// =============================================================================

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    let scene = make_scene(128, 32, 4);
    let frame = scene.frame_view();
    let views = scene.sprite_views();
    let catalog = CatalogView::new(scene.geometry, &views);
    let matches = locate_sprites(&frame, &catalog, 32);
    let table = scene.rotation_table().expect("scene has rotations");
    let options = RenderOptions::default();
    let mut out = vec![0u16; scene.geometry.base_pixel_count()];

    group.bench_function("render_frame_128x32", |b| {
        b.iter(|| render_frame(black_box(&frame), &catalog, &matches, Resolution::Base, &options, &mut out))
    });

    let mut cache = RotationCache::new(out.len());
    group.bench_function("render_frame_with_rotation_128x32", |b| {
        b.iter(|| {
            render_frame_with_rotation(
                black_box(&frame),
                &catalog,
                &matches,
                Resolution::Base,
                &options,
                &table,
                &[1, 2, 0, 0],
                &mut out,
                &mut cache,
            )
        })
    });

    group.finish();
}

// =============================================================================
// Rotation Benchmarks
// =============================================================================

fn bench_rotation(c: &mut Criterion) {
    let mut group = c.benchmark_group("rotation");

    let scene = make_scene(128, 32, 4);
    let frame = scene.frame_view();
    let views = scene.sprite_views();
    let catalog = CatalogView::new(scene.geometry, &views);
    let matches = locate_sprites(&frame, &catalog, 32);
    let table = scene.rotation_table().expect("scene has rotations");

    let mut rendered = vec![0u16; scene.geometry.base_pixel_count()];
    let mut cache = RotationCache::new(rendered.len());
    render_frame_with_rotation(
        &frame,
        &catalog,
        &matches,
        Resolution::Base,
        &RenderOptions::default(),
        &table,
        &[0; 4],
        &mut rendered,
        &mut cache,
    )
    .expect("benchmark frame renders");
    let mut output = vec![0u16; rendered.len()];

    group.throughput(Throughput::Elements(rendered.len() as u64));

    // Every iteration is one due tick: the clock advances by the shortest delay
    group.bench_function("apply_rotations_full_scan", |b| {
        let mut state = RotationState::new(&table, 0);
        let mut now = 0u32;
        b.iter(|| {
            now = now.wrapping_add(50);
            apply_rotations(&table, black_box(&rendered), &mut output, &mut state, now)
        })
    });

    group.bench_function("apply_rotations_cached", |b| {
        let mut state = RotationState::new(&table, 0);
        let mut now = 0u32;
        b.iter(|| {
            now = now.wrapping_add(50);
            apply_rotations_cached(&table, black_box(&rendered), &mut output, &cache, &mut state, now)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_locate, bench_render, bench_rotation);
criterion_main!(benches);
