//! Criterion benchmarks for mapraster critical paths
//!
//! Benchmarks the core performance-critical operations:
//! - Remap: fade table generation against a full palette
//! - Priority: sorting a dense sprite list
//! - Composite: frame blitting in every draw mode
//! - Radar: mini-tile decomposition
//! - Render: a full map render

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::GrayImage;
use mapraster::composite::{blit_frame, ShadowFilter, NO_FILTER};
use mapraster::config::RenderConfig;
use mapraster::models::{Frame, FrameSource, MapBounds, MapDescription, SpriteSheet, TilePos};
use mapraster::palette::{Palette, PALETTE_SIZE};
use mapraster::priority::sort_by_priority;
use mapraster::profile::{Game, GameProfile};
use mapraster::radar::decompose_frame;
use mapraster::remap::{build_fade_table, FadeParams, RemapTable};
use mapraster::render::{render_map, RenderContext};
use mapraster::sprite::{DrawMode, Sprite, SpriteKind, Visual};
use mapraster::theater::Theater;
use std::sync::Arc;

// =============================================================================
// Test Data Generators
// =============================================================================

/// Palette with a smooth ramp in every channel
fn make_palette() -> Palette {
    let mut colors = [[0u8; 3]; PALETTE_SIZE];
    for (i, color) in colors.iter_mut().enumerate() {
        *color = [(i % 64) as u8, ((i * 3) % 64) as u8, ((i * 7) % 64) as u8];
    }
    Palette::new(colors)
}

/// Frame with a diagonal pattern and a transparent border
fn make_frame(size: u32) -> Frame {
    let indices = (0..size * size)
        .map(|i| {
            let (x, y) = (i % size, i / size);
            if x == 0 || y == 0 { 0 } else { ((x + y) % 255 + 1) as u8 }
        })
        .collect();
    Frame::from_indices(size, size, indices).expect("frame dimensions match")
}

fn make_sheet(name: &str, count: usize, size: u32) -> Arc<dyn FrameSource> {
    Arc::new(SpriteSheet::new(name, (0..count).map(|_| make_frame(size)).collect()))
}

/// Sprites scattered over the grid in a fixed pseudo-random order
fn make_sprites(count: usize, profile: &GameProfile) -> Vec<Sprite> {
    let sheet = make_sheet("MTNK", 1, 24);
    let remap = Arc::new(RemapTable::identity());
    (0..count)
        .map(|i| {
            let x = (i * 37) as u32 % profile.map_width;
            let y = (i * 53) as u32 % profile.map_height;
            let visual = Visual::new(Arc::clone(&sheet), 0, (0, 0), Arc::clone(&remap));
            Sprite::new("MTNK", TilePos::new(x as i32, y as i32), SpriteKind::Unit, visual)
        })
        .collect()
}

// =============================================================================
// Remap Benchmarks
// =============================================================================

fn bench_remap(c: &mut Criterion) {
    let mut group = c.benchmark_group("remap");
    let palette = make_palette();

    group.bench_function("fade_basic", |b| {
        b.iter(|| build_fade_table(black_box(&palette), &FadeParams::basic(12, 128)))
    });

    group.bench_function("fade_conquer_red_alert", |b| {
        let params = FadeParams::conquer(Game::RedAlert, 12, 128);
        b.iter(|| build_fade_table(black_box(&palette), &params))
    });

    group.bench_function("fade_full_palette", |b| {
        b.iter(|| build_fade_table(black_box(&palette), &FadeParams::full_palette(12, 200)))
    });

    group.finish();
}

// =============================================================================
// Priority Benchmarks
// =============================================================================

fn bench_priority(c: &mut Criterion) {
    let mut group = c.benchmark_group("priority");
    let profile = GameProfile::RED_ALERT;

    for count in [100, 1000, 10000].iter() {
        let sprites = make_sprites(*count, &profile);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("sort", count), &sprites, |b, sprites| {
            b.iter(|| {
                let mut list = sprites.clone();
                sort_by_priority(black_box(&mut list), &profile);
                list
            })
        });
    }

    group.finish();
}

// =============================================================================
// Composite Benchmarks
// =============================================================================

fn bench_composite(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite");
    let frame = make_frame(48);
    let remap = RemapTable::identity();
    let mut table = [NO_FILTER; PALETTE_SIZE];
    table[10] = 2;
    let shadows = [ShadowFilter::new(table)];

    for mode in [DrawMode::Normal, DrawMode::Dithered, DrawMode::ShadowFiltered] {
        let name = format!("{:?}", mode).to_lowercase();
        group.bench_function(&name, |b| {
            let mut canvas = GrayImage::new(96, 96);
            b.iter(|| blit_frame(&mut canvas, black_box(&frame), 20, 20, &remap, mode, &shadows))
        });
    }

    group.bench_function("clipped", |b| {
        let mut canvas = GrayImage::new(96, 96);
        b.iter(|| {
            blit_frame(&mut canvas, black_box(&frame), 80, -30, &remap, DrawMode::Normal, &shadows)
        })
    });

    group.finish();
}

// =============================================================================
// Radar Benchmarks
// =============================================================================

fn bench_radar(c: &mut Criterion) {
    let mut group = c.benchmark_group("radar");

    for tiles in [1u32, 2, 4].iter() {
        let frame = make_frame(24 * tiles);
        group.throughput(Throughput::Elements((*tiles * *tiles) as u64));
        group.bench_with_input(BenchmarkId::new("decompose", tiles), &frame, |b, frame| {
            b.iter(|| decompose_frame(black_box(frame), 24))
        });
    }

    group.finish();
}

// =============================================================================
// Render Benchmarks
// =============================================================================

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let mut theater = Theater::new("TEMPERATE", make_palette())
        .with_template("CLEAR1", make_sheet("CLEAR1", 16, 24))
        .with_asset("T01", make_sheet("T01", 1, 48))
        .with_asset("CR1", make_sheet("CR1", 6, 24));
    let config = RenderConfig::default();

    let mut map = MapDescription::new(MapBounds::new(0, 0, 32, 32));
    for i in 0..64 {
        let cell = (i * 67) % (64 * 32);
        map.push_record("Terrain", cell.to_string(), "T01");
        map.push_record("Smudge", i.to_string(), format!("CR1,{}", cell + 1));
    }

    group.bench_function("map_32x32", |b| {
        let mut ctx = RenderContext::new(&mut theater, &config);
        b.iter(|| render_map(black_box(&map), &mut ctx))
    });

    group.finish();
}

criterion_group!(benches, bench_remap, bench_priority, bench_composite, bench_radar, bench_render);
criterion_main!(benches);
