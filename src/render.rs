//! Map and radar rendering entry points
//!
//! One call renders one map to completion: decode, assemble, sort, then
//! composite into an indexed buffer. Batch rendering isolates failures per
//! map.

use image::GrayImage;

use crate::composite::{draw_sprite, draw_visual};
use crate::config::RenderConfig;
use crate::error::{RenderError, Result, Warning, Warnings};
use crate::models::MapDescription;
use crate::overlay::{collect_annotations, draw_annotations};
use crate::profile::GameProfile;
use crate::radar::blit_mini_tile;
use crate::scene::Scene;
use crate::sprite::{DrawMode, SpriteKind, Visual};
use crate::theater::Theater;

/// Everything one render needs besides the map itself.
#[derive(Debug)]
pub struct RenderContext<'a> {
    pub theater: &'a mut Theater,
    pub profile: GameProfile,
    pub config: &'a RenderConfig,
}

impl<'a> RenderContext<'a> {
    /// Context using the profile the configuration names.
    pub fn new(theater: &'a mut Theater, config: &'a RenderConfig) -> Self {
        Self { theater, profile: config.profile(), config }
    }
}

/// Composited map and the warnings raised while building it.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// Palette indices, one pixel per map pixel inside the map bounds.
    pub image: GrayImage,
    pub warnings: Vec<Warning>,
}

/// One radar image per requested scale.
#[derive(Debug, Clone)]
pub struct RadarOutput {
    pub images: Vec<RadarImage>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct RadarImage {
    /// Pixels per tile edge.
    pub scale: u32,
    pub image: GrayImage,
}

/// Render a map into a new buffer sized to its bounds.
///
/// # Error Handling
///
/// - Missing assets, undefined smudges and malformed records: skipped with
///   a warning
/// - Out-of-range directions, sub-cells or frame indices: the map fails
///   with a [`RenderError`]
///
/// # Examples
///
/// ```
/// use mapraster::config::RenderConfig;
/// use mapraster::models::{MapBounds, MapDescription};
/// use mapraster::palette::{Palette, PALETTE_SIZE};
/// use mapraster::render::{render_map, RenderContext};
/// use mapraster::theater::Theater;
///
/// let mut theater = Theater::new("TEMPERATE", Palette::new([[0; 3]; PALETTE_SIZE]));
/// let config = RenderConfig::default();
/// let mut ctx = RenderContext::new(&mut theater, &config);
///
/// let map = MapDescription::new(MapBounds::new(0, 0, 2, 2));
/// let output = render_map(&map, &mut ctx).unwrap();
/// assert_eq!(output.image.dimensions(), (48, 48));
/// // no CLEAR1 template in this theater
/// assert_eq!(output.warnings.len(), 1);
/// ```
pub fn render_map(map: &MapDescription, ctx: &mut RenderContext<'_>) -> Result<RenderOutput> {
    let (width, height) = map.bounds.pixel_size(ctx.profile.tile_size);
    let mut image = GrayImage::new(width, height);
    let warnings = render_map_into(map, ctx, &mut image)?;
    Ok(RenderOutput { image, warnings })
}

/// Render a map into a caller-provided buffer of exactly the map's pixel size.
pub fn render_map_into(
    map: &MapDescription,
    ctx: &mut RenderContext<'_>,
    canvas: &mut GrayImage,
) -> Result<Vec<Warning>> {
    let expected = map.bounds.pixel_size(ctx.profile.tile_size);
    if canvas.dimensions() != expected {
        return Err(RenderError::CanvasSize { expected, actual: canvas.dimensions() });
    }

    let mut warnings = Warnings::new();
    let scene = Scene::build(map, ctx.theater, &ctx.profile, ctx.config, &mut warnings)?;
    let sprites = scene.draw_list(&ctx.profile)?;
    let origin = map_origin(map, &ctx.profile);

    let shadows = ctx.theater.shadow_filters();
    for visual in &scene.templates {
        draw_visual(canvas, visual, origin, shadows);
    }
    for sprite in &sprites {
        draw_sprite(canvas, sprite, origin, shadows);
    }
    log::debug!("drew {} templates and {} sprites", scene.templates.len(), sprites.len());

    if ctx.config.draws_overlay() {
        let annotations = collect_annotations(&scene, &ctx.profile, ctx.config);
        draw_annotations(canvas, &annotations, ctx.theater, &ctx.profile, origin);
    }

    Ok(warnings.into_vec())
}

/// Render one radar image per scale in the configuration.
///
/// The radar shows templates, overlay, terrain objects and structures,
/// each tile reduced to a mini-tile and scaled. Base ghosts and concealed
/// objects are left out.
pub fn render_radar(map: &MapDescription, ctx: &mut RenderContext<'_>) -> Result<RadarOutput> {
    let config = ctx.config;
    if let Some(&bad) = config.radar_scales.iter().find(|&&scale| scale == 0) {
        return Err(RenderError::InvalidRadarScale(bad));
    }

    let mut warnings = Warnings::new();
    let scene = Scene::build(map, ctx.theater, &ctx.profile, config, &mut warnings)?;
    let sprites = scene.draw_list(&ctx.profile)?;

    let mut layers: Vec<&Visual> = scene.templates.iter().collect();
    layers.extend(
        sprites
            .iter()
            .filter(|s| shows_on_radar(&s.kind))
            .flat_map(|s| s.layers())
            .filter(|v| v.mode == DrawMode::Normal),
    );

    let mut probed_outside = false;
    let mut images = Vec::with_capacity(config.radar_scales.len());
    for &scale in &config.radar_scales {
        let image = draw_radar(map, ctx, &layers, scale, &mut probed_outside);
        images.push(RadarImage { scale, image });
    }
    if probed_outside {
        log::warn!("radar sampling probed outside a frame; treated as transparent");
    }

    Ok(RadarOutput { images, warnings: warnings.into_vec() })
}

fn shows_on_radar(kind: &SpriteKind) -> bool {
    matches!(kind, SpriteKind::Overlay | SpriteKind::Terrain | SpriteKind::Structure(_))
}

fn draw_radar(
    map: &MapDescription,
    ctx: &mut RenderContext<'_>,
    layers: &[&Visual],
    scale: u32,
    probed_outside: &mut bool,
) -> GrayImage {
    let tile_size = ctx.profile.tile_size;
    let ts = tile_size as i32;
    let bounds = map.bounds;
    let mut canvas = GrayImage::new(bounds.width * scale, bounds.height * scale);

    for visual in layers {
        let source = visual.source.as_ref();
        let Some((tiles, outside)) = ctx.theater.mini_tiles(source, visual.frame, tile_size) else {
            continue;
        };
        *probed_outside |= outside;

        let base_x = visual.offset.0.div_euclid(ts) - bounds.x;
        let base_y = visual.offset.1.div_euclid(ts) - bounds.y;
        let remap = (!visual.remap.is_identity()).then_some(visual.remap.as_ref());
        for (tx, ty, tile) in tiles.iter() {
            let x = (base_x + tx as i32) * scale as i32;
            let y = (base_y + ty as i32) * scale as i32;
            blit_mini_tile(&mut canvas, tile, x, y, scale, remap);
        }
    }
    canvas
}

/// Map pixel shown at canvas (0, 0).
fn map_origin(map: &MapDescription, profile: &GameProfile) -> (i32, i32) {
    let ts = profile.tile_size as i32;
    (map.bounds.x * ts, map.bounds.y * ts)
}

/// Render maps one after another. A failing map does not stop the batch.
pub fn render_batch(
    maps: &[MapDescription],
    ctx: &mut RenderContext<'_>,
) -> Vec<Result<RenderOutput>> {
    maps.iter()
        .enumerate()
        .map(|(i, map)| {
            let result = render_map(map, ctx);
            if let Err(e) = &result {
                log::warn!("map {} failed: {}", i, e);
            }
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::{ShadowFilter, NO_FILTER};
    use crate::models::MapBounds;
    use crate::palette::{Palette, PALETTE_SIZE};
    use crate::sprite::test_support::solid_sheet;

    fn theater() -> Theater {
        Theater::new("TEMPERATE", Palette::new([[0u8; 3]; PALETTE_SIZE]))
            .with_template("CLEAR1", solid_sheet("CLEAR1", 16, 24, 24))
            .with_asset("T01", solid_sheet("T01", 1, 24, 24))
            .with_asset("SC1", solid_sheet("SC1", 1, 24, 24))
    }

    #[test]
    fn test_canvas_size_mismatch() {
        let mut theater = theater();
        let config = RenderConfig::default();
        let mut ctx = RenderContext::new(&mut theater, &config);
        let map = MapDescription::new(MapBounds::new(0, 0, 2, 2));
        let mut canvas = GrayImage::new(10, 10);
        let err = render_map_into(&map, &mut ctx, &mut canvas).unwrap_err();
        assert_eq!(err, RenderError::CanvasSize { expected: (48, 48), actual: (10, 10) });
    }

    #[test]
    fn test_templates_then_sprites() {
        let mut theater = theater();
        let config = RenderConfig::default();
        let mut ctx = RenderContext::new(&mut theater, &config);
        let map =
            MapDescription::new(MapBounds::new(1, 1, 2, 1)).with_record("Terrain", "66", "T01");
        let output = render_map(&map, &mut ctx).unwrap();

        // tile (1, 1) shows CLEAR1 icon 1 + 4 = 5, i.e. index 6
        assert_eq!(output.image.get_pixel(0, 0)[0], 6);
        // the tree at (2, 1) covers the template
        assert_eq!(output.image.get_pixel(30, 5)[0], 1);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_shadow_filters_apply() {
        let mut table = [NO_FILTER; PALETTE_SIZE];
        table[1] = 2;
        let mut theater = theater().with_asset("ORCA", solid_sheet("ORCA", 32, 24, 24));
        theater.add_shadow_filter(ShadowFilter::new(table));
        let config = RenderConfig::default();
        let mut ctx = RenderContext::new(&mut theater, &config);

        // CLEAR1 icon 0 is index 1 at tile (0, 0)
        let map = MapDescription::new(MapBounds::new(0, 0, 1, 2))
            .with_record("Aircraft", "0", "GoodGuy,ORCA,256,0,0,Guard");
        let output = render_map(&map, &mut ctx).unwrap();
        // the body covers rows 0..12 at -12 offset; the shadow shows at row 12..24
        assert_eq!(output.image.get_pixel(3, 20)[0], 2);
        assert_eq!(output.image.get_pixel(3, 5)[0], 1);
    }

    #[test]
    fn test_radar_scales() {
        let mut theater = theater();
        let config = RenderConfig { radar_scales: vec![1, 3, 6], ..Default::default() };
        let mut ctx = RenderContext::new(&mut theater, &config);
        let map =
            MapDescription::new(MapBounds::new(0, 0, 2, 2)).with_record("Terrain", "1", "T01");
        let output = render_radar(&map, &mut ctx).unwrap();

        let sizes: Vec<_> = output.images.iter().map(|r| (r.scale, r.image.dimensions())).collect();
        assert_eq!(sizes, vec![(1, (2, 2)), (3, (6, 6)), (6, (12, 12))]);
        let native = &output.images[1].image;
        // tree at (1, 0), CLEAR1 icon 0 at (0, 0)
        assert_eq!(native.get_pixel(4, 1)[0], 1);
        assert_eq!(native.get_pixel(1, 1)[0], 1);
        // CLEAR1 icon (1 % 4) + (1 % 4) * 4 = 5 at (1, 1)
        assert_eq!(native.get_pixel(4, 4)[0], 6);
    }

    #[test]
    fn test_radar_rejects_zero_scale() {
        let mut theater = theater();
        let config = RenderConfig { radar_scales: vec![3, 0], ..Default::default() };
        let mut ctx = RenderContext::new(&mut theater, &config);
        let map = MapDescription::new(MapBounds::new(0, 0, 1, 1));
        assert_eq!(render_radar(&map, &mut ctx).unwrap_err(), RenderError::InvalidRadarScale(0));
    }

    #[test]
    fn test_batch_isolates_failures() {
        let mut theater = theater();
        let config = RenderConfig::default();
        let mut ctx = RenderContext::new(&mut theater, &config);
        let good = MapDescription::new(MapBounds::new(0, 0, 1, 1));
        let bad = MapDescription::new(MapBounds::new(0, 0, 1, 1))
            .with_record("Units", "0", "GoodGuy,MTNK,256,0,300,Guard");
        let results = render_batch(&[good.clone(), bad, good], &mut ctx);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(RenderError::InvalidDirection { value: 300, .. })));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_annotations_are_drawn_last() {
        let mut theater = theater();
        let config = RenderConfig { draw_waypoints: true, ..Default::default() };
        let mut ctx = RenderContext::new(&mut theater, &config);
        let map =
            MapDescription::new(MapBounds::new(0, 0, 1, 1)).with_record("Waypoints", "0", "0");
        let plain = render_map(&MapDescription::new(MapBounds::new(0, 0, 1, 1)), &mut ctx).unwrap();
        let labeled = render_map(&map, &mut ctx).unwrap();
        assert_ne!(plain.image, labeled.image);
    }
}
