//! Map-info overlay: waypoints, triggers and base numbers
//!
//! Annotations are gathered per tile into a [`TileGrid`] of [`TileInfo`],
//! then each annotated tile is drawn as a darkened box with its labels in
//! the bitmap font. Sprite-trigger labels move to a free neighboring tile
//! when their own tile already carries an annotation.

use image::{GrayImage, Luma};

use crate::config::RenderConfig;
use crate::font::{draw_text, LINE_HEIGHT};
use crate::models::{Direction, MapBounds, Rect, TilePos};
use crate::occupancy::{Placed, TileGrid};
use crate::profile::GameProfile;
use crate::remap::{FadeParams, RemapTable};
use crate::scene::Scene;
use crate::sprite::SpriteKind;
use crate::theater::Theater;

/// Blend strength of the backing box.
const BOX_FADE: u8 = 160;

/// Labels attached to one tile, in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileInfo {
    pub tile: TilePos,
    pub waypoints: Vec<String>,
    pub cell_triggers: Vec<String>,
    /// Sprite triggers and base numbers.
    pub object_labels: Vec<String>,
}

impl TileInfo {
    pub fn new(tile: TilePos) -> Self {
        Self { tile, waypoints: Vec::new(), cell_triggers: Vec::new(), object_labels: Vec::new() }
    }

    /// Every label in draw order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.waypoints
            .iter()
            .chain(&self.cell_triggers)
            .chain(&self.object_labels)
            .map(String::as_str)
    }
}

impl Placed for TileInfo {
    fn tile(&self) -> TilePos {
        self.tile
    }
}

/// Tile for an object label: its own tile if free, else the first free
/// neighbor (north, east, south, west) inside the visible bounds, else its
/// own tile anyway.
fn label_tile(grid: &TileGrid<TileInfo>, bounds: &MapBounds, tile: TilePos) -> TilePos {
    if !grid.is_occupied(tile) {
        return tile;
    }
    Direction::ALL
        .iter()
        .map(|&dir| tile.step(dir))
        .find(|&pos| bounds.contains(pos) && grid.contains(pos) && !grid.is_occupied(pos))
        .unwrap_or(tile)
}

fn push_object_label(
    grid: &mut TileGrid<TileInfo>,
    bounds: &MapBounds,
    tile: TilePos,
    label: String,
) {
    let pos = label_tile(grid, bounds, tile);
    if let Some(info) = grid.get_or_insert_with(pos, || TileInfo::new(pos)) {
        info.object_labels.push(label);
    }
}

/// Gather the annotations the configuration asks for.
pub fn collect_annotations(
    scene: &Scene,
    profile: &GameProfile,
    config: &RenderConfig,
) -> TileGrid<TileInfo> {
    let mut grid = TileGrid::new(profile.map_width, profile.map_height);
    let declarations = &scene.declarations;

    if config.draw_waypoints {
        for waypoint in &declarations.waypoints {
            let tile = waypoint.tile;
            if let Some(info) = grid.get_or_insert_with(tile, || TileInfo::new(tile)) {
                info.waypoints.push(waypoint.number.to_string());
            }
        }
    }

    if config.draw_cell_triggers {
        for trigger in &declarations.cell_triggers {
            let tile = trigger.tile;
            if let Some(info) = grid.get_or_insert_with(tile, || TileInfo::new(tile)) {
                info.cell_triggers.push(trigger.trigger.clone());
            }
        }
    }

    if config.draw_sprite_triggers {
        for sprite in scene.objects() {
            if matches!(sprite.kind, SpriteKind::Shadow) {
                continue;
            }
            if let Some(trigger) = &sprite.trigger {
                push_object_label(&mut grid, &scene.bounds, sprite.tile, trigger.clone());
            }
        }
    }

    if config.draw_base_numbers {
        for sprite in &scene.base {
            if let Some(state) = sprite.structure() {
                let label = format!("#{}", state.base_number);
                push_object_label(&mut grid, &scene.bounds, sprite.tile, label);
            }
        }
    }

    log::debug!("collected annotations on {} tiles", grid.occupied_count());
    grid
}

/// Apply a remap to every pixel inside a rectangle.
fn remap_box(canvas: &mut GrayImage, area: Rect, remap: &RemapTable) {
    let left = area.x.max(0);
    let top = area.y.max(0);
    let right = area.right().min(canvas.width() as i32);
    let bottom = area.bottom().min(canvas.height() as i32);
    for y in top..bottom {
        for x in left..right {
            let pixel = canvas.get_pixel_mut(x as u32, y as u32);
            *pixel = Luma([remap.apply(pixel[0])]);
        }
    }
}

/// Paint annotations. `origin` is the map pixel shown at canvas (0, 0).
pub fn draw_annotations(
    canvas: &mut GrayImage,
    annotations: &TileGrid<TileInfo>,
    theater: &mut Theater,
    profile: &GameProfile,
    origin: (i32, i32),
) {
    if annotations.occupied_count() == 0 {
        return;
    }
    let black = theater.palette().nearest_index([0, 0, 0]);
    let white = theater.palette().nearest_index([63, 63, 63]);
    let darken = theater.fade(FadeParams::conquer(profile.game, black, BOX_FADE));
    let ts = profile.tile_size as i32;

    for (pos, info) in annotations.all_occupied() {
        let size = profile.tile_size;
        let area = Rect::new(pos.x * ts - origin.0, pos.y * ts - origin.1, size, size);
        remap_box(canvas, area, &darken);
        for (line, text) in info.lines().enumerate() {
            let y = area.y + 1 + line as i32 * LINE_HEIGHT as i32;
            draw_text(canvas, text, area.x + 1, y, white, area);
        }
    }
}
