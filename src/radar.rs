//! Radar mini-tiles: 3×3 point-sampled summaries of game tiles
//!
//! Each game tile of a frame is reduced to a [`MiniTile`] by sampling a 3×3
//! grid of points. Mini-tiles are then scaled with nearest-neighbor sampling
//! to the requested radar scale.

use image::{GrayImage, Luma};

use crate::models::Frame;
use crate::palette::TRANSPARENT_INDEX;
use crate::remap::RemapTable;

/// Edge length of a mini-tile in pixels.
pub const MINI_TILE_SIZE: u32 = 3;

/// Palette index reserved for shadows; never picked for the radar.
pub const RADAR_SHADOW_INDEX: u8 = 4;

/// Offsets tried around each sample point, in order.
const PROBE_OFFSETS: [i32; 3] = [0, 1, -1];

/// 3×3 indices, row-major.
pub type MiniTile = [u8; (MINI_TILE_SIZE * MINI_TILE_SIZE) as usize];

/// Mini-tiles of every game tile covered by one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiniTileSet {
    pub tiles_wide: u32,
    pub tiles_high: u32,
    tiles: Vec<MiniTile>,
}

impl MiniTileSet {
    pub fn get(&self, tx: u32, ty: u32) -> Option<&MiniTile> {
        if tx >= self.tiles_wide || ty >= self.tiles_high {
            return None;
        }
        self.tiles.get((ty * self.tiles_wide + tx) as usize)
    }

    /// Tiles with their offset inside the frame, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &MiniTile)> {
        let wide = self.tiles_wide.max(1);
        self.tiles.iter().enumerate().map(move |(i, tile)| (i as u32 % wide, i as u32 / wide, tile))
    }
}

/// Result of decomposing one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposition {
    pub tiles: MiniTileSet,
    /// Some fallback probe read outside the frame.
    pub probed_outside: bool,
}

/// Split a frame into game tiles and sample a mini-tile for each.
pub fn decompose_frame(frame: &Frame, tile_size: u32) -> Decomposition {
    let zoom = (tile_size / MINI_TILE_SIZE).max(1) as i32;
    let tweak = zoom / 2;
    let tiles_wide = frame.width().div_ceil(tile_size);
    let tiles_high = frame.height().div_ceil(tile_size);

    let mut probed_outside = false;
    let mut tiles = Vec::with_capacity((tiles_wide * tiles_high) as usize);

    for ty in 0..tiles_high {
        for tx in 0..tiles_wide {
            let mut mini = [TRANSPARENT_INDEX; 9];
            for my in 0..MINI_TILE_SIZE as i32 {
                for mx in 0..MINI_TILE_SIZE as i32 {
                    let x = (tx * tile_size) as i32 + tweak + mx * zoom;
                    let y = (ty * tile_size) as i32 + tweak + my * zoom;
                    let slot = (my * MINI_TILE_SIZE as i32 + mx) as usize;
                    mini[slot] = sample(frame, x, y, &mut probed_outside);
                }
            }
            tiles.push(mini);
        }
    }

    Decomposition { tiles: MiniTileSet { tiles_wide, tiles_high, tiles }, probed_outside }
}

/// First probe that is neither transparent nor the shadow index.
fn sample(frame: &Frame, x: i32, y: i32, probed_outside: &mut bool) -> u8 {
    for delta in PROBE_OFFSETS {
        match frame.index_at(x + delta, y + delta) {
            Some(index) if index != TRANSPARENT_INDEX && index != RADAR_SHADOW_INDEX => {
                return index;
            }
            Some(_) => {}
            None => *probed_outside = true,
        }
    }
    TRANSPARENT_INDEX
}

/// Mini-tile row/column shown at output pixel `d` of a `scale`-pixel tile.
///
/// Upscaling beyond the native size rounds with a one-step bias, which
/// reproduces the game's radar pixel placement.
pub fn source_index(d: u32, scale: u32) -> usize {
    let index = if scale > MINI_TILE_SIZE {
        (d * MINI_TILE_SIZE + 1) / scale
    } else {
        d * MINI_TILE_SIZE / scale
    };
    index.min(MINI_TILE_SIZE - 1) as usize
}

/// Paint a mini-tile scaled to `scale`×`scale` pixels at (x, y).
///
/// Transparent entries leave the canvas untouched.
pub fn blit_mini_tile(
    canvas: &mut GrayImage,
    tile: &MiniTile,
    x: i32,
    y: i32,
    scale: u32,
    remap: Option<&RemapTable>,
) {
    for dy in 0..scale {
        let py = y + dy as i32;
        if py < 0 || py >= canvas.height() as i32 {
            continue;
        }
        let row = source_index(dy, scale);
        for dx in 0..scale {
            let px = x + dx as i32;
            if px < 0 || px >= canvas.width() as i32 {
                continue;
            }
            let index = tile[row * MINI_TILE_SIZE as usize + source_index(dx, scale)];
            if index == TRANSPARENT_INDEX {
                continue;
            }
            let value = remap.map_or(index, |table| table.apply(index));
            canvas.put_pixel(px as u32, py as u32, Luma([value]));
        }
    }
}
