//! Indexed pixel blitting with dithering and shadow filters
//!
//! The canvas is a [`GrayImage`] whose pixel values are palette indices.
//! Index 0 in a frame is transparent and never written.

use image::{GrayImage, Luma};

use crate::models::Frame;
use crate::palette::{PALETTE_SIZE, TRANSPARENT_INDEX};
use crate::remap::RemapTable;
use crate::sprite::{DrawMode, Sprite, Visual};

/// 4×4 mask for dithered drawing, rows most significant first.
/// A set bit skips the pixel.
pub const DITHER_MASK: u16 = 0xA5A5;

/// Shadow filter entry meaning "keep the sprite's own color".
pub const NO_FILTER: u8 = 0;

/// Whether the dither mask skips canvas pixel (x, y).
#[inline]
pub fn dither_skips(x: u32, y: u32) -> bool {
    let bit = (y & 3) * 4 + (x & 3);
    (DITHER_MASK >> (15 - bit)) & 1 == 1
}

/// Destination-index substitution table for shadow drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowFilter([u8; PALETTE_SIZE]);

impl ShadowFilter {
    pub fn new(table: [u8; PALETTE_SIZE]) -> Self {
        Self(table)
    }

    /// Filter that maps every index to [`NO_FILTER`].
    pub fn passthrough() -> Self {
        Self([NO_FILTER; PALETTE_SIZE])
    }

    /// Substitute for a destination index, `None` when unfiltered.
    pub fn lookup(&self, destination: u8) -> Option<u8> {
        let value = self.0[destination as usize];
        (value != NO_FILTER).then_some(value)
    }
}

/// First substitute any filter in the chain offers for `destination`.
fn filtered(shadows: &[ShadowFilter], destination: u8) -> Option<u8> {
    shadows.iter().find_map(|filter| filter.lookup(destination))
}

/// Paint one frame onto the canvas with its top-left at (x, y).
///
/// Only opaque pixels inside the canvas are written; nothing wraps.
pub fn blit_frame(
    canvas: &mut GrayImage,
    frame: &Frame,
    x: i32,
    y: i32,
    remap: &RemapTable,
    mode: DrawMode,
    shadows: &[ShadowFilter],
) {
    if mode == DrawMode::Invisible {
        return;
    }

    let canvas_width = canvas.width() as i32;
    let canvas_height = canvas.height() as i32;

    for (fy, row) in frame.pixels().rows().enumerate() {
        let dest_y = y + fy as i32;
        if dest_y < 0 {
            continue;
        }
        if dest_y >= canvas_height {
            break;
        }

        for (fx, pixel) in row.enumerate() {
            let dest_x = x + fx as i32;
            if dest_x < 0 {
                continue;
            }
            if dest_x >= canvas_width {
                break;
            }

            let source = pixel[0];
            if source == TRANSPARENT_INDEX {
                continue;
            }

            let (dx, dy) = (dest_x as u32, dest_y as u32);
            let value = match mode {
                DrawMode::Dithered if dither_skips(dx, dy) => continue,
                DrawMode::ShadowFiltered => {
                    let below = canvas.get_pixel(dx, dy)[0];
                    filtered(shadows, below).unwrap_or_else(|| remap.apply(source))
                }
                _ => remap.apply(source),
            };
            canvas.put_pixel(dx, dy, Luma([value]));
        }
    }
}

/// Draw one visual. `origin` is the map pixel shown at canvas (0, 0).
///
/// Visuals whose frame does not exist draw nothing; assembly has already
/// rejected those for every sprite category except smudges.
pub fn draw_visual(
    canvas: &mut GrayImage,
    visual: &Visual,
    origin: (i32, i32),
    shadows: &[ShadowFilter],
) {
    let Some(frame) = visual.source.frame(visual.frame) else {
        return;
    };
    blit_frame(
        canvas,
        frame,
        visual.offset.0 - origin.0,
        visual.offset.1 - origin.1,
        &visual.remap,
        visual.mode,
        shadows,
    );
}

/// Draw a sprite followed by its chain.
pub fn draw_sprite(
    canvas: &mut GrayImage,
    sprite: &Sprite,
    origin: (i32, i32),
    shadows: &[ShadowFilter],
) {
    for visual in sprite.layers() {
        draw_visual(canvas, visual, origin, shadows);
    }
}
