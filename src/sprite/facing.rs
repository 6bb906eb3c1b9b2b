//! Direction and sub-cell conversions for units and infantry.

use crate::models::{Lepton, LEPTONS_PER_TILE};

/// Body frame for a 32-facing sheet. Sheets run counter-clockwise from north.
pub fn body_facing(direction: u8) -> usize {
    ((256 - direction as usize + 4) / 8) % 32
}

/// Standing frame for an 8-facing infantry sheet.
pub fn infantry_facing(direction: u8) -> usize {
    ((direction as usize + 16) / 32) % 8
}

/// Lepton position of an infantry sub-cell, `None` outside 0..=4.
pub fn subcell_lepton(subcell: u8) -> Option<Lepton> {
    let quarter = LEPTONS_PER_TILE / 4;
    let (x, y) = match subcell {
        0 => (2, 2),
        1 => (1, 1),
        2 => (3, 1),
        3 => (1, 3),
        4 => (3, 3),
        _ => return None,
    };
    Some(Lepton::new(x * quarter, y * quarter))
}

/// Pixel position of an infantry sub-cell inside a tile.
pub fn subcell_pixel(subcell: u8, tile_size: u32) -> Option<(i32, i32)> {
    subcell_lepton(subcell).map(|lepton| {
        let ts = tile_size as i32;
        (lepton.x * ts / LEPTONS_PER_TILE, lepton.y * ts / LEPTONS_PER_TILE)
    })
}
