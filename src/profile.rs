//! Per-game coordinate profiles.
//!
//! Map grid size, tile size, and the draw-priority plane constant all come
//! from one [`GameProfile`] value that is passed through the pipeline.

use serde::{Deserialize, Serialize};

use crate::models::{TilePos, LEPTONS_PER_TILE};

/// Which game's numbering and grid to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Game {
    #[default]
    TiberianDawn,
    RedAlert,
}

/// Coordinate system of one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameProfile {
    pub game: Game,
    /// Grid width in tiles; also the stride of cell numbers.
    pub map_width: u32,
    pub map_height: u32,
    /// Edge length of one tile in pixels.
    pub tile_size: u32,
}

impl GameProfile {
    pub const TIBERIAN_DAWN: GameProfile =
        GameProfile { game: Game::TiberianDawn, map_width: 64, map_height: 64, tile_size: 24 };

    pub const RED_ALERT: GameProfile =
        GameProfile { game: Game::RedAlert, map_width: 128, map_height: 128, tile_size: 24 };

    pub fn for_game(game: Game) -> GameProfile {
        match game {
            Game::TiberianDawn => Self::TIBERIAN_DAWN,
            Game::RedAlert => Self::RED_ALERT,
        }
    }

    /// Multiplier separating priority planes.
    ///
    /// Exceeds every positional term `x + y * map_width * 256` of a sort
    /// point inside the grid. Priority keys clamp sort points to the grid, so
    /// footprints reaching past the last row or column stay below it.
    pub fn plane_constant(&self) -> i64 {
        let row = self.map_width as i64 * LEPTONS_PER_TILE as i64;
        row * self.map_height as i64 * LEPTONS_PER_TILE as i64
    }

    /// Largest lepton coordinates inside the grid.
    pub fn max_lepton(&self) -> (i64, i64) {
        let leptons = LEPTONS_PER_TILE as i64;
        (self.map_width as i64 * leptons - 1, self.map_height as i64 * leptons - 1)
    }

    /// Convert a cell number to a tile, `None` outside the grid.
    pub fn cell_to_tile(&self, cell: i64) -> Option<TilePos> {
        let total = self.map_width as i64 * self.map_height as i64;
        if cell < 0 || cell >= total {
            return None;
        }
        let width = self.map_width as i64;
        Some(TilePos::new((cell % width) as i32, (cell / width) as i32))
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as u32) < self.map_width
            && (pos.y as u32) < self.map_height
    }
}

impl Default for GameProfile {
    fn default() -> Self {
        Self::TIBERIAN_DAWN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_tile() {
        let td = GameProfile::TIBERIAN_DAWN;
        assert_eq!(td.cell_to_tile(0), Some(TilePos::new(0, 0)));
        assert_eq!(td.cell_to_tile(65), Some(TilePos::new(1, 1)));
        assert_eq!(td.cell_to_tile(64 * 64), None);
        assert_eq!(td.cell_to_tile(-1), None);

        let ra = GameProfile::RED_ALERT;
        assert_eq!(ra.cell_to_tile(129), Some(TilePos::new(1, 1)));
    }

    #[test]
    fn test_plane_constant_exceeds_positional_range() {
        for profile in [GameProfile::TIBERIAN_DAWN, GameProfile::RED_ALERT] {
            let width = profile.map_width as i64 * 256;
            let max_x = width - 1;
            let max_y = profile.map_height as i64 * 256 - 1;
            assert!(max_x + max_y * width < profile.plane_constant());
        }
    }
}
